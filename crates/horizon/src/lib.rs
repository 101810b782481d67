//! Horizon account queries for the NovaFund client.
//!
//! The donation flow needs exactly one read from Horizon: the current
//! state of an account: its sequence number and balances. Sequence
//! numbers are single-use, so accounts are loaded fresh before every
//! envelope build and never cached across phases.

pub mod account;
pub mod error;

pub use account::{Account, Balance};
pub use error::HorizonError;

use std::time::Duration;

use tracing::debug;

use account::AccountRecord;

/// Default timeout for Horizon requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A client for a Horizon server's account endpoint.
#[derive(Debug, Clone)]
pub struct HorizonClient {
    http: reqwest::Client,
    base_url: String,
}

impl HorizonClient {
    /// Creates a client for the given Horizon base URL.
    pub fn new(base_url: impl Into<String>) -> Result<Self, HorizonError> {
        let http = reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(DEFAULT_TIMEOUT)
            .build()?;
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Ok(Self { http, base_url })
    }

    /// Returns the base URL this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Loads the current state of an account.
    ///
    /// # Errors
    ///
    /// Returns [`HorizonError::AccountNotFound`] if the address has never
    /// been funded (Horizon answers 404), [`HorizonError::Transport`] for
    /// connectivity faults, and [`HorizonError::InvalidResponse`] when
    /// the body does not parse.
    pub async fn load_account(&self, address: &str) -> Result<Account, HorizonError> {
        let url = format!("{}/accounts/{}", self.base_url, address);
        debug!(%url, "loading account");

        let response = self.http.get(&url).send().await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(HorizonError::AccountNotFound(address.to_string()));
        }
        let record: AccountRecord = response.error_for_status()?.json().await?;
        record.into_account()
    }
}
