//! Soroban RPC client for the NovaFund client.
//!
//! This crate speaks the two JSON-RPC methods the donation flow needs:
//!
//! - `simulateTransaction`: a non-committing dry-run returning the
//!   invocation's effects (return value, resource footprint, auth
//!   entries) or a diagnostic.
//! - `sendTransaction`: hands a signed envelope to the network and
//!   reports whether it was accepted into the mempool.
//!
//! Envelopes travel as base64-encoded XDR in both directions. The client
//! is stateless per call and safe to share across concurrent tasks.

pub mod error;
mod response;
pub mod types;

pub use error::RpcError;
pub use types::{SimulationResult, SimulationSuccess, SubmissionOutcome};

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use stellar_xdr::curr::{Limits, TransactionEnvelope, WriteXdr};
use tracing::debug;

use response::{JsonRpcResponse, SendResponse, SimulateResponse};

/// Default timeout for RPC requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A JSON-RPC 2.0 client for a Soroban RPC server.
#[derive(Debug, Clone)]
pub struct SorobanRpcClient {
    http: reqwest::Client,
    url: String,
}

impl SorobanRpcClient {
    /// Creates a client for the given RPC endpoint URL.
    ///
    /// The underlying HTTP client uses rustls and a fixed request
    /// timeout.
    pub fn new(url: impl Into<String>) -> Result<Self, RpcError> {
        let http = reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(DEFAULT_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            url: url.into(),
        })
    }

    /// Returns the endpoint URL this client talks to.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Simulates a transaction without committing it.
    ///
    /// Idempotent and side-effect-free: repeated calls against unchanged
    /// ledger state return the same result. Contract-side failures come
    /// back as [`SimulationResult::Failure`]; only transport-level faults
    /// produce an `Err`.
    pub async fn simulate_transaction(
        &self,
        envelope: &TransactionEnvelope,
    ) -> Result<SimulationResult, RpcError> {
        let xdr = envelope.to_xdr_base64(Limits::none())?;
        debug!(url = %self.url, "simulating transaction");
        let response: SimulateResponse = self
            .call("simulateTransaction", json!({ "transaction": xdr }))
            .await?;
        response.into_result()
    }

    /// Submits a signed envelope to the network.
    ///
    /// A `Rejected` outcome is not retryable with the same envelope:
    /// sequence numbers are single-use, so recovery always means
    /// rebuilding from a freshly loaded account.
    pub async fn send_transaction(
        &self,
        envelope: &TransactionEnvelope,
    ) -> Result<SubmissionOutcome, RpcError> {
        let xdr = envelope.to_xdr_base64(Limits::none())?;
        debug!(url = %self.url, "submitting transaction");
        let response: SendResponse = self
            .call("sendTransaction", json!({ "transaction": xdr }))
            .await?;
        response.into_outcome()
    }

    /// Performs one JSON-RPC 2.0 call.
    async fn call<P: Serialize, R: DeserializeOwned>(
        &self,
        method: &str,
        params: P,
    ) -> Result<R, RpcError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let response: JsonRpcResponse<R> = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(err) = response.error {
            return Err(RpcError::Rpc {
                code: err.code,
                message: err.message,
            });
        }
        response
            .result
            .ok_or_else(|| RpcError::InvalidResponse("missing result".to_string()))
    }
}
