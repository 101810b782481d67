//! Error types for Horizon queries.

use thiserror::Error;

/// Errors that can occur while querying Horizon.
#[derive(Debug, Error)]
pub enum HorizonError {
    /// The address has never been funded on this network.
    #[error("account not found: {0}")]
    AccountNotFound(String),

    /// The HTTP request could not be completed.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server's response did not match the expected shape.
    #[error("invalid Horizon response: {0}")]
    InvalidResponse(String),
}
