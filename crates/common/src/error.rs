//! Common error types for the NovaFund client.
//!
//! This module provides the unified error type [`enum@Error`] and the
//! convenience alias [`Result`] used by the crates that do not need a more
//! specific taxonomy of their own.
//!
//! # Error Handling Philosophy
//!
//! The [`enum@Error`] enum provides broad categories. More specific error
//! types (transaction building, RPC transport, donation outcomes) live in
//! their own crates and convert into these categories only at the edges
//! where a caller does not care about the distinction.

use thiserror::Error;

/// A type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for NovaFund client operations.
#[derive(Error, Debug)]
pub enum Error {
    /// XDR encoding/decoding error.
    ///
    /// Occurs when serializing or deserializing Stellar XDR types fails.
    #[error("XDR error: {0}")]
    Xdr(#[from] stellar_xdr::curr::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    ///
    /// Occurs when configuration is invalid or cannot be parsed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid data error.
    ///
    /// Occurs when data fails validation (wrong format, out of range, or a
    /// return value whose shape does not match the contract surface).
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Resource not found error.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Operation failed error.
    ///
    /// A catch-all for operations that fail for reasons not covered by the
    /// other variants.
    #[error("Operation failed: {0}")]
    OperationFailed(String),
}
