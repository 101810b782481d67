//! Error types for transaction building.

use thiserror::Error;

/// Errors that can occur while constructing or assembling envelopes.
#[derive(Debug, Error)]
pub enum TxError {
    /// The requested operation is malformed: non-positive amount, bad
    /// address, or an argument the XDR types cannot represent.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// Simulation data could not be merged into the envelope.
    #[error("assembly failed: {0}")]
    AssemblyError(String),

    /// XDR serialization error.
    #[error("XDR error: {0}")]
    Xdr(#[from] stellar_xdr::curr::Error),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}
