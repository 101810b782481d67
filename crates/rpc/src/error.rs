//! Error types for the Soroban RPC client.

use thiserror::Error;

/// Errors that can occur while talking to a Soroban RPC server.
///
/// Business-logic failures (a contract assertion tripping during
/// simulation, a rejected submission) are **not** errors; they are data,
/// carried by [`crate::SimulationResult::Failure`] and
/// [`crate::SubmissionOutcome::Rejected`]. This enum covers only the
/// faults of the conversation itself.
#[derive(Debug, Error)]
pub enum RpcError {
    /// The HTTP request could not be completed (connectivity, timeout,
    /// TLS). Retryable, though submissions must be rebuilt first, since
    /// sequence numbers are single-use.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a JSON-RPC error object.
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// The server's response did not match the expected shape.
    #[error("invalid RPC response: {0}")]
    InvalidResponse(String),

    /// XDR decoding of a response field failed.
    #[error("XDR error: {0}")]
    Xdr(#[from] stellar_xdr::curr::Error),
}
