//! Error types for cryptographic operations.

use thiserror::Error;

/// Errors that can occur during key handling and StrKey processing.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// A StrKey string failed to decode (bad base32, version, length, or
    /// checksum).
    #[error("invalid StrKey: {0}")]
    InvalidStrKey(String),

    /// Raw bytes do not form a valid Ed25519 public key.
    #[error("invalid public key")]
    InvalidPublicKey,

    /// A signature failed verification.
    #[error("invalid signature")]
    InvalidSignature,
}
