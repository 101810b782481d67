//! The external signer boundary.
//!
//! Signing is an opaque capability from the orchestrator's point of view:
//! it hands over an unsigned envelope and gets back either a signed
//! envelope or a refusal. Wallet integrations live behind this trait;
//! [`LocalSigner`] is the seed-based implementation the CLI uses.

use async_trait::async_trait;
use stellar_xdr::curr::TransactionEnvelope;
use thiserror::Error;

use novafund_common::NetworkId;
use novafund_crypto::SecretKey;
use novafund_tx::{attach_signature, envelope_payload_hash};

/// Errors from the signer boundary.
#[derive(Debug, Error)]
pub enum SignerError {
    /// The signer declined to sign (user dismissed the dialog, policy
    /// refused the transaction).
    #[error("signature refused: {0}")]
    Refused(String),

    /// Signing failed for a technical reason.
    #[error("signing failed: {0}")]
    Failed(String),
}

/// An opaque signing capability.
///
/// The orchestrator suspends on [`sign`](EnvelopeSigner::sign) until the
/// signer resolves; there is no timeout here, since the envelope's own expiry
/// horizon bounds how long a signature stays usable.
#[async_trait]
pub trait EnvelopeSigner: Send + Sync {
    /// The account this signer signs for (G-strkey).
    fn address(&self) -> String;

    /// Signs an envelope for the given network.
    async fn sign(
        &self,
        envelope: &TransactionEnvelope,
        network: &NetworkId,
    ) -> Result<TransactionEnvelope, SignerError>;
}

/// A signer holding an Ed25519 seed in process.
///
/// Used by the CLI; wallet custody is explicitly out of scope, so this is
/// as much key management as the client carries.
pub struct LocalSigner {
    secret: SecretKey,
}

impl LocalSigner {
    /// Creates a signer from a secret key.
    pub fn new(secret: SecretKey) -> Self {
        Self { secret }
    }

    /// Creates a signer from an S-strkey seed.
    pub fn from_seed(seed: &str) -> Result<Self, SignerError> {
        let secret = SecretKey::from_strkey(seed)
            .map_err(|e| SignerError::Failed(format!("bad seed: {e}")))?;
        Ok(Self::new(secret))
    }
}

#[async_trait]
impl EnvelopeSigner for LocalSigner {
    fn address(&self) -> String {
        self.secret.public_key().to_strkey()
    }

    async fn sign(
        &self,
        envelope: &TransactionEnvelope,
        network: &NetworkId,
    ) -> Result<TransactionEnvelope, SignerError> {
        let hash = envelope_payload_hash(network, envelope)
            .map_err(|e| SignerError::Failed(e.to_string()))?;
        let signature = self.secret.sign(&hash);
        let hint = self.secret.public_key().signature_hint();
        attach_signature(envelope, hint, signature.0)
            .map_err(|e| SignerError::Failed(e.to_string()))
    }
}
