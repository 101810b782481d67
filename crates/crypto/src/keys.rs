//! Ed25519 keypairs.
//!
//! [`SecretKey`] and [`PublicKey`] wrap `ed25519_dalek` types and speak
//! StrKey at the edges. The `Debug`/`Display` implementations show the
//! StrKey encodings, keeping log output consistent with Stellar
//! conventions (secrets are redacted).

use std::fmt;

use ed25519_dalek::{Signer, SigningKey, VerifyingKey};

use crate::error::CryptoError;
use crate::strkey;

/// A raw 64-byte Ed25519 signature.
#[derive(Clone, Copy)]
pub struct Signature(pub [u8; 64]);

/// An Ed25519 public key (verifying key).
///
/// In Stellar, public keys are encoded as account IDs starting with 'G'.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PublicKey(VerifyingKey);

impl PublicKey {
    /// Creates a public key from raw 32-byte Ed25519 key material.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidPublicKey`] if the bytes are not a
    /// valid point on the Ed25519 curve.
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self, CryptoError> {
        let key = VerifyingKey::from_bytes(bytes).map_err(|_| CryptoError::InvalidPublicKey)?;
        Ok(Self(key))
    }

    /// Returns the raw 32-byte key material.
    pub fn as_bytes(&self) -> &[u8; 32] {
        self.0.as_bytes()
    }

    /// Verifies an Ed25519 signature over a message.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidSignature`] if verification fails.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> Result<(), CryptoError> {
        use ed25519_dalek::Verifier;
        let sig = ed25519_dalek::Signature::from_bytes(&signature.0);
        self.0
            .verify(message, &sig)
            .map_err(|_| CryptoError::InvalidSignature)
    }

    /// Encodes the public key as a Stellar account ID (G...).
    pub fn to_strkey(&self) -> String {
        strkey::encode_account_id(self.as_bytes())
    }

    /// Parses a public key from a Stellar account ID (G...).
    pub fn from_strkey(s: &str) -> Result<Self, CryptoError> {
        let bytes = strkey::decode_account_id(s)?;
        Self::from_bytes(&bytes)
    }

    /// Returns the signature hint: the last four bytes of the key.
    ///
    /// Hints let verifiers pick the right signer without trying every
    /// signature against every key.
    pub fn signature_hint(&self) -> [u8; 4] {
        let bytes = self.as_bytes();
        let mut hint = [0u8; 4];
        hint.copy_from_slice(&bytes[28..32]);
        hint
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.to_strkey())
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_strkey())
    }
}

impl From<&PublicKey> for stellar_xdr::curr::PublicKey {
    fn from(pk: &PublicKey) -> Self {
        stellar_xdr::curr::PublicKey::PublicKeyTypeEd25519(stellar_xdr::curr::Uint256(
            *pk.as_bytes(),
        ))
    }
}

impl From<&PublicKey> for stellar_xdr::curr::AccountId {
    fn from(pk: &PublicKey) -> Self {
        stellar_xdr::curr::AccountId(pk.into())
    }
}

impl From<&PublicKey> for stellar_xdr::curr::MuxedAccount {
    fn from(pk: &PublicKey) -> Self {
        stellar_xdr::curr::MuxedAccount::Ed25519(stellar_xdr::curr::Uint256(*pk.as_bytes()))
    }
}

/// An Ed25519 secret key (signing key).
///
/// In Stellar, secret keys are encoded as seeds starting with 'S'. The
/// corresponding [`PublicKey`] is derived on demand. `SigningKey` zeroizes
/// its material on drop.
#[derive(Clone)]
pub struct SecretKey(SigningKey);

impl SecretKey {
    /// Creates a secret key from a raw 32-byte seed.
    pub fn from_bytes(seed: &[u8; 32]) -> Self {
        Self(SigningKey::from_bytes(seed))
    }

    /// Parses a secret key from a Stellar seed (S...).
    pub fn from_strkey(s: &str) -> Result<Self, CryptoError> {
        let seed = strkey::decode_secret_seed(s)?;
        Ok(Self::from_bytes(&seed))
    }

    /// Generates a fresh random secret key.
    pub fn generate() -> Self {
        let mut csprng = rand::rngs::OsRng;
        Self(SigningKey::generate(&mut csprng))
    }

    /// Returns the corresponding public key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.0.verifying_key())
    }

    /// Signs a message, returning the raw 64-byte signature.
    pub fn sign(&self, message: &[u8]) -> Signature {
        Signature(self.0.sign(message).to_bytes())
    }

    /// Encodes the secret key as a Stellar seed (S...).
    pub fn to_strkey(&self) -> String {
        strkey::encode_secret_seed(&self.0.to_bytes())
    }
}

// Debug and Display both redact the seed; only the derived account ID is
// shown.
impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretKey({})", self.public_key().to_strkey())
    }
}

impl fmt::Display for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretKey({})", self.public_key().to_strkey())
    }
}
