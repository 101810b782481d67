//! Key handling and StrKey codecs for the NovaFund client.
//!
//! This crate covers the cryptographic surface a wallet-side client needs:
//!
//! - SHA-256 hashing ([`sha256`])
//! - StrKey encoding/decoding for account IDs (G...), secret seeds (S...)
//!   and contract IDs (C...) ([`strkey`])
//! - Ed25519 keypairs for the local signer ([`SecretKey`], [`PublicKey`])
//!
//! Signing dialogs of external wallets stay outside this crate; these keys
//! exist so the command-line client can satisfy the signer boundary on its
//! own.

pub mod error;
pub mod hash;
pub mod keys;
pub mod strkey;

pub use error::CryptoError;
pub use hash::sha256;
pub use keys::{PublicKey, SecretKey, Signature};
