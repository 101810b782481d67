//! Network identity types.
//!
//! This module provides the [`NetworkId`] type, a unique identifier for a
//! Stellar network derived from its passphrase.
//!
//! # Network Passphrases
//!
//! Each Stellar network is identified by a unique passphrase, and the
//! network ID is the SHA-256 hash of that passphrase. The ID is mixed into
//! every transaction signature preimage, so an envelope signed for one
//! network can never be replayed on another.
//!
//! | Network | Passphrase |
//! |---------|------------|
//! | Mainnet | `"Public Global Stellar Network ; September 2015"` |
//! | Testnet | `"Test SDF Network ; September 2015"` |

use sha2::{Digest, Sha256};

/// Passphrase of the Stellar public testnet.
pub const TESTNET_PASSPHRASE: &str = "Test SDF Network ; September 2015";

/// Passphrase of the Stellar public mainnet.
pub const MAINNET_PASSPHRASE: &str = "Public Global Stellar Network ; September 2015";

/// A unique identifier for a Stellar network.
///
/// The network ID is the SHA-256 hash of the network passphrase. It is
/// included in the hash preimage of every transaction signature, binding
/// signatures to a single network.
///
/// # Example
///
/// ```rust
/// use novafund_common::NetworkId;
///
/// let testnet = NetworkId::testnet();
/// let mainnet = NetworkId::mainnet();
/// assert_ne!(testnet.as_bytes(), mainnet.as_bytes());
///
/// let custom = NetworkId::from_passphrase("My Private Network ; 2024");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NetworkId([u8; 32]);

impl NetworkId {
    /// Creates a network ID from a passphrase string.
    ///
    /// The network ID is computed as `SHA256(passphrase)`.
    pub fn from_passphrase(passphrase: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(passphrase.as_bytes());
        Self(hasher.finalize().into())
    }

    /// Returns a reference to the underlying 32-byte hash.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Returns the network ID for the Stellar public testnet.
    pub fn testnet() -> Self {
        Self::from_passphrase(TESTNET_PASSPHRASE)
    }

    /// Returns the network ID for the Stellar public mainnet.
    pub fn mainnet() -> Self {
        Self::from_passphrase(MAINNET_PASSPHRASE)
    }
}

impl From<NetworkId> for stellar_xdr::curr::Hash {
    fn from(id: NetworkId) -> Self {
        stellar_xdr::curr::Hash(id.0)
    }
}
