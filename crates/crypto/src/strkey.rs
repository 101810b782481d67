//! Stellar StrKey encoding and decoding.
//!
//! StrKey is Stellar's human-readable key encoding: RFC 4648 base32 over a
//! version byte, the raw key bytes, and a CRC16-XModem checksum.
//!
//! # Key Types
//!
//! | Prefix | Type | Description |
//! |--------|------|-------------|
//! | G | Account ID | Ed25519 public key |
//! | S | Secret Seed | Ed25519 secret key |
//! | C | Contract ID | Soroban contract address |
//!
//! Only the three kinds the client consumes are implemented; Stellar defines
//! further kinds (muxed accounts, pre-auth hashes, signed payloads) that
//! have no use on this side of the wire.
//!
//! # Example
//!
//! ```
//! use novafund_crypto::strkey::{encode_account_id, decode_account_id};
//!
//! let key = [0u8; 32];
//! let encoded = encode_account_id(&key);
//! assert!(encoded.starts_with('G'));
//! assert_eq!(decode_account_id(&encoded).unwrap(), key);
//! ```

use crate::error::CryptoError;

// Version bytes, computed as (base32_character_index << 3) so that the
// first encoded character is the desired prefix letter.

/// Version byte for account IDs (produces 'G' prefix).
const VERSION_ACCOUNT_ID: u8 = 6 << 3;
/// Version byte for secret seeds (produces 'S' prefix).
const VERSION_SEED: u8 = 18 << 3;
/// Version byte for contract IDs (produces 'C' prefix).
const VERSION_CONTRACT: u8 = 2 << 3;

/// Encodes an Ed25519 public key as a Stellar account ID (G...).
pub fn encode_account_id(key: &[u8; 32]) -> String {
    encode_check(VERSION_ACCOUNT_ID, key)
}

/// Decodes a Stellar account ID (G...) to raw key bytes.
///
/// # Errors
///
/// Returns [`CryptoError::InvalidStrKey`] if the string is not a valid
/// account ID.
pub fn decode_account_id(s: &str) -> Result<[u8; 32], CryptoError> {
    decode_check(VERSION_ACCOUNT_ID, s)
}

/// Encodes an Ed25519 secret key as a Stellar seed (S...).
pub fn encode_secret_seed(seed: &[u8; 32]) -> String {
    encode_check(VERSION_SEED, seed)
}

/// Decodes a Stellar seed (S...) to raw key bytes.
///
/// # Errors
///
/// Returns [`CryptoError::InvalidStrKey`] if the string is not a valid seed.
pub fn decode_secret_seed(s: &str) -> Result<[u8; 32], CryptoError> {
    decode_check(VERSION_SEED, s)
}

/// Encodes a Soroban contract hash as a contract ID (C...).
pub fn encode_contract_id(hash: &[u8; 32]) -> String {
    encode_check(VERSION_CONTRACT, hash)
}

/// Decodes a Soroban contract ID (C...) to the raw contract hash.
///
/// # Errors
///
/// Returns [`CryptoError::InvalidStrKey`] if the string is not a valid
/// contract ID.
pub fn decode_contract_id(s: &str) -> Result<[u8; 32], CryptoError> {
    decode_check(VERSION_CONTRACT, s)
}

/// Encodes data with a version byte and CRC16 checksum.
///
/// Format: base32(version || data || crc16(version || data))
fn encode_check(version: u8, data: &[u8; 32]) -> String {
    let mut payload = vec![version];
    payload.extend_from_slice(data);

    // CRC16-XModem checksum, little-endian.
    let checksum = crc16_xmodem(&payload);
    payload.extend_from_slice(&checksum.to_le_bytes());

    base32::encode(base32::Alphabet::Rfc4648 { padding: false }, &payload)
}

/// Decodes a 32-byte StrKey, verifying version byte and checksum.
fn decode_check(expected_version: u8, s: &str) -> Result<[u8; 32], CryptoError> {
    let decoded = base32::decode(base32::Alphabet::Rfc4648 { padding: false }, s)
        .ok_or_else(|| CryptoError::InvalidStrKey("invalid base32".to_string()))?;

    // 1 version byte + 32 data bytes + 2 checksum bytes.
    if decoded.len() != 35 {
        return Err(CryptoError::InvalidStrKey(format!(
            "length {} != 35",
            decoded.len()
        )));
    }

    if decoded[0] != expected_version {
        return Err(CryptoError::InvalidStrKey(format!(
            "version byte {:#x} != {:#x}",
            decoded[0], expected_version
        )));
    }

    let checksum_pos = decoded.len() - 2;
    let checksum = u16::from_le_bytes([decoded[checksum_pos], decoded[checksum_pos + 1]]);
    let computed = crc16_xmodem(&decoded[..checksum_pos]);
    if checksum != computed {
        return Err(CryptoError::InvalidStrKey("checksum mismatch".to_string()));
    }

    let mut key = [0u8; 32];
    key.copy_from_slice(&decoded[1..33]);
    Ok(key)
}

/// CRC16-XModem (polynomial 0x1021, initial value 0).
fn crc16_xmodem(data: &[u8]) -> u16 {
    let mut crc: u16 = 0;
    for &byte in data {
        crc ^= (byte as u16) << 8;
        for _ in 0..8 {
            if crc & 0x8000 != 0 {
                crc = (crc << 1) ^ 0x1021;
            } else {
                crc <<= 1;
            }
        }
    }
    crc
}
