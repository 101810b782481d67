//! SHA-256 helpers.

use sha2::{Digest, Sha256};

/// Computes the SHA-256 digest of `data`.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_empty() {
        // Well-known SHA-256 of the empty string.
        let digest = sha256(b"");
        assert_eq!(
            digest[..4],
            [0xe3, 0xb0, 0xc4, 0x42],
            "unexpected empty-input digest prefix"
        );
    }

    #[test]
    fn test_sha256_deterministic() {
        assert_eq!(sha256(b"novafund"), sha256(b"novafund"));
        assert_ne!(sha256(b"a"), sha256(b"b"));
    }
}
