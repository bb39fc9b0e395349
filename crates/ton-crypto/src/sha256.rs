//! SHA-256 helpers.
//!
//! Cell representation hashes and V4R2 signing digests are SHA-256; the
//! helpers return fixed-size arrays so callers never deal with `GenericArray`.

use sha2::{Digest, Sha256};

/// SHA-256 of a single buffer.
///
/// ```
/// use ton_crypto::sha256::sha256;
///
/// assert_eq!(sha256(b"Hello, TON!").len(), 32);
/// ```
pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// SHA-256 over several buffers as if they were concatenated.
pub fn sha256_multi(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_empty() {
        assert_eq!(
            hex::encode(sha256(b"")),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_sha256_multi_matches_concat() {
        assert_eq!(sha256(b"HelloWorld"), sha256_multi(&[b"Hello", b"World"]));
    }
}
