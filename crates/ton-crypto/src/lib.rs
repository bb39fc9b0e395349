//! Cryptographic primitives for the TON/ICP wallet panel.
//!
//! - **Ed25519**: one keypair signs TON transfers and backs the IC identity
//! - **SHA-256**: cell hashing and signing digests
//! - **KDF**: HMAC-SHA512 / PBKDF2-SHA512 for TON mnemonics
//!
//! # Example
//!
//! ```
//! use ton_crypto::{random_bytes_32, Ed25519Keypair};
//!
//! let keypair = Ed25519Keypair::from_seed(random_bytes_32());
//! let signature = keypair.sign(b"body hash");
//! assert!(keypair.verify(b"body hash", &signature).is_ok());
//! ```

pub mod ed25519;
pub mod kdf;
pub mod sha256;

pub use ed25519::{verify_signature, Ed25519Error, Ed25519Keypair};
pub use kdf::{hmac_sha512, pbkdf2_sha512};
pub use sha256::{sha256, sha256_multi};

/// 32 bytes from the thread-local CSPRNG (seeded from the OS).
pub fn random_bytes_32() -> [u8; 32] {
    use rand::RngCore;
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_bytes() {
        assert_ne!(random_bytes_32(), random_bytes_32());
    }

    #[test]
    fn test_random_seed_signs() {
        let keypair = Ed25519Keypair::from_seed(random_bytes_32());
        let signature = keypair.sign(b"payload");
        assert!(verify_signature(&keypair.public_key, b"payload", &signature).is_ok());
    }
}
