//! Ed25519 keys shared by TON wallets and Internet Computer identities.
//!
//! The same 32-byte seed backs both sides: TON wallets sign transfer bodies
//! with it, and the IC identity derives its principal from the public half.
//! TON tooling historically stores the "secret key" as the 64-byte
//! `seed || public_key` concatenation (NaCl layout); both layouts are
//! accepted on import.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::rngs::OsRng;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Errors that can occur during Ed25519 operations.
#[derive(Debug, Error)]
pub enum Ed25519Error {
    /// The provided key bytes are invalid.
    #[error("Invalid key bytes: {0}")]
    InvalidKey(String),

    /// The public half of a 64-byte secret does not match its seed.
    #[error("Public key does not match secret seed")]
    PublicKeyMismatch,

    /// The signature verification failed.
    #[error("Signature verification failed")]
    VerificationFailed,
}

/// An Ed25519 keypair.
///
/// ```
/// use ton_crypto::ed25519::Ed25519Keypair;
///
/// let keypair = Ed25519Keypair::from_seed([7u8; 32]);
/// let signature = keypair.sign(b"transfer body hash");
/// assert!(keypair.verify(b"transfer body hash", &signature).is_ok());
/// ```
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Ed25519Keypair {
    /// 32-byte seed. Zeroized on drop.
    seed: [u8; 32],
    #[zeroize(skip)]
    pub public_key: [u8; 32],
    // SigningKey zeroizes itself on drop.
    #[zeroize(skip)]
    signing_key: SigningKey,
}

impl Ed25519Keypair {
    /// Generate a new keypair from the operating system RNG.
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut OsRng);
        Self::from_seed(signing_key.to_bytes())
    }

    /// Build a keypair from a 32-byte seed.
    pub fn from_seed(seed: [u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(&seed);
        let public_key = signing_key.verifying_key().to_bytes();

        Self {
            seed,
            public_key,
            signing_key,
        }
    }

    /// Build a keypair from either a 32-byte seed or a 64-byte
    /// `seed || public_key` secret.
    ///
    /// # Errors
    /// Returns an error for any other length, or when the public half of a
    /// 64-byte secret does not belong to the seed.
    pub fn from_secret_bytes(bytes: &[u8]) -> Result<Self, Ed25519Error> {
        match bytes.len() {
            32 => {
                let mut seed = [0u8; 32];
                seed.copy_from_slice(bytes);
                Ok(Self::from_seed(seed))
            }
            64 => {
                let mut seed = [0u8; 32];
                seed.copy_from_slice(&bytes[..32]);
                let keypair = Self::from_seed(seed);
                if keypair.public_key[..] != bytes[32..] {
                    return Err(Ed25519Error::PublicKeyMismatch);
                }
                Ok(keypair)
            }
            n => Err(Ed25519Error::InvalidKey(format!(
                "Expected 32 or 64 bytes, got {}",
                n
            ))),
        }
    }

    /// Sign a message, returning the 64-byte signature.
    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.signing_key.sign(message).to_bytes()
    }

    /// Verify a signature made by this keypair.
    pub fn verify(&self, message: &[u8], signature: &[u8; 64]) -> Result<(), Ed25519Error> {
        verify_signature(&self.public_key, message, signature)
    }

    /// The 32-byte seed.
    pub fn seed(&self) -> &[u8; 32] {
        &self.seed
    }

    /// The 64-byte `seed || public_key` secret used by TON tooling.
    pub fn secret_key_bytes(&self) -> [u8; 64] {
        let mut secret = [0u8; 64];
        secret[..32].copy_from_slice(&self.seed);
        secret[32..].copy_from_slice(&self.public_key);
        secret
    }
}

impl std::fmt::Debug for Ed25519Keypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ed25519Keypair")
            .field("public_key", &hex::encode(self.public_key))
            .field("seed", &"[REDACTED]")
            .finish()
    }
}

/// Verify a signature against a raw 32-byte public key.
pub fn verify_signature(
    public_key: &[u8; 32],
    message: &[u8],
    signature: &[u8; 64],
) -> Result<(), Ed25519Error> {
    let verifying_key = VerifyingKey::from_bytes(public_key)
        .map_err(|e| Ed25519Error::InvalidKey(e.to_string()))?;
    verifying_key
        .verify(message, &Signature::from_bytes(signature))
        .map_err(|_| Ed25519Error::VerificationFailed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counting_seed() -> [u8; 32] {
        let mut seed = [0u8; 32];
        for (i, b) in seed.iter_mut().enumerate() {
            *b = i as u8;
        }
        seed
    }

    #[test]
    fn test_known_public_key() {
        let keypair = Ed25519Keypair::from_seed(counting_seed());
        assert_eq!(
            hex::encode(keypair.public_key),
            "03a107bff3ce10be1d70dd18e74bc09967e4d6309ba50d5f1ddc8664125531b8"
        );
    }

    #[test]
    fn test_sign_and_verify() {
        let keypair = Ed25519Keypair::generate();
        let signature = keypair.sign(b"Hello, TON!");
        assert!(keypair.verify(b"Hello, TON!", &signature).is_ok());
        assert!(keypair.verify(b"Hello, ICP!", &signature).is_err());
    }

    #[test]
    fn test_secret_key_layouts() {
        let keypair = Ed25519Keypair::from_seed(counting_seed());
        let secret = keypair.secret_key_bytes();

        let from_seed = Ed25519Keypair::from_secret_bytes(&secret[..32]).unwrap();
        let from_full = Ed25519Keypair::from_secret_bytes(&secret).unwrap();
        assert_eq!(from_seed.public_key, keypair.public_key);
        assert_eq!(from_full.public_key, keypair.public_key);
    }

    #[test]
    fn test_secret_key_mismatched_public_half() {
        let mut secret = Ed25519Keypair::from_seed(counting_seed()).secret_key_bytes();
        secret[63] ^= 0x01;
        assert!(matches!(
            Ed25519Keypair::from_secret_bytes(&secret),
            Err(Ed25519Error::PublicKeyMismatch)
        ));
    }

    #[test]
    fn test_secret_key_bad_length() {
        assert!(matches!(
            Ed25519Keypair::from_secret_bytes(&[0u8; 31]),
            Err(Ed25519Error::InvalidKey(_))
        ));
    }

    #[test]
    fn test_debug_redacts_seed() {
        let keypair = Ed25519Keypair::from_seed(counting_seed());
        let printed = format!("{:?}", keypair);
        assert!(printed.contains("REDACTED"));
        assert!(!printed.contains(&hex::encode(counting_seed())));
    }
}
