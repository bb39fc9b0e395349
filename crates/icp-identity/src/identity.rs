//! Ed25519 key identities.

use ton_crypto::{Ed25519Keypair, random_bytes_32};

use crate::error::{IdentityError, IdentityResult};
use crate::principal::Principal;

/// `SubjectPublicKeyInfo` prefix for an Ed25519 key (OID 1.3.101.112).
pub const ED25519_DER_PREFIX: [u8; 12] = [
    0x30, 0x2a, 0x30, 0x05, 0x06, 0x03, 0x2b, 0x65, 0x70, 0x03, 0x21, 0x00,
];

/// Wrap a raw Ed25519 public key in its DER encoding.
pub fn der_encode_ed25519(public_key: &[u8; 32]) -> Vec<u8> {
    let mut der = Vec::with_capacity(ED25519_DER_PREFIX.len() + 32);
    der.extend_from_slice(&ED25519_DER_PREFIX);
    der.extend_from_slice(public_key);
    der
}

/// Extract the raw key from a DER-encoded Ed25519 public key.
pub fn der_decode_ed25519(der: &[u8]) -> IdentityResult<[u8; 32]> {
    let raw = der
        .strip_prefix(&ED25519_DER_PREFIX[..])
        .ok_or_else(|| IdentityError::InvalidDerKey("not an Ed25519 key".to_string()))?;
    raw.try_into()
        .map_err(|_| IdentityError::InvalidDerKey(format!("{} key bytes", raw.len())))
}

/// An identity backed directly by an Ed25519 keypair.
///
/// The same keypair owns the TON wallet, so its principal and the wallet
/// address are two views of one key.
#[derive(Clone, Debug)]
pub struct Ed25519KeyIdentity {
    keypair: Ed25519Keypair,
}

impl Ed25519KeyIdentity {
    /// Build an identity from 32 bytes of seed entropy.
    pub fn generate(seed: [u8; 32]) -> Self {
        Self::from_keypair(Ed25519Keypair::from_seed(seed))
    }

    /// Fresh identity from OS randomness.
    pub fn random() -> Self {
        Self::generate(random_bytes_32())
    }

    pub fn from_keypair(keypair: Ed25519Keypair) -> Self {
        Ed25519KeyIdentity { keypair }
    }

    /// Restore from a 32-byte seed or a 64-byte `seed || public` secret.
    pub fn from_secret_bytes(secret: &[u8]) -> IdentityResult<Self> {
        Ok(Self::from_keypair(Ed25519Keypair::from_secret_bytes(secret)?))
    }

    pub fn keypair(&self) -> &Ed25519Keypair {
        &self.keypair
    }

    pub fn public_key(&self) -> &[u8; 32] {
        &self.keypair.public_key
    }

    pub fn der_public_key(&self) -> Vec<u8> {
        der_encode_ed25519(&self.keypair.public_key)
    }

    pub fn principal(&self) -> Principal {
        Principal::self_authenticating(&self.der_public_key())
    }

    pub fn sign(&self, message: &[u8]) -> [u8; 64] {
        self.keypair.sign(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_seed() -> [u8; 32] {
        let mut seed = [0u8; 32];
        for (i, b) in seed.iter_mut().enumerate() {
            *b = i as u8;
        }
        seed
    }

    #[test]
    fn test_known_principal() {
        let identity = Ed25519KeyIdentity::generate(sample_seed());
        assert_eq!(
            hex::encode(identity.public_key()),
            "03a107bff3ce10be1d70dd18e74bc09967e4d6309ba50d5f1ddc8664125531b8"
        );
        assert_eq!(
            identity.principal().to_text(),
            "yavxl-ppty4-enezb-hcalr-cdgzv-zoexx-7od3c-urvk6-rfzs4-552ct-7ae"
        );
    }

    #[test]
    fn test_der_roundtrip() {
        let identity = Ed25519KeyIdentity::generate(sample_seed());
        let der = identity.der_public_key();
        assert_eq!(der.len(), 44);
        assert_eq!(&der_decode_ed25519(&der).unwrap(), identity.public_key());
        assert!(der_decode_ed25519(&der[1..]).is_err());
        assert!(der_decode_ed25519(&der[..40]).is_err());
    }

    #[test]
    fn test_restore_from_64_byte_secret() {
        let identity = Ed25519KeyIdentity::generate(sample_seed());
        let secret = identity.keypair().secret_key_bytes();
        let restored = Ed25519KeyIdentity::from_secret_bytes(&secret).unwrap();
        assert_eq!(restored.principal(), identity.principal());
    }

    #[test]
    fn test_debug_hides_seed() {
        let identity = Ed25519KeyIdentity::generate(sample_seed());
        let debug = format!("{:?}", identity);
        assert!(!debug.contains("000102030405"));
    }
}
