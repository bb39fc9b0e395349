//! SHA-512 based key derivation used by TON mnemonics.
//!
//! A TON mnemonic is turned into key material in two steps: the phrase is
//! used as an HMAC-SHA512 key over the (possibly empty) password, and the
//! resulting 64 bytes are stretched with PBKDF2-HMAC-SHA512 under a fixed
//! salt.

use hmac::{Hmac, Mac};
use sha2::Sha512;

type HmacSha512 = Hmac<Sha512>;

/// Compute HMAC-SHA512 of `data` under `key`.
///
/// ```
/// use ton_crypto::kdf::hmac_sha512;
///
/// let mac = hmac_sha512(b"key", b"message");
/// assert_eq!(mac.len(), 64);
/// ```
pub fn hmac_sha512(key: &[u8], data: &[u8]) -> [u8; 64] {
    let mut mac =
        HmacSha512::new_from_slice(key).expect("HMAC can be initialized with any key length");
    mac.update(data);
    let mut output = [0u8; 64];
    output.copy_from_slice(&mac.finalize().into_bytes());
    output
}

/// PBKDF2-HMAC-SHA512 with a 64-byte output.
///
/// `iterations` of zero is bumped to one.
pub fn pbkdf2_sha512(password: &[u8], salt: &[u8], iterations: u32) -> [u8; 64] {
    let mut output = [0u8; 64];
    pbkdf2::pbkdf2::<HmacSha512>(password, salt, iterations.max(1), &mut output)
        .expect("HMAC can be initialized with any key length");
    output
}
