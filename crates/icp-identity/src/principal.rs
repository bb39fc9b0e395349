//! Internet Computer principals.
//!
//! A principal is up to 29 opaque bytes. Its text form is the lowercase,
//! unpadded base32 of `crc32(bytes) || bytes`, split into groups of five
//! characters by dashes.

use std::fmt;
use std::str::FromStr;

use base32::Alphabet;
use sha2::{Digest, Sha224};

use crate::error::{IdentityError, IdentityResult};

/// Longest principal in bytes.
pub const MAX_PRINCIPAL_LEN: usize = 29;

const SELF_AUTHENTICATING_TAG: u8 = 0x02;
const ANONYMOUS_TAG: u8 = 0x04;
const ALPHABET: Alphabet = Alphabet::RFC4648 { padding: false };

#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Principal {
    bytes: Vec<u8>,
}

impl Principal {
    /// The management canister (`aaaaa-aa`).
    pub fn management() -> Self {
        Principal { bytes: Vec::new() }
    }

    /// The anonymous caller (`2vxsx-fae`).
    pub fn anonymous() -> Self {
        Principal {
            bytes: vec![ANONYMOUS_TAG],
        }
    }

    /// `sha224(der_public_key) || 0x02`.
    pub fn self_authenticating(der_public_key: &[u8]) -> Self {
        let mut bytes = Sha224::digest(der_public_key).to_vec();
        bytes.push(SELF_AUTHENTICATING_TAG);
        Principal { bytes }
    }

    pub fn from_slice(bytes: &[u8]) -> IdentityResult<Self> {
        if bytes.len() > MAX_PRINCIPAL_LEN {
            return Err(IdentityError::InvalidPrincipal(format!(
                "{} bytes (max {})",
                bytes.len(),
                MAX_PRINCIPAL_LEN
            )));
        }
        Ok(Principal {
            bytes: bytes.to_vec(),
        })
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    pub fn is_anonymous(&self) -> bool {
        self.bytes == [ANONYMOUS_TAG]
    }

    pub fn to_text(&self) -> String {
        let mut buf = Vec::with_capacity(4 + self.bytes.len());
        buf.extend_from_slice(&crc32(&self.bytes).to_be_bytes());
        buf.extend_from_slice(&self.bytes);

        let encoded = base32::encode(ALPHABET, &buf).to_lowercase();
        encoded
            .as_bytes()
            .chunks(5)
            .map(|chunk| String::from_utf8_lossy(chunk))
            .collect::<Vec<_>>()
            .join("-")
    }

    /// Parse the canonical text form, verifying the checksum.
    pub fn from_text(text: &str) -> IdentityResult<Self> {
        let compact: String = text.chars().filter(|c| *c != '-').collect();
        let decoded = base32::decode(ALPHABET, &compact.to_ascii_uppercase())
            .ok_or_else(|| IdentityError::InvalidPrincipal(format!("not base32: {}", text)))?;
        if decoded.len() < 4 {
            return Err(IdentityError::InvalidPrincipal(format!("too short: {}", text)));
        }

        let (checksum, bytes) = decoded.split_at(4);
        let principal = Self::from_slice(bytes)?;
        if checksum != crc32(bytes).to_be_bytes() {
            return Err(IdentityError::PrincipalChecksum);
        }
        if principal.to_text() != text {
            return Err(IdentityError::InvalidPrincipal(format!(
                "not in canonical form: {}",
                text
            )));
        }
        Ok(principal)
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

impl fmt::Debug for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Principal({})", self.to_text())
    }
}

impl FromStr for Principal {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_text(s)
    }
}

fn crc32(data: &[u8]) -> u32 {
    const CRC32: crc::Crc<u32> = crc::Crc::<u32>::new(&crc::CRC_32_ISO_HDLC);
    CRC32.checksum(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "yavxl-ppty4-enezb-hcalr-cdgzv-zoexx-7od3c-urvk6-rfzs4-552ct-7ae";

    #[test]
    fn test_well_known_principals() {
        assert_eq!(Principal::management().to_text(), "aaaaa-aa");
        assert_eq!(Principal::anonymous().to_text(), "2vxsx-fae");
        assert!(Principal::anonymous().is_anonymous());
    }

    #[test]
    fn test_text_roundtrip() {
        let bytes = hex::decode("f3c708d264271017110cd9ae5c4bdfee1ec548d55e89732e77ba14fe02").unwrap();
        let principal = Principal::from_slice(&bytes).unwrap();
        assert_eq!(principal.to_text(), SAMPLE);
        assert_eq!(SAMPLE.parse::<Principal>().unwrap(), principal);
        assert_eq!(Principal::from_text("aaaaa-aa").unwrap(), Principal::management());
    }

    #[test]
    fn test_checksum_detected() {
        let tampered = SAMPLE.replacen("yavxl", "yavxm", 1);
        assert!(Principal::from_text(&tampered).is_err());
    }

    #[test]
    fn test_non_canonical_rejected() {
        assert!(Principal::from_text("2VXSX-FAE").is_err());
        assert!(Principal::from_text("2vxsxfae").is_err());
    }

    #[test]
    fn test_too_long() {
        assert!(Principal::from_slice(&[0u8; 30]).is_err());
    }

    #[test]
    fn test_self_authenticating_tag() {
        let principal = Principal::self_authenticating(b"some der key");
        assert_eq!(principal.as_slice().len(), 29);
        assert_eq!(principal.as_slice()[28], 0x02);
    }
}
