//! TON message addresses.
//!
//! Internal addresses are written either raw (`wc:hex`) or user-friendly:
//! 36 bytes `tag | workchain | hash | crc16` encoded as 48 base64 characters.
//! The tag carries the bounceable and testnet-only flags.

use std::fmt;
use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE, URL_SAFE_NO_PAD};

use crate::{CellError, CellResult};

const TAG_BOUNCEABLE: u8 = 0x11;
const TAG_NON_BOUNCEABLE: u8 = 0x51;
const TAG_TESTNET: u8 = 0x80;

/// TON message address (`addr_none` or `addr_std`).
///
/// ```
/// use ton_cell::{AddressFlags, MsgAddress};
///
/// let addr = MsgAddress::Internal { workchain: 0, address: [0u8; 32] };
/// let text = addr.to_user_friendly(AddressFlags::default()).unwrap();
/// assert_eq!(MsgAddress::from_string(&text).unwrap(), addr);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MsgAddress {
    /// `addr_none$00`.
    #[default]
    Null,

    /// `addr_std$10` without anycast.
    Internal {
        /// Workchain ID (-1 for masterchain, 0 for basechain).
        workchain: i32,
        /// Account ID.
        address: [u8; 32],
    },
}

/// Flags carried by the tag byte of a user-friendly address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressFlags {
    pub bounceable: bool,
    pub testnet: bool,
}

impl Default for AddressFlags {
    /// Bounceable mainnet, which is what a raw address implies.
    fn default() -> Self {
        AddressFlags {
            bounceable: true,
            testnet: false,
        }
    }
}

impl MsgAddress {
    /// Parse a raw or user-friendly address, discarding its flags.
    pub fn from_string(s: &str) -> CellResult<Self> {
        Self::parse(s).map(|(addr, _)| addr)
    }

    /// Parse a raw or user-friendly address together with its flags.
    ///
    /// Raw addresses report the default flags (bounceable, mainnet).
    pub fn parse(s: &str) -> CellResult<(Self, AddressFlags)> {
        let s = s.trim();
        if s.is_empty() {
            return Err(CellError::InvalidAddress("empty address".to_string()));
        }
        if let Some((wc, hash)) = s.split_once(':') {
            return Self::from_raw(wc, hash).map(|addr| (addr, AddressFlags::default()));
        }
        Self::from_user_friendly(s)
    }

    fn from_raw(wc: &str, hash: &str) -> CellResult<Self> {
        let workchain: i8 = wc
            .parse()
            .map_err(|_| CellError::InvalidAddress(format!("Invalid workchain: {}", wc)))?;
        if hash.len() != 64 {
            return Err(CellError::InvalidAddress(format!(
                "Address hex must be 64 characters, got {}",
                hash.len()
            )));
        }
        let mut address = [0u8; 32];
        hex::decode_to_slice(hash, &mut address)
            .map_err(|e| CellError::InvalidAddress(format!("Invalid hex: {}", e)))?;
        Ok(MsgAddress::Internal {
            workchain: workchain as i32,
            address,
        })
    }

    fn from_user_friendly(s: &str) -> CellResult<(Self, AddressFlags)> {
        if s.len() != 48 {
            return Err(CellError::InvalidAddress(format!(
                "User-friendly address must be 48 characters, got {}",
                s.len()
            )));
        }
        let engine = if s.contains(['-', '_']) { &URL_SAFE } else { &STANDARD };
        let bytes = engine
            .decode(s)
            .map_err(|e| CellError::InvalidBase64(e.to_string()))?;
        if bytes.len() != 36 {
            return Err(CellError::InvalidAddress(format!(
                "User-friendly address must be 36 bytes, got {}",
                bytes.len()
            )));
        }

        let expected = u16::from_be_bytes([bytes[34], bytes[35]]);
        let actual = crc16_xmodem(&bytes[..34]);
        if expected != actual {
            return Err(CellError::InvalidAddress(format!(
                "CRC16 mismatch: expected {:04x}, got {:04x}",
                expected, actual
            )));
        }

        let tag = bytes[0];
        let testnet = tag & TAG_TESTNET != 0;
        let bounceable = match tag & !TAG_TESTNET {
            TAG_BOUNCEABLE => true,
            TAG_NON_BOUNCEABLE => false,
            other => {
                return Err(CellError::InvalidAddress(format!(
                    "Unknown address tag: 0x{:02x}",
                    other
                )));
            }
        };

        let mut address = [0u8; 32];
        address.copy_from_slice(&bytes[2..34]);
        Ok((
            MsgAddress::Internal {
                workchain: bytes[1] as i8 as i32,
                address,
            },
            AddressFlags {
                bounceable,
                testnet,
            },
        ))
    }

    /// Raw `wc:hex` form; empty for `addr_none`.
    pub fn to_raw_string(&self) -> String {
        match self {
            MsgAddress::Null => String::new(),
            MsgAddress::Internal { workchain, address } => {
                format!("{}:{}", workchain, hex::encode(address))
            }
        }
    }

    /// URL-safe user-friendly form, or `None` for `addr_none`.
    pub fn to_user_friendly(&self, flags: AddressFlags) -> Option<String> {
        let MsgAddress::Internal { workchain, address } = self else {
            return None;
        };

        let mut tag = if flags.bounceable {
            TAG_BOUNCEABLE
        } else {
            TAG_NON_BOUNCEABLE
        };
        if flags.testnet {
            tag |= TAG_TESTNET;
        }

        let mut data = Vec::with_capacity(36);
        data.push(tag);
        data.push(*workchain as i8 as u8);
        data.extend_from_slice(address);
        let crc = crc16_xmodem(&data);
        data.extend_from_slice(&crc.to_be_bytes());

        Some(URL_SAFE_NO_PAD.encode(&data))
    }

    pub fn workchain(&self) -> Option<i32> {
        match self {
            MsgAddress::Internal { workchain, .. } => Some(*workchain),
            MsgAddress::Null => None,
        }
    }

    pub fn hash_part(&self) -> Option<&[u8; 32]> {
        match self {
            MsgAddress::Internal { address, .. } => Some(address),
            MsgAddress::Null => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, MsgAddress::Null)
    }
}

impl FromStr for MsgAddress {
    type Err = CellError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_string(s)
    }
}

impl fmt::Display for MsgAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_raw_string())
    }
}

fn crc16_xmodem(data: &[u8]) -> u16 {
    const CRC16: crc::Crc<u16> = crc::Crc::<u16>::new(&crc::CRC_16_XMODEM);
    CRC16.checksum(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RAW: &str = "0:d371439c26fc2d331e11e956dbfae602b4910b0b3000bdd0f8dfd7dcd98d1436";

    fn sample() -> MsgAddress {
        MsgAddress::from_string(RAW).unwrap()
    }

    #[test]
    fn test_crc16_xmodem() {
        assert_eq!(crc16_xmodem(b"123456789"), 0x31C3);
    }

    #[test]
    fn test_raw_roundtrip() {
        let addr = sample();
        assert_eq!(addr.workchain(), Some(0));
        assert_eq!(addr.to_string(), RAW);
    }

    #[test]
    fn test_masterchain_raw() {
        let addr = MsgAddress::from_string(
            "-1:0000000000000000000000000000000000000000000000000000000000000000",
        )
        .unwrap();
        assert_eq!(addr.workchain(), Some(-1));
    }

    #[test]
    fn test_user_friendly_forms() {
        let addr = sample();
        let non_bounceable = AddressFlags {
            bounceable: false,
            testnet: false,
        };
        assert_eq!(
            addr.to_user_friendly(non_bounceable).unwrap(),
            "UQDTcUOcJvwtMx4R6Vbb-uYCtJELCzAAvdD439fc2Y0UNpjM"
        );
        assert_eq!(
            addr.to_user_friendly(AddressFlags::default()).unwrap(),
            "EQDTcUOcJvwtMx4R6Vbb-uYCtJELCzAAvdD439fc2Y0UNsUJ"
        );
        assert_eq!(
            addr.to_user_friendly(AddressFlags {
                bounceable: false,
                testnet: true
            })
            .unwrap(),
            "0QDTcUOcJvwtMx4R6Vbb-uYCtJELCzAAvdD439fc2Y0UNiNG"
        );
    }

    #[test]
    fn test_parse_reports_flags() {
        let (addr, flags) =
            MsgAddress::parse("0QDQBpCcv361Q785LZ33ky4fowYlgSYLTEIRTPzHVOaAhsVm").unwrap();
        assert!(!flags.bounceable);
        assert!(flags.testnet);
        assert_eq!(
            addr.to_raw_string(),
            "0:d006909cbf7eb543bf392d9df7932e1fa3062581260b4c42114cfcc754e68086"
        );

        let (_, flags) = MsgAddress::parse(RAW).unwrap();
        assert_eq!(flags, AddressFlags::default());
    }

    #[test]
    fn test_standard_base64_accepted() {
        let (addr, flags) =
            MsgAddress::parse("EQDTcUOcJvwtMx4R6Vbb+uYCtJELCzAAvdD439fc2Y0UNsUJ").unwrap();
        assert!(flags.bounceable);
        assert_eq!(addr, sample());
    }

    #[test]
    fn test_rejects_bad_checksum() {
        let err = MsgAddress::from_string("UQDTcUOcJvwtMx4R6Vbb-uYCtJELCzAAvdD439fc2Y0UNpjN");
        assert!(err.is_err());
    }

    #[test]
    fn test_rejects_garbage() {
        for input in ["", "hello", "0:zz", "300:00", "not-an-address-at-all-not-an-address-at-all-xxxx"] {
            assert!(MsgAddress::from_string(input).is_err(), "{input}");
        }
    }

    #[test]
    fn test_null_has_no_friendly_form() {
        assert!(MsgAddress::Null.to_user_friendly(AddressFlags::default()).is_none());
        assert!(MsgAddress::Null.is_null());
    }
}
