//! TON Message Address types.
//!
//! Addresses arrive from user input either in raw form (`0:abcd...`) or in the
//! checksummed user-friendly base64 form (`EQ...`, `UQ...`, `kQ...`, `0Q...`).

use base64::Engine;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};

use crate::{CellError, CellResult};

/// Length of a user-friendly address string.
pub const FRIENDLY_ADDRESS_LEN: usize = 48;

const TAG_BOUNCEABLE: u8 = 0x11;
const TAG_NON_BOUNCEABLE: u8 = 0x51;
const TAG_TEST_ONLY: u8 = 0x80;

/// TON Message Address.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MsgAddress {
    /// No address (addr_none$00).
    #[default]
    Null,

    /// External address (addr_extern$01).
    External {
        /// Length in bits.
        len: u16,
        /// Address data.
        data: Vec<u8>,
    },

    /// Standard internal address (addr_std$10).
    Internal {
        /// Workchain ID (-1 for masterchain, 0 for basechain).
        workchain: i32,
        /// 256-bit account ID.
        address: [u8; 32],
    },
}

/// A parsed user-friendly address together with its flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FriendlyAddress {
    pub address: MsgAddress,
    pub bounceable: bool,
    pub testnet: bool,
}

impl MsgAddress {
    /// Parse an address in raw (`workchain:hex`) or user-friendly form.
    pub fn from_string(s: &str) -> CellResult<Self> {
        let s = s.trim();
        if s.contains(':') {
            return Self::from_raw(s);
        }
        Self::parse_friendly(s).map(|f| f.address)
    }

    /// Parse a raw address: "workchain:hex_address".
    pub fn from_raw(s: &str) -> CellResult<Self> {
        let (workchain_str, address_str) = s
            .split_once(':')
            .ok_or_else(|| CellError::InvalidAddress(format!("Missing workchain: {}", s)))?;

        let workchain: i32 = workchain_str
            .parse()
            .map_err(|_| CellError::InvalidAddress(format!("Invalid workchain: {}", workchain_str)))?;

        let mut address = [0u8; 32];
        hex::decode_to_slice(address_str, &mut address)
            .map_err(|e| CellError::InvalidAddress(format!("Invalid account id: {}", e)))?;

        Ok(MsgAddress::Internal { workchain, address })
    }

    /// Parse a user-friendly address.
    ///
    /// Format: 1 byte tag + 1 byte workchain + 32 bytes address + 2 bytes CRC16,
    /// base64 (standard or URL-safe) encoded into exactly 48 characters.
    pub fn parse_friendly(s: &str) -> CellResult<FriendlyAddress> {
        if s.len() != FRIENDLY_ADDRESS_LEN {
            return Err(CellError::InvalidAddress(format!(
                "User-friendly address must be {} characters, got {}",
                FRIENDLY_ADDRESS_LEN,
                s.len()
            )));
        }

        let standard_b64: String = s
            .chars()
            .map(|c| match c {
                '-' => '+',
                '_' => '/',
                c => c,
            })
            .collect();

        let bytes = STANDARD
            .decode(&standard_b64)
            .map_err(|e| CellError::InvalidBase64(e.to_string()))?;

        if bytes.len() != 36 {
            return Err(CellError::InvalidAddress(format!(
                "User-friendly address must decode to 36 bytes, got {}",
                bytes.len()
            )));
        }

        let expected_crc = u16::from_be_bytes([bytes[34], bytes[35]]);
        let actual_crc = crc16_xmodem(&bytes[..34]);
        if expected_crc != actual_crc {
            return Err(CellError::InvalidAddress(format!(
                "CRC16 mismatch: expected {:04x}, got {:04x}",
                expected_crc, actual_crc
            )));
        }

        let tag = bytes[0];
        let testnet = tag & TAG_TEST_ONLY != 0;
        let bounceable = match tag & !TAG_TEST_ONLY {
            TAG_BOUNCEABLE => true,
            TAG_NON_BOUNCEABLE => false,
            other => {
                return Err(CellError::InvalidAddress(format!("Unknown address tag: 0x{:02x}", other)));
            }
        };

        let workchain = bytes[1] as i8 as i32;
        let mut address = [0u8; 32];
        address.copy_from_slice(&bytes[2..34]);

        Ok(FriendlyAddress {
            address: MsgAddress::Internal { workchain, address },
            bounceable,
            testnet,
        })
    }

    /// Raw string representation ("workchain:hex_address").
    pub fn to_raw_string(&self) -> String {
        match self {
            MsgAddress::Null => String::new(),
            MsgAddress::External { len, data } => format!("extern:{}:{}", len, hex::encode(data)),
            MsgAddress::Internal { workchain, address } => {
                format!("{}:{}", workchain, hex::encode(address))
            }
        }
    }

    /// User-friendly URL-safe base64 form; `None` for non-internal addresses.
    pub fn to_user_friendly(&self, bounceable: bool, testnet: bool) -> Option<String> {
        let MsgAddress::Internal { workchain, address } = self else {
            return None;
        };

        let mut data = Vec::with_capacity(36);
        let mut tag = if bounceable { TAG_BOUNCEABLE } else { TAG_NON_BOUNCEABLE };
        if testnet {
            tag |= TAG_TEST_ONLY;
        }
        data.push(tag);
        data.push(*workchain as i8 as u8);
        data.extend_from_slice(address);
        data.extend_from_slice(&crc16_xmodem(&data).to_be_bytes());

        Some(URL_SAFE_NO_PAD.encode(&data))
    }

    /// Get the workchain ID (if internal address).
    pub fn workchain(&self) -> Option<i32> {
        match self {
            MsgAddress::Internal { workchain, .. } => Some(*workchain),
            _ => None,
        }
    }

    /// Get the 256-bit account ID (if internal address).
    pub fn hash_part(&self) -> Option<&[u8; 32]> {
        match self {
            MsgAddress::Internal { address, .. } => Some(address),
            _ => None,
        }
    }
}

impl std::fmt::Display for MsgAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_raw_string())
    }
}

/// CRC16-XMODEM checksum.
fn crc16_xmodem(data: &[u8]) -> u16 {
    const CRC16: crc::Crc<u16> = crc::Crc::<u16>::new(&crc::CRC_16_XMODEM);
    CRC16.checksum(data)
}
