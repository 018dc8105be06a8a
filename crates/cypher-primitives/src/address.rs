//! Network address type (21 bytes: prefix byte + 20-byte account id)

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::base58::{base58check_decode, base58check_encode, Base58Error};

/// Network prefix byte of every address
pub const ADDRESS_PREFIX_BYTE: u8 = 0x1c;

/// Network prefix as it appears at the start of the hex form
pub const ADDRESS_PREFIX: &str = "1c";

/// Length of the base58check form in characters
pub const ADDRESS_SIZE: usize = 34;

/// Address parsing error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    /// Invalid hex string
    #[error("invalid hex string: {0}")]
    InvalidHex(String),
    /// Invalid length
    #[error("invalid address length: expected 21 bytes, got {0}")]
    InvalidLength(usize),
    /// Wrong network prefix byte
    #[error("invalid address prefix: expected 0x1c, got {0:#04x}")]
    InvalidPrefix(u8),
    /// Base58 form is not 34 characters
    #[error("invalid base58 address length: expected 34 characters, got {0}")]
    InvalidEncodedLength(usize),
    /// Base58check decoding failed
    #[error(transparent)]
    Base58(#[from] Base58Error),
}

/// 21-byte network address
///
/// The first byte is always [`ADDRESS_PREFIX_BYTE`]. The remaining 20 bytes are
/// the account id, the last 20 bytes of keccak-256 over the public key.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; 21]);

impl Address {
    /// Size of address in bytes
    pub const LEN: usize = 21;

    /// Build an address from a 20-byte account id
    pub fn from_account_id(id: [u8; 20]) -> Self {
        let mut bytes = [0u8; 21];
        bytes[0] = ADDRESS_PREFIX_BYTE;
        bytes[1..].copy_from_slice(&id);
        Address(bytes)
    }

    /// Create address from a 21-byte slice carrying the prefix
    pub fn from_slice(slice: &[u8]) -> Result<Self, AddressError> {
        if slice.len() != Self::LEN {
            return Err(AddressError::InvalidLength(slice.len()));
        }
        if slice[0] != ADDRESS_PREFIX_BYTE {
            return Err(AddressError::InvalidPrefix(slice[0]));
        }
        let mut bytes = [0u8; 21];
        bytes.copy_from_slice(slice);
        Ok(Address(bytes))
    }

    /// Parse the hex form (`1c` followed by 40 hex chars)
    pub fn from_hex(s: &str) -> Result<Self, AddressError> {
        let bytes = hex::decode(s).map_err(|e| AddressError::InvalidHex(e.to_string()))?;
        Self::from_slice(&bytes)
    }

    /// Parse the base58check form
    pub fn from_base58(s: &str) -> Result<Self, AddressError> {
        if s.len() != ADDRESS_SIZE {
            return Err(AddressError::InvalidEncodedLength(s.len()));
        }
        let payload = base58check_decode(s)?;
        Self::from_slice(&payload)
    }

    /// Parse either form
    pub fn parse(s: &str) -> Result<Self, AddressError> {
        if s.len() == 2 * Self::LEN && s.bytes().all(|b| b.is_ascii_hexdigit()) {
            Self::from_hex(s)
        } else {
            Self::from_base58(s)
        }
    }

    /// Whether `s` is a well-formed address in hex or base58check form
    pub fn is_valid(s: &str) -> bool {
        Self::parse(s).is_ok()
    }

    /// Full 21 bytes including the prefix
    pub fn as_bytes(&self) -> &[u8; 21] {
        &self.0
    }

    /// The 20-byte account id without the prefix
    pub fn account_id(&self) -> [u8; 20] {
        let mut id = [0u8; 20];
        id.copy_from_slice(&self.0[1..]);
        id
    }

    /// Lowercase hex form without `0x`
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Base58check form
    pub fn to_base58(&self) -> String {
        base58check_encode(&self.0)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_hex())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_base58())
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<[u8; 20]> for Address {
    fn from(id: [u8; 20]) -> Self {
        Address::from_account_id(id)
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    use super::*;
    use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

    impl Serialize for Address {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.serialize_str(&self.to_base58())
        }
    }

    impl<'de> Deserialize<'de> for Address {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let s = String::deserialize(deserializer)?;
            Address::parse(&s).map_err(de::Error::custom)
        }
    }
}
