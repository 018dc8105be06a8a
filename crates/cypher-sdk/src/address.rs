//! String-level address helpers
//!
//! Addresses travel through application code as strings in either hex
//! (`1c` + 40 hex chars) or base58check form. These helpers convert between
//! the two and never panic on malformed input.

use cypher_crypto::private_key_to_address;
use cypher_primitives::Address;
use serde_json::Value;
use zeroize::Zeroize;

use crate::SdkError;

/// Base58 address owned by a hex private key
pub fn from_private_key(private_key: &str) -> Result<String, SdkError> {
    let stripped = private_key.strip_prefix("0x").unwrap_or(private_key);
    let mut bytes =
        hex::decode(stripped).map_err(|_| SdkError::InvalidKey("private key is not valid hex".into()))?;
    let address = private_key_to_address(&bytes);
    bytes.zeroize();
    Ok(address?.to_base58())
}

/// Hex form of an address given in either form
pub fn to_hex(address: &str) -> Result<String, SdkError> {
    Address::parse(address)
        .map(|a| a.to_hex())
        .map_err(|_| SdkError::InvalidAddress(format!("Invalid address provided: {}", address)))
}

/// Base58 form of a hex address
///
/// Fails when the prefix byte or the length is wrong.
pub fn from_hex(address: &str) -> Result<String, SdkError> {
    Ok(Address::from_hex(address)?.to_base58())
}

/// Whether `value` is a valid hex or base58check address
pub fn is_address(value: &str) -> bool {
    Address::is_valid(value)
}

/// [`is_address`] over a JSON value; anything but a string is not an address
pub fn is_address_value(value: &Value) -> bool {
    value.as_str().map_or(false, is_address)
}

/// Parse an address argument, mapping failure to `message`
pub(crate) fn parse_arg(value: &str, message: &str) -> Result<Address, SdkError> {
    Address::parse(value).map_err(|_| SdkError::invalid_input(message))
}
