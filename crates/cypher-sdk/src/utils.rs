//! Conversion helpers: hex, text, big numbers, base units and base58

use std::str::FromStr;

use cypher_crypto::keccak256;
use cypher_types::Event;
use num_bigint::{BigInt, Sign};
use rust_decimal::Decimal;
use serde_json::Value;

use crate::SdkError;

/// Base units per whole coin
pub const SUN_PER_CYP: i64 = 1_000_000;

const INVALID_HEX: &str = "The passed value is not a valid hex string";

/// Keccak-256 of a UTF-8 string as hex
pub fn sha3(input: &str, prefix: bool) -> String {
    let hash = keccak256(input.as_bytes());
    if prefix {
        hash.to_hex_prefixed()
    } else {
        hash.to_hex()
    }
}

/// `0x1` or `0x0`
pub fn bool_to_hex(value: bool) -> String {
    if value { "0x1" } else { "0x0" }.to_string()
}

/// `0x` followed by the hex of the UTF-8 bytes
pub fn from_utf8(input: &str) -> String {
    format!("0x{}", hex::encode(input.as_bytes()))
}

/// `0x` followed by one byte per character
///
/// The result is right padded with zeros up to `padding` hex characters.
pub fn from_ascii(input: &str, padding: usize) -> Result<String, SdkError> {
    let mut out = String::with_capacity(2 + input.len() * 2);
    out.push_str("0x");
    for c in input.chars() {
        let code = u32::from(c);
        if code > 0xff {
            return Err(SdkError::invalid_input("The passed value is not a valid ASCII string"));
        }
        out.push_str(&format!("{:02x}", code));
    }
    while out.len() - 2 < padding {
        out.push('0');
    }
    Ok(out)
}

/// Hex form of a decimal or hex number, `-0x..` for negatives
pub fn from_decimal(value: &str) -> Result<String, SdkError> {
    Ok(big_to_hex(&to_big_number(value)?))
}

fn big_to_hex(n: &BigInt) -> String {
    let digits = n.magnitude().to_str_radix(16);
    match n.sign() {
        Sign::Minus => format!("-0x{}", digits),
        _ => format!("0x{}", digits),
    }
}

/// Hex form of an arbitrary JSON value
///
/// Booleans and numbers become numeric hex, strings already in hex form are
/// returned untouched, numeric strings are converted, any other text is
/// UTF-8 encoded and objects/arrays encode their JSON text.
pub fn to_hex(value: &Value) -> Result<String, SdkError> {
    match value {
        Value::Bool(b) => Ok(bool_to_hex(*b)),
        Value::Number(n) => from_decimal(&n.to_string()),
        Value::String(s) => {
            if s.starts_with("0x") || s.starts_with("-0x") {
                Ok(s.clone())
            } else if to_big_number(s).is_ok() {
                from_decimal(s)
            } else {
                Ok(from_utf8(s))
            }
        }
        Value::Object(_) | Value::Array(_) => Ok(json_to_hex(value)),
        Value::Null => Err(SdkError::invalid_input("The passed value is not convertible to a hex string")),
    }
}

/// UTF-8 hex of a value's JSON text
pub fn json_to_hex(value: &Value) -> String {
    from_utf8(&value.to_string())
}

fn decode_hex_arg(input: &str) -> Result<Vec<u8>, SdkError> {
    let stripped = input.strip_prefix("0x").unwrap_or(input);
    if !stripped.is_empty() && !is_hex(stripped) {
        return Err(SdkError::invalid_input(INVALID_HEX));
    }
    hex::decode(stripped).map_err(|_| SdkError::invalid_input(INVALID_HEX))
}

/// Text from hex-encoded UTF-8
///
/// In strict mode malformed UTF-8 is an error, otherwise it is replaced.
pub fn to_utf8(input: &str, strict: bool) -> Result<String, SdkError> {
    let bytes = decode_hex_arg(input)?;
    if strict {
        String::from_utf8(bytes).map_err(|_| SdkError::invalid_input(INVALID_HEX))
    } else {
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Text from hex, one character per byte
pub fn to_ascii(input: &str) -> Result<String, SdkError> {
    Ok(decode_hex_arg(input)?.into_iter().map(char::from).collect())
}

/// Arbitrary-precision integer from decimal or `0x` hex text
pub fn to_big_number(input: &str) -> Result<BigInt, SdkError> {
    let trimmed = input.trim();
    let (negative, body) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };
    let parsed = match body.strip_prefix("0x").or_else(|| body.strip_prefix("0X")) {
        Some(digits) => BigInt::parse_bytes(digits.as_bytes(), 16),
        None => BigInt::parse_bytes(body.as_bytes(), 10),
    };
    let n = parsed.ok_or_else(|| SdkError::invalid_input(format!("Invalid number provided: {}", input)))?;
    Ok(if negative { -n } else { n })
}

/// Decimal text of a decimal or hex number
pub fn to_decimal(input: &str) -> Result<String, SdkError> {
    Ok(to_big_number(input)?.to_string())
}

fn parse_amount(amount: &str) -> Result<Decimal, SdkError> {
    Decimal::from_str(amount.trim()).map_err(|_| SdkError::invalid_input("Invalid amount provided"))
}

/// Whole coins to base units
pub fn to_sun(amount: &str) -> Result<String, SdkError> {
    let value = parse_amount(amount)?
        .checked_mul(Decimal::from(SUN_PER_CYP))
        .ok_or_else(|| SdkError::invalid_input("Invalid amount provided"))?;
    Ok(value.normalize().to_string())
}

/// Base units to whole coins
pub fn from_sun(amount: &str) -> Result<String, SdkError> {
    let value = parse_amount(amount)?
        .checked_div(Decimal::from(SUN_PER_CYP))
        .ok_or_else(|| SdkError::invalid_input("Invalid amount provided"))?;
    Ok(value.normalize().to_string())
}

/// Non-empty hex digits with an optional `0x` prefix
pub fn is_hex(input: &str) -> bool {
    let digits = input.strip_prefix("0x").unwrap_or(input);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Absolute http(s) URL; a bare host is accepted as http
pub fn is_valid_url(input: &str) -> bool {
    fn accept(url: &url::Url) -> bool {
        matches!(url.scheme(), "http" | "https") && url.host_str().map_or(false, |h| !h.is_empty())
    }
    let parsed = if input.contains("://") {
        url::Url::parse(input)
    } else {
        url::Url::parse(&format!("http://{}", input))
    };
    parsed.map_or(false, |url| accept(&url))
}

/// Left pad `input` with `fill` up to `len` characters
pub fn pad_left(input: &str, fill: char, len: usize) -> String {
    let count = input.chars().count();
    if count >= len {
        return input.to_string();
    }
    let mut out: String = std::iter::repeat(fill).take(len - count).collect();
    out.push_str(input);
    out
}

/// Plain base58 (no checksum)
pub fn encode58(bytes: &[u8]) -> String {
    bs58::encode(bytes).into_string()
}

/// Inverse of [`encode58`]
pub fn decode58(input: &str) -> Result<Vec<u8>, SdkError> {
    bs58::decode(input)
        .into_vec()
        .map_err(|e| SdkError::invalid_input(format!("Invalid base58 string: {}", e)))
}

/// Raw event server record to the canonical event shape
pub fn map_event(raw: &Value) -> Event {
    Event::from_raw_value(raw)
}
