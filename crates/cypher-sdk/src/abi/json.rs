//! Conversion between JSON values and ABI tokens

use cypher_primitives::{Address, U256};
use serde_json::{Map, Value};

use super::decode::decode;
use super::encode::encode_params;
use super::types::{I256, ParamType, Token};
use crate::SdkError;

/// Coerce a JSON value into a token of the given type
///
/// Addresses accept base58, prefixed hex or `0x` + 40 hex digits. Integers
/// accept JSON integers and decimal or `0x` hex strings. Byte values accept
/// hex strings or arrays of byte numbers.
pub fn token_from_json(param: &ParamType, value: &Value) -> Result<Token, SdkError> {
    let mismatch = || SdkError::invalid_parameter(format!("Invalid value {} for type {}", value, param));
    match param {
        ParamType::Address => {
            let s = value.as_str().ok_or_else(mismatch)?;
            parse_abi_address(s).map(Token::Address)
        }
        ParamType::Uint(_) => parse_uint(value).map(Token::Uint),
        ParamType::Int(_) => parse_int(value).map(Token::Int),
        ParamType::Bool => value.as_bool().map(Token::Bool).ok_or_else(mismatch),
        ParamType::Bytes => parse_bytes(value).map(Token::Bytes),
        ParamType::FixedBytes(_) => parse_bytes(value).map(Token::FixedBytes),
        ParamType::String => value.as_str().map(Token::string).ok_or_else(mismatch),
        ParamType::Array(inner) => {
            let items = value.as_array().ok_or_else(mismatch)?;
            items
                .iter()
                .map(|item| token_from_json(inner, item))
                .collect::<Result<Vec<_>, _>>()
                .map(Token::Array)
        }
        ParamType::FixedArray(inner, _) => {
            let items = value.as_array().ok_or_else(mismatch)?;
            items
                .iter()
                .map(|item| token_from_json(inner, item))
                .collect::<Result<Vec<_>, _>>()
                .map(Token::FixedArray)
        }
        ParamType::Tuple(types) => {
            let items = value.as_array().ok_or_else(mismatch)?;
            if items.len() != types.len() {
                return Err(mismatch());
            }
            types
                .iter()
                .zip(items)
                .map(|(t, item)| token_from_json(t, item))
                .collect::<Result<Vec<_>, _>>()
                .map(Token::Tuple)
        }
    }
}

/// Render a token as JSON: addresses as prefixed hex, integers as decimal strings
pub fn token_to_json(token: &Token) -> Value {
    match token {
        Token::Address(a) => Value::String(a.to_hex()),
        Token::Uint(v) => Value::String(v.to_string()),
        Token::Int(v) => Value::String(v.to_string()),
        Token::Bool(b) => Value::Bool(*b),
        Token::Bytes(b) | Token::FixedBytes(b) => Value::String(format!("0x{}", hex::encode(b))),
        Token::String(s) => Value::String(s.clone()),
        Token::Array(items) | Token::FixedArray(items) | Token::Tuple(items) => {
            Value::Array(items.iter().map(token_to_json).collect())
        }
    }
}

/// Encode JSON values against type tags, returning `0x`-prefixed hex
pub fn encode_params_json(types: &[&str], values: &[Value]) -> Result<String, SdkError> {
    if types.len() != values.len() {
        return Err(SdkError::invalid_parameter("Invalid argument count provided"));
    }
    let params = types.iter().map(|t| ParamType::parse(t)).collect::<Result<Vec<_>, _>>()?;
    let tokens = params
        .iter()
        .zip(values)
        .map(|(p, v)| token_from_json(p, v))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(format!("0x{}", hex::encode(encode_params(&params, &tokens)?)))
}

/// Decode hex output against type tags
///
/// With `names` the result is an object keyed by name, otherwise an array.
/// `ignore_method_hash` drops a leading 4-byte selector when present.
pub fn decode_params_json(
    names: &[&str],
    types: &[&str],
    output: &str,
    ignore_method_hash: bool,
) -> Result<Value, SdkError> {
    if !names.is_empty() && names.len() != types.len() {
        return Err(SdkError::invalid_parameter("Names and types must have the same length"));
    }
    let mut hex_part = output.strip_prefix("0x").unwrap_or(output);
    if !hex_part.is_ascii() {
        return Err(SdkError::invalid_input("The encoded string is not valid hex."));
    }
    if ignore_method_hash && hex_part.len() % 64 == 8 {
        hex_part = &hex_part[8..];
    }
    if hex_part.len() % 64 != 0 {
        return Err(SdkError::invalid_input(
            "The encoded string is not valid. Its length must be a multiple of 64.",
        ));
    }
    let data = hex::decode(hex_part)?;
    let params = types.iter().map(|t| ParamType::parse(t)).collect::<Result<Vec<_>, _>>()?;
    let tokens = decode(&params, &data)?;

    if names.is_empty() {
        return Ok(Value::Array(tokens.iter().map(token_to_json).collect()));
    }
    let mut obj = Map::new();
    for (name, token) in names.iter().zip(&tokens) {
        obj.insert((*name).to_string(), token_to_json(token));
    }
    Ok(Value::Object(obj))
}

fn parse_abi_address(s: &str) -> Result<Address, SdkError> {
    if let Some(evm) = s.strip_prefix("0x") {
        let bytes = hex::decode(evm).map_err(|_| SdkError::InvalidAddress(format!("Invalid address provided: {}", s)))?;
        return match bytes.len() {
            20 => {
                let mut id = [0u8; 20];
                id.copy_from_slice(&bytes);
                Ok(Address::from_account_id(id))
            }
            _ => Address::from_slice(&bytes).map_err(SdkError::from),
        };
    }
    Address::parse(s).map_err(|_| SdkError::InvalidAddress(format!("Invalid address provided: {}", s)))
}

fn parse_uint(value: &Value) -> Result<U256, SdkError> {
    let bad = || SdkError::invalid_parameter(format!("Invalid unsigned integer: {}", value));
    match value {
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                Ok(U256::from(u))
            } else if n.as_i64().is_some() {
                Err(SdkError::ValueOutOfRange(format!("{} is negative", n)))
            } else {
                Err(bad())
            }
        }
        Value::String(s) => {
            if s.starts_with('-') {
                return Err(SdkError::ValueOutOfRange(format!("{} is negative", s)));
            }
            parse_u256_str(s).ok_or_else(bad)
        }
        _ => Err(bad()),
    }
}

fn parse_int(value: &Value) -> Result<I256, SdkError> {
    let bad = || SdkError::invalid_parameter(format!("Invalid integer: {}", value));
    match value {
        Value::Number(n) => n
            .as_i64()
            .map(|i| I256::from_i128(i as i128))
            .or_else(|| n.as_u64().map(|u| I256::new(U256::from(u), false)))
            .ok_or_else(bad),
        Value::String(s) => {
            let (negative, digits) = match s.strip_prefix('-') {
                Some(rest) => (true, rest),
                None => (false, s.as_str()),
            };
            parse_u256_str(digits).map(|abs| I256::new(abs, negative)).ok_or_else(bad)
        }
        _ => Err(bad()),
    }
}

fn parse_u256_str(s: &str) -> Option<U256> {
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex_digits) => U256::from_str_radix(hex_digits, 16).ok(),
        None => U256::from_dec_str(s).ok(),
    }
}

fn parse_bytes(value: &Value) -> Result<Vec<u8>, SdkError> {
    match value {
        Value::String(s) => Ok(hex::decode(s.strip_prefix("0x").unwrap_or(s))?),
        Value::Array(items) => items
            .iter()
            .map(|v| {
                v.as_u64()
                    .filter(|b| *b <= 255)
                    .map(|b| b as u8)
                    .ok_or_else(|| SdkError::invalid_parameter(format!("Invalid byte: {}", v)))
            })
            .collect(),
        _ => Err(SdkError::invalid_parameter(format!("Invalid bytes value: {}", value))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const HEX: &str = "1cf39fd6e51aad88f6f4ce6ab8827279cfffb92266";

    #[test]
    fn test_encode_params_json_basic() {
        let out = encode_params_json(&["uint256", "bool"], &[json!(5), json!(true)]).unwrap();
        assert_eq!(
            out,
            format!("0x{}{}", format!("{:064x}", 5), format!("{:064x}", 1))
        );
    }

    #[test]
    fn test_address_forms_encode_identically() {
        let b58 = Address::from_hex(HEX).unwrap().to_base58();
        let a = encode_params_json(&["address"], &[json!(HEX)]).unwrap();
        let b = encode_params_json(&["address"], &[json!(b58)]).unwrap();
        let c = encode_params_json(&["address"], &[json!(format!("0x{}", &HEX[2..]))]).unwrap();
        assert_eq!(a, b);
        assert_eq!(a, c);
        assert!(a.ends_with(&HEX[2..]));
    }

    #[test]
    fn test_argument_count() {
        let err = encode_params_json(&["uint256"], &[]).unwrap_err();
        assert_eq!(err.to_string(), "Invalid argument count provided");
    }

    #[test]
    fn test_decode_with_names() {
        let data = encode_params_json(&["address", "uint256"], &[json!(HEX), json!("1000")]).unwrap();
        let decoded = decode_params_json(&["owner", "amount"], &["address", "uint256"], &data, false).unwrap();
        assert_eq!(decoded, json!({"owner": HEX, "amount": "1000"}));
    }

    #[test]
    fn test_decode_ignores_method_hash() {
        let data = encode_params_json(&["string"], &[json!("Pi Day")]).unwrap();
        let with_selector = format!("0xa9059cbb{}", &data[2..]);
        let decoded = decode_params_json(&[], &["string"], &with_selector, true).unwrap();
        assert_eq!(decoded, json!(["Pi Day"]));
        assert!(decode_params_json(&[], &["string"], &with_selector, false).is_err());
    }

    #[test]
    fn test_non_ascii_output_rejected() {
        let output = format!("aaaaaaa\u{e9}{}", "a".repeat(63));
        assert!(decode_params_json(&[], &["uint256"], &output, true).is_err());
        assert!(decode_params_json(&[], &["uint256"], &output, false).is_err());
    }

    #[test]
    fn test_int_strings_and_hex() {
        let out = encode_params_json(&["int256", "uint256"], &[json!("-1"), json!("0xff")]).unwrap();
        let decoded = decode_params_json(&[], &["int256", "uint256"], &out, false).unwrap();
        assert_eq!(decoded, json!(["-1", "255"]));
    }

    #[test]
    fn test_negative_uint_out_of_range() {
        assert!(matches!(
            encode_params_json(&["uint8"], &[json!(-3)]),
            Err(SdkError::ValueOutOfRange(_))
        ));
    }

    #[test]
    fn test_bytes_inputs() {
        let a = encode_params_json(&["bytes"], &[json!("0x0102")]).unwrap();
        let b = encode_params_json(&["bytes"], &[json!([1, 2])]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_unsupported_type_tag() {
        assert!(matches!(
            encode_params_json(&["uint7"], &[json!(1)]),
            Err(SdkError::UnsupportedType(_))
        ));
    }
}
