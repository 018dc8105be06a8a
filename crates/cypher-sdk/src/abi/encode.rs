//! ABI encoding

use cypher_primitives::U256;

use super::types::{ParamType, Token};
use crate::SdkError;

/// Encode tokens using each token's natural type
pub fn encode(tokens: &[Token]) -> Result<Vec<u8>, SdkError> {
    let types: Vec<ParamType> = tokens.iter().map(|t| t.type_of()).collect();
    encode_params(&types, tokens)
}

/// Encode function call (selector + params)
pub fn encode_function_call(
    selector: [u8; 4],
    types: &[ParamType],
    tokens: &[Token],
) -> Result<Vec<u8>, SdkError> {
    let mut result = selector.to_vec();
    result.extend(encode_params(types, tokens)?);
    Ok(result)
}

/// Encode `tokens` against declared `types` (head/tail layout)
pub fn encode_params(types: &[ParamType], tokens: &[Token]) -> Result<Vec<u8>, SdkError> {
    if types.len() != tokens.len() {
        return Err(SdkError::invalid_parameter(format!(
            "Expected {} values, got {}",
            types.len(),
            tokens.len()
        )));
    }

    let head_size = types
        .iter()
        .fold(0usize, |total, t| total.saturating_add(t.head_length()));
    let mut head = Vec::new();
    let mut tail = Vec::new();

    for (param_type, token) in types.iter().zip(tokens) {
        if param_type.is_dynamic() {
            head.extend(word(&U256::from(head_size.saturating_add(tail.len()))));
            tail.extend(encode_token(param_type, token)?);
        } else {
            head.extend(encode_token(param_type, token)?);
        }
    }

    head.extend(tail);
    Ok(head)
}

fn encode_token(param_type: &ParamType, token: &Token) -> Result<Vec<u8>, SdkError> {
    match (param_type, token) {
        (ParamType::Address, Token::Address(addr)) => {
            // the network prefix byte is not part of the ABI value
            let mut buf = [0u8; 32];
            buf[12..].copy_from_slice(&addr.account_id());
            Ok(buf.to_vec())
        }
        (ParamType::Uint(bits), Token::Uint(value)) => {
            if value.bits() > *bits {
                return Err(SdkError::ValueOutOfRange(format!("{} does not fit uint{}", value, bits)));
            }
            Ok(word(value))
        }
        (ParamType::Int(bits), Token::Int(value)) => {
            if !value.fits(*bits) {
                return Err(SdkError::ValueOutOfRange(format!("{} does not fit int{}", value, bits)));
            }
            Ok(word(&value.to_word()))
        }
        (ParamType::Bool, Token::Bool(b)) => {
            let mut buf = [0u8; 32];
            buf[31] = u8::from(*b);
            Ok(buf.to_vec())
        }
        (ParamType::FixedBytes(size), Token::FixedBytes(data)) => {
            if data.len() > *size {
                return Err(SdkError::ValueOutOfRange(format!(
                    "{} bytes do not fit bytes{}",
                    data.len(),
                    size
                )));
            }
            let mut buf = [0u8; 32];
            buf[..data.len()].copy_from_slice(data);
            Ok(buf.to_vec())
        }
        (ParamType::Bytes, Token::Bytes(data)) => Ok(encode_bytes(data)),
        (ParamType::String, Token::String(s)) => Ok(encode_bytes(s.as_bytes())),
        (ParamType::Array(inner), Token::Array(tokens)) => {
            let mut result = word(&U256::from(tokens.len()));
            let inner_types = vec![(**inner).clone(); tokens.len()];
            result.extend(encode_params(&inner_types, tokens)?);
            Ok(result)
        }
        (ParamType::FixedArray(inner, size), Token::FixedArray(tokens) | Token::Array(tokens)) => {
            if tokens.len() != *size {
                return Err(SdkError::invalid_parameter(format!(
                    "Expected {} elements for {}, got {}",
                    size,
                    param_type,
                    tokens.len()
                )));
            }
            encode_params(&vec![(**inner).clone(); *size], tokens)
        }
        (ParamType::Tuple(types), Token::Tuple(tokens)) => encode_params(types, tokens),
        (expected, got) => Err(SdkError::invalid_parameter(format!(
            "Value {:?} does not match type {}",
            got, expected
        ))),
    }
}

fn word(value: &U256) -> Vec<u8> {
    let mut bytes = [0u8; 32];
    value.to_big_endian(&mut bytes);
    bytes.to_vec()
}

/// Length word followed by the data right-padded to a multiple of 32
fn encode_bytes(data: &[u8]) -> Vec<u8> {
    let mut result = word(&U256::from(data.len()));
    let padded_len = data.len().div_ceil(32) * 32;
    let mut padded = vec![0u8; padded_len];
    padded[..data.len()].copy_from_slice(data);
    result.extend(padded);
    result
}

/// Compute function selector (first 4 bytes of keccak256(signature))
pub fn function_selector(signature: &str) -> [u8; 4] {
    let hash = cypher_crypto::keccak256(signature.as_bytes());
    let mut selector = [0u8; 4];
    selector.copy_from_slice(&hash.as_bytes()[..4]);
    selector
}

/// Parse a type string (e.g., "uint256", "address[]", "(bool,string)")
pub fn parse_type(s: &str) -> Result<ParamType, SdkError> {
    ParamType::parse(s)
}

/// Input types of a function signature such as `transfer(address,uint256)`
pub fn signature_types(signature: &str) -> Result<Vec<ParamType>, SdkError> {
    let open = signature
        .find('(')
        .ok_or_else(|| SdkError::invalid_input("Invalid function selector provided"))?;
    match ParamType::parse(&signature[open..])? {
        ParamType::Tuple(types) => Ok(types),
        _ => Err(SdkError::invalid_input("Invalid function selector provided")),
    }
}
