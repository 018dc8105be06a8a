//! ABI decoding

use cypher_primitives::{Address, U256};

use super::types::{I256, ParamType, Token};
use crate::SdkError;

/// Decode tokens from ABI-encoded data
pub fn decode(types: &[ParamType], data: &[u8]) -> Result<Vec<Token>, SdkError> {
    decode_params(types, data, 0)
}

/// Decode function return data
pub fn decode_output(types: &[ParamType], data: &[u8]) -> Result<Vec<Token>, SdkError> {
    decode(types, data)
}

/// Decode a head starting at `base`; dynamic members' offsets are relative to `base`
fn decode_params(types: &[ParamType], data: &[u8], base: usize) -> Result<Vec<Token>, SdkError> {
    let mut tokens = Vec::with_capacity(types.len());
    let mut head = base;

    for param_type in types {
        let token = if param_type.is_dynamic() {
            let offset = read_usize(data, head)?;
            let position = base.checked_add(offset).ok_or_else(|| truncated(usize::MAX, data))?;
            decode_at(param_type, data, position)?
        } else {
            decode_at(param_type, data, head)?
        };
        tokens.push(token);
        head = head.saturating_add(param_type.head_length());
    }

    Ok(tokens)
}

/// Decode one value whose encoding begins at `pos`
fn decode_at(param_type: &ParamType, data: &[u8], pos: usize) -> Result<Token, SdkError> {
    match param_type {
        ParamType::Address => {
            let w = read_word(data, pos)?;
            let mut id = [0u8; 20];
            id.copy_from_slice(&w[12..]);
            Ok(Token::Address(Address::from_account_id(id)))
        }
        ParamType::Uint(_) => Ok(Token::Uint(U256::from_big_endian(read_word(data, pos)?))),
        ParamType::Int(_) => {
            let w = U256::from_big_endian(read_word(data, pos)?);
            Ok(Token::Int(I256::from_word(w)))
        }
        ParamType::Bool => Ok(Token::Bool(read_word(data, pos)?[31] != 0)),
        ParamType::FixedBytes(size) => Ok(Token::FixedBytes(read_word(data, pos)?[..*size].to_vec())),
        ParamType::Bytes => Ok(Token::Bytes(read_bytes(data, pos)?)),
        ParamType::String => {
            let bytes = read_bytes(data, pos)?;
            let s = String::from_utf8(bytes)
                .map_err(|e| SdkError::InvalidInput(format!("Invalid UTF-8 in string value: {}", e)))?;
            Ok(Token::String(s))
        }
        ParamType::Array(inner) => {
            let len = read_usize(data, pos)?;
            // each element needs at least one word; reject absurd lengths early
            if len > data.len() / 32 {
                return Err(truncated(pos + 32 + len.saturating_mul(32), data));
            }
            let types = vec![(**inner).clone(); len];
            Ok(Token::Array(decode_params(&types, data, pos + 32)?))
        }
        ParamType::FixedArray(inner, size) => {
            // every element occupies its head in place; a zero-width element still counts one byte
            let element = inner.head_length().max(1);
            let end = size.checked_mul(element).and_then(|n| n.checked_add(pos));
            match end {
                Some(end) if end <= data.len() || (inner.head_length() == 0 && *size <= data.len()) => {}
                _ => return Err(truncated(end.unwrap_or(usize::MAX), data)),
            }
            let types = vec![(**inner).clone(); *size];
            Ok(Token::FixedArray(decode_params(&types, data, pos)?))
        }
        ParamType::Tuple(types) => Ok(Token::Tuple(decode_params(types, data, pos)?)),
    }
}

fn read_word(data: &[u8], pos: usize) -> Result<&[u8], SdkError> {
    let end = pos.checked_add(32).ok_or_else(|| truncated(usize::MAX, data))?;
    if data.len() < end {
        return Err(truncated(end, data));
    }
    Ok(&data[pos..end])
}

fn read_usize(data: &[u8], pos: usize) -> Result<usize, SdkError> {
    let value = U256::from_big_endian(read_word(data, pos)?);
    if value > U256::from(data.len()) {
        return Err(SdkError::TruncatedData(format!(
            "offset or length {} exceeds data size {}",
            value,
            data.len()
        )));
    }
    Ok(value.as_usize())
}

fn read_bytes(data: &[u8], pos: usize) -> Result<Vec<u8>, SdkError> {
    let len = read_usize(data, pos)?;
    let start = pos + 32;
    let end = start + len;
    if data.len() < end {
        return Err(truncated(end, data));
    }
    Ok(data[start..end].to_vec())
}

fn truncated(required: usize, data: &[u8]) -> SdkError {
    SdkError::TruncatedData(format!(
        "need {} bytes, have {}",
        required,
        data.len()
    ))
}
