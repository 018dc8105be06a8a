//! Decoding of revert data returned by failed calls

use cypher_primitives::U256;

use super::decode::decode;
use super::entry::{AbiEntry, EntryKind};
use super::types::{ParamType, Token};
use crate::SdkError;

const ERROR_STRING_SELECTOR: [u8; 4] = [0x08, 0xc3, 0x79, 0xa0];
const PANIC_SELECTOR: [u8; 4] = [0x4e, 0x48, 0x7b, 0x71];

/// Why a call reverted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevertReason {
    /// `require`/`revert` with a message
    Message(String),
    /// Compiler-inserted panic code
    Panic(U256),
    /// Custom error declared in the contract ABI
    Custom {
        /// Error name
        name: String,
        /// Decoded arguments
        args: Vec<Token>,
    },
    /// Unrecognised revert payload
    Unknown(Vec<u8>),
}

/// Decode revert data against the custom errors declared in `abi`
pub fn decode_revert(abi: &[AbiEntry], data: &[u8]) -> Result<RevertReason, SdkError> {
    if data.len() < 4 {
        return Ok(RevertReason::Unknown(data.to_vec()));
    }
    let (selector, body) = data.split_at(4);

    if selector == ERROR_STRING_SELECTOR {
        let tokens = decode(&[ParamType::String], body)?;
        return Ok(match tokens.into_iter().next() {
            Some(Token::String(s)) => RevertReason::Message(s),
            _ => RevertReason::Unknown(data.to_vec()),
        });
    }
    if selector == PANIC_SELECTOR {
        let tokens = decode(&[ParamType::Uint(256)], body)?;
        return Ok(match tokens.first().and_then(Token::as_uint) {
            Some(code) => RevertReason::Panic(code),
            None => RevertReason::Unknown(data.to_vec()),
        });
    }

    for entry in abi.iter().filter(|e| e.entry_kind() == EntryKind::Error) {
        if entry.selector()? == selector {
            let args = decode(&entry.input_types()?, body)?;
            return Ok(RevertReason::Custom { name: entry.name.clone(), args });
        }
    }
    Ok(RevertReason::Unknown(data.to_vec()))
}
