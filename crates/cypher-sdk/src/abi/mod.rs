//! ABI encoding and decoding for contract calls
//!
//! This module provides functionality for:
//! - Encoding call parameters and function calls
//! - Decoding return values and revert data
//! - Computing function selectors
//! - Reading JSON ABI descriptions
//!
//! Addresses are 21 bytes on this network; the prefix byte is dropped when a
//! value is ABI encoded and restored when decoded.
//!
//! # Example
//!
//! ```rust
//! use cypher_sdk::abi::{encode_params, decode, function_selector, Token, ParamType};
//! use cypher_sdk::U256;
//!
//! let selector = function_selector("transfer(address,uint256)");
//! let data = encode_params(&[ParamType::Uint(256)], &[Token::Uint(U256::from(1000))]).unwrap();
//!
//! let balance = decode(&[ParamType::Uint(256)], &data).unwrap();
//! assert_eq!(balance[0].as_uint(), Some(U256::from(1000)));
//! ```

mod decode;
mod encode;
mod entry;
mod json;
mod revert;
mod types;

pub use decode::{decode, decode_output};
pub use encode::{
    encode, encode_function_call, encode_params, function_selector, parse_type, signature_types,
};
pub use entry::{parse_abi, AbiEntry, AbiParam, EntryKind};
pub use json::{decode_params_json, encode_params_json, token_from_json, token_to_json};
pub use revert::{decode_revert, RevertReason};
pub use types::{I256, ParamType, Token};

#[cfg(test)]
mod tests {
    use super::*;
    use cypher_primitives::{Address, U256};
    use proptest::prelude::*;

    fn leaf_type() -> impl Strategy<Value = (ParamType, Token)> {
        prop_oneof![
            any::<u64>().prop_map(|v| (ParamType::Uint(64), Token::Uint(U256::from(v)))),
            any::<i64>().prop_map(|v| (ParamType::Int(64), Token::Int(I256::from_i128(v as i128)))),
            any::<bool>().prop_map(|b| (ParamType::Bool, Token::Bool(b))),
            any::<[u8; 20]>().prop_map(|id| (ParamType::Address, Token::Address(Address::from_account_id(id)))),
            proptest::collection::vec(any::<u8>(), 0..70).prop_map(|b| (ParamType::Bytes, Token::Bytes(b))),
            "[a-zA-Z0-9 ]{0,40}".prop_map(|s| (ParamType::String, Token::String(s))),
        ]
    }

    fn typed_value() -> impl Strategy<Value = (ParamType, Token)> {
        leaf_type().prop_recursive(3, 24, 4, |inner| {
            prop_oneof![
                proptest::collection::vec(inner.clone(), 1..4).prop_map(|members| {
                    let (types, tokens): (Vec<_>, Vec<_>) = members.into_iter().unzip();
                    (ParamType::Tuple(types), Token::Tuple(tokens))
                }),
                (inner, 0usize..3).prop_map(|((t, v), n)| {
                    (ParamType::Array(Box::new(t)), Token::Array(vec![v; n]))
                }),
            ]
        })
    }

    proptest! {
        #[test]
        fn prop_encode_decode_roundtrip(values in proptest::collection::vec(typed_value(), 0..4)) {
            let (types, tokens): (Vec<_>, Vec<_>) = values.into_iter().unzip();
            let encoded = encode_params(&types, &tokens).unwrap();
            prop_assert_eq!(encoded.len() % 32, 0);
            prop_assert_eq!(decode(&types, &encoded).unwrap(), tokens);
        }
    }
}
