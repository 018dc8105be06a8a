//! ABI type definitions

use std::fmt;

use cypher_primitives::{Address, H256, U256};

use crate::SdkError;

/// Solidity ABI token types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Address (21 bytes here, 20 on the wire)
    Address(Address),
    /// Unsigned integer (8-256 bits)
    Uint(U256),
    /// Signed integer (8-256 bits)
    Int(I256),
    /// Boolean
    Bool(bool),
    /// Dynamic bytes
    Bytes(Vec<u8>),
    /// Fixed-size bytes (1-32)
    FixedBytes(Vec<u8>),
    /// UTF-8 string
    String(String),
    /// Dynamic array
    Array(Vec<Token>),
    /// Fixed-size array
    FixedArray(Vec<Token>),
    /// Tuple (struct)
    Tuple(Vec<Token>),
}

/// Signed 256-bit integer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct I256 {
    /// Absolute value
    pub abs: U256,
    /// Sign (true if negative)
    pub negative: bool,
}

impl I256 {
    /// Create a new I256; negative zero is normalised to zero
    pub fn new(abs: U256, negative: bool) -> Self {
        Self { abs, negative: negative && !abs.is_zero() }
    }

    /// Create from i128
    pub fn from_i128(value: i128) -> Self {
        Self::new(U256::from(value.unsigned_abs()), value < 0)
    }

    /// Check if zero
    pub fn is_zero(&self) -> bool {
        self.abs.is_zero()
    }

    /// Whether the value fits a signed integer of `bits` width
    pub fn fits(&self, bits: usize) -> bool {
        if bits >= 256 {
            let limit = U256::one() << 255;
            return if self.negative { self.abs <= limit } else { self.abs < limit };
        }
        let limit = U256::one() << (bits - 1);
        if self.negative {
            self.abs <= limit
        } else {
            self.abs < limit
        }
    }

    /// 32-byte two's complement word
    pub fn to_word(&self) -> U256 {
        if self.negative {
            (!self.abs).overflowing_add(U256::one()).0
        } else {
            self.abs
        }
    }

    /// Read a 32-byte two's complement word
    pub fn from_word(word: U256) -> Self {
        if word.bit(255) {
            Self::new((!word).overflowing_add(U256::one()).0, true)
        } else {
            Self::new(word, false)
        }
    }
}

impl fmt::Display for I256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            write!(f, "-{}", self.abs)
        } else {
            write!(f, "{}", self.abs)
        }
    }
}

/// Solidity parameter types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamType {
    /// Address
    Address,
    /// Unsigned integer with bit size (8, 16, ..., 256)
    Uint(usize),
    /// Signed integer with bit size
    Int(usize),
    /// Boolean
    Bool,
    /// Dynamic bytes
    Bytes,
    /// Fixed-size bytes (size 1-32)
    FixedBytes(usize),
    /// UTF-8 string
    String,
    /// Dynamic array
    Array(Box<ParamType>),
    /// Fixed-size array
    FixedArray(Box<ParamType>, usize),
    /// Tuple
    Tuple(Vec<ParamType>),
}

impl ParamType {
    /// Check if this type is dynamic (variable length)
    pub fn is_dynamic(&self) -> bool {
        match self {
            ParamType::Bytes | ParamType::String | ParamType::Array(_) => true,
            ParamType::FixedArray(inner, _) => inner.is_dynamic(),
            ParamType::Tuple(types) => types.iter().any(|t| t.is_dynamic()),
            _ => false,
        }
    }

    /// Bytes this type occupies in the head of its enclosing encoding
    pub fn head_length(&self) -> usize {
        if self.is_dynamic() {
            return 32;
        }
        match self {
            ParamType::FixedArray(inner, size) => inner.head_length().saturating_mul(*size),
            ParamType::Tuple(types) => types
                .iter()
                .fold(0usize, |total, t| total.saturating_add(t.head_length())),
            _ => 32,
        }
    }

    /// Parse a type tag such as `uint256`, `address[]`, `(uint8,bytes)[2]`
    pub fn parse(s: &str) -> Result<ParamType, SdkError> {
        let s = s.trim();
        let unsupported = || SdkError::UnsupportedType(s.to_string());

        if let Some(stripped) = s.strip_suffix(']') {
            let open = stripped.rfind('[').ok_or_else(unsupported)?;
            let inner = ParamType::parse(&stripped[..open])?;
            let size = &stripped[open + 1..];
            return if size.is_empty() {
                Ok(ParamType::Array(Box::new(inner)))
            } else {
                let size: usize = size.parse().map_err(|_| unsupported())?;
                Ok(ParamType::FixedArray(Box::new(inner), size))
            };
        }

        let tuple_body = s
            .strip_prefix("tuple(")
            .or_else(|| s.strip_prefix('('))
            .and_then(|rest| rest.strip_suffix(')'));
        if let Some(body) = tuple_body {
            let members = split_top_level(body)
                .into_iter()
                .filter(|m| !m.trim().is_empty())
                .map(ParamType::parse)
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(ParamType::Tuple(members));
        }

        match s {
            "address" => return Ok(ParamType::Address),
            "bool" => return Ok(ParamType::Bool),
            "string" => return Ok(ParamType::String),
            "bytes" => return Ok(ParamType::Bytes),
            "uint" => return Ok(ParamType::Uint(256)),
            "int" => return Ok(ParamType::Int(256)),
            // tokens ids and values on this network are carried as trcToken (uint256)
            "trcToken" => return Ok(ParamType::Uint(256)),
            _ => {}
        }

        if let Some(bits) = s.strip_prefix("uint") {
            let bits: usize = bits.parse().map_err(|_| unsupported())?;
            return if bits > 0 && bits <= 256 && bits % 8 == 0 {
                Ok(ParamType::Uint(bits))
            } else {
                Err(unsupported())
            };
        }
        if let Some(bits) = s.strip_prefix("int") {
            let bits: usize = bits.parse().map_err(|_| unsupported())?;
            return if bits > 0 && bits <= 256 && bits % 8 == 0 {
                Ok(ParamType::Int(bits))
            } else {
                Err(unsupported())
            };
        }
        if let Some(size) = s.strip_prefix("bytes") {
            let size: usize = size.parse().map_err(|_| unsupported())?;
            return if (1..=32).contains(&size) {
                Ok(ParamType::FixedBytes(size))
            } else {
                Err(unsupported())
            };
        }

        Err(unsupported())
    }
}

/// Split on commas that are not nested inside parentheses
pub(crate) fn split_top_level(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::Address => write!(f, "address"),
            ParamType::Uint(bits) => write!(f, "uint{}", bits),
            ParamType::Int(bits) => write!(f, "int{}", bits),
            ParamType::Bool => write!(f, "bool"),
            ParamType::Bytes => write!(f, "bytes"),
            ParamType::FixedBytes(size) => write!(f, "bytes{}", size),
            ParamType::String => write!(f, "string"),
            ParamType::Array(inner) => write!(f, "{}[]", inner),
            ParamType::FixedArray(inner, size) => write!(f, "{}[{}]", inner, size),
            ParamType::Tuple(types) => {
                write!(f, "(")?;
                for (i, t) in types.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", t)?;
                }
                write!(f, ")")
            }
        }
    }
}

impl Token {
    /// Create an address token
    pub fn address(addr: Address) -> Self {
        Token::Address(addr)
    }

    /// Create a uint256 token
    pub fn uint256(value: U256) -> Self {
        Token::Uint(value)
    }

    /// Create a uint256 from u128
    pub fn uint256_from_u128(value: u128) -> Self {
        Token::Uint(U256::from(value))
    }

    /// Create an int256 token
    pub fn int(value: i128) -> Self {
        Token::Int(I256::from_i128(value))
    }

    /// Create a bool token
    pub fn bool(value: bool) -> Self {
        Token::Bool(value)
    }

    /// Create a bytes token
    pub fn bytes(data: Vec<u8>) -> Self {
        Token::Bytes(data)
    }

    /// Create a string token
    pub fn string(s: impl Into<String>) -> Self {
        Token::String(s.into())
    }

    /// Create a bytes32 token
    pub fn bytes32(data: H256) -> Self {
        Token::FixedBytes(data.as_bytes().to_vec())
    }

    /// Unsigned value, if this is a uint token
    pub fn as_uint(&self) -> Option<U256> {
        match self {
            Token::Uint(v) => Some(*v),
            _ => None,
        }
    }

    /// Address value, if this is an address token
    pub fn as_address(&self) -> Option<Address> {
        match self {
            Token::Address(a) => Some(*a),
            _ => None,
        }
    }

    /// Bool value, if this is a bool token
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Token::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// String value, if this is a string token
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Token::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the natural type of this token
    pub fn type_of(&self) -> ParamType {
        match self {
            Token::Address(_) => ParamType::Address,
            Token::Uint(_) => ParamType::Uint(256),
            Token::Int(_) => ParamType::Int(256),
            Token::Bool(_) => ParamType::Bool,
            Token::Bytes(_) => ParamType::Bytes,
            Token::FixedBytes(b) => ParamType::FixedBytes(b.len()),
            Token::String(_) => ParamType::String,
            Token::Array(tokens) => {
                let inner = tokens.first().map(|t| t.type_of()).unwrap_or(ParamType::Uint(256));
                ParamType::Array(Box::new(inner))
            }
            Token::FixedArray(tokens) => {
                let inner = tokens.first().map(|t| t.type_of()).unwrap_or(ParamType::Uint(256));
                ParamType::FixedArray(Box::new(inner), tokens.len())
            }
            Token::Tuple(tokens) => ParamType::Tuple(tokens.iter().map(|t| t.type_of()).collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_param_type_is_dynamic() {
        assert!(!ParamType::Address.is_dynamic());
        assert!(!ParamType::Uint(256).is_dynamic());
        assert!(!ParamType::FixedBytes(32).is_dynamic());
        assert!(ParamType::Bytes.is_dynamic());
        assert!(ParamType::String.is_dynamic());
        assert!(ParamType::Array(Box::new(ParamType::Uint(256))).is_dynamic());
        assert!(ParamType::Tuple(vec![ParamType::Bool, ParamType::String]).is_dynamic());
        assert!(!ParamType::FixedArray(Box::new(ParamType::Bool), 3).is_dynamic());
    }

    #[test]
    fn test_parse_simple_types() {
        assert_eq!(ParamType::parse("address").unwrap(), ParamType::Address);
        assert_eq!(ParamType::parse("uint").unwrap(), ParamType::Uint(256));
        assert_eq!(ParamType::parse("int8").unwrap(), ParamType::Int(8));
        assert_eq!(ParamType::parse("bytes32").unwrap(), ParamType::FixedBytes(32));
        assert_eq!(ParamType::parse("trcToken").unwrap(), ParamType::Uint(256));
    }

    #[test]
    fn test_parse_composite_types() {
        assert_eq!(
            ParamType::parse("uint256[]").unwrap(),
            ParamType::Array(Box::new(ParamType::Uint(256)))
        );
        assert_eq!(
            ParamType::parse("address[3][]").unwrap(),
            ParamType::Array(Box::new(ParamType::FixedArray(Box::new(ParamType::Address), 3)))
        );
        assert_eq!(
            ParamType::parse("(uint8,(bool,string))").unwrap(),
            ParamType::Tuple(vec![
                ParamType::Uint(8),
                ParamType::Tuple(vec![ParamType::Bool, ParamType::String]),
            ])
        );
        assert_eq!(
            ParamType::parse("tuple(address,bytes)[2]").unwrap().to_string(),
            "(address,bytes)[2]"
        );
    }

    #[test]
    fn test_parse_unsupported() {
        for bad in ["uint7", "uint512", "bytes0", "bytes33", "float", "fixed128x18", "uint[x]", ""] {
            assert!(
                matches!(ParamType::parse(bad), Err(SdkError::UnsupportedType(_))),
                "{} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_i256_ranges() {
        assert!(I256::from_i128(127).fits(8));
        assert!(!I256::from_i128(128).fits(8));
        assert!(I256::from_i128(-128).fits(8));
        assert!(!I256::from_i128(-129).fits(8));
    }

    #[test]
    fn test_i256_word_roundtrip() {
        for v in [0i128, 1, -1, 255, -256, i128::MAX, i128::MIN + 1] {
            let x = I256::from_i128(v);
            assert_eq!(I256::from_word(x.to_word()), x);
        }
        assert_eq!(I256::from_i128(-1).to_word(), U256::MAX);
    }

    #[test]
    fn test_negative_zero_normalised() {
        assert_eq!(I256::new(U256::zero(), true), I256::default());
    }
}
