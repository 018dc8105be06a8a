//! # cypher-primitives
//!
//! Primitive types for the CypherWeb SDK.
//!
//! - `Address`: 21-byte account address with hex and base58check forms
//! - `H256`: 32-byte hash
//! - base58check helpers shared by address and key handling

#![warn(missing_docs)]
#![warn(clippy::all)]

mod address;
mod base58;
mod hash;
mod error;

pub use address::{Address, AddressError, ADDRESS_PREFIX, ADDRESS_PREFIX_BYTE, ADDRESS_SIZE};
pub use base58::{base58check_decode, base58check_encode, double_sha256, Base58Error};
pub use hash::{HashError, H256};
pub use error::PrimitiveError;

// Re-export primitive-types for U256
pub use primitive_types::U256;

/// Block height type
pub type BlockNumber = i64;

/// Amount in sun, the smallest currency unit (10^-6 of a whole coin)
pub type Sun = i64;
