//! # cypher-proto
//!
//! Protobuf wire messages for the network protocol.
//!
//! Each on-chain operation has its own message, declared as a field table
//! through `prost` derive attributes. Field numbers are fixed by the protocol
//! and must not be renumbered. The encoder writes fields in ascending field
//! number order, omits default values and skips unknown fields when reading.
//! No semantic validation happens at this layer.

#![warn(clippy::all)]

pub mod contract;
pub mod transaction;
mod operation;
mod error;

pub use contract::*;
pub use operation::ContractOperation;
pub use transaction::{Any, ContractType, Transaction};
pub use error::ProtoError;

pub use prost::Message;
