//! # cypher-types
//!
//! Core types for the CypherWeb SDK.
//!
//! This crate provides:
//! - [`Transaction`](transaction::Transaction) - raw data, id and signatures
//! - [`RefBlock`](transaction::RefBlock) - recent block a transaction is anchored to
//! - [`Event`](event::Event) - canonical event record

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod event;
pub mod transaction;
mod error;

pub use error::TypesError;
pub use event::{Event, RawEvent};
pub use transaction::{RefBlock, Transaction, TransactionJson};
