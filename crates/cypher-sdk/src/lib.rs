//! # cypher-sdk
//!
//! Rust client SDK for the Cypher network.
//!
//! ## Features
//!
//! - **CypherWeb**: client for a full node, a solidity node and an event server
//! - **Wallet**: keys, mnemonics and transaction signing
//! - **TxBuilder**: unsigned transactions from protocol operations
//! - **TransactionBuilder**: validated builders anchored to the latest block
//! - **Contract**: ABI-driven contract calls
//! - **Events**: paginated event queries with fingerprints
//! - **Plugins**: extend or override client methods at runtime
//! - **SideChain**: deposits and withdrawals through chain gateways
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cypher_sdk::{CypherWeb, Wallet};
//! use cypher_sdk::transaction_builder::BuildOptions;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = CypherWeb::new_mock();
//!
//!     let wallet = Wallet::new_random();
//!     client.set_private_key(&hex::encode([7u8; 32]))?;
//!     println!("Address: {}", wallet.address().to_base58());
//!
//!     let balance = client.get_balance(&wallet.address().to_hex()).await?;
//!     println!("Balance: {} sun", balance);
//!
//!     let tx = client
//!         .transaction_builder()
//!         .send_cyp(&wallet.address().to_hex(), 1_000_000, None, &BuildOptions::default())
//!         .await?;
//!     let result = client.send_transaction(tx, None).await?;
//!     println!("txid: {}", result.txid);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Contract Interaction
//!
//! ```rust,no_run
//! use cypher_sdk::{contract, abi::Token, Address, CypherWeb};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = CypherWeb::new_mock();
//!
//!     let token = client.contract(contract::trc20("1c742d35cc6634c0532925a3b844bc9e7595f0ab3d")?)?;
//!     let owner = Address::from_hex("1c1234567890123456789012345678901234567890")?;
//!     let balance = token.call("balanceOf", &[Token::Address(owner)], None).await?;
//!     println!("Balance: {:?}", balance[0]);
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod abi;
pub mod address;
pub mod callback;
mod client;
mod config;
pub mod contract;
mod error;
pub mod event;
pub mod message;
pub mod plugin;
pub mod sidechain;
pub mod transaction_builder;
mod transport;
mod tx_builder;
pub mod utils;
mod wallet;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use client::{BroadcastResult, ClientBuilder, Connection, CypherWeb, Providers, Settings};
pub use config::CypherConfig;
pub use error::SdkError;
pub use transport::{deserialize_response, HttpMethod, MockTransport, RecordedRequest};

/// Re-export Transport trait for custom implementations
pub use transport::Transport;
pub use tx_builder::{parse_ref_block, TxBuilder, DEFAULT_EXPIRATION_MS, DEFAULT_FEE_LIMIT, MAX_FEE_LIMIT};
pub use wallet::{Wallet, BIP44_PATH_INDEX_0, BIP44_PATH_PREFIX};

#[cfg(feature = "http")]
pub use transport::HttpProvider;

pub use cypher_proto as proto;
pub use cypher_types as types;

// Re-export primitives for convenience
pub use cypher_primitives::{Address, H256, U256};
pub use cypher_types::{Event, RefBlock, Transaction};
