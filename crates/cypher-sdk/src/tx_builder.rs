//! Transaction builder

use cypher_primitives::H256;
use cypher_proto::transaction::transaction::Raw;
use cypher_proto::{ContractOperation, ContractType};
use cypher_types::{RefBlock, Transaction};
use serde_json::Value;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

use crate::{SdkError, Wallet};

/// Fee limit applied to smart contract operations when none is given
pub const DEFAULT_FEE_LIMIT: i64 = 20_000_000;

/// Upper bound accepted for a fee limit
pub const MAX_FEE_LIMIT: i64 = 1_000_000_000;

/// Default expiration window in milliseconds
pub const DEFAULT_EXPIRATION_MS: i64 = 60_000;

/// Transaction builder with fluent API
///
/// ```rust
/// use cypher_sdk::{TxBuilder, Wallet};
/// use cypher_sdk::proto::TransferContract;
/// use cypher_sdk::types::RefBlock;
/// use cypher_sdk::H256;
///
/// let wallet = Wallet::new_random();
/// let op = TransferContract {
///     owner_address: wallet.address().as_bytes().to_vec(),
///     to_address: wallet.address().as_bytes().to_vec(),
///     amount: 1_000_000,
/// };
/// let block = RefBlock { number: 100, id: H256::from_bytes([7; 32]), timestamp: 0 };
/// let tx = TxBuilder::new(op).ref_block(&block).sign(&wallet).unwrap();
/// assert!(tx.is_signed_by(wallet.address()));
/// ```
#[derive(Debug, Clone)]
pub struct TxBuilder {
    operation: ContractOperation,
    ref_block: Option<RefBlock>,
    fee_limit: Option<i64>,
    expiration_window: i64,
    expiration: Option<i64>,
    timestamp: Option<i64>,
    data: Vec<u8>,
    permission_id: i32,
}

impl TxBuilder {
    /// Create a builder for one operation
    pub fn new(operation: impl Into<ContractOperation>) -> Self {
        Self {
            operation: operation.into(),
            ref_block: None,
            fee_limit: None,
            expiration_window: DEFAULT_EXPIRATION_MS,
            expiration: None,
            timestamp: None,
            data: Vec::new(),
            permission_id: 0,
        }
    }

    /// Set the block the transaction is anchored to
    pub fn ref_block(mut self, block: &RefBlock) -> Self {
        self.ref_block = Some(block.clone());
        self
    }

    /// Set the fee limit in sun
    pub fn fee_limit(mut self, fee_limit: i64) -> Self {
        self.fee_limit = Some(fee_limit);
        self
    }

    /// Set the expiration window relative to the timestamp
    pub fn expiration_window(mut self, window_ms: i64) -> Self {
        self.expiration_window = window_ms;
        self
    }

    /// Set an absolute expiration time in milliseconds
    pub fn expiration(mut self, expiration_ms: i64) -> Self {
        self.expiration = Some(expiration_ms);
        self
    }

    /// Set the creation timestamp in milliseconds (defaults to now)
    pub fn timestamp(mut self, timestamp_ms: i64) -> Self {
        self.timestamp = Some(timestamp_ms);
        self
    }

    /// Attach a memo
    pub fn data(mut self, data: impl Into<Vec<u8>>) -> Self {
        self.data = data.into();
        self
    }

    /// Select the account permission the signatures are checked against
    pub fn permission_id(mut self, permission_id: i32) -> Self {
        self.permission_id = permission_id;
        self
    }

    fn is_contract_call(&self) -> bool {
        matches!(
            self.operation.contract_type(),
            ContractType::CreateSmartContract | ContractType::TriggerSmartContract
        )
    }

    /// Build the unsigned transaction
    pub fn build(&self) -> Result<Transaction, SdkError> {
        let block = self
            .ref_block
            .as_ref()
            .ok_or_else(|| SdkError::validation("A reference block is required"))?;

        let fee_limit = match self.fee_limit {
            Some(limit) if limit <= 0 || limit > MAX_FEE_LIMIT => {
                return Err(SdkError::invalid_input("Invalid feeLimit provided"))
            }
            Some(limit) => limit,
            None if self.is_contract_call() => DEFAULT_FEE_LIMIT,
            None => 0,
        };

        let timestamp = self.timestamp.unwrap_or_else(now_ms);
        let expiration = self.expiration.unwrap_or(timestamp + self.expiration_window);
        if expiration <= timestamp {
            return Err(SdkError::invalid_input("Invalid expiration provided"));
        }

        let raw = Raw {
            ref_block_bytes: block.ref_block_bytes(),
            ref_block_hash: block.ref_block_hash(),
            expiration,
            data: self.data.clone(),
            contract: vec![self.operation.to_contract(self.permission_id)],
            timestamp,
            fee_limit,
            ..Default::default()
        };
        let tx = Transaction::new(raw);

        debug!(
            txid = %tx.txid().to_hex(),
            kind = ?self.operation.contract_type(),
            ref_block = block.number,
            "built transaction"
        );
        Ok(tx)
    }

    /// Build and sign with one wallet
    pub fn sign(&self, wallet: &Wallet) -> Result<Transaction, SdkError> {
        let mut tx = self.build()?;
        wallet.sign_transaction(&mut tx)?;
        Ok(tx)
    }
}

/// Reference block from a `getnowblock` style response
pub fn parse_ref_block(block: &Value) -> Result<RefBlock, SdkError> {
    let id = block
        .get("blockID")
        .and_then(Value::as_str)
        .ok_or_else(|| SdkError::Remote(block.clone()))?;
    let id = H256::from_hex(id).map_err(|e| SdkError::InvalidHex(e.to_string()))?;
    let raw = &block["block_header"]["raw_data"];
    Ok(RefBlock {
        number: raw.get("number").and_then(Value::as_i64).unwrap_or(0),
        id,
        timestamp: raw.get("timestamp").and_then(Value::as_i64).unwrap_or(0),
    })
}

pub(crate) fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cypher_crypto::sha256;
    use cypher_proto::{Message, TransferContract, TriggerSmartContract};
    use serde_json::json;

    fn block() -> RefBlock {
        let mut id = [0u8; 32];
        for (i, b) in id.iter_mut().enumerate() {
            *b = i as u8;
        }
        RefBlock { number: 0x1234_5678, id: H256::from_bytes(id), timestamp: 0 }
    }

    fn transfer() -> TransferContract {
        TransferContract {
            owner_address: vec![0x1c; 21],
            to_address: vec![0x1c; 21],
            amount: 5,
        }
    }

    #[test]
    fn test_build_sets_ref_block_and_window() {
        let tx = TxBuilder::new(transfer())
            .ref_block(&block())
            .timestamp(1_000_000)
            .build()
            .unwrap();
        assert_eq!(tx.raw().ref_block_bytes, vec![0x56, 0x78]);
        assert_eq!(tx.raw().ref_block_hash, (8u8..16).collect::<Vec<_>>());
        assert_eq!(tx.raw().expiration, 1_060_000);
        assert_eq!(tx.raw().fee_limit, 0);
        assert_eq!(tx.txid(), sha256(&tx.raw().encode_to_vec()));
    }

    #[test]
    fn test_contract_calls_get_default_fee_limit() {
        let op = TriggerSmartContract {
            owner_address: vec![0x1c; 21],
            contract_address: vec![0x1c; 21],
            ..Default::default()
        };
        let tx = TxBuilder::new(op.clone()).ref_block(&block()).build().unwrap();
        assert_eq!(tx.raw().fee_limit, DEFAULT_FEE_LIMIT);

        let tx = TxBuilder::new(op).ref_block(&block()).fee_limit(1_000).build().unwrap();
        assert_eq!(tx.raw().fee_limit, 1_000);
    }

    #[test]
    fn test_build_validation() {
        assert!(matches!(TxBuilder::new(transfer()).build(), Err(SdkError::Validation(_))));
        assert!(TxBuilder::new(transfer()).ref_block(&block()).fee_limit(0).build().is_err());
        assert!(TxBuilder::new(transfer())
            .ref_block(&block())
            .fee_limit(MAX_FEE_LIMIT + 1)
            .build()
            .is_err());
        assert!(TxBuilder::new(transfer())
            .ref_block(&block())
            .timestamp(10)
            .expiration(5)
            .build()
            .is_err());
    }

    #[test]
    fn test_memo_and_permission() {
        let tx = TxBuilder::new(transfer())
            .ref_block(&block())
            .data(b"memo".to_vec())
            .permission_id(2)
            .build()
            .unwrap();
        assert_eq!(tx.raw().data, b"memo".to_vec());
        assert_eq!(tx.raw().contract[0].permission_id, 2);
    }

    #[test]
    fn test_sign_appends_signature() {
        let wallet = Wallet::new_random();
        let tx = TxBuilder::new(transfer()).ref_block(&block()).sign(&wallet).unwrap();
        assert_eq!(tx.signatures().len(), 1);
        assert!(tx.is_signed_by(wallet.address()));
    }

    #[test]
    fn test_parse_ref_block() {
        let parsed = parse_ref_block(&json!({
            "blockID": "0000000000bc614e9d4aab6a8e3d34e7b5e0fa79f0a3cf2b1e5bd2c6d21fa0b1",
            "block_header": {"raw_data": {"number": 12345678, "timestamp": 42}}
        }))
        .unwrap();
        assert_eq!(parsed.number, 12345678);
        assert_eq!(parsed.timestamp, 42);
        assert!(matches!(parse_ref_block(&json!({})), Err(SdkError::Remote(_))));
    }
}
