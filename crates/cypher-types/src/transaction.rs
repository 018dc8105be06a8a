//! Transaction envelope

use cypher_crypto::{recover_address, sha256, Signature};
use cypher_primitives::{Address, H256};
use cypher_proto::transaction::transaction::Raw;
use cypher_proto::{ContractOperation, Message};
use serde::{Deserialize, Serialize};

use crate::TypesError;

/// Recent block a transaction is anchored to
///
/// Nodes reject transactions whose reference block is unknown or too old.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RefBlock {
    /// Block height
    pub number: i64,
    /// Block id (32 bytes, the first 8 encode the height)
    pub id: H256,
    /// Block timestamp in milliseconds
    pub timestamp: i64,
}

impl RefBlock {
    /// Bytes 6..8 of the big-endian block height
    pub fn ref_block_bytes(&self) -> Vec<u8> {
        self.number.to_be_bytes()[6..8].to_vec()
    }

    /// Bytes 8..16 of the block id
    pub fn ref_block_hash(&self) -> Vec<u8> {
        self.id.as_bytes()[8..16].to_vec()
    }
}

/// Transaction: raw data, its id and the ordered signature list
///
/// The id is the SHA-256 of the serialized raw data and is recomputed on every
/// change to the raw data, so it can never go stale.
#[derive(Clone, Debug, PartialEq)]
pub struct Transaction {
    raw: Raw,
    txid: H256,
    signatures: Vec<Signature>,
}

impl Transaction {
    /// Wrap raw data, computing the id
    pub fn new(raw: Raw) -> Self {
        let txid = sha256(&raw.encode_to_vec());
        Transaction { raw, txid, signatures: Vec::new() }
    }

    /// Raw data
    pub fn raw(&self) -> &Raw {
        &self.raw
    }

    /// Replace raw data; existing signatures no longer match and are dropped
    pub fn set_raw(&mut self, raw: Raw) {
        self.txid = sha256(&raw.encode_to_vec());
        self.raw = raw;
        self.signatures.clear();
    }

    /// Transaction id
    pub fn txid(&self) -> H256 {
        self.txid
    }

    /// Serialized raw data
    pub fn raw_data_bytes(&self) -> Vec<u8> {
        self.raw.encode_to_vec()
    }

    /// Hex of the serialized raw data
    pub fn raw_data_hex(&self) -> String {
        hex::encode(self.raw_data_bytes())
    }

    /// Signatures in signing order
    pub fn signatures(&self) -> &[Signature] {
        &self.signatures
    }

    /// Append a signature
    pub fn push_signature(&mut self, signature: Signature) {
        self.signatures.push(signature);
    }

    /// Whether any signature is attached
    pub fn is_signed(&self) -> bool {
        !self.signatures.is_empty()
    }

    /// Decode the contained operations
    pub fn operations(&self) -> Result<Vec<ContractOperation>, TypesError> {
        self.raw
            .contract
            .iter()
            .map(|c| ContractOperation::from_contract(c).map_err(TypesError::from))
            .collect()
    }

    /// Addresses recovered from every signature, in order
    pub fn signers(&self) -> Result<Vec<Address>, TypesError> {
        self.signatures
            .iter()
            .map(|sig| recover_address(&self.txid, sig).map_err(TypesError::from))
            .collect()
    }

    /// Whether `address` produced one of the signatures
    pub fn is_signed_by(&self, address: &Address) -> bool {
        self.signatures
            .iter()
            .any(|sig| recover_address(&self.txid, sig).map(|a| &a == address).unwrap_or(false))
    }

    /// Full protobuf message
    pub fn to_proto(&self) -> cypher_proto::Transaction {
        cypher_proto::Transaction {
            raw_data: Some(self.raw.clone()),
            signature: self.signatures.iter().map(|s| s.to_bytes().to_vec()).collect(),
            ret: Vec::new(),
        }
    }

    /// Serialized protobuf transaction
    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_proto().encode_to_vec()
    }

    /// Parse a serialized protobuf transaction
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TypesError> {
        let proto = cypher_proto::Transaction::decode(bytes).map_err(cypher_proto::ProtoError::from)?;
        let raw = proto.raw_data.ok_or(TypesError::MissingRawData)?;
        let mut tx = Transaction::new(raw);
        for sig in &proto.signature {
            tx.push_signature(Signature::from_slice(sig)?);
        }
        Ok(tx)
    }

    /// JSON form exchanged with nodes
    pub fn to_json(&self) -> TransactionJson {
        TransactionJson {
            txid: self.txid.to_hex(),
            raw_data_hex: self.raw_data_hex(),
            signature: self.signatures.iter().map(Signature::to_hex).collect(),
            visible: false,
        }
    }

    /// Rebuild from the JSON form; the id is recomputed from `raw_data_hex`
    pub fn from_json(json: &TransactionJson) -> Result<Self, TypesError> {
        let raw_bytes = hex::decode(&json.raw_data_hex)?;
        let raw = Raw::decode(raw_bytes.as_slice()).map_err(cypher_proto::ProtoError::from)?;
        let mut tx = Transaction::new(raw);
        for sig in &json.signature {
            tx.push_signature(Signature::from_hex(sig)?);
        }
        Ok(tx)
    }
}

/// Node-facing JSON shape of a transaction
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionJson {
    /// Transaction id hex
    #[serde(rename = "txID")]
    pub txid: String,
    /// Serialized raw data hex
    pub raw_data_hex: String,
    /// Signature hex strings
    #[serde(default)]
    pub signature: Vec<String>,
    /// Whether addresses are rendered in base58
    #[serde(default)]
    pub visible: bool,
}
