//! Keccak-256 and SHA-256 hashing

use cypher_primitives::H256;
use sha2::Sha256;
use sha3::{Digest, Keccak256};

/// Compute Keccak-256 hash of the input data
pub fn keccak256(data: &[u8]) -> H256 {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    let result = hasher.finalize();
    H256::from_bytes(result.into())
}

/// Compute SHA-256 hash of the input data
///
/// Transaction ids are the SHA-256 of the serialized raw data.
pub fn sha256(data: &[u8]) -> H256 {
    let mut hasher = Sha256::new();
    hasher.update(data);
    H256::from_bytes(hasher.finalize().into())
}
