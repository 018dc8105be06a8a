//! Base58check encoding (4-byte double SHA-256 checksum)

use sha2::{Digest, Sha256};
use thiserror::Error;

/// Base58check decoding error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Base58Error {
    /// Not a base58 string
    #[error("base58check: invalid character or encoding: {0}")]
    InvalidEncoding(String),
    /// Payload too short to carry a checksum
    #[error("base58check: invalid length")]
    InvalidLength,
    /// Checksum mismatch
    #[error("base58check: invalid checksum")]
    InvalidChecksum,
}

/// SHA-256 applied twice
pub fn double_sha256(data: &[u8]) -> [u8; 32] {
    let first = Sha256::digest(data);
    Sha256::digest(first).into()
}

/// Encode `payload` followed by the first four bytes of its double SHA-256
pub fn base58check_encode(payload: &[u8]) -> String {
    let mut buf = Vec::with_capacity(payload.len() + 4);
    buf.extend_from_slice(payload);
    let check = double_sha256(payload);
    buf.extend_from_slice(&check[..4]);
    bs58::encode(buf).into_string()
}

/// Decode a base58check string and verify its checksum, returning the payload
pub fn base58check_decode(src: &str) -> Result<Vec<u8>, Base58Error> {
    let raw = bs58::decode(src)
        .into_vec()
        .map_err(|e| Base58Error::InvalidEncoding(e.to_string()))?;
    if raw.len() < 5 {
        return Err(Base58Error::InvalidLength);
    }

    let (payload, check) = raw.split_at(raw.len() - 4);
    if double_sha256(payload)[..4] != *check {
        return Err(Base58Error::InvalidChecksum);
    }
    Ok(payload.to_vec())
}
