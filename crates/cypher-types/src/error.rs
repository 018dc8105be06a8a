//! Type-level errors

use cypher_crypto::CryptoError;
use cypher_proto::ProtoError;
use thiserror::Error;

/// Transaction envelope error
#[derive(Debug, Error)]
pub enum TypesError {
    /// Wire decoding failed
    #[error(transparent)]
    Proto(#[from] ProtoError),

    /// Signature handling failed
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// Serialized transaction carries no raw data
    #[error("transaction has no raw data")]
    MissingRawData,

    /// Hex field could not be decoded
    #[error("invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),
}
