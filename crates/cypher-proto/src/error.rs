//! Wire-layer errors

use thiserror::Error;

/// Protobuf encoding/decoding error
#[derive(Debug, Error)]
pub enum ProtoError {
    /// Malformed protobuf bytes
    #[error("protobuf decode failed: {0}")]
    Decode(#[from] prost::DecodeError),

    /// Contract type number that this library has no message for
    #[error("unsupported contract type: {0}")]
    UnsupportedContract(i32),

    /// Contract entry without a parameter payload
    #[error("contract parameter missing")]
    MissingParameter,

    /// Parameter type url disagrees with the declared contract type
    #[error("type url mismatch: expected {expected}, got {got}")]
    TypeUrlMismatch {
        /// Url implied by the contract type
        expected: String,
        /// Url carried by the payload
        got: String,
    },
}
