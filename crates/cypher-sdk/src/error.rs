//! SDK error types

use serde_json::Value;
use thiserror::Error;

/// SDK error type
///
/// Messages for input and validation failures are the exact text shown to
/// callers, so they are not prefixed.
#[derive(Debug, Error)]
pub enum SdkError {
    /// Transport/network error
    #[error("Transport error: {0}")]
    Transport(String),

    /// Structured error body returned by a node or the event server
    #[error("Remote error: {0}")]
    Remote(Value),

    /// Malformed argument
    #[error("{0}")]
    InvalidInput(String),

    /// Invalid address format
    #[error("{0}")]
    InvalidAddress(String),

    /// Option value of the wrong kind
    #[error("{0}")]
    InvalidParameter(String),

    /// Arguments are individually valid but not together
    #[error("{0}")]
    Validation(String),

    /// Event queries need an event server
    #[error("No event server configured")]
    NoEventServer,

    /// Plugin requires an incompatible host version
    #[error("{0}")]
    IncompatiblePlugin(String),

    /// ABI type tag that cannot be encoded
    #[error("Unsupported ABI type: {0}")]
    UnsupportedType(String),

    /// Number does not fit its declared width
    #[error("Value out of range: {0}")]
    ValueOutOfRange(String),

    /// ABI data shorter than its types require
    #[error("Truncated ABI data: {0}")]
    TruncatedData(String),

    /// Invalid private key
    #[error("Invalid private key: {0}")]
    InvalidKey(String),

    /// No key supplied and no default key configured
    #[error("Missing private key")]
    MissingKey,

    /// Signing failed
    #[error("Signing failed: {0}")]
    Signing(String),

    /// Invalid hex string
    #[error("Invalid hex: {0}")]
    InvalidHex(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration could not be loaded or is inconsistent
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SdkError {
    pub(crate) fn invalid_input(msg: impl Into<String>) -> Self {
        SdkError::InvalidInput(msg.into())
    }

    pub(crate) fn invalid_parameter(msg: impl Into<String>) -> Self {
        SdkError::InvalidParameter(msg.into())
    }

    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        SdkError::Validation(msg.into())
    }
}

impl From<hex::FromHexError> for SdkError {
    fn from(e: hex::FromHexError) -> Self {
        SdkError::InvalidHex(e.to_string())
    }
}

impl From<serde_json::Error> for SdkError {
    fn from(e: serde_json::Error) -> Self {
        SdkError::Serialization(e.to_string())
    }
}

impl From<cypher_crypto::CryptoError> for SdkError {
    fn from(e: cypher_crypto::CryptoError) -> Self {
        use cypher_crypto::CryptoError;
        match e {
            CryptoError::InvalidPrivateKey => SdkError::InvalidKey(e.to_string()),
            CryptoError::InvalidMnemonic(_) | CryptoError::InvalidPath(_) => {
                SdkError::InvalidInput(e.to_string())
            }
            other => SdkError::Signing(other.to_string()),
        }
    }
}

impl From<cypher_primitives::AddressError> for SdkError {
    fn from(e: cypher_primitives::AddressError) -> Self {
        SdkError::InvalidAddress(e.to_string())
    }
}

impl From<cypher_primitives::PrimitiveError> for SdkError {
    fn from(e: cypher_primitives::PrimitiveError) -> Self {
        SdkError::InvalidAddress(e.to_string())
    }
}

impl From<cypher_proto::ProtoError> for SdkError {
    fn from(e: cypher_proto::ProtoError) -> Self {
        SdkError::Serialization(e.to_string())
    }
}

impl From<cypher_types::TypesError> for SdkError {
    fn from(e: cypher_types::TypesError) -> Self {
        use cypher_types::TypesError;
        match e {
            TypesError::Crypto(c) => c.into(),
            TypesError::Proto(p) => p.into(),
            TypesError::InvalidHex(h) => h.into(),
            other => SdkError::Serialization(other.to_string()),
        }
    }
}
