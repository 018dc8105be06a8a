//! Signed text messages

use cypher_crypto::{keccak256, recover_address, Signature};
use cypher_primitives::H256;

use crate::{SdkError, Wallet};

/// Prefix mixed into every message digest
pub const MESSAGE_PREFIX: &str = "\x19Cypher Signed Message:\n";

/// keccak-256 of the prefixed message
pub fn hash_message(message: &[u8]) -> H256 {
    let mut data = Vec::with_capacity(MESSAGE_PREFIX.len() + 20 + message.len());
    data.extend_from_slice(MESSAGE_PREFIX.as_bytes());
    data.extend_from_slice(message.len().to_string().as_bytes());
    data.extend_from_slice(message);
    keccak256(&data)
}

/// `0x`-prefixed 65-byte signature over the message
pub fn sign_message(message: &[u8], private_key: &str) -> Result<String, SdkError> {
    let wallet = Wallet::from_private_key_hex(private_key)?;
    let signature = wallet.sign_hash(&hash_message(message))?;
    Ok(format!("0x{}", signature.to_hex()))
}

/// Base58 address of the message signer
pub fn verify_message(message: &[u8], signature: &str) -> Result<String, SdkError> {
    let signature = Signature::from_hex(signature)?;
    Ok(recover_address(&hash_message(message), &signature)?.to_base58())
}
