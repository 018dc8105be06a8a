//! ECDSA signature operations using secp256k1

use cypher_primitives::{Address, H256};
use k256::ecdsa::{RecoveryId, Signature as K256Signature, SigningKey, VerifyingKey};
use crate::{keccak256, CryptoError};

/// Half of the secp256k1 curve order (n/2)
const SECP256K1_N_DIV_2: [u8; 32] = [
    0x7F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0x5D, 0x57, 0x6E, 0x73, 0x57, 0xA4, 0x50, 0x1D,
    0xDF, 0xE9, 0x2F, 0x46, 0x68, 0x1B, 0x20, 0xA0,
];

/// Recoverable ECDSA signature, 65 bytes on the wire as `r || s || v`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    /// r component (32 bytes)
    pub r: [u8; 32],
    /// s component (32 bytes)
    pub s: [u8; 32],
    /// recovery id, stored as 27 or 28
    pub v: u8,
}

/// Public key (65 bytes uncompressed, or 33 bytes compressed)
pub type PublicKey = VerifyingKey;

/// Private key (32 bytes)
pub type PrivateKey = SigningKey;

impl Signature {
    /// Size of the serialized signature
    pub const LEN: usize = 65;

    /// Create signature from r, s, v components
    pub fn new(r: [u8; 32], s: [u8; 32], v: u8) -> Self {
        Signature { r, s, v }
    }

    /// Get recovery ID (0 or 1)
    pub fn recovery_id(&self) -> u8 {
        if self.v >= 27 {
            self.v - 27
        } else {
            self.v
        }
    }

    /// Convert to 65-byte representation (r || s || v)
    pub fn to_bytes(&self) -> [u8; 65] {
        let mut bytes = [0u8; 65];
        bytes[..32].copy_from_slice(&self.r);
        bytes[32..64].copy_from_slice(&self.s);
        bytes[64] = self.v;
        bytes
    }

    /// Parse from a 65-byte slice
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != Self::LEN {
            return Err(CryptoError::InvalidSignature(format!(
                "expected 65 bytes, got {}",
                bytes.len()
            )));
        }
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..64]);
        Ok(Signature { r, s, v: bytes[64] })
    }

    /// Lowercase hex of the 65-byte form, as carried in transaction JSON
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Parse the hex form (with or without 0x prefix)
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s).map_err(|e| CryptoError::InvalidSignature(e.to_string()))?;
        Self::from_slice(&bytes)
    }

    /// Check if signature has low-s value
    pub fn is_low_s(&self) -> bool {
        self.s <= SECP256K1_N_DIV_2
    }

    fn to_k256(&self) -> Result<K256Signature, CryptoError> {
        let r: k256::FieldBytes = self.r.into();
        let s: k256::FieldBytes = self.s.into();
        K256Signature::from_scalars(r, s).map_err(|e| CryptoError::InvalidSignature(e.to_string()))
    }
}

/// Parse a 32-byte private key, rejecting zero and values at or above the curve order
pub fn parse_private_key(bytes: &[u8]) -> Result<PrivateKey, CryptoError> {
    if bytes.len() != 32 {
        return Err(CryptoError::InvalidPrivateKey);
    }
    SigningKey::from_slice(bytes).map_err(|_| CryptoError::InvalidPrivateKey)
}

/// Sign a 32-byte digest with a private key, normalising to low-s
pub fn sign(message_hash: &H256, private_key: &PrivateKey) -> Result<Signature, CryptoError> {
    let (signature, mut recovery_id) = private_key
        .sign_prehash_recoverable(message_hash.as_bytes())
        .map_err(|e| CryptoError::SigningFailed(e.to_string()))?;

    let signature = match signature.normalize_s() {
        Some(normalized) => {
            recovery_id = RecoveryId::try_from(recovery_id.to_byte() ^ 1)
                .map_err(|_| CryptoError::SigningFailed("recovery id out of range".to_string()))?;
            normalized
        }
        None => signature,
    };

    Ok(Signature {
        r: signature.r().to_bytes().into(),
        s: signature.s().to_bytes().into(),
        v: recovery_id.to_byte() + 27,
    })
}

/// Verify a signature against a message hash and public key
pub fn verify(
    message_hash: &H256,
    signature: &Signature,
    public_key: &PublicKey,
) -> Result<bool, CryptoError> {
    if !signature.is_low_s() {
        return Ok(false);
    }

    use k256::ecdsa::signature::hazmat::PrehashVerifier;
    Ok(public_key
        .verify_prehash(message_hash.as_bytes(), &signature.to_k256()?)
        .is_ok())
}

/// Recover public key from signature and message hash
pub fn recover_public_key(
    message_hash: &H256,
    signature: &Signature,
) -> Result<PublicKey, CryptoError> {
    let recovery_id = RecoveryId::try_from(signature.recovery_id())
        .map_err(|_| CryptoError::InvalidRecoveryId(signature.recovery_id()))?;

    VerifyingKey::recover_from_prehash(message_hash.as_bytes(), &signature.to_k256()?, recovery_id)
        .map_err(|e| CryptoError::RecoveryFailed(e.to_string()))
}

/// Recover the signer's address
pub fn recover_address(message_hash: &H256, signature: &Signature) -> Result<Address, CryptoError> {
    recover_public_key(message_hash, signature).map(|pk| public_key_to_address(&pk))
}

/// Derive the network address from a public key
pub fn public_key_to_address(public_key: &PublicKey) -> Address {
    // 0x04 || x || y
    let encoded = public_key.to_encoded_point(false);
    let hash = keccak256(&encoded.as_bytes()[1..]);

    let mut id = [0u8; 20];
    id.copy_from_slice(&hash.as_bytes()[12..]);
    Address::from_account_id(id)
}

/// Derive the network address from raw private key bytes
pub fn private_key_to_address(private_key: &[u8]) -> Result<Address, CryptoError> {
    let key = parse_private_key(private_key)?;
    Ok(public_key_to_address(key.verifying_key()))
}
