//! Wallet and account management

use cypher_crypto::{
    derive_path, generate_mnemonic, mnemonic_to_seed, public_key_to_address, sign, PrivateKey,
    PublicKey, Signature,
};
use cypher_primitives::{Address, H256};
use cypher_types::Transaction;
use k256::ecdsa::SigningKey;
use rand::rngs::OsRng;
use tracing::debug;
use zeroize::Zeroize;

use crate::SdkError;

/// Fixed purpose and coin type of every derivation path
pub const BIP44_PATH_PREFIX: &str = "m/44'/195'";

/// Path of the first account
pub const BIP44_PATH_INDEX_0: &str = "m/44'/195'/0'/0/0";

/// Wallet for managing private keys and signing
///
/// Note: Clone is intentionally not implemented to prevent accidental key duplication.
/// Use `from_private_key` to create a new wallet with the same key if needed.
pub struct Wallet {
    private_key: PrivateKey,
    address: Address,
}

impl Wallet {
    /// Create a new random wallet
    pub fn new_random() -> Self {
        Self::from_signing_key(SigningKey::random(&mut OsRng))
    }

    fn from_signing_key(private_key: PrivateKey) -> Self {
        let address = public_key_to_address(private_key.verifying_key());
        Self { private_key, address }
    }

    /// Create a wallet from a 32-byte private key
    pub fn from_private_key(key: &[u8; 32]) -> Result<Self, SdkError> {
        let private_key =
            SigningKey::from_slice(key).map_err(|e| SdkError::InvalidKey(e.to_string()))?;
        Ok(Self::from_signing_key(private_key))
    }

    /// Create a wallet from a hex-encoded private key
    ///
    /// Accepts both with and without "0x" prefix.
    pub fn from_private_key_hex(hex: &str) -> Result<Self, SdkError> {
        let hex = hex.strip_prefix("0x").unwrap_or(hex);
        let mut bytes =
            hex::decode(hex).map_err(|_| SdkError::InvalidKey("private key is not valid hex".into()))?;
        if bytes.len() != 32 {
            let len = bytes.len();
            bytes.zeroize();
            return Err(SdkError::InvalidKey(format!("Expected 32 bytes, got {}", len)));
        }

        let mut key = [0u8; 32];
        key.copy_from_slice(&bytes);
        bytes.zeroize();

        let result = Self::from_private_key(&key);
        key.zeroize();
        result
    }

    /// Derive a wallet from a mnemonic phrase
    ///
    /// `path` defaults to [`BIP44_PATH_INDEX_0`]; any path not starting with
    /// `m/44'/195'` is rejected.
    pub fn from_mnemonic(phrase: &str, path: Option<&str>) -> Result<Self, SdkError> {
        let path = path.unwrap_or(BIP44_PATH_INDEX_0);
        validate_path(path)?;

        let mut seed = mnemonic_to_seed(phrase, "")?;
        let derived = derive_path(&seed, path);
        seed.zeroize();

        let wallet = Self::from_signing_key(derived?.private_key()?);
        debug!(address = %wallet.address, path, "derived wallet from mnemonic");
        Ok(wallet)
    }

    /// Derive the account at `index` under `m/44'/195'/0'/0`
    pub fn from_mnemonic_index(phrase: &str, index: u32) -> Result<Self, SdkError> {
        Self::from_mnemonic(phrase, Some(&format!("{}/0'/0/{}", BIP44_PATH_PREFIX, index)))
    }

    /// Generate a fresh mnemonic and its first account
    pub fn generate(word_count: usize) -> Result<(Self, String), SdkError> {
        let phrase = generate_mnemonic(word_count)?;
        let wallet = Self::from_mnemonic(&phrase, None)?;
        Ok((wallet, phrase))
    }

    /// Get the wallet's address
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// Get the wallet's public key
    pub fn public_key(&self) -> &PublicKey {
        self.private_key.verifying_key()
    }

    /// Sign a 32-byte digest
    pub fn sign_hash(&self, hash: &H256) -> Result<Signature, SdkError> {
        sign(hash, &self.private_key).map_err(|e| SdkError::Signing(e.to_string()))
    }

    /// Append a signature over the transaction id
    ///
    /// Signing twice with the same key is rejected.
    pub fn sign_transaction(&self, tx: &mut Transaction) -> Result<(), SdkError> {
        if tx.is_signed_by(&self.address) {
            return Err(SdkError::validation("Transaction was already signed"));
        }
        let signature = self.sign_hash(&tx.txid())?;
        tx.push_signature(signature);
        debug!(txid = %tx.txid().to_hex(), signer = %self.address, "signed transaction");
        Ok(())
    }
}

fn validate_path(path: &str) -> Result<(), SdkError> {
    let mut segments = path.split('/');
    let prefix_ok = segments.next() == Some("m")
        && segments.next() == Some("44'")
        && segments.next() == Some("195'");
    if prefix_ok {
        Ok(())
    } else {
        Err(SdkError::invalid_input("Invalid cypher path provided"))
    }
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PHRASE: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    #[test]
    fn test_wallet_from_hex() {
        let wallet = Wallet::from_private_key_hex(
            "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
        )
        .unwrap();
        assert_eq!(wallet.address().to_hex(), "1cf39fd6e51aad88f6f4ce6ab8827279cfffb92266");

        let no_prefix = Wallet::from_private_key_hex(
            "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
        )
        .unwrap();
        assert_eq!(no_prefix.address(), wallet.address());
    }

    #[test]
    fn test_wallet_invalid_keys() {
        assert!(matches!(Wallet::from_private_key_hex("0x1234"), Err(SdkError::InvalidKey(_))));
        assert!(matches!(Wallet::from_private_key_hex("xyz"), Err(SdkError::InvalidKey(_))));
        assert!(matches!(Wallet::from_private_key(&[0u8; 32]), Err(SdkError::InvalidKey(_))));
    }

    #[test]
    fn test_mnemonic_default_path_is_index_zero() {
        let default = Wallet::from_mnemonic(PHRASE, None).unwrap();
        let explicit = Wallet::from_mnemonic(PHRASE, Some(BIP44_PATH_INDEX_0)).unwrap();
        let index0 = Wallet::from_mnemonic_index(PHRASE, 0).unwrap();
        let index1 = Wallet::from_mnemonic_index(PHRASE, 1).unwrap();
        assert_eq!(default.address(), explicit.address());
        assert_eq!(default.address(), index0.address());
        assert_ne!(default.address(), index1.address());
    }

    #[test]
    fn test_mnemonic_rejects_foreign_paths() {
        for path in ["m/44'/60'/0'/0/0", "m/49'/195'/0'/0/0", "44'/195'/0'/0/0"] {
            let err = Wallet::from_mnemonic(PHRASE, Some(path)).unwrap_err();
            assert!(matches!(err, SdkError::InvalidInput(ref m) if m == "Invalid cypher path provided"));
        }
    }

    #[test]
    fn test_generate_roundtrips_through_phrase() {
        let (wallet, phrase) = Wallet::generate(12).unwrap();
        assert_eq!(phrase.split_whitespace().count(), 12);
        assert_eq!(Wallet::from_mnemonic(&phrase, None).unwrap().address(), wallet.address());
    }

    #[test]
    fn test_wallet_sign_hash() {
        let wallet = Wallet::new_random();
        let signature = wallet.sign_hash(&H256::from_bytes([0x42; 32])).unwrap();
        assert!(signature.v == 27 || signature.v == 28);
        assert!(signature.is_low_s());
    }

    #[test]
    fn test_wallet_debug_hides_key() {
        let wallet = Wallet::new_random();
        let debug = format!("{:?}", wallet);
        assert!(debug.contains("address"));
        assert!(!debug.contains("private_key"));
    }
}
