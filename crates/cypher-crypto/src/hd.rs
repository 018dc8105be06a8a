//! BIP39 mnemonics and BIP32 hierarchical key derivation

use std::fmt;
use std::str::FromStr;

use bip39::{Language, Mnemonic};
use hmac::{Hmac, Mac};
use k256::elliptic_curve::{Field, PrimeField};
use k256::{FieldBytes, Scalar};
use sha2::Sha512;
use zeroize::Zeroize;

use crate::signature::{public_key_to_address, PrivateKey};
use crate::CryptoError;
use cypher_primitives::Address;

type HmacSha512 = Hmac<Sha512>;

const HARDENED: u32 = 0x8000_0000;

/// Parsed derivation path such as `m/44'/195'/0'/0/0`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DerivationPath(Vec<u32>);

impl DerivationPath {
    /// Child indexes, hardened ones carrying the top bit
    pub fn indexes(&self) -> &[u32] {
        &self.0
    }
}

impl FromStr for DerivationPath {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split('/');
        if parts.next() != Some("m") {
            return Err(CryptoError::InvalidPath(s.to_string()));
        }
        let indexes = parts
            .map(|part| {
                let (digits, hardened) = match part.strip_suffix('\'').or_else(|| part.strip_suffix('h')) {
                    Some(d) => (d, true),
                    None => (part, false),
                };
                let index: u32 = digits
                    .parse()
                    .map_err(|_| CryptoError::InvalidPath(s.to_string()))?;
                if index >= HARDENED {
                    return Err(CryptoError::InvalidPath(s.to_string()));
                }
                Ok(if hardened { index | HARDENED } else { index })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(DerivationPath(indexes))
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m")?;
        for index in &self.0 {
            if index & HARDENED != 0 {
                write!(f, "/{}'", index & !HARDENED)?;
            } else {
                write!(f, "/{}", index)?;
            }
        }
        Ok(())
    }
}

/// BIP32 extended private key
pub struct ExtendedKey {
    key: Scalar,
    chain_code: [u8; 32],
}

impl ExtendedKey {
    /// Master key from a BIP39 seed
    pub fn master(seed: &[u8]) -> Result<Self, CryptoError> {
        let mut mac = HmacSha512::new_from_slice(b"Bitcoin seed")
            .map_err(|e| CryptoError::InvalidPath(e.to_string()))?;
        mac.update(seed);
        Self::from_hmac_output(&mac.finalize().into_bytes())
    }

    fn from_hmac_output(out: &[u8]) -> Result<Self, CryptoError> {
        let key = scalar_from_slice(&out[..32])?;
        if bool::from(key.is_zero()) {
            return Err(CryptoError::InvalidPrivateKey);
        }
        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(&out[32..]);
        Ok(ExtendedKey { key, chain_code })
    }

    /// Derive one child
    pub fn child(&self, index: u32) -> Result<Self, CryptoError> {
        let mut mac = HmacSha512::new_from_slice(&self.chain_code)
            .map_err(|e| CryptoError::InvalidPath(e.to_string()))?;
        if index & HARDENED != 0 {
            mac.update(&[0u8]);
            mac.update(&self.key.to_repr());
        } else {
            let public = self.private_key()?.verifying_key().to_encoded_point(true);
            mac.update(public.as_bytes());
        }
        mac.update(&index.to_be_bytes());
        let out = mac.finalize().into_bytes();

        let tweak = scalar_from_slice(&out[..32])?;
        let key = tweak + self.key;
        if bool::from(key.is_zero()) {
            return Err(CryptoError::InvalidPath(format!("child {} is unusable", index)));
        }
        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(&out[32..]);
        Ok(ExtendedKey { key, chain_code })
    }

    /// Walk a full path from this key
    pub fn derive(&self, path: &DerivationPath) -> Result<Self, CryptoError> {
        let mut current = ExtendedKey { key: self.key, chain_code: self.chain_code };
        for index in path.indexes() {
            current = current.child(*index)?;
        }
        Ok(current)
    }

    /// Signing key for this node
    pub fn private_key(&self) -> Result<PrivateKey, CryptoError> {
        PrivateKey::from_bytes(&self.key.to_repr()).map_err(|_| CryptoError::InvalidPrivateKey)
    }

    /// Raw 32 private key bytes
    pub fn private_key_bytes(&self) -> [u8; 32] {
        self.key.to_repr().into()
    }

    /// Address of this node
    pub fn address(&self) -> Result<Address, CryptoError> {
        Ok(public_key_to_address(self.private_key()?.verifying_key()))
    }
}

impl Drop for ExtendedKey {
    fn drop(&mut self) {
        self.chain_code.zeroize();
        self.key = Scalar::ZERO;
    }
}

fn scalar_from_slice(bytes: &[u8]) -> Result<Scalar, CryptoError> {
    let repr = FieldBytes::clone_from_slice(bytes);
    Option::<Scalar>::from(Scalar::from_repr(repr)).ok_or(CryptoError::InvalidPrivateKey)
}

/// Generate a fresh English mnemonic with the given word count (12, 15, 18, 21 or 24)
pub fn generate_mnemonic(word_count: usize) -> Result<String, CryptoError> {
    Mnemonic::generate_in(Language::English, word_count)
        .map(|m| m.to_string())
        .map_err(|e| CryptoError::InvalidMnemonic(e.to_string()))
}

/// BIP39 seed for a phrase and optional passphrase
pub fn mnemonic_to_seed(phrase: &str, passphrase: &str) -> Result<[u8; 64], CryptoError> {
    let mnemonic = Mnemonic::parse_in_normalized(Language::English, phrase)
        .map_err(|e| CryptoError::InvalidMnemonic(e.to_string()))?;
    Ok(mnemonic.to_seed(passphrase))
}

/// Derive the extended key at `path` from a BIP39 seed
pub fn derive_path(seed: &[u8], path: &str) -> Result<ExtendedKey, CryptoError> {
    let path: DerivationPath = path.parse()?;
    ExtendedKey::master(seed)?.derive(&path)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PHRASE: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    #[test]
    fn test_path_parse_and_display() {
        let path: DerivationPath = "m/44'/195'/0'/0/3".parse().unwrap();
        assert_eq!(path.indexes(), &[44 | HARDENED, 195 | HARDENED, HARDENED, 0, 3]);
        assert_eq!(path.to_string(), "m/44'/195'/0'/0/3");
    }

    #[test]
    fn test_path_rejects_garbage() {
        assert!("44'/195'".parse::<DerivationPath>().is_err());
        assert!("m/abc".parse::<DerivationPath>().is_err());
        assert!("m/2147483648".parse::<DerivationPath>().is_err());
    }

    #[test]
    fn test_known_vector_coin_type_60() {
        let seed = mnemonic_to_seed(PHRASE, "").unwrap();
        let node = derive_path(&seed, "m/44'/60'/0'/0/0").unwrap();
        assert_eq!(
            hex::encode(node.address().unwrap().account_id()),
            "9858effd232b4033e47d90003d41ec34ecaeda94"
        );
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let seed = mnemonic_to_seed(PHRASE, "").unwrap();
        let a = derive_path(&seed, "m/44'/195'/0'/0/0").unwrap();
        let b = derive_path(&seed, "m/44'/195'/0'/0/0").unwrap();
        let c = derive_path(&seed, "m/44'/195'/0'/0/1").unwrap();
        assert_eq!(a.private_key_bytes(), b.private_key_bytes());
        assert_ne!(a.private_key_bytes(), c.private_key_bytes());
    }

    #[test]
    fn test_generate_mnemonic() {
        let phrase = generate_mnemonic(12).unwrap();
        assert_eq!(phrase.split_whitespace().count(), 12);
        assert!(mnemonic_to_seed(&phrase, "").is_ok());
        assert!(generate_mnemonic(13).is_err());
    }

    #[test]
    fn test_invalid_mnemonic() {
        assert!(matches!(
            mnemonic_to_seed("abandon abandon", ""),
            Err(CryptoError::InvalidMnemonic(_))
        ));
    }
}
