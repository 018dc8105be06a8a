//! # cypher-crypto
//!
//! Cryptographic primitives for the CypherWeb SDK.
//!
//! - Keccak-256 and SHA-256 hashing
//! - ECDSA signing/verification (secp256k1)
//! - Public key recovery
//! - Address derivation
//! - BIP39 mnemonics and BIP32 hierarchical derivation

#![warn(missing_docs)]
#![warn(clippy::all)]

mod hash;
mod hd;
mod signature;
mod error;

pub use hash::{keccak256, sha256};
pub use hd::{derive_path, generate_mnemonic, mnemonic_to_seed, DerivationPath, ExtendedKey};
pub use signature::{
    sign, verify, recover_public_key, recover_address, public_key_to_address,
    private_key_to_address, parse_private_key, Signature, PublicKey, PrivateKey,
};
pub use error::CryptoError;
