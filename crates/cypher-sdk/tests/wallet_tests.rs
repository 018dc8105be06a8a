//! Wallet and account tests for cypher-sdk
//!
//! Tests key generation, import, mnemonic derivation and address forms.

use cypher_crypto::{public_key_to_address, recover_address, verify};
use cypher_sdk::{address, Address, CypherWeb, SdkError, Wallet, BIP44_PATH_INDEX_0, H256};

const KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
const KEY_HEX_ADDRESS: &str = "1cf39fd6e51aad88f6f4ce6ab8827279cfffb92266";
const PHRASE: &str =
    "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

// ==================== Key Generation Tests ====================

#[test]
fn test_wallet_new_random() {
    let wallet = Wallet::new_random();
    assert_eq!(wallet.address().as_bytes()[0], 0x1c);
    assert_eq!(wallet.address().to_base58().len(), 34);
}

#[test]
fn test_wallet_random_multiple_unique() {
    let wallets: Vec<_> = (0..10).map(|_| Wallet::new_random()).collect();
    for i in 0..wallets.len() {
        for j in (i + 1)..wallets.len() {
            assert_ne!(wallets[i].address(), wallets[j].address());
        }
    }
}

// ==================== Key Import Tests ====================

#[test]
fn test_wallet_from_hex_with_and_without_prefix() {
    let plain = Wallet::from_private_key_hex(KEY).unwrap();
    let prefixed = Wallet::from_private_key_hex(&format!("0x{}", KEY)).unwrap();
    assert_eq!(plain.address().to_hex(), KEY_HEX_ADDRESS);
    assert_eq!(plain.address(), prefixed.address());
}

#[test]
fn test_wallet_from_private_key_bytes() {
    let mut key = [0u8; 32];
    key.copy_from_slice(&hex::decode(KEY).unwrap());
    let wallet = Wallet::from_private_key(&key).unwrap();
    assert_eq!(wallet.address().to_hex(), KEY_HEX_ADDRESS);
}

#[test]
fn test_wallet_rejects_bad_keys() {
    assert!(matches!(Wallet::from_private_key_hex("not hex"), Err(SdkError::InvalidKey(_))));
    assert!(matches!(Wallet::from_private_key_hex("abcd"), Err(SdkError::InvalidKey(_))));
    assert!(matches!(Wallet::from_private_key(&[0u8; 32]), Err(SdkError::InvalidKey(_))));
    assert!(matches!(Wallet::from_private_key(&[0xff; 32]), Err(SdkError::InvalidKey(_))));
}

#[test]
fn test_public_key_matches_address() {
    let wallet = Wallet::new_random();
    assert_eq!(&public_key_to_address(wallet.public_key()), wallet.address());
}

// ==================== Mnemonic Tests ====================

#[test]
fn test_mnemonic_default_path_is_first_account() {
    let default = Wallet::from_mnemonic(PHRASE, None).unwrap();
    let explicit = Wallet::from_mnemonic(PHRASE, Some(BIP44_PATH_INDEX_0)).unwrap();
    let indexed = Wallet::from_mnemonic_index(PHRASE, 0).unwrap();
    assert_eq!(default.address(), explicit.address());
    assert_eq!(default.address(), indexed.address());
}

#[test]
fn test_mnemonic_accounts_differ_by_index() {
    let first = Wallet::from_mnemonic_index(PHRASE, 0).unwrap();
    let second = Wallet::from_mnemonic_index(PHRASE, 1).unwrap();
    assert_ne!(first.address(), second.address());
    assert_eq!(
        second.address(),
        Wallet::from_mnemonic(PHRASE, Some("m/44'/195'/0'/0/1")).unwrap().address()
    );
}

#[test]
fn test_mnemonic_rejects_foreign_paths() {
    for path in ["m/44'/60'/0'/0/0", "44'/195'/0'/0/0", "m/49'/195'/0'/0/0", ""] {
        let err = Wallet::from_mnemonic(PHRASE, Some(path)).unwrap_err();
        assert!(
            matches!(err, SdkError::InvalidInput(ref m) if m == "Invalid cypher path provided"),
            "{} gave {:?}",
            path,
            err
        );
    }
}

#[test]
fn test_mnemonic_rejects_bad_phrase() {
    assert!(Wallet::from_mnemonic("abandon abandon abandon", None).is_err());
    assert!(Wallet::from_mnemonic(&PHRASE.replace("about", "abandon"), None).is_err());
}

#[test]
fn test_generate_round_trips_through_phrase() {
    let (wallet, phrase) = Wallet::generate(12).unwrap();
    assert_eq!(phrase.split_whitespace().count(), 12);
    assert_eq!(Wallet::from_mnemonic(&phrase, None).unwrap().address(), wallet.address());

    let (_, long) = Wallet::generate(24).unwrap();
    assert_eq!(long.split_whitespace().count(), 24);
    assert!(Wallet::generate(13).is_err());
}

// ==================== Signing Keys ====================

#[test]
fn test_sign_hash_recovers_wallet_address() {
    let wallet = Wallet::from_private_key_hex(KEY).unwrap();
    let hash = H256::from_bytes([0x42; 32]);
    let signature = wallet.sign_hash(&hash).unwrap();

    assert!(verify(&hash, &signature, wallet.public_key()).unwrap());
    assert_eq!(&recover_address(&hash, &signature).unwrap(), wallet.address());
}

// ==================== Address Helpers ====================

#[test]
fn test_address_helpers() {
    let base58 = address::from_private_key(KEY).unwrap();
    assert_eq!(base58.len(), 34);
    assert_eq!(address::to_hex(&base58).unwrap(), KEY_HEX_ADDRESS);
    assert_eq!(address::from_hex(KEY_HEX_ADDRESS).unwrap(), base58);
    assert!(address::is_address(&base58));
    assert!(address::is_address(KEY_HEX_ADDRESS));
    assert!(!address::is_address("41f39fd6e51aad88f6f4ce6ab8827279cfffb92266"));
    assert!(matches!(address::to_hex("nope"), Err(SdkError::InvalidAddress(_))));
}

// ==================== Client Keys ====================

#[test]
fn test_client_default_key_and_address() {
    let client = CypherWeb::new_mock();
    assert!(client.default_address().is_none());

    client.set_private_key(KEY).unwrap();
    assert_eq!(client.default_address().unwrap().to_hex(), KEY_HEX_ADDRESS);

    let other = Address::from_hex("1c1234567890123456789012345678901234567890").unwrap();
    client.set_address(&other.to_hex()).unwrap();
    assert_eq!(client.default_address(), Some(other));
    assert!(client.set_address("garbage").is_err());
}

#[test]
fn test_builder_private_key() {
    let client = CypherWeb::builder()
        .full_node(cypher_sdk::MockTransport::new())
        .private_key(KEY)
        .build()
        .unwrap();
    assert_eq!(client.default_address().unwrap().to_hex(), KEY_HEX_ADDRESS);

    let result = CypherWeb::builder()
        .full_node(cypher_sdk::MockTransport::new())
        .private_key("zz")
        .build();
    assert!(result.is_err());
}
