//! Signing and verification tests for cypher-sdk
//!
//! Tests transaction signing, multi-signature, message signing and
//! broadcast of signed transactions.

use std::sync::Arc;

use cypher_crypto::{recover_address, sha256};
use cypher_sdk::message::{hash_message, sign_message, verify_message};
use cypher_sdk::proto::{Message, TransferContract};
use cypher_sdk::transaction_builder::BuildOptions;
use cypher_sdk::types::RefBlock;
use cypher_sdk::{address, CypherWeb, MockTransport, SdkError, Transaction, TxBuilder, Wallet, H256};
use proptest::prelude::*;
use serde_json::json;

const KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
const SECOND_KEY: &str = "59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";

fn block() -> RefBlock {
    RefBlock { number: 1000, id: H256::from_bytes([0x0a; 32]), timestamp: 0 }
}

fn unsigned(owner: &Wallet) -> Transaction {
    let op = TransferContract {
        owner_address: owner.address().as_bytes().to_vec(),
        to_address: owner.address().as_bytes().to_vec(),
        amount: 1_000_000,
    };
    TxBuilder::new(op).ref_block(&block()).timestamp(1_000).build().unwrap()
}

// ==================== Transaction Signing Tests ====================

#[test]
fn test_txid_is_sha256_of_raw_data() {
    let wallet = Wallet::new_random();
    let tx = unsigned(&wallet);
    assert_eq!(tx.txid(), sha256(&tx.raw().encode_to_vec()));
    assert_eq!(tx.raw_data_hex(), hex::encode(tx.raw_data_bytes()));
}

#[test]
fn test_sign_transaction_recovers_signer() {
    let wallet = Wallet::new_random();
    let mut tx = unsigned(&wallet);
    assert!(!tx.is_signed());

    wallet.sign_transaction(&mut tx).unwrap();
    assert!(tx.is_signed());
    assert!(tx.is_signed_by(wallet.address()));

    let signature = tx.signatures()[0].clone();
    assert!(signature.v == 27 || signature.v == 28);
    assert_eq!(&recover_address(&tx.txid(), &signature).unwrap(), wallet.address());
}

#[test]
fn test_signing_twice_is_rejected() {
    let wallet = Wallet::new_random();
    let mut tx = unsigned(&wallet);
    wallet.sign_transaction(&mut tx).unwrap();
    let err = wallet.sign_transaction(&mut tx).unwrap_err();
    assert!(matches!(err, SdkError::Validation(ref m) if m == "Transaction was already signed"));
    assert_eq!(tx.signatures().len(), 1);
}

#[test]
fn test_signing_does_not_change_txid() {
    let wallet = Wallet::new_random();
    let mut tx = unsigned(&wallet);
    let before = tx.txid();
    wallet.sign_transaction(&mut tx).unwrap();
    assert_eq!(tx.txid(), before);
}

#[test]
fn test_signatures_are_low_s() {
    let wallet = Wallet::new_random();
    for i in 0..50u8 {
        let signature = wallet.sign_hash(&H256::from_bytes([i; 32])).unwrap();
        assert!(signature.is_low_s(), "high-s signature for input {}", i);
    }
}

#[test]
fn test_signed_transaction_survives_encoding() {
    let wallet = Wallet::new_random();
    let mut tx = unsigned(&wallet);
    wallet.sign_transaction(&mut tx).unwrap();

    let decoded = Transaction::from_bytes(&tx.to_bytes()).unwrap();
    assert_eq!(decoded.txid(), tx.txid());
    assert_eq!(decoded.signers().unwrap(), vec![*wallet.address()]);
}

// ==================== Client Signing Tests ====================

#[test]
fn test_client_sign_requires_key() {
    let client = CypherWeb::new_mock();
    let wallet = Wallet::new_random();
    let mut tx = unsigned(&wallet);
    assert!(matches!(client.sign(&mut tx, None), Err(SdkError::MissingKey)));

    client.sign(&mut tx, Some(KEY)).unwrap();
    assert_eq!(client.recover_signers(&tx).unwrap().len(), 1);
}

#[test]
fn test_multi_sign_collects_signers() {
    let client = CypherWeb::new_mock();
    let owner = Wallet::from_private_key_hex(KEY).unwrap();
    let op = TransferContract {
        owner_address: owner.address().as_bytes().to_vec(),
        to_address: owner.address().as_bytes().to_vec(),
        amount: 1,
    };
    let mut tx = TxBuilder::new(op).ref_block(&block()).permission_id(2).build().unwrap();

    client.multi_sign(&mut tx, Some(KEY), 2).unwrap();
    client.multi_sign(&mut tx, Some(SECOND_KEY), 2).unwrap();

    let second = Wallet::from_private_key_hex(SECOND_KEY).unwrap();
    assert_eq!(client.recover_signers(&tx).unwrap(), vec![*owner.address(), *second.address()]);
}

#[test]
fn test_multi_sign_checks_permission() {
    let client = CypherWeb::new_mock();
    let wallet = Wallet::from_private_key_hex(KEY).unwrap();
    let mut tx = unsigned(&wallet);
    let err = client.multi_sign(&mut tx, Some(KEY), 2).unwrap_err();
    assert!(matches!(err, SdkError::Validation(_)));
    assert!(!tx.is_signed());
}

// ==================== Broadcast Tests ====================

#[tokio::test]
async fn test_send_transaction_broadcasts_hex() {
    let transport = Arc::new(MockTransport::new());
    transport.set_response("wallet/broadcasthex", json!({"result": true}));
    let client = CypherWeb::with_transport(transport.clone());
    client.set_private_key(KEY).unwrap();

    let tx = client
        .transaction_builder()
        .send_cyp("1c1234567890123456789012345678901234567890", 5, None, &BuildOptions::default())
        .await
        .unwrap();
    let txid = tx.txid().to_hex();
    let signed_bytes = {
        let mut signed = tx.clone();
        client.sign(&mut signed, None).unwrap();
        signed.to_bytes()
    };

    let result = client.send_transaction(tx, None).await.unwrap();
    assert!(result.result);
    assert_eq!(result.txid, txid);

    let request = transport.last_request().unwrap();
    assert_eq!(request.path, "wallet/broadcasthex");
    assert_eq!(request.body.unwrap()["transaction"], hex::encode(signed_bytes));
}

#[tokio::test]
async fn test_unsigned_transactions_are_not_broadcast() {
    let transport = Arc::new(MockTransport::new());
    let client = CypherWeb::with_transport(transport.clone());
    let tx = unsigned(&Wallet::new_random());

    let err = client.send_raw_transaction(&tx).await.unwrap_err();
    assert!(matches!(err, SdkError::Validation(_)));
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn test_rejected_broadcast() {
    let transport = Arc::new(MockTransport::new());
    transport.set_response("wallet/broadcasthex", json!({"result": false, "code": "SIGERROR"}));
    let client = CypherWeb::with_transport(transport);

    let mut tx = unsigned(&Wallet::new_random());
    client.sign(&mut tx, Some(KEY)).unwrap();
    let err = client.send_raw_transaction(&tx).await.unwrap_err();
    assert!(matches!(err, SdkError::Remote(ref body) if body["code"] == "SIGERROR"));
}

// ==================== Message Signing Tests ====================

#[test]
fn test_sign_and_verify_message() {
    let signature = sign_message(b"Hello, Cypher!", KEY).unwrap();
    assert_eq!(verify_message(b"Hello, Cypher!", &signature).unwrap(), address::from_private_key(KEY).unwrap());
}

#[test]
fn test_client_message_signing_uses_default_key() {
    let client = CypherWeb::new_mock();
    assert!(matches!(client.sign_message(b"hi", None), Err(SdkError::MissingKey)));

    client.set_private_key(KEY).unwrap();
    let signature = client.sign_message(b"hi", None).unwrap();
    assert_eq!(signature, sign_message(b"hi", KEY).unwrap());
    assert_eq!(
        client.verify_message(b"hi", &signature).unwrap(),
        client.default_address().unwrap().to_base58()
    );
}

#[test]
fn test_verify_rejects_malformed_signature() {
    assert!(verify_message(b"hi", "0x1234").is_err());
    assert!(verify_message(b"hi", "not hex").is_err());
}

#[test]
fn test_message_hash_differs_from_plain_hash() {
    assert_ne!(hash_message(b"hi"), cypher_crypto::keccak256(b"hi"));
}

proptest! {
    #[test]
    fn prop_message_signer_round_trips(message in proptest::collection::vec(any::<u8>(), 0..256)) {
        let signature = sign_message(&message, KEY).unwrap();
        prop_assert_eq!(verify_message(&message, &signature).unwrap(), address::from_private_key(KEY).unwrap());
    }
}
