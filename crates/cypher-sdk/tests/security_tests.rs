//! Hostile input tests for cypher-sdk
//!
//! Parsers and decoders must reject malformed input with an error instead of
//! panicking, and signatures must not be malleable.

use cypher_sdk::abi::{decode, decode_params_json, decode_revert, parse_type, ParamType};
use cypher_sdk::{address, utils, Address, CypherWeb, Transaction, Wallet, H256};
use proptest::prelude::*;
use serde_json::json;

proptest! {
    #[test]
    fn prop_address_parse_never_panics(input in ".{0,64}") {
        let _ = Address::parse(&input);
        let _ = address::to_hex(&input);
        let _ = address::from_hex(&input);
    }

    #[test]
    fn prop_decode58_never_panics(input in "[1-9A-HJ-NP-Za-km-z]{0,48}") {
        let _ = utils::decode58(&input);
    }

    #[test]
    fn prop_transaction_decode_never_panics(bytes in proptest::collection::vec(any::<u8>(), 0..512)) {
        let _ = Transaction::from_bytes(&bytes);
    }

    #[test]
    fn prop_abi_decode_never_panics(bytes in proptest::collection::vec(any::<u8>(), 0..256)) {
        let _ = decode(&[ParamType::String, ParamType::Array(Box::new(ParamType::Uint(256)))], &bytes);
        let _ = decode_revert(&[], &bytes);
    }

    #[test]
    fn prop_abi_json_decode_never_panics(output in ".{0,160}", ignore_method_hash in any::<bool>()) {
        let _ = decode_params_json(&[], &["uint256"], &output, ignore_method_hash);
        let _ = decode_params_json(&["a", "b"], &["string", "bytes32"], &output, ignore_method_hash);
    }

    #[test]
    fn prop_fixed_array_sizes_never_panic(size in any::<u64>(), bytes in proptest::collection::vec(any::<u8>(), 0..128)) {
        for tag in [format!("uint256[{}]", size), format!("(bool,address)[{}]", size), format!("bytes[{}]", size)] {
            if let Ok(t) = parse_type(&tag) {
                let _ = decode(&[t], &bytes);
            }
        }
    }

    #[test]
    fn prop_utf8_helpers_never_panic(input in ".{0,64}") {
        let _ = utils::to_utf8(&input, true);
        let _ = utils::to_big_number(&input);
        let _ = utils::to_sun(&input);
    }
}

#[test]
fn test_oversized_abi_offsets_are_rejected() {
    let mut data = vec![0u8; 64];
    data[..32].copy_from_slice(&[0xff; 32]);
    assert!(decode(&[ParamType::Bytes], &data).is_err());

    let mut data = vec![0u8; 64];
    data[31] = 0x20;
    data[32..].copy_from_slice(&[0xff; 32]);
    assert!(decode(&[ParamType::Bytes], &data).is_err());
}

#[test]
fn test_wrong_prefix_addresses_are_rejected() {
    let foreign = format!("41{}", "ab".repeat(20));
    assert!(Address::from_hex(&foreign).is_err());
    assert!(!address::is_address(&foreign));
    assert!(!address::is_address(&format!("{}00", Address::from_account_id([1; 20]).to_hex())));
}

#[test]
fn test_high_s_signature_does_not_verify() {
    let wallet = Wallet::new_random();
    let hash = H256::from_bytes([0x11; 32]);
    let mut signature = wallet.sign_hash(&hash).unwrap();
    assert!(cypher_crypto::verify(&hash, &signature, wallet.public_key()).unwrap());

    // s' = n - s
    const N: [u8; 32] = [
        0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xfe,
        0xba, 0xae, 0xdc, 0xe6, 0xaf, 0x48, 0xa0, 0x3b, 0xbf, 0xd2, 0x5e, 0x8c, 0xd0, 0x36, 0x41, 0x41,
    ];
    let mut borrow = 0i16;
    for i in (0..32).rev() {
        let diff = N[i] as i16 - signature.s[i] as i16 - borrow;
        signature.s[i] = diff.rem_euclid(256) as u8;
        borrow = if diff < 0 { 1 } else { 0 };
    }
    assert!(!signature.is_low_s());
    assert!(!cypher_crypto::verify(&hash, &signature, wallet.public_key()).unwrap());
}

#[tokio::test]
async fn test_event_options_of_wrong_type_send_nothing() {
    let events = std::sync::Arc::new(cypher_sdk::MockTransport::new());
    let client = CypherWeb::builder()
        .full_node(cypher_sdk::MockTransport::new())
        .event_server(events.clone())
        .build()
        .unwrap();

    let contract = Address::from_account_id([7; 20]).to_hex();
    for options in [json!({"size": "1; DROP"}), json!({"page": [1]}), json!({"since": {"$gt": 0}})] {
        assert!(client.get_events_by_contract_address_json(&contract, &options).await.is_err());
    }
    assert_eq!(events.call_count(), 0);
}
