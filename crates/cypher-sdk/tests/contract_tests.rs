//! Contract interaction tests for cypher-sdk
//!
//! Tests read-only calls, signed contract calls and deployment against a
//! recording mock node.

use std::sync::Arc;

use cypher_sdk::abi::{AbiEntry, AbiParam, Token};
use cypher_sdk::contract::{self, Contract};
use cypher_sdk::proto::ContractOperation;
use cypher_sdk::transaction_builder::{DeployOptions, TriggerOptions};
use cypher_sdk::{Address, CypherWeb, MockTransport, SdkError, DEFAULT_FEE_LIMIT, U256};
use serde_json::json;

const KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
const TOKEN: &str = "1c742d35cc6634c0532925a3b844bc9e7595f0ab3d";
const HOLDER: &str = "1c1234567890123456789012345678901234567890";

fn holder() -> Token {
    Token::Address(Address::from_hex(HOLDER).unwrap())
}

fn setup() -> (CypherWeb, Arc<MockTransport>) {
    let transport = Arc::new(MockTransport::new());
    transport.set_response("wallet/broadcasthex", json!({"result": true}));
    let client = CypherWeb::with_transport(transport.clone());
    client.set_private_key(KEY).unwrap();
    (client, transport)
}

// ==================== Read-only Calls ====================

#[tokio::test]
async fn test_balance_of() {
    let (client, transport) = setup();
    transport.set_response(
        "wallet/triggerconstantcontract",
        json!({"result": {"result": true}, "constant_result": [format!("{:064x}", 42)]}),
    );

    let token = client.contract(contract::trc20(TOKEN).unwrap()).unwrap();
    let balance = token.call("balanceOf", &[holder()], None).await.unwrap();
    assert_eq!(balance, vec![Token::Uint(U256::from(42))]);

    let body = transport.last_request().unwrap().body.unwrap();
    assert_eq!(body["contract_address"], TOKEN);
    assert_eq!(body["owner_address"], client.default_address().unwrap().to_hex());
    assert_eq!(body["visible"], false);
}

#[tokio::test]
async fn test_failed_constant_call() {
    let (client, transport) = setup();
    transport.set_response(
        "wallet/triggerconstantcontract",
        json!({"result": {"code": "CONTRACT_VALIDATE_ERROR", "message": "636f6e7472616374"}}),
    );

    let token = client.contract(contract::trc20(TOKEN).unwrap()).unwrap();
    let err = token.call("totalSupply", &[], None).await.unwrap_err();
    assert!(matches!(err, SdkError::Remote(_)));
}

#[tokio::test]
async fn test_unknown_function() {
    let (client, transport) = setup();
    let token = client.contract(contract::trc20(TOKEN).unwrap()).unwrap();
    assert!(token.call("mint", &[], None).await.is_err());
    assert_eq!(transport.call_count(), 0);
}

// ==================== Signed Calls ====================

#[tokio::test]
async fn test_transfer_is_signed_and_broadcast() {
    let (client, transport) = setup();
    let token = client.contract(contract::trc20(TOKEN).unwrap()).unwrap();

    let result = token
        .send("transfer", &[holder(), Token::Uint(U256::from(1000))], &TriggerOptions::default(), None)
        .await
        .unwrap();
    assert!(result.result);
    assert_eq!(result.txid.len(), 64);

    let request = transport.last_request().unwrap();
    assert_eq!(request.path, "wallet/broadcasthex");
    let bytes = hex::decode(request.body.unwrap()["transaction"].as_str().unwrap()).unwrap();
    let tx = cypher_sdk::Transaction::from_bytes(&bytes).unwrap();
    assert_eq!(tx.txid().to_hex(), result.txid);
    assert_eq!(tx.raw().fee_limit, DEFAULT_FEE_LIMIT);
    assert_eq!(tx.signers().unwrap(), vec![client.default_address().unwrap()]);

    match &tx.operations().unwrap()[0] {
        ContractOperation::TriggerSmartContract(call) => {
            assert_eq!(&call.data[..4], &[0xa9, 0x05, 0x9c, 0xbb]);
            assert_eq!(call.contract_address, Address::from_hex(TOKEN).unwrap().as_bytes().to_vec());
        }
        other => panic!("unexpected operation {:?}", other),
    }
}

#[tokio::test]
async fn test_call_value_requires_payable() {
    let (client, transport) = setup();
    let token = client.contract(contract::trc20(TOKEN).unwrap()).unwrap();
    let options = TriggerOptions { call_value: 10, ..Default::default() };

    let err = token
        .send("transfer", &[holder(), Token::Uint(U256::from(1))], &options, None)
        .await
        .unwrap_err();
    assert!(matches!(err, SdkError::Validation(_)));
    assert_eq!(transport.call_count(), 0);
}

#[tokio::test]
async fn test_fee_limit_bounds() {
    let (client, _) = setup();
    let builder = client.transaction_builder();
    for fee_limit in [0, -1, 1_000_000_001] {
        let options = TriggerOptions { fee_limit: Some(fee_limit), ..Default::default() };
        let result = builder
            .trigger_smart_contract(TOKEN, "transfer(address,uint256)", &[holder(), Token::Uint(U256::from(1))], &options, None)
            .await;
        assert!(result.is_err(), "fee limit {} accepted", fee_limit);
    }

    let options = TriggerOptions { fee_limit: Some(1_000_000_000), ..Default::default() };
    let tx = builder
        .trigger_smart_contract(TOKEN, "transfer(address,uint256)", &[holder(), Token::Uint(U256::from(1))], &options, None)
        .await
        .unwrap();
    assert_eq!(tx.raw().fee_limit, 1_000_000_000);
}

// ==================== Deployment ====================

#[tokio::test]
async fn test_deploy_appends_constructor_arguments() {
    let (client, _) = setup();
    let constructor = AbiEntry {
        kind: Some("constructor".into()),
        ..AbiEntry::function("", vec![AbiParam::new("supply", "uint256")], vec![], "nonpayable")
    };
    let abi = vec![constructor];
    let deploy = DeployOptions {
        abi: abi.clone(),
        bytecode: "0x6080".into(),
        parameters: vec![Token::Uint(U256::from(7))],
        name: "Token".into(),
        ..Default::default()
    };

    let tx = client.transaction_builder().create_smart_contract(&deploy, None).await.unwrap();
    assert_eq!(tx.raw().fee_limit, DEFAULT_FEE_LIMIT);
    match &tx.operations().unwrap()[0] {
        ContractOperation::CreateSmartContract(create) => {
            let contract = create.new_contract.as_ref().unwrap();
            assert_eq!(contract.bytecode.len(), 2 + 32);
            assert_eq!(contract.bytecode[33], 7);
            assert_eq!(contract.consume_user_resource_percent, 100);
            assert_eq!(contract.origin_energy_limit, 10_000_000);
            assert_eq!(contract.name, "Token");
        }
        other => panic!("unexpected operation {:?}", other),
    }

    let deployed = Contract::new(abi).at(TOKEN).unwrap();
    assert!(client.contract(deployed).is_ok());
}

#[tokio::test]
async fn test_deploy_validation() {
    let (client, _) = setup();
    let builder = client.transaction_builder();

    let bad_code = DeployOptions { bytecode: "zz".into(), ..Default::default() };
    assert!(builder.create_smart_contract(&bad_code, None).await.is_err());

    let bad_share = DeployOptions { bytecode: "00".into(), user_fee_percentage: 101, ..Default::default() };
    assert!(builder.create_smart_contract(&bad_share, None).await.is_err());

    let no_constructor = DeployOptions {
        bytecode: "00".into(),
        parameters: vec![Token::Bool(true)],
        ..Default::default()
    };
    assert!(builder.create_smart_contract(&no_constructor, None).await.is_err());
}
