//! Offline walkthrough of the SDK against a mock node
//!
//! Run with: cargo run --example mock_walkthrough

use std::sync::Arc;

use anyhow::Result;
use cypher_sdk::abi::Token;
use cypher_sdk::transaction_builder::BuildOptions;
use cypher_sdk::{contract, CypherWeb, MockTransport, Wallet, U256};
use serde_json::json;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    let node = Arc::new(MockTransport::new());
    node.set_response("wallet/broadcasthex", json!({"result": true}));
    node.set_response(
        "wallet/triggerconstantcontract",
        json!({"result": {"result": true}, "constant_result": [format!("{:064x}", 1_000_000u64)]}),
    );
    let client = CypherWeb::with_transport(node.clone());

    let (wallet, phrase) = Wallet::generate(12)?;
    println!("Mnemonic: {}", phrase);
    println!("Address:  {} ({})", wallet.address(), wallet.address().to_hex());

    let (_, key_phrase) = Wallet::generate(12)?;
    let signer = Wallet::from_mnemonic(&key_phrase, None)?;
    client.set_address(&signer.address().to_hex())?;

    let block = client.get_current_block().await?;
    println!("Current block: {}", block["block_header"]["raw_data"]["number"]);

    let tx = client
        .transaction_builder()
        .send_cyp(&wallet.address().to_hex(), 1_000_000, None, &BuildOptions::default())
        .await?;
    println!("Unsigned txid: {}", tx.txid().to_hex());

    let token = client.contract(contract::trc20("1c742d35cc6634c0532925a3b844bc9e7595f0ab3d")?)?;
    let balance = token.call("balanceOf", &[Token::Address(*wallet.address())], None).await?;
    println!("Token balance: {:?}", balance.first().and_then(Token::as_uint).unwrap_or(U256::zero()));

    println!("Requests sent: {}", node.call_count());
    Ok(())
}
