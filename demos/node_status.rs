//! Connectivity and latest block of a live node
//!
//! Run with: cargo run --example node_status -- http://127.0.0.1:8090

use anyhow::{Context, Result};
use cypher_sdk::{CypherConfig, CypherWeb};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    let config = match std::env::args().nth(1) {
        Some(path) if path.ends_with(".toml") => CypherConfig::load(&path)?,
        Some(host) => CypherConfig::with_full_host(host),
        None => CypherConfig::with_full_host("http://127.0.0.1:8090"),
    };
    let client = CypherWeb::from_config(&config).context("building client")?;

    let connection = client.is_connected().await;
    tracing::info!(?connection, providers = ?client.current_providers(), "connectivity");

    let block = client.get_ref_block().await.context("fetching latest block")?;
    println!("Block {} ({})", block.number, block.id.to_hex());
    Ok(())
}
