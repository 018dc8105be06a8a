//! CypherWeb - main client

use cypher_primitives::Address;
use cypher_types::{RefBlock, Transaction};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

use crate::plugin::PluginRegistry;
use crate::transport::{HttpMethod, MockTransport, Transport};
use crate::tx_builder::{parse_ref_block, DEFAULT_EXPIRATION_MS, DEFAULT_FEE_LIMIT};
use crate::{message, SdkError, Wallet};

#[cfg(feature = "http")]
use crate::config::CypherConfig;
#[cfg(feature = "http")]
use crate::transport::HttpProvider;

/// Client-wide defaults
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    /// Fee limit for smart contract operations
    pub fee_limit: i64,
    /// Transaction expiration window in milliseconds
    pub expiration_ms: i64,
    /// Refuse plugin registration
    pub disable_plugins: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fee_limit: DEFAULT_FEE_LIMIT,
            expiration_ms: DEFAULT_EXPIRATION_MS,
            disable_plugins: false,
        }
    }
}

#[derive(Clone)]
pub(crate) struct EventServer {
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) healthcheck: String,
}

pub(crate) struct Inner {
    full_node: Arc<dyn Transport>,
    solidity_node: Arc<dyn Transport>,
    pub(crate) event_server: RwLock<Option<EventServer>>,
    default_wallet: RwLock<Option<Arc<Wallet>>>,
    default_address: RwLock<Option<Address>>,
    settings: Settings,
    pub(crate) plugins: RwLock<PluginRegistry>,
}

/// Client for a full node, a solidity node and an optional event server
///
/// Cloning is cheap and every clone shares the same default account, event
/// server and plugin registry. Changing those while requests are in flight
/// from other tasks is not synchronised beyond each individual update.
#[derive(Clone)]
pub struct CypherWeb {
    pub(crate) inner: Arc<Inner>,
}

/// Reachability of each configured endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    /// Full node answered
    pub full_node: bool,
    /// Solidity node answered
    pub solidity_node: bool,
    /// Event server health check answered
    pub event_server: bool,
}

/// Hosts of the configured endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Providers {
    /// Full node host
    pub full_node: String,
    /// Solidity node host
    pub solidity_node: String,
    /// Event server host
    pub event_server: Option<String>,
}

/// Outcome of a successful broadcast
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastResult {
    /// Always true; rejected broadcasts are errors
    pub result: bool,
    /// Id of the broadcast transaction
    pub txid: String,
}

/// Builder for [`CypherWeb`]
#[derive(Default)]
pub struct ClientBuilder {
    full_node: Option<Arc<dyn Transport>>,
    solidity_node: Option<Arc<dyn Transport>>,
    event_server: Option<Arc<dyn Transport>>,
    private_key: Option<String>,
    settings: Settings,
}

impl ClientBuilder {
    /// Full node transport (required)
    pub fn full_node(mut self, transport: impl Transport + 'static) -> Self {
        self.full_node = Some(Arc::new(transport));
        self
    }

    /// Solidity node transport, defaults to the full node
    pub fn solidity_node(mut self, transport: impl Transport + 'static) -> Self {
        self.solidity_node = Some(Arc::new(transport));
        self
    }

    /// Event server transport
    pub fn event_server(mut self, transport: impl Transport + 'static) -> Self {
        self.event_server = Some(Arc::new(transport));
        self
    }

    /// Default private key (hex)
    pub fn private_key(mut self, key: impl Into<String>) -> Self {
        self.private_key = Some(key.into());
        self
    }

    /// Override client-wide defaults
    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Build the client
    pub fn build(self) -> Result<CypherWeb, SdkError> {
        let full_node = self
            .full_node
            .ok_or_else(|| SdkError::Config("a full node transport is required".into()))?;
        let solidity_node = self.solidity_node.unwrap_or_else(|| full_node.clone());

        let client = CypherWeb::from_parts(full_node, solidity_node, self.settings);
        if let Some(transport) = self.event_server {
            client.set_event_transport(Some(transport), None);
        }
        if let Some(key) = self.private_key {
            client.set_private_key(&key)?;
        }
        Ok(client)
    }
}

impl CypherWeb {
    fn from_parts(
        full_node: Arc<dyn Transport>,
        solidity_node: Arc<dyn Transport>,
        settings: Settings,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                full_node,
                solidity_node,
                event_server: RwLock::new(None),
                default_wallet: RwLock::new(None),
                default_address: RwLock::new(None),
                settings,
                plugins: RwLock::new(PluginRegistry::default()),
            }),
        }
    }

    /// Start building a client
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Create a client using one transport for the full and solidity nodes
    pub fn with_transport(transport: impl Transport + 'static) -> Self {
        let transport: Arc<dyn Transport> = Arc::new(transport);
        Self::from_parts(transport.clone(), transport, Settings::default())
    }

    /// Create a new client with mock transport (for testing)
    pub fn new_mock() -> Self {
        Self::with_transport(MockTransport::new())
    }

    /// Create a client with HTTP providers from configuration
    #[cfg(feature = "http")]
    pub fn from_config(config: &CypherConfig) -> Result<Self, SdkError> {
        config.validate()?;
        let full_url = config
            .full_node_url()
            .ok_or_else(|| SdkError::Config("a full node or full host is required".into()))?;
        let full_node = HttpProvider::with_options(full_url, &config.headers, config.timeout_secs)?;

        let mut builder = Self::builder().full_node(full_node).settings(Settings {
            fee_limit: config.fee_limit,
            expiration_ms: config.expiration_ms,
            disable_plugins: config.disable_plugins,
        });
        if let Some(url) = config.solidity_node_url() {
            builder = builder.solidity_node(HttpProvider::with_options(
                url,
                &config.headers,
                config.timeout_secs,
            )?);
        }
        if let Some(url) = config.event_server_url() {
            let headers = if config.event_headers.is_empty() { &config.headers } else { &config.event_headers };
            builder = builder.event_server(HttpProvider::with_options(url, headers, config.timeout_secs)?);
        }
        if let Some(key) = &config.private_key {
            builder = builder.private_key(key.clone());
        }
        builder.build()
    }

    /// Library version, used for plugin compatibility checks
    pub fn version() -> &'static str {
        crate::VERSION
    }

    /// Full node transport
    pub fn full_node(&self) -> &Arc<dyn Transport> {
        &self.inner.full_node
    }

    /// Solidity node transport
    pub fn solidity_node(&self) -> &Arc<dyn Transport> {
        &self.inner.solidity_node
    }

    /// Client-wide defaults
    pub fn settings(&self) -> Settings {
        self.inner.settings
    }

    // ==================== Default Account ====================

    /// Set the default signing key; the default address follows it
    pub fn set_private_key(&self, key: &str) -> Result<(), SdkError> {
        let wallet = Wallet::from_private_key_hex(key)?;
        let address = *wallet.address();
        *self.inner.default_wallet.write() = Some(Arc::new(wallet));
        *self.inner.default_address.write() = Some(address);
        Ok(())
    }

    /// Set the default address
    ///
    /// A default key owning a different address is dropped.
    pub fn set_address(&self, address: &str) -> Result<(), SdkError> {
        let address = Address::parse(address)
            .map_err(|_| SdkError::InvalidAddress("Invalid address provided".into()))?;
        let mut wallet = self.inner.default_wallet.write();
        if wallet.as_ref().map_or(false, |w| *w.address() != address) {
            *wallet = None;
        }
        *self.inner.default_address.write() = Some(address);
        Ok(())
    }

    /// Default address, if any
    pub fn default_address(&self) -> Option<Address> {
        *self.inner.default_address.read()
    }

    /// Wallet for an explicit hex key, else the default key
    pub(crate) fn signer(&self, key: Option<&str>) -> Result<Arc<Wallet>, SdkError> {
        match key {
            Some(key) => Ok(Arc::new(Wallet::from_private_key_hex(key)?)),
            None => self.inner.default_wallet.read().clone().ok_or(SdkError::MissingKey),
        }
    }

    /// Address argument, else the default address
    pub(crate) fn owner_or_default(&self, address: Option<&str>, message: &str) -> Result<Address, SdkError> {
        match address {
            Some(address) => crate::address::parse_arg(address, message),
            None => self.default_address().ok_or_else(|| SdkError::invalid_input(message)),
        }
    }

    // ==================== Connectivity ====================

    /// Check which endpoints respond; failures read as `false`
    pub async fn is_connected(&self) -> Connection {
        let full_node = self
            .inner
            .full_node
            .request("wallet/getnowblock", None, HttpMethod::Post)
            .await
            .is_ok();
        let solidity_node = self
            .inner
            .solidity_node
            .request("walletsolidity/getnowblock", None, HttpMethod::Post)
            .await
            .is_ok();
        let event_server = self.event_server_connected().await;
        Connection { full_node, solidity_node, event_server }
    }

    /// Hosts of the configured endpoints
    pub fn current_providers(&self) -> Providers {
        Providers {
            full_node: self.inner.full_node.host().to_string(),
            solidity_node: self.inner.solidity_node.host().to_string(),
            event_server: self
                .inner
                .event_server
                .read()
                .as_ref()
                .map(|s| s.transport.host().to_string()),
        }
    }

    // ==================== Chain Queries ====================

    async fn post(&self, path: &str, body: Value) -> Result<Value, SdkError> {
        debug!(path, "full node request");
        self.inner.full_node.request(path, Some(body), HttpMethod::Post).await
    }

    /// Latest block from the full node
    pub async fn get_current_block(&self) -> Result<Value, SdkError> {
        if let Some(result) = self.run_override("cyp", "getCurrentBlock", vec![]).await {
            return result;
        }
        self.post("wallet/getnowblock", json!({})).await
    }

    /// Latest confirmed block from the solidity node
    pub async fn get_confirmed_current_block(&self) -> Result<Value, SdkError> {
        if let Some(result) = self.run_override("cyp", "getConfirmedCurrentBlock", vec![]).await {
            return result;
        }
        self.inner
            .solidity_node
            .request("walletsolidity/getnowblock", Some(json!({})), HttpMethod::Post)
            .await
    }

    /// Block at a height
    pub async fn get_block_by_number(&self, number: i64) -> Result<Value, SdkError> {
        if let Some(result) = self.run_override("cyp", "getBlockByNumber", vec![json!(number)]).await {
            return result;
        }
        if number < 0 {
            return Err(SdkError::invalid_input("Invalid block number provided"));
        }
        let block = self.post("wallet/getblockbynum", json!({ "num": number })).await?;
        if is_empty_object(&block) {
            return Err(SdkError::Remote(json!("Block not found")));
        }
        Ok(block)
    }

    /// Reference block for new transactions
    pub async fn get_ref_block(&self) -> Result<RefBlock, SdkError> {
        parse_ref_block(&self.get_current_block().await?)
    }

    /// Account record; unknown accounts yield an empty object
    pub async fn get_account(&self, address: &str) -> Result<Value, SdkError> {
        if let Some(result) = self.run_override("cyp", "getAccount", vec![json!(address)]).await {
            return result;
        }
        let address = crate::address::parse_arg(address, "Invalid address provided")?;
        self.post("wallet/getaccount", json!({ "address": address.to_hex() })).await
    }

    /// Balance in sun
    pub async fn get_balance(&self, address: &str) -> Result<i64, SdkError> {
        if let Some(result) = self.run_override("cyp", "getBalance", vec![json!(address)]).await {
            return crate::transport::deserialize_response(result?);
        }
        let account = self.get_account(address).await?;
        Ok(account.get("balance").and_then(Value::as_i64).unwrap_or(0))
    }

    /// Transaction by id
    pub async fn get_transaction(&self, txid: &str) -> Result<Value, SdkError> {
        if let Some(result) = self.run_override("cyp", "getTransaction", vec![json!(txid)]).await {
            return result;
        }
        validate_txid(txid)?;
        let tx = self.post("wallet/gettransactionbyid", json!({ "value": txid })).await?;
        if is_empty_object(&tx) {
            return Err(SdkError::Remote(json!("Transaction not found")));
        }
        Ok(tx)
    }

    /// Execution receipt of a transaction
    pub async fn get_transaction_info(&self, txid: &str) -> Result<Value, SdkError> {
        if let Some(result) = self.run_override("cyp", "getTransactionInfo", vec![json!(txid)]).await {
            return result;
        }
        validate_txid(txid)?;
        self.post("wallet/gettransactioninfobyid", json!({ "value": txid })).await
    }

    // ==================== Signing & Broadcast ====================

    /// Append a signature with `key`, or the default key
    pub fn sign(&self, tx: &mut Transaction, key: Option<&str>) -> Result<(), SdkError> {
        self.signer(key)?.sign_transaction(tx)
    }

    /// Sign under an account permission
    ///
    /// The permission must match the one the transaction was built for.
    pub fn multi_sign(
        &self,
        tx: &mut Transaction,
        key: Option<&str>,
        permission_id: i32,
    ) -> Result<(), SdkError> {
        let declared = tx.raw().contract.first().map(|c| c.permission_id).unwrap_or(0);
        if declared != permission_id {
            return Err(SdkError::validation(format!(
                "Permission id {} does not match the transaction's permission id {}",
                permission_id, declared
            )));
        }
        self.sign(tx, key)
    }

    /// Addresses that signed `tx`
    pub fn recover_signers(&self, tx: &Transaction) -> Result<Vec<Address>, SdkError> {
        Ok(tx.signers()?)
    }

    /// Sign a text message with `key`, or the default key
    pub fn sign_message(&self, message: &[u8], key: Option<&str>) -> Result<String, SdkError> {
        let wallet = self.signer(key)?;
        let signature = wallet.sign_hash(&message::hash_message(message))?;
        Ok(format!("0x{}", signature.to_hex()))
    }

    /// Base58 address that signed a message
    pub fn verify_message(&self, message: &[u8], signature: &str) -> Result<String, SdkError> {
        message::verify_message(message, signature)
    }

    /// Broadcast a signed transaction
    pub async fn send_raw_transaction(&self, tx: &Transaction) -> Result<BroadcastResult, SdkError> {
        let args = vec![serde_json::to_value(tx.to_json())?];
        if let Some(result) = self.run_override("cyp", "sendRawTransaction", args).await {
            return crate::transport::deserialize_response(result?);
        }
        if !tx.is_signed() {
            return Err(SdkError::validation("Transaction is not signed"));
        }
        let txid = tx.txid().to_hex();
        let response = self
            .post("wallet/broadcasthex", json!({ "transaction": hex::encode(tx.to_bytes()) }))
            .await?;

        if response.get("result").and_then(Value::as_bool) != Some(true) {
            return Err(SdkError::Remote(response));
        }
        debug!(%txid, "broadcast accepted");
        Ok(BroadcastResult {
            result: true,
            txid: response
                .get("txid")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or(txid),
        })
    }

    /// Sign with `key` (or the default key) and broadcast
    pub async fn send_transaction(
        &self,
        mut tx: Transaction,
        key: Option<&str>,
    ) -> Result<BroadcastResult, SdkError> {
        self.sign(&mut tx, key)?;
        self.send_raw_transaction(&tx).await
    }
}

fn is_empty_object(value: &Value) -> bool {
    value.as_object().map_or(false, |o| o.is_empty())
}

fn validate_txid(txid: &str) -> Result<(), SdkError> {
    if txid.len() == 64 && crate::utils::is_hex(txid) {
        Ok(())
    } else {
        Err(SdkError::invalid_input("Invalid transaction ID provided"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[tokio::test]
    async fn test_mock_current_block() {
        let client = CypherWeb::new_mock();
        let block = client.get_current_block().await.unwrap();
        assert_eq!(block["block_header"]["raw_data"]["number"], 12345678);

        let ref_block = client.get_ref_block().await.unwrap();
        assert_eq!(ref_block.number, 12345678);
    }

    #[tokio::test]
    async fn test_is_connected_without_event_server() {
        let client = CypherWeb::new_mock();
        let connection = client.is_connected().await;
        assert!(connection.full_node);
        assert!(connection.solidity_node);
        assert!(!connection.event_server);
    }

    #[test]
    fn test_default_account() {
        let client = CypherWeb::new_mock();
        assert!(client.default_address().is_none());
        assert!(matches!(client.signer(None), Err(SdkError::MissingKey)));

        client.set_private_key(KEY).unwrap();
        assert_eq!(
            client.default_address().unwrap().to_hex(),
            "1cf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );
        assert!(client.signer(None).is_ok());

        client.set_address("1c0000000000000000000000000000000000000001").unwrap();
        assert!(matches!(client.signer(None), Err(SdkError::MissingKey)));
    }

    #[test]
    fn test_invalid_key() {
        let client = CypherWeb::new_mock();
        assert!(matches!(client.set_private_key("abcd"), Err(SdkError::InvalidKey(_))));
        assert!(matches!(client.signer(Some("zz")), Err(SdkError::InvalidKey(_))));
    }

    #[tokio::test]
    async fn test_input_validation_before_requests() {
        let transport = Arc::new(MockTransport::new());
        let client = CypherWeb::with_transport(transport.clone());

        assert!(matches!(client.get_account("nope").await, Err(SdkError::InvalidInput(_))));
        assert!(matches!(client.get_transaction("12").await, Err(SdkError::InvalidInput(_))));
        assert!(matches!(client.get_block_by_number(-1).await, Err(SdkError::InvalidInput(_))));
        assert_eq!(transport.call_count(), 0);
    }

    #[test]
    fn test_builder_requires_full_node() {
        assert!(matches!(CypherWeb::builder().build(), Err(SdkError::Config(_))));
    }

    #[test]
    fn test_current_providers() {
        let client = CypherWeb::new_mock();
        let providers = client.current_providers();
        assert_eq!(providers.full_node, "mock://");
        assert!(providers.event_server.is_none());
    }
}
