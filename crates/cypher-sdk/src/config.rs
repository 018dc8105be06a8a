//! Client configuration

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::utils::is_valid_url;
use crate::SdkError;

/// Client configuration
///
/// `full_host` is used for every node role that is not set explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CypherConfig {
    /// Fallback host for all node roles
    #[serde(default)]
    pub full_host: Option<String>,
    /// Full node URL
    #[serde(default)]
    pub full_node: Option<String>,
    /// Solidity node URL
    #[serde(default)]
    pub solidity_node: Option<String>,
    /// Event server URL
    #[serde(default)]
    pub event_server: Option<String>,
    /// Default private key (hex)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
    /// Headers sent to the nodes
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub headers: HashMap<String, String>,
    /// Headers sent to the event server
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub event_headers: HashMap<String, String>,
    /// Fee limit for smart contract operations, in sun
    #[serde(default = "default_fee_limit")]
    pub fee_limit: i64,
    /// Transaction expiration window in milliseconds
    #[serde(default = "default_expiration_ms")]
    pub expiration_ms: i64,
    /// Decimals of the native coin
    #[serde(default = "default_decimals")]
    pub decimals: u32,
    /// Refuse plugin registration
    #[serde(default)]
    pub disable_plugins: bool,
    /// HTTP request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_fee_limit() -> i64 {
    20_000_000
}

fn default_expiration_ms() -> i64 {
    60_000
}

fn default_decimals() -> u32 {
    6
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for CypherConfig {
    fn default() -> Self {
        Self {
            full_host: None,
            full_node: None,
            solidity_node: None,
            event_server: None,
            private_key: None,
            headers: HashMap::new(),
            event_headers: HashMap::new(),
            fee_limit: default_fee_limit(),
            expiration_ms: default_expiration_ms(),
            decimals: default_decimals(),
            disable_plugins: false,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl CypherConfig {
    /// Config pointing every role at one host
    pub fn with_full_host(host: impl Into<String>) -> Self {
        Self {
            full_host: Some(host.into()),
            ..Default::default()
        }
    }

    /// Parse TOML text and validate it
    pub fn from_toml_str(content: &str) -> Result<Self, SdkError> {
        let config: Self = toml::from_str(content).map_err(|e| SdkError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SdkError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| SdkError::Config(format!("{}: {}", path.as_ref().display(), e)))?;
        Self::from_toml_str(&content)
    }

    /// Save to a TOML file, creating parent directories
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SdkError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| SdkError::Config(e.to_string()))?;
        }
        let content = toml::to_string_pretty(self).map_err(|e| SdkError::Config(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| SdkError::Config(e.to_string()))
    }

    /// Full node URL, falling back to `full_host`
    pub fn full_node_url(&self) -> Option<&str> {
        self.full_node.as_deref().or(self.full_host.as_deref())
    }

    /// Solidity node URL, falling back to `full_host`
    pub fn solidity_node_url(&self) -> Option<&str> {
        self.solidity_node.as_deref().or(self.full_host.as_deref())
    }

    /// Event server URL, falling back to `full_host`
    pub fn event_server_url(&self) -> Option<&str> {
        self.event_server.as_deref().or(self.full_host.as_deref())
    }

    /// Check URLs and numeric limits
    pub fn validate(&self) -> Result<(), SdkError> {
        let urls = [
            ("full_host", &self.full_host),
            ("full_node", &self.full_node),
            ("solidity_node", &self.solidity_node),
            ("event_server", &self.event_server),
        ];
        for (name, url) in urls {
            if let Some(url) = url {
                if !is_valid_url(url) {
                    return Err(SdkError::Config(format!("invalid {} URL: {}", name, url)));
                }
            }
        }
        if self.full_node_url().is_none() {
            return Err(SdkError::Config("a full node or full host is required".into()));
        }
        if self.fee_limit <= 0 {
            return Err(SdkError::Config("fee_limit must be positive".into()));
        }
        if self.expiration_ms <= 0 {
            return Err(SdkError::Config("expiration_ms must be positive".into()));
        }
        Ok(())
    }
}
