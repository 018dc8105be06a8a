//! Transport layer for node and event server communication

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::SdkError;

/// HTTP verb of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    /// GET, no body
    Get,
    /// POST with a JSON body
    Post,
}

/// Transport trait for node communication (object-safe)
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request to `path` relative to the host and return its JSON body
    async fn request(
        &self,
        path: &str,
        body: Option<Value>,
        method: HttpMethod,
    ) -> Result<Value, SdkError>;

    /// Base URL requests are sent to
    fn host(&self) -> &str {
        ""
    }
}

/// Helper to deserialize response
pub fn deserialize_response<T: serde::de::DeserializeOwned>(value: Value) -> Result<T, SdkError> {
    serde_json::from_value(value).map_err(|e| SdkError::Serialization(e.to_string()))
}

/// A request seen by [`MockTransport`]
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    /// Full path including any query string
    pub path: String,
    /// JSON body
    pub body: Option<Value>,
    /// HTTP verb
    pub method: HttpMethod,
}

enum MockReply {
    Json(Value),
    Failure(String),
}

/// Mock transport for testing
///
/// Responses are keyed by path without the query string. Every request is
/// recorded so tests can assert what was (or was not) sent.
pub struct MockTransport {
    host: String,
    responses: Arc<Mutex<HashMap<String, MockReply>>>,
    default_responses: HashMap<String, Value>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockTransport {
    /// Create a new mock transport
    pub fn new() -> Self {
        let mut defaults = HashMap::new();

        defaults.insert(
            "wallet/getnowblock".to_string(),
            json!({
                "blockID": "0000000000bc614e9d4aab6a8e3d34e7b5e0fa79f0a3cf2b1e5bd2c6d21fa0b1",
                "block_header": {
                    "raw_data": {
                        "number": 12345678,
                        "timestamp": 1_700_000_000_000i64,
                    }
                }
            }),
        );
        defaults.insert(
            "walletsolidity/getnowblock".to_string(),
            json!({
                "blockID": "0000000000bc614d4e0e1a0b6f0c2b0e8d6b0f2b1c5a7a9e8f3d2c1b0a998877",
                "block_header": {
                    "raw_data": {
                        "number": 12345677,
                        "timestamp": 1_699_999_997_000i64,
                    }
                }
            }),
        );
        defaults.insert("wallet/getaccount".to_string(), json!({}));
        defaults.insert("healthcheck".to_string(), json!({"status": "ok"}));

        Self {
            host: "mock://".to_string(),
            responses: Arc::new(Mutex::new(HashMap::new())),
            default_responses: defaults,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Set a mock response for a path
    pub fn set_response(&self, path: &str, response: Value) {
        self.responses.lock().insert(path.to_string(), MockReply::Json(response));
    }

    /// Make a path fail with a transport error
    pub fn set_failure(&self, path: &str, message: &str) {
        self.responses
            .lock()
            .insert(path.to_string(), MockReply::Failure(message.to_string()));
    }

    /// Clear custom responses
    pub fn clear_responses(&self) {
        self.responses.lock().clear();
    }

    /// Requests received so far, oldest first
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    /// Number of requests received so far
    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// Most recent request
    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.requests.lock().last().cloned()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn request(
        &self,
        path: &str,
        body: Option<Value>,
        method: HttpMethod,
    ) -> Result<Value, SdkError> {
        self.requests.lock().push(RecordedRequest {
            path: path.to_string(),
            body,
            method,
        });

        let key = path.split('?').next().unwrap_or(path).trim_start_matches('/');

        // Check custom responses first
        match self.responses.lock().get(key) {
            Some(MockReply::Json(value)) => return Ok(value.clone()),
            Some(MockReply::Failure(message)) => return Err(SdkError::Transport(message.clone())),
            None => {}
        }

        self.default_responses
            .get(key)
            .cloned()
            .ok_or_else(|| SdkError::Transport(format!("No mock response for {}", key)))
    }

    fn host(&self) -> &str {
        &self.host
    }
}

/// Shared handles let a test keep inspecting a transport after handing it to
/// a client
#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn request(
        &self,
        path: &str,
        body: Option<Value>,
        method: HttpMethod,
    ) -> Result<Value, SdkError> {
        (**self).request(path, body, method).await
    }

    fn host(&self) -> &str {
        (**self).host()
    }
}

/// HTTP transport for a full node, solidity node or event server
#[cfg(feature = "http")]
pub struct HttpProvider {
    client: reqwest::Client,
    host: String,
}

#[cfg(feature = "http")]
impl HttpProvider {
    /// Default request timeout in seconds
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Create a provider for `host`
    pub fn new(host: &str) -> Result<Self, SdkError> {
        Self::with_options(host, &HashMap::new(), Self::DEFAULT_TIMEOUT_SECS)
    }

    /// Create a provider sending `headers` with every request
    pub fn with_options(
        host: &str,
        headers: &HashMap<String, String>,
        timeout_secs: u64,
    ) -> Result<Self, SdkError> {
        if !crate::utils::is_valid_url(host) {
            return Err(SdkError::invalid_input("Invalid URL provided to HttpProvider"));
        }

        let mut header_map = reqwest::header::HeaderMap::new();
        for (name, value) in headers {
            let name = reqwest::header::HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| SdkError::invalid_input(format!("Invalid header name: {}", e)))?;
            let value = reqwest::header::HeaderValue::from_str(value)
                .map_err(|e| SdkError::invalid_input(format!("Invalid header value: {}", e)))?;
            header_map.insert(name, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(header_map)
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| SdkError::Transport(e.to_string()))?;

        let host = if host.contains("://") { host.to_string() } else { format!("http://{}", host) };
        Ok(Self {
            client,
            host: host.trim_end_matches('/').to_string(),
        })
    }
}

#[cfg(feature = "http")]
#[async_trait]
impl Transport for HttpProvider {
    async fn request(
        &self,
        path: &str,
        body: Option<Value>,
        method: HttpMethod,
    ) -> Result<Value, SdkError> {
        let url = format!("{}/{}", self.host, path.trim_start_matches('/'));
        debug!(%url, ?method, "sending request");

        let request = match method {
            HttpMethod::Get => self.client.get(&url),
            HttpMethod::Post => self.client.post(&url).json(&body.unwrap_or_else(|| json!({}))),
        };

        let response = request
            .send()
            .await
            .map_err(|e| SdkError::Transport(e.to_string()))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| SdkError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(match serde_json::from_str::<Value>(&text) {
                Ok(body) => SdkError::Remote(body),
                Err(_) => SdkError::Transport(format!("HTTP {}: {}", status, text)),
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| SdkError::Transport(e.to_string()))
    }

    fn host(&self) -> &str {
        &self.host
    }
}
