//! Event records returned by the event server

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Record exactly as the event server returns it
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct RawEvent {
    /// Block height
    #[serde(default)]
    pub block_number: Option<u64>,
    /// Block timestamp in milliseconds
    #[serde(default)]
    pub block_timestamp: Option<u64>,
    /// Emitting contract (base58)
    #[serde(default)]
    pub contract_address: Option<String>,
    /// Event name
    #[serde(default)]
    pub event_name: Option<String>,
    /// Transaction id
    #[serde(default)]
    pub transaction_id: Option<String>,
    /// Decoded event arguments
    #[serde(default)]
    pub result: Option<Map<String, Value>>,
    /// Node that served the record
    #[serde(default, rename = "resource_Node")]
    pub resource_node: Option<String>,
}

/// Canonical event record
///
/// Missing source fields stay `None` and are omitted when serialized.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Block height
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block: Option<u64>,
    /// Block timestamp in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
    /// Emitting contract
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract: Option<String>,
    /// Event name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Transaction id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction: Option<String>,
    /// Decoded event arguments
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Map<String, Value>>,
    /// Node that served the record
    #[serde(rename = "resourceNode", skip_serializing_if = "Option::is_none")]
    pub resource_node: Option<String>,
}

impl From<RawEvent> for Event {
    fn from(raw: RawEvent) -> Self {
        Event {
            block: raw.block_number,
            timestamp: raw.block_timestamp,
            contract: raw.contract_address,
            name: raw.event_name,
            transaction: raw.transaction_id,
            result: raw.result,
            resource_node: raw.resource_node,
        }
    }
}

impl Event {
    /// Normalise one raw JSON record. Fields with an unexpected shape are
    /// treated as missing.
    pub fn from_raw_value(value: &Value) -> Event {
        let str_field = |key: &str| value.get(key).and_then(Value::as_str).map(str::to_string);
        let num_field = |key: &str| {
            value.get(key).and_then(|v| v.as_u64().or_else(|| v.as_str().and_then(|s| s.parse().ok())))
        };
        Event {
            block: num_field("block_number"),
            timestamp: num_field("block_timestamp"),
            contract: str_field("contract_address"),
            name: str_field("event_name"),
            transaction: str_field("transaction_id"),
            result: value.get("result").and_then(Value::as_object).cloned(),
            resource_node: str_field("resource_Node"),
        }
    }
}
