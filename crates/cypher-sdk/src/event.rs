//! Event server queries
//!
//! Queries go to an HTTP event-indexing service configured separately from
//! the nodes. Arguments are validated before any request is sent, in a fixed
//! order so that the first problem found is the one reported.

use std::sync::Arc;

use cypher_types::Event;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use crate::client::{CypherWeb, EventServer};
use crate::transport::{HttpMethod, Transport};
use crate::SdkError;

/// Largest page the event server accepts
pub const MAX_PAGE_SIZE: u64 = 200;

/// Default page size
pub const DEFAULT_PAGE_SIZE: u64 = 20;

/// Default health-check route
pub const DEFAULT_HEALTHCHECK: &str = "healthcheck";

/// Options for [`CypherWeb::get_events_by_contract_address`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EventQueryOptions {
    /// Only events with this name
    pub event_name: Option<String>,
    /// Only events of this block; requires `event_name`
    pub block_number: Option<u64>,
    /// Page size, clamped to 200
    pub size: u64,
    /// Page number, starting at 1
    pub page: u64,
    /// Earliest block timestamp in milliseconds
    pub from_timestamp: Option<i64>,
    /// Alias of `from_timestamp`
    pub since_timestamp: Option<i64>,
    /// Alias of `from_timestamp`
    pub since: Option<i64>,
    /// Only confirmed events
    pub only_confirmed: bool,
    /// Only unconfirmed events; ignored with `only_confirmed`
    pub only_unconfirmed: bool,
    /// Continue after this fingerprint
    pub fingerprint: Option<String>,
    /// Alias of `fingerprint`
    pub previous_fingerprint: Option<String>,
    /// Alias of `fingerprint`
    pub previous_last_event_fingerprint: Option<String>,
    /// Sort order, e.g. `-block_timestamp`
    pub sort: Option<String>,
    /// Filters on event result fields
    pub filters: Option<Map<String, Value>>,
    /// Return records exactly as the server sent them
    pub raw_response: bool,
}

impl Default for EventQueryOptions {
    fn default() -> Self {
        Self {
            event_name: None,
            block_number: None,
            size: DEFAULT_PAGE_SIZE,
            page: 1,
            from_timestamp: None,
            since_timestamp: None,
            since: None,
            only_confirmed: false,
            only_unconfirmed: false,
            fingerprint: None,
            previous_fingerprint: None,
            previous_last_event_fingerprint: None,
            sort: None,
            filters: None,
            raw_response: false,
        }
    }
}

/// One page of events
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct EventPage {
    /// Normalised records
    pub events: Vec<Event>,
    /// Fingerprint of the last record, for requesting the next page
    pub fingerprint: Option<String>,
}

/// Result of an event query
#[derive(Debug, Clone, PartialEq)]
pub enum EventResponse {
    /// Normalised records
    Page(EventPage),
    /// Records as returned by the server
    Raw(Vec<Value>),
}

impl EventResponse {
    /// Number of records
    pub fn len(&self) -> usize {
        match self {
            EventResponse::Page(page) => page.events.len(),
            EventResponse::Raw(records) => records.len(),
        }
    }

    /// Whether the page is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fingerprint to continue from
    pub fn fingerprint(&self) -> Option<&str> {
        match self {
            EventResponse::Page(page) => page.fingerprint.as_deref(),
            EventResponse::Raw(records) => last_fingerprint(records),
        }
    }

    /// JSON form: an array of records
    pub fn into_value(self) -> Value {
        match self {
            EventResponse::Page(page) => json!(page.events),
            EventResponse::Raw(records) => Value::Array(records),
        }
    }
}

/// Loosely typed query arguments. Both typed options and JSON objects land
/// here so validation runs once, in one order.
#[derive(Debug, Default)]
struct QueryArgs {
    event_name: Value,
    block_number: Value,
    size: Value,
    page: Value,
    from_timestamp: Value,
    only_confirmed: bool,
    only_unconfirmed: bool,
    fingerprint: Option<String>,
    sort: Option<String>,
    filters: Option<Map<String, Value>>,
    raw_response: bool,
}

impl From<&EventQueryOptions> for QueryArgs {
    fn from(opts: &EventQueryOptions) -> Self {
        let opt = |v: Option<i64>| v.map_or(Value::Null, Value::from);
        let from_timestamp = first_truthy(
            &[opt(opts.from_timestamp), json!(opts.since_timestamp.unwrap_or(0))],
            opt(opts.since),
        );
        Self {
            event_name: opts.event_name.clone().map_or(Value::Null, Value::from),
            block_number: opts.block_number.map_or(Value::Null, Value::from),
            size: json!(opts.size),
            page: json!(opts.page),
            from_timestamp,
            only_confirmed: opts.only_confirmed,
            only_unconfirmed: opts.only_unconfirmed,
            fingerprint: [
                &opts.fingerprint,
                &opts.previous_fingerprint,
                &opts.previous_last_event_fingerprint,
            ]
            .into_iter()
            .flatten()
            .find(|f| !f.is_empty())
            .cloned(),
            sort: opts.sort.clone().filter(|s| !s.is_empty()),
            filters: opts.filters.clone(),
            raw_response: opts.raw_response,
        }
    }
}

impl QueryArgs {
    /// Read camelCase option keys from a JSON object
    fn from_json(options: &Value) -> Self {
        let get = |key: &str| options.get(key).cloned().unwrap_or(Value::Null);
        let text = |key: &str| options.get(key).filter(|v| truthy(v)).map(value_text);

        let from_timestamp = first_truthy(
            &[get("fromTimestamp"), options.get("sinceTimestamp").cloned().unwrap_or(json!(0))],
            get("since"),
        );
        let fingerprint = text("fingerprint")
            .or_else(|| text("previousFingerprint"))
            .or_else(|| text("previousLastEventFingerprint"));

        Self {
            event_name: get("eventName"),
            block_number: get("blockNumber"),
            size: options.get("size").cloned().unwrap_or(json!(DEFAULT_PAGE_SIZE)),
            page: options.get("page").cloned().unwrap_or(json!(1)),
            from_timestamp,
            only_confirmed: truthy(&get("onlyConfirmed")),
            only_unconfirmed: truthy(&get("onlyUnconfirmed")),
            fingerprint,
            sort: text("sort"),
            filters: options.get("filters").and_then(Value::as_object).cloned(),
            raw_response: options.get("rawResponse") == Some(&Value::Bool(true)),
        }
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(false, |f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn first_truthy(candidates: &[Value], fallback: Value) -> Value {
    candidates.iter().find(|v| truthy(v)).cloned().unwrap_or(fallback)
}

fn is_integer(value: &Value) -> bool {
    match value {
        Value::Number(n) => n.is_i64() || n.is_u64() || n.as_f64().map_or(false, |f| f.fract() == 0.0),
        _ => false,
    }
}

/// Text of a value already checked by `is_integer`; `20.0` renders as `20`
fn integer_text(value: &Value) -> String {
    match value {
        Value::Number(n) if !(n.is_i64() || n.is_u64()) => {
            (n.as_f64().unwrap_or_default() as i64).to_string()
        }
        other => value_text(other),
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn last_fingerprint(records: &[Value]) -> Option<&str> {
    records.last().and_then(|r| r.get("_fingerprint")).and_then(Value::as_str)
}

fn into_response(data: Value, raw: bool) -> Result<EventResponse, SdkError> {
    if !truthy(&data) {
        return Err(SdkError::Remote(json!("Unknown error occurred")));
    }
    let records = match data {
        Value::Array(records) => records,
        other => return Err(SdkError::Remote(other)),
    };
    if raw {
        return Ok(EventResponse::Raw(records));
    }
    Ok(EventResponse::Page(EventPage {
        events: records.iter().map(Event::from_raw_value).collect(),
        fingerprint: last_fingerprint(&records).map(str::to_string),
    }))
}

impl CypherWeb {
    /// Set or clear the event server
    #[cfg(feature = "http")]
    pub fn set_event_server(&self, url: Option<&str>, healthcheck: Option<&str>) -> Result<(), SdkError> {
        let transport = match url {
            Some(url) if !url.is_empty() => {
                if !crate::utils::is_valid_url(url) {
                    return Err(SdkError::invalid_input("Invalid event server provided"));
                }
                let provider = crate::transport::HttpProvider::new(url)
                    .map_err(|_| SdkError::invalid_input("Invalid event server provided"))?;
                Some(Arc::new(provider) as Arc<dyn Transport>)
            }
            _ => None,
        };
        self.set_event_transport(transport, healthcheck);
        Ok(())
    }

    /// Set or clear the event server transport
    pub fn set_event_transport(&self, transport: Option<Arc<dyn Transport>>, healthcheck: Option<&str>) {
        let server = transport.map(|transport| EventServer {
            transport,
            healthcheck: healthcheck.unwrap_or(DEFAULT_HEALTHCHECK).to_string(),
        });
        *self.inner.event_server.write() = server;
    }

    /// Whether an event server is configured
    pub fn has_event_server(&self) -> bool {
        self.inner.event_server.read().is_some()
    }

    fn event_server(&self) -> Result<EventServer, SdkError> {
        self.inner.event_server.read().clone().ok_or(SdkError::NoEventServer)
    }

    pub(crate) async fn event_server_connected(&self) -> bool {
        let server = match self.event_server() {
            Ok(server) => server,
            Err(_) => return false,
        };
        server
            .transport
            .request(&server.healthcheck, None, HttpMethod::Get)
            .await
            .is_ok()
    }

    /// Events emitted by a contract
    pub async fn get_events_by_contract_address(
        &self,
        contract_address: &str,
        options: &EventQueryOptions,
    ) -> Result<EventResponse, SdkError> {
        let args = vec![json!(contract_address), serde_json::to_value(options)?];
        if let Some(result) = self.run_override("event", "getEventsByContractAddress", args).await {
            return into_response(result?, options.raw_response);
        }
        self.query_contract_events(contract_address, QueryArgs::from(options)).await
    }

    /// Same as [`get_events_by_contract_address`](Self::get_events_by_contract_address)
    /// with camelCase JSON options
    pub async fn get_events_by_contract_address_json(
        &self,
        contract_address: &str,
        options: &Value,
    ) -> Result<EventResponse, SdkError> {
        let args = vec![json!(contract_address), options.clone()];
        if let Some(result) = self.run_override("event", "getEventsByContractAddress", args).await {
            let raw = options.get("rawResponse") == Some(&Value::Bool(true));
            return into_response(result?, raw);
        }
        self.query_contract_events(contract_address, QueryArgs::from_json(options)).await
    }

    async fn query_contract_events(&self, contract_address: &str, args: QueryArgs) -> Result<EventResponse, SdkError> {
        let server = self.event_server()?;
        let contract = crate::address::parse_arg(contract_address, "Invalid contract address provided")?;

        if !args.from_timestamp.is_null() && !is_integer(&args.from_timestamp) {
            return Err(SdkError::invalid_parameter("Invalid fromTimestamp provided"));
        }
        if !is_integer(&args.size) {
            return Err(SdkError::invalid_parameter("Invalid size provided"));
        }
        let mut size = args.size.as_f64().unwrap_or_default();
        if size > MAX_PAGE_SIZE as f64 {
            warn!("Defaulting to maximum accepted size: {}", MAX_PAGE_SIZE);
            size = MAX_PAGE_SIZE as f64;
        }
        if !is_integer(&args.page) {
            return Err(SdkError::invalid_parameter("Invalid page provided"));
        }
        let has_event_name = truthy(&args.event_name);
        if truthy(&args.block_number) && !has_event_name {
            return Err(SdkError::validation(
                "Usage of block number filtering requires an event name",
            ));
        }

        let mut route = vec![contract.to_base58()];
        if has_event_name {
            route.push(value_text(&args.event_name));
            if truthy(&args.block_number) {
                route.push(value_text(&args.block_number));
            }
        }

        let mut query = url::form_urlencoded::Serializer::new(String::new());
        query.append_pair("size", &(size as i64).to_string());
        query.append_pair("page", &integer_text(&args.page));
        if let Some(filters) = args.filters.as_ref().filter(|f| !f.is_empty()) {
            query.append_pair("filters", &Value::Object(filters.clone()).to_string());
        }
        if truthy(&args.from_timestamp) {
            let since = integer_text(&args.from_timestamp);
            query.append_pair("fromTimestamp", &since);
            query.append_pair("since", &since);
        }
        if args.only_confirmed {
            query.append_pair("only_confirmed", "true");
        }
        if args.only_unconfirmed && !args.only_confirmed {
            query.append_pair("only_unconfirmed", "true");
        }
        if let Some(sort) = &args.sort {
            query.append_pair("sort", sort);
        }
        if let Some(fingerprint) = &args.fingerprint {
            query.append_pair("fingerprint", fingerprint);
        }

        let path = format!("event/contract/{}?{}", route.join("/"), query.finish());
        debug!(%path, "event query");
        let data = server.transport.request(&path, None, HttpMethod::Get).await?;
        into_response(data, args.raw_response)
    }

    /// Events emitted by one transaction
    pub async fn get_events_by_transaction_id(
        &self,
        transaction_id: &str,
        raw_response: bool,
    ) -> Result<EventResponse, SdkError> {
        let args = vec![json!(transaction_id), json!({ "rawResponse": raw_response })];
        if let Some(result) = self.run_override("event", "getEventsByTransactionID", args).await {
            return into_response(result?, raw_response);
        }
        let server = self.event_server()?;
        let path = format!("event/transaction/{}", transaction_id);
        debug!(%path, "event query");
        let data = server.transport.request(&path, None, HttpMethod::Get).await?;
        into_response(data, raw_response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;

    #[test]
    fn test_integer_text() {
        assert_eq!(integer_text(&json!(20.0)), "20");
        assert_eq!(integer_text(&json!(7)), "7");
        assert_eq!(integer_text(&json!(-3.0)), "-3");
    }

    #[test]
    fn test_truthiness() {
        assert!(!truthy(&json!(0)));
        assert!(!truthy(&json!("")));
        assert!(!truthy(&Value::Null));
        assert!(truthy(&json!("0")));
        assert!(truthy(&json!([])));
    }

    #[test]
    fn test_integer_check() {
        assert!(is_integer(&json!(20)));
        assert!(is_integer(&json!(20.0)));
        assert!(!is_integer(&json!(20.5)));
        assert!(!is_integer(&json!("20")));
    }

    #[test]
    fn test_timestamp_alias_resolution() {
        let args = QueryArgs::from_json(&json!({"since": 5, "sinceTimestamp": 7}));
        assert_eq!(args.from_timestamp, json!(7));
        let args = QueryArgs::from_json(&json!({"since": 5}));
        assert_eq!(args.from_timestamp, json!(5));
        let args = QueryArgs::from_json(&json!({}));
        assert!(args.from_timestamp.is_null());
    }

    #[test]
    fn test_fingerprint_alias_resolution() {
        let opts = EventQueryOptions {
            previous_fingerprint: Some("b".into()),
            previous_last_event_fingerprint: Some("c".into()),
            ..Default::default()
        };
        assert_eq!(QueryArgs::from(&opts).fingerprint.as_deref(), Some("b"));
        let args = QueryArgs::from_json(&json!({"previousLastEventFingerprint": "c"}));
        assert_eq!(args.fingerprint.as_deref(), Some("c"));
    }

    #[test]
    fn test_response_mapping() {
        let data = json!([{"event_name": "Transfer", "_fingerprint": "fp1"}]);
        match into_response(data.clone(), false).unwrap() {
            EventResponse::Page(page) => {
                assert_eq!(page.events[0].name.as_deref(), Some("Transfer"));
                assert_eq!(page.fingerprint.as_deref(), Some("fp1"));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(into_response(data, true).unwrap().fingerprint(), Some("fp1"));

        let err = into_response(Value::Null, false).unwrap_err();
        assert!(matches!(err, SdkError::Remote(Value::String(ref s)) if s == "Unknown error occurred"));
        let err = into_response(json!({"Error": "boom"}), false).unwrap_err();
        assert!(matches!(err, SdkError::Remote(ref v) if v["Error"] == "boom"));
    }

    #[tokio::test]
    async fn test_event_server_health() {
        let client = CypherWeb::new_mock();
        assert!(!client.event_server_connected().await);

        let events = Arc::new(MockTransport::new());
        client.set_event_transport(Some(events.clone()), None);
        assert!(client.has_event_server());
        assert!(client.event_server_connected().await);

        events.set_failure("healthcheck", "down");
        assert!(!client.event_server_connected().await);

        client.set_event_transport(None, None);
        assert!(!client.has_event_server());
    }

    #[cfg(feature = "http")]
    #[test]
    fn test_set_event_server_rejects_bad_url() {
        let client = CypherWeb::new_mock();
        let err = client.set_event_server(Some("ftp://events"), None).unwrap_err();
        assert_eq!(err.to_string(), "Invalid event server provided");
        client.set_event_server(Some("http://127.0.0.1:8090"), None).unwrap();
        assert_eq!(client.current_providers().event_server.as_deref(), Some("http://127.0.0.1:8090"));
        client.set_event_server(None, None).unwrap();
        assert!(!client.has_event_server());
    }
}
