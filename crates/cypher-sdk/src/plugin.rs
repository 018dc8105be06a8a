//! Plugin registry
//!
//! A plugin either plugs methods into the client's components (`cyp`,
//! `transactionBuilder`, `event`, `plugin`, or a library registered earlier),
//! or registers itself whole as a library. Plugged methods are consulted
//! before the built-in implementation whenever that method runs.
//!
//! Registration is not transactional: methods plugged before a failure stay
//! plugged.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use semver::{Version, VersionReq};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::client::CypherWeb;
use crate::SdkError;

/// Future returned by plugged methods
pub type PluginFuture = BoxFuture<'static, Result<Value, SdkError>>;

/// A plugged method. Receives the client it was registered on and the call
/// arguments.
pub type PluginMethod = Arc<dyn Fn(CypherWeb, Vec<Value>) -> PluginFuture + Send + Sync>;

/// Wrap an async closure as a [`PluginMethod`]
pub fn plugin_method<F, Fut>(f: F) -> PluginMethod
where
    F: Fn(CypherWeb, Vec<Value>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, SdkError>> + Send + 'static,
{
    Arc::new(move |client, args| Box::pin(f(client, args)))
}

const BUILTIN_METHODS: &[(&str, &[&str])] = &[
    (
        "cyp",
        &[
            "getCurrentBlock",
            "getConfirmedCurrentBlock",
            "getBlockByNumber",
            "getAccount",
            "getBalance",
            "getTransaction",
            "getTransactionInfo",
            "sendRawTransaction",
            "sign",
            "multiSign",
            "signMessage",
        ],
    ),
    (
        "transactionBuilder",
        &[
            "sendCyp",
            "sendToken",
            "vote",
            "createWitness",
            "updateWitness",
            "updateAccount",
            "freezeBalance",
            "unfreezeBalance",
            "withdrawBlockRewards",
            "createSmartContract",
            "triggerSmartContract",
            "triggerConstantContract",
        ],
    ),
    ("event", &["getEventsByContractAddress", "getEventsByTransactionID"]),
    ("plugin", &["register"]),
];

const NO_OVERRIDE: &[(&str, &[&str])] = &[
    ("cyp", &["sign", "signMessage", "multiSign"]),
    ("plugin", &["register"]),
];

fn lookup(table: &[(&str, &'static [&'static str])], component: &str) -> &'static [&'static str] {
    table
        .iter()
        .find(|(name, _)| *name == component)
        .map(|(_, methods)| *methods)
        .unwrap_or(&[])
}

fn is_builtin_component(component: &str) -> bool {
    BUILTIN_METHODS.iter().any(|(name, _)| *name == component)
}

/// How a plugin attaches to the client
pub enum PluginKind {
    /// Register the whole plugin as a library
    FullClass,
    /// Plug methods into components, in order
    Components(Vec<(String, Vec<(String, PluginMethod)>)>),
}

/// What a plugin provides and which client versions it supports
pub struct PluginInterface {
    /// Semver range the client version must satisfy
    pub requires: String,
    /// Attachment mode
    pub kind: PluginKind,
}

impl Default for PluginInterface {
    fn default() -> Self {
        Self {
            requires: "0.0.0".to_string(),
            kind: PluginKind::Components(Vec::new()),
        }
    }
}

impl PluginInterface {
    /// Interface registering the plugin as a library
    pub fn full_class(requires: &str) -> Self {
        Self {
            requires: requires.to_string(),
            kind: PluginKind::FullClass,
        }
    }

    /// Interface plugging methods; add them with [`method`](Self::method)
    pub fn components(requires: &str) -> Self {
        Self {
            requires: requires.to_string(),
            kind: PluginKind::Components(Vec::new()),
        }
    }

    /// Add a method to `component`
    pub fn method(mut self, component: &str, name: &str, method: PluginMethod) -> Self {
        if let PluginKind::Components(components) = &mut self.kind {
            match components.iter_mut().find(|(c, _)| c == component) {
                Some((_, methods)) => methods.push((name.to_string(), method)),
                None => components.push((component.to_string(), vec![(name.to_string(), method)])),
            }
        }
        self
    }
}

/// A client extension
pub trait Plugin: Send + Sync + 'static {
    /// Class name; a library is registered under it with the first letter
    /// lowercased
    fn class_name(&self) -> &str;

    /// Interface for this registration
    fn plugin_interface(&self, _options: &Value) -> PluginInterface {
        PluginInterface::default()
    }

    /// Invoke a library method by name
    fn call(&self, _client: CypherWeb, method: &str, _args: Vec<Value>) -> PluginFuture {
        let message = format!("Unknown method {}.{}", self.class_name(), method);
        Box::pin(async move { Err(SdkError::InvalidInput(message)) })
    }
}

/// Outcome of [`CypherWeb::register`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RegisterResult {
    /// Library class names registered
    pub libs: Vec<String>,
    /// Methods plugged
    pub plugged: Vec<String>,
    /// Methods refused
    pub skipped: Vec<String>,
    /// Set when registration was refused as a whole
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Default)]
pub(crate) struct PluginRegistry {
    overrides: HashMap<String, HashMap<String, PluginMethod>>,
    libs: HashMap<String, Arc<dyn Plugin>>,
}

impl PluginRegistry {
    fn method(&self, component: &str, method: &str) -> Option<PluginMethod> {
        self.overrides.get(component).and_then(|m| m.get(method)).cloned()
    }

    fn defines(&self, component: &str, method: &str) -> bool {
        lookup(BUILTIN_METHODS, component).contains(&method) || self.method(component, method).is_some()
    }
}

/// Whether `version` satisfies a range such as `>=5.0.0 <6.0.0 || 7.x`
///
/// Follows npm range syntax: a bare version matches only itself, a bare
/// partial such as `5.2` matches `5.2.x`, `A - B` is inclusive on both ends
/// and an operator may be separated from its version by spaces. Ranges that
/// cannot be parsed are not satisfied.
pub fn version_satisfies(version: &str, range: &str) -> bool {
    let version = match Version::parse(version) {
        Ok(v) => v,
        Err(_) => return false,
    };
    range.split("||").any(|alternative| {
        let comparators = match range_comparators(alternative) {
            Some(comparators) => comparators,
            None => return false,
        };
        if comparators.is_empty() {
            return true;
        }
        VersionReq::parse(&comparators.join(", ")).map_or(false, |req| req.matches(&version))
    })
}

/// Comparators of one `||` alternative in the form `VersionReq` parses
fn range_comparators(alternative: &str) -> Option<Vec<String>> {
    let tokens: Vec<&str> = alternative
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .collect();

    if let Some(dash) = tokens.iter().position(|t| *t == "-") {
        return match (dash, tokens.len()) {
            (1, 3) => Some(vec![
                format!(">={}", tokens[0].trim_start_matches('v')),
                format!("<={}", tokens[2].trim_start_matches('v')),
            ]),
            _ => None,
        };
    }

    let mut comparators = Vec::with_capacity(tokens.len());
    let mut pending_op: Option<&str> = None;
    for token in tokens {
        if is_operator(token) {
            if pending_op.replace(token).is_some() {
                return None;
            }
            continue;
        }
        let token = token.trim_start_matches('v');
        match pending_op.take() {
            Some(op) => comparators.push(format!("{}{}", op, token)),
            None if is_bare_version(token) => comparators.push(format!("={}", token)),
            None => comparators.push(token.to_string()),
        }
    }
    if pending_op.is_some() {
        return None;
    }
    Some(comparators)
}

fn is_operator(token: &str) -> bool {
    matches!(token, "=" | ">" | ">=" | "<" | "<=" | "~" | "^")
}

/// `5`, `5.2`, `5.2.1` or a full version with pre-release/build metadata
fn is_bare_version(token: &str) -> bool {
    if Version::parse(token).is_ok() {
        return true;
    }
    !token.is_empty()
        && token.split('.').count() <= 3
        && token.split('.').all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()))
}

fn instance_name(class_name: &str) -> String {
    let mut chars = class_name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn arg_str<'a>(args: &'a [Value], index: usize, message: &str) -> Result<&'a str, SdkError> {
    args.get(index)
        .and_then(Value::as_str)
        .ok_or_else(|| SdkError::invalid_input(message))
}

impl CypherWeb {
    /// Register a plugin
    ///
    /// With plugins disabled the result carries an error and nothing changes.
    /// A plugin whose `requires` range excludes this version is rejected
    /// before anything is installed.
    pub fn register<P: Plugin>(&self, plugin: P, options: &Value) -> Result<RegisterResult, SdkError> {
        let mut result = RegisterResult::default();
        if self.settings().disable_plugins {
            result.error = Some("This instance of CypherWeb has plugins disabled.".to_string());
            return Ok(result);
        }

        let interface = plugin.plugin_interface(options);
        if !version_satisfies(Self::version(), &interface.requires) {
            return Err(SdkError::IncompatiblePlugin(
                "The plugin is not compatible with this version of CypherWeb".to_string(),
            ));
        }

        let mut registry = self.inner.plugins.write();
        match interface.kind {
            PluginKind::FullClass => {
                let class_name = plugin.class_name().to_string();
                let instance = instance_name(&class_name);
                if instance != class_name {
                    info!(library = %instance, "plugin library registered");
                    registry.libs.insert(instance, Arc::new(plugin));
                    result.libs.push(class_name);
                }
            }
            PluginKind::Components(components) => {
                for (component, methods) in components {
                    if !is_builtin_component(&component) && !registry.libs.contains_key(&component) {
                        continue;
                    }
                    let no_override = lookup(NO_OVERRIDE, &component);
                    for (name, method) in methods {
                        let protected = registry.defines(&component, &name) && no_override.contains(&name.as_str());
                        if name == "constructor" || name.starts_with('_') || protected {
                            warn!(%component, method = %name, "plugin method skipped");
                            result.skipped.push(name);
                            continue;
                        }
                        info!(%component, method = %name, "plugin method plugged");
                        registry
                            .overrides
                            .entry(component.clone())
                            .or_default()
                            .insert(name.clone(), method);
                        result.plugged.push(name);
                    }
                }
            }
        }
        Ok(result)
    }

    /// Library registered under `instance_name`
    pub fn plugin_lib(&self, instance_name: &str) -> Option<Arc<dyn Plugin>> {
        self.inner.plugins.read().libs.get(instance_name).cloned()
    }

    /// Whether `component.method` has been plugged
    pub fn is_plugged(&self, component: &str, method: &str) -> bool {
        self.inner.plugins.read().method(component, method).is_some()
    }

    pub(crate) async fn run_override(
        &self,
        component: &str,
        method: &str,
        args: Vec<Value>,
    ) -> Option<Result<Value, SdkError>> {
        let plugged = self.inner.plugins.read().method(component, method)?;
        Some(plugged(self.clone(), args).await)
    }

    /// Invoke a method by component and name
    ///
    /// Plugged methods win, then library methods, then the built-in
    /// read-only queries. Other built-ins need typed arguments and are not
    /// callable by name.
    pub async fn call(&self, component: &str, method: &str, args: Vec<Value>) -> Result<Value, SdkError> {
        if let Some(result) = self.run_override(component, method, args.clone()).await {
            return result;
        }
        let lib = self.inner.plugins.read().libs.get(component).cloned();
        if let Some(lib) = lib {
            return lib.call(self.clone(), method, args).await;
        }

        match (component, method) {
            ("cyp", "getCurrentBlock") => self.get_current_block().await,
            ("cyp", "getConfirmedCurrentBlock") => self.get_confirmed_current_block().await,
            ("cyp", "getBlockByNumber") => {
                let number = args
                    .first()
                    .and_then(Value::as_i64)
                    .ok_or_else(|| SdkError::invalid_input("Invalid block number provided"))?;
                self.get_block_by_number(number).await
            }
            ("cyp", "getAccount") => {
                self.get_account(arg_str(&args, 0, "Invalid address provided")?).await
            }
            ("cyp", "getBalance") => {
                Ok(json!(self.get_balance(arg_str(&args, 0, "Invalid address provided")?).await?))
            }
            ("cyp", "getTransaction") => {
                self.get_transaction(arg_str(&args, 0, "Invalid transaction ID provided")?).await
            }
            ("cyp", "getTransactionInfo") => {
                self.get_transaction_info(arg_str(&args, 0, "Invalid transaction ID provided")?).await
            }
            ("event", "getEventsByContractAddress") => {
                let address = arg_str(&args, 0, "Invalid contract address provided")?;
                let options = args.get(1).cloned().unwrap_or_else(|| json!({}));
                Ok(self.get_events_by_contract_address_json(address, &options).await?.into_value())
            }
            ("event", "getEventsByTransactionID") => {
                let id = arg_str(&args, 0, "Invalid transaction ID provided")?;
                let raw = args.get(1).and_then(|o| o.get("rawResponse")) == Some(&Value::Bool(true));
                Ok(self.get_events_by_transaction_id(id, raw).await?.into_value())
            }
            _ if lookup(BUILTIN_METHODS, component).contains(&method) => Err(SdkError::invalid_input(
                format!("{}.{} is not callable by name", component, method),
            )),
            _ => Err(SdkError::invalid_input(format!("Unknown method {}.{}", component, method))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_ranges() {
        assert!(version_satisfies("5.3.2", "^5.0.0"));
        assert!(version_satisfies("5.3.2", ">=5.0.0 <6.0.0"));
        assert!(version_satisfies("5.3.2", "4.x || 5.x"));
        assert!(version_satisfies("5.3.2", "5.3.2"));
        assert!(!version_satisfies("5.3.2", "5.3.1"));
        assert!(!version_satisfies("5.3.2", "0.0.0"));
        assert!(!version_satisfies("5.3.2", "^6.0.0"));
        assert!(!version_satisfies("5.3.2", "not a range"));
    }

    #[test]
    fn test_partial_versions_match_their_prefix() {
        assert!(!version_satisfies("5.3.2", "5.2"));
        assert!(version_satisfies("5.3.2", "5.3"));
        assert!(version_satisfies("5.3.2", "5"));
        assert!(!version_satisfies("5.3.2", "4"));
        assert!(version_satisfies("5.3.2", "v5.3.2"));
    }

    #[test]
    fn test_hyphen_ranges_are_inclusive() {
        assert!(version_satisfies("5.3.2", "5.0.0 - 6.0.0"));
        assert!(version_satisfies("5.3.2", "5.0.0 - 5.3.2"));
        assert!(version_satisfies("5.3.2", "5.3.2 - 6"));
        assert!(!version_satisfies("5.3.2", "5.0.0 - 5.3.1"));
        assert!(version_satisfies("5.3.2", "1.0.0 - 2.0.0 || 5.0.0 - 5.9.9"));
        assert!(!version_satisfies("5.3.2", "5.0.0 - "));
    }

    #[test]
    fn test_operator_separated_from_version() {
        assert!(version_satisfies("5.3.2", ">= 5.0.0"));
        assert!(version_satisfies("5.3.2", ">= 5.0.0 < 6.0.0"));
        assert!(!version_satisfies("5.3.2", "< 5.0.0"));
        assert!(!version_satisfies("5.3.2", ">="));
        assert!(!version_satisfies("5.3.2", ">= >= 5.0.0"));
    }

    #[test]
    fn test_instance_name() {
        assert_eq!(instance_name("BlockLib"), "blockLib");
        assert_eq!(instance_name("blockLib"), "blockLib");
        assert_eq!(instance_name(""), "");
    }

    #[test]
    fn test_interface_groups_methods_by_component() {
        let noop = plugin_method(|_, _| async { Ok(Value::Null) });
        let interface = PluginInterface::components("^5.0.0")
            .method("cyp", "a", noop.clone())
            .method("event", "b", noop.clone())
            .method("cyp", "c", noop);
        match interface.kind {
            PluginKind::Components(components) => {
                assert_eq!(components.len(), 2);
                assert_eq!(components[0].1.len(), 2);
            }
            PluginKind::FullClass => panic!("expected components"),
        }
    }

    #[test]
    fn test_registry_defines() {
        let registry = PluginRegistry::default();
        assert!(registry.defines("cyp", "sign"));
        assert!(!registry.defines("cyp", "getBandwidth"));
        assert!(!registry.defines("blockLib", "anything"));
    }
}
