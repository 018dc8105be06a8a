//! JSON ABI descriptions (functions, events, errors, constructors)

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::encode::function_selector;
use super::types::ParamType;
use crate::SdkError;

/// One parameter of an ABI entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiParam {
    /// Parameter name, may be empty
    #[serde(default)]
    pub name: String,
    /// Type tag, `tuple` / `tuple[]` when `components` are used
    #[serde(rename = "type")]
    pub kind: String,
    /// Members of a tuple type
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<AbiParam>,
    /// Indexed event argument
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub indexed: bool,
}

impl AbiParam {
    /// Build a plain parameter
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        AbiParam { name: name.into(), kind: kind.into(), components: Vec::new(), indexed: false }
    }

    /// Resolved parameter type
    pub fn param_type(&self) -> Result<ParamType, SdkError> {
        match self.kind.strip_prefix("tuple") {
            Some(suffix) if !self.components.is_empty() => {
                let members = self
                    .components
                    .iter()
                    .map(AbiParam::param_type)
                    .collect::<Result<Vec<_>, _>>()?;
                let inner = ParamType::Tuple(members).to_string();
                ParamType::parse(&format!("{}{}", inner, suffix))
            }
            _ => ParamType::parse(&self.kind),
        }
    }
}

/// Kind of ABI entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Callable function
    Function,
    /// Deployment constructor
    Constructor,
    /// Event
    Event,
    /// Custom error
    Error,
    /// Fallback function
    Fallback,
    /// Receive function
    Receive,
}

/// One ABI entry
///
/// Nodes return entry types and mutabilities capitalised (`Function`,
/// `View`); both spellings are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiEntry {
    /// Entry type tag
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    /// Entry name
    #[serde(default)]
    pub name: String,
    /// Inputs
    #[serde(default)]
    pub inputs: Vec<AbiParam>,
    /// Outputs
    #[serde(default)]
    pub outputs: Vec<AbiParam>,
    /// `pure`, `view`, `nonpayable` or `payable`
    #[serde(rename = "stateMutability", default, skip_serializing_if = "Option::is_none")]
    pub state_mutability: Option<String>,
    /// Legacy constant flag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constant: Option<bool>,
    /// Legacy payable flag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payable: Option<bool>,
    /// Anonymous event
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub anonymous: bool,
}

impl AbiEntry {
    /// Shorthand for a function entry
    pub fn function(name: &str, inputs: Vec<AbiParam>, outputs: Vec<AbiParam>, mutability: &str) -> Self {
        AbiEntry {
            kind: Some("function".into()),
            name: name.into(),
            inputs,
            outputs,
            state_mutability: Some(mutability.into()),
            constant: None,
            payable: None,
            anonymous: false,
        }
    }

    /// Entry kind; an absent type means function
    pub fn entry_kind(&self) -> EntryKind {
        match self.kind.as_deref().map(str::to_ascii_lowercase).as_deref() {
            Some("constructor") => EntryKind::Constructor,
            Some("event") => EntryKind::Event,
            Some("error") => EntryKind::Error,
            Some("fallback") => EntryKind::Fallback,
            Some("receive") => EntryKind::Receive,
            _ => EntryKind::Function,
        }
    }

    /// Read-only functions can be called without a transaction
    pub fn is_constant(&self) -> bool {
        match self.state_mutability.as_deref().map(str::to_ascii_lowercase).as_deref() {
            Some("view") | Some("pure") => true,
            Some(_) => false,
            None => self.constant.unwrap_or(false),
        }
    }

    /// Whether the function accepts a call value
    pub fn is_payable(&self) -> bool {
        match self.state_mutability.as_deref().map(str::to_ascii_lowercase).as_deref() {
            Some(m) => m == "payable",
            None => self.payable.unwrap_or(false),
        }
    }

    /// Input types in order
    pub fn input_types(&self) -> Result<Vec<ParamType>, SdkError> {
        self.inputs.iter().map(AbiParam::param_type).collect()
    }

    /// Output types in order
    pub fn output_types(&self) -> Result<Vec<ParamType>, SdkError> {
        self.outputs.iter().map(AbiParam::param_type).collect()
    }

    /// Canonical signature, `name(type1,type2)`
    pub fn signature(&self) -> Result<String, SdkError> {
        let types = self
            .input_types()?
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        Ok(format!("{}({})", self.name, types))
    }

    /// Four-byte selector of the canonical signature
    pub fn selector(&self) -> Result<[u8; 4], SdkError> {
        Ok(function_selector(&self.signature()?))
    }
}

/// Parse a JSON ABI: either an array of entries or a node's `{"entrys": [...]}`
pub fn parse_abi(value: &Value) -> Result<Vec<AbiEntry>, SdkError> {
    let entries = match value {
        Value::Array(_) => value.clone(),
        Value::Object(map) => map
            .get("entrys")
            .cloned()
            .ok_or_else(|| SdkError::invalid_input("Invalid ABI provided"))?,
        Value::String(s) => return parse_abi(&serde_json::from_str(s)?),
        _ => return Err(SdkError::invalid_input("Invalid ABI provided")),
    };
    Ok(serde_json::from_value(entries)?)
}
