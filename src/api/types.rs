//! API description types.
//!
//! These structs map to the entries of `api_aliases.json`. The file is
//! produced by catalog tooling and is loosely shaped, so every field is
//! optional and decoded leniently: a field with the wrong JSON type falls
//! back to its default instead of rejecting the whole function.

use std::fmt;

use indexmap::IndexMap;
use serde::de::{DeserializeOwned, Deserializer};
use serde::Deserialize;

/// One callable in one module.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FunctionSpec {
    /// Catalog action id
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<String>,
    /// First sign line shown in game
    #[serde(rename = "sign1", default, deserialize_with = "lenient")]
    pub signature1: Option<String>,
    /// Second sign line shown in game
    #[serde(rename = "sign2", default, deserialize_with = "lenient")]
    pub signature2: Option<String>,
    #[serde(rename = "gui", default, deserialize_with = "lenient")]
    pub gui_hint: Option<String>,
    /// Clickable GUI menu label
    #[serde(default, deserialize_with = "lenient")]
    pub menu: Option<String>,
    #[serde(default, deserialize_with = "alias_list")]
    pub aliases: Vec<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub description: Option<String>,
    /// Description still carrying `§` formatting codes
    #[serde(rename = "descriptionRaw", default, deserialize_with = "lenient")]
    pub rich_description: Option<String>,
    #[serde(rename = "params", default, deserialize_with = "lenient_items")]
    pub parameters: Vec<Parameter>,
    #[serde(rename = "enums", default, deserialize_with = "lenient_items")]
    pub enum_values: Vec<EnumValue>,
}

impl FunctionSpec {
    /// Parameter names joined for a call signature, e.g. `text, text2`.
    pub fn parameter_list(&self) -> String {
        self.parameters
            .iter()
            .map(|p| p.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Positional parameter slot.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Parameter {
    #[serde(default, deserialize_with = "lenient")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient")]
    pub mode: Option<ParamMode>,
    #[serde(default, deserialize_with = "lenient")]
    pub slot: Option<u32>,
}

/// Enumerated option selector.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EnumValue {
    #[serde(default, deserialize_with = "lenient")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient")]
    pub slot: Option<u32>,
    /// Option label -> click index
    #[serde(default, deserialize_with = "lenient")]
    pub options: IndexMap<String, i64>,
}

/// How a parameter slot is filled.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum ParamMode {
    Text,
    Number,
    Location,
    Array,
    Item,
    Any,
    Variable,
    /// Unrecognised mode, kept verbatim for display
    Other(String),
}

impl From<String> for ParamMode {
    fn from(raw: String) -> Self {
        match raw.to_ascii_uppercase().as_str() {
            "TEXT" => ParamMode::Text,
            "NUMBER" => ParamMode::Number,
            "LOCATION" => ParamMode::Location,
            "ARRAY" => ParamMode::Array,
            "ITEM" => ParamMode::Item,
            "ANY" => ParamMode::Any,
            "VARIABLE" => ParamMode::Variable,
            _ => ParamMode::Other(raw),
        }
    }
}

impl fmt::Display for ParamMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ParamMode::Text => "TEXT",
            ParamMode::Number => "NUMBER",
            ParamMode::Location => "LOCATION",
            ParamMode::Array => "ARRAY",
            ParamMode::Item => "ITEM",
            ParamMode::Any => "ANY",
            ParamMode::Variable => "VARIABLE",
            ParamMode::Other(raw) => raw,
        };
        f.write_str(s)
    }
}

fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Keeps well-formed items of a list, drops the rest.
fn lenient_items<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let serde_json::Value::Array(items) = value else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

/// Alias lists keep only non-empty strings.
fn alias_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let serde_json::Value::Array(items) = value else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter_map(|item| match item {
            serde_json::Value::String(s) if !s.is_empty() => Some(s),
            _ => None,
        })
        .collect())
}
