//! Serialized form of the structure definition.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Top-level structure document. Both lower- and upper-case keys are accepted;
/// missing keys mean empty collections.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawStructure {
    #[serde(default, alias = "Solver")]
    pub solver: Vec<String>,
    /// One entry per solver: `{solver name: [ {section name: [field, ...]}, ... ]}`.
    #[serde(default, alias = "Parameters")]
    pub parameters: Vec<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawField {
    #[serde(rename = "Name", alias = "name")]
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dialog: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_suffix: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub list: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<RawField>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<RawField>,
}
