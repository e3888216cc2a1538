//! Tree definition types
//!
//! This module defines the data structures that represent a cmdtree.yml file.

use crate::option::{OptionSpec, OptionType, Value};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Top-level tree definition; the root group
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TreeConfig {
    /// Application name (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Usage line for the root group
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,

    /// Longer description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Options parsed by the root group
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, OptionConfig>,

    /// Commands and groups under the root
    #[serde(default)]
    pub children: Vec<NodeConfig>,

    /// Interpreter for `run` templates (e.g., ["bash", "-c"])
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interpreter: Option<Vec<String>>,
}

/// A command or group definition
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct NodeConfig {
    /// Name matched against the first positional token
    #[serde(default)]
    pub name: String,

    /// Run this node when the parent gets no subcommand
    #[serde(default)]
    pub default: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, OptionConfig>,

    /// Present on groups only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<NodeConfig>>,

    /// Shell templates run by a command
    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        deserialize_with = "deserialize_run"
    )]
    pub run: Vec<String>,

    /// Load this node's definition from another file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include: Option<String>,
}

/// Kind of node a definition describes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Command,
    Group,
}

impl NodeConfig {
    /// A definition with `children` is a group, anything else a command
    pub fn kind(&self) -> NodeKind {
        if self.children.is_some() {
            NodeKind::Group
        } else {
            NodeKind::Command
        }
    }
}

/// An option definition
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OptionConfig {
    /// Option type (string, boolean, number, array)
    #[serde(rename = "type", default)]
    pub option_type: OptionType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub required: bool,

    /// Accepted values; every array element must be one of them
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<String>,
}

impl OptionConfig {
    /// Convert into an option descriptor
    pub fn to_spec(&self) -> OptionSpec {
        let mut spec = OptionSpec::new(self.option_type);

        if let Some(default) = &self.default {
            spec = spec.with_default(default.clone());
        }
        if let Some(description) = &self.description {
            spec = spec.with_description(description.clone());
        }
        if self.required {
            spec = spec.required();
        }
        if !self.choices.is_empty() {
            let choices = self.choices.clone();
            spec = spec.with_validator(move |value| match value {
                Value::Array(items) => items.iter().all(|item| choices.contains(item)),
                other => choices.contains(&other.to_string()),
            });
        }

        spec
    }
}

/// Custom deserializer for run templates that handles both single values and arrays
fn deserialize_run<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;
    use serde_yaml::Value;

    let value = Value::deserialize(deserializer)?;

    match value {
        // Single template
        Value::String(s) => Ok(vec![s]),
        // List of templates
        Value::Sequence(seq) => seq
            .into_iter()
            .map(|item| match item {
                Value::String(s) => Ok(s),
                _ => Err(D::Error::custom("run entries must be strings")),
            })
            .collect(),
        // Null or not present
        Value::Null => Ok(Vec::new()),
        _ => Err(D::Error::custom("run must be a string or array")),
    }
}
