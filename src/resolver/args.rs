//! Resolved argument record

use crate::option::Value;
use serde::Serialize;
use std::collections::BTreeMap;

/// Fully typed arguments handed to plugins and handlers
///
/// Values are keyed in camel case (`logLevel`). `positional` holds the words
/// left after flag scanning stopped, `passthrough` everything after `--`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParsedArgs {
    pub positional: Vec<String>,
    pub passthrough: Vec<String>,
    #[serde(flatten)]
    values: BTreeMap<String, Value>,
}

impl ParsedArgs {
    pub fn new(
        positional: Vec<String>,
        passthrough: Vec<String>,
        values: BTreeMap<String, Value>,
    ) -> Self {
        ParsedArgs {
            positional,
            passthrough,
            values,
        }
    }

    /// Set a value
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    pub fn get_number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(Value::as_number)
    }

    pub fn get_array(&self, key: &str) -> Option<&[String]> {
        self.get(key).and_then(Value::as_array)
    }

    /// All typed values
    pub fn values(&self) -> &BTreeMap<String, Value> {
        &self.values
    }

    /// Copy of the values whose keys are listed, without positional or
    /// passthrough tokens
    pub fn pick<S: AsRef<str>>(&self, keys: impl IntoIterator<Item = S>) -> ParsedArgs {
        let values = keys
            .into_iter()
            .filter_map(|key| self.values.get_key_value(key.as_ref()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        ParsedArgs {
            values,
            ..Default::default()
        }
    }
}
