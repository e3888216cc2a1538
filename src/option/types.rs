//! Core option types
//!
//! This module defines the descriptor for a single option and the typed
//! values options resolve to.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Primitive type of an option
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    /// Single string value
    #[default]
    String,

    /// Flag without a value
    #[serde(alias = "bool")]
    Boolean,

    /// Numeric value (integer, decimal, exponent or hexadecimal literal)
    Number,

    /// Repeatable string value
    Array,
}

impl OptionType {
    /// Name of the type as written in tree definitions
    pub fn as_str(&self) -> &'static str {
        match self {
            OptionType::String => "string",
            OptionType::Boolean => "boolean",
            OptionType::Number => "number",
            OptionType::Array => "array",
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved, typed option value
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Value {
    Boolean(bool),
    Number(f64),
    String(String),
    Array(Vec<String>),
}

impl Value {
    /// Whether this value may stand as a default for an option of type `ty`
    ///
    /// Array options also accept a single string, which is wrapped on resolution.
    pub fn fits(&self, ty: OptionType) -> bool {
        matches!(
            (ty, self),
            (OptionType::String, Value::String(_))
                | (OptionType::Boolean, Value::Boolean(_))
                | (OptionType::Number, Value::Number(_))
                | (OptionType::Array, Value::Array(_))
                | (OptionType::Array, Value::String(_))
        )
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[String]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => f.write_str(s),
            Value::Array(items) => f.write_str(&items.join(" ")),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<String>> for Value {
    fn from(items: Vec<String>) -> Self {
        Value::Array(items)
    }
}

/// User-supplied predicate run on a coerced value
pub type Validator = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// A single named parameter
///
/// The type is fixed at construction; the remaining builder methods only
/// attach metadata.
#[derive(Clone, Default)]
pub struct OptionSpec {
    option_type: OptionType,
    default: Option<Value>,
    description: Option<String>,
    required: bool,
    validate: Option<Validator>,
}

impl OptionSpec {
    /// Create an option of the given type
    pub fn new(option_type: OptionType) -> Self {
        OptionSpec {
            option_type,
            ..Default::default()
        }
    }

    pub fn string() -> Self {
        Self::new(OptionType::String)
    }

    pub fn boolean() -> Self {
        Self::new(OptionType::Boolean)
    }

    pub fn number() -> Self {
        Self::new(OptionType::Number)
    }

    pub fn array() -> Self {
        Self::new(OptionType::Array)
    }

    /// Set the default value
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Set the help description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Mark the option as required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Attach a validation predicate
    pub fn with_validator<F>(mut self, validate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.validate = Some(Arc::new(validate));
        self
    }

    pub fn option_type(&self) -> OptionType {
        self.option_type
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Run the validator, if any. Options without one accept every value.
    pub fn accepts(&self, value: &Value) -> bool {
        self.validate.as_ref().map_or(true, |validate| validate(value))
    }
}

impl fmt::Debug for OptionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionSpec")
            .field("option_type", &self.option_type)
            .field("default", &self.default)
            .field("description", &self.description)
            .field("required", &self.required)
            .field("validate", &self.validate.is_some())
            .finish()
    }
}
