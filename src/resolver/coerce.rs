//! Type coercion
//!
//! Turns a raw layered value into the typed value its option declares.

use crate::error::{ValidationError, ValidationResult};
use crate::option::{OptionSpec, OptionType, Value};
use crate::resolver::lexer::RawValue;
use regex::Regex;
use std::sync::OnceLock;

fn decimal_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[-+]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][-+]?\d+)?$").unwrap())
}

fn hex_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^0[xX][0-9a-fA-F]+$").unwrap())
}

/// Parse a numeric literal
///
/// Accepts an optional sign, integer or decimal digits, an optional exponent,
/// or a `0x`-prefixed hexadecimal integer. Anything else is rejected.
pub fn parse_number(text: &str) -> Option<f64> {
    if hex_pattern().is_match(text) {
        return Some(
            text[2..]
                .chars()
                .filter_map(|c| c.to_digit(16))
                .fold(0.0, |acc, digit| acc * 16.0 + digit as f64),
        );
    }

    if decimal_pattern().is_match(text) {
        return text.parse::<f64>().ok();
    }

    None
}

/// Coerce `raw` to the type of `option`
///
/// Booleans treat every text except the literal `false` as true. Only array
/// options may receive more than one occurrence.
pub fn coerce(key: &str, raw: RawValue, option: &OptionSpec) -> ValidationResult<Value> {
    let expected = option.option_type();
    let mismatch = || ValidationError::TypeCoercion {
        option: key.to_string(),
        expected,
    };

    if expected != OptionType::Array {
        if let RawValue::Repeated(_) = raw {
            return Err(ValidationError::MultipleValues(key.to_string()));
        }
    }

    match (expected, raw) {
        (OptionType::Boolean, RawValue::Switch(b)) => Ok(Value::Boolean(b)),
        (OptionType::Boolean, RawValue::Text(text)) => Ok(Value::Boolean(text != "false")),

        (OptionType::Number, RawValue::Text(text)) => {
            parse_number(&text).map(Value::Number).ok_or_else(mismatch)
        }

        (OptionType::String, RawValue::Text(text)) => Ok(Value::String(text)),

        (OptionType::Array, RawValue::Text(text)) => Ok(Value::Array(vec![text])),
        (OptionType::Array, RawValue::Repeated(items)) => Ok(Value::Array(items)),
        (OptionType::Array, RawValue::Typed(Value::String(text))) => Ok(Value::Array(vec![text])),

        (_, RawValue::Typed(value)) if value.fits(expected) => Ok(value),

        _ => Err(mismatch()),
    }
}
