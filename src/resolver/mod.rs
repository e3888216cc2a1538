//! Argument resolution
//!
//! This module turns raw argv tokens plus an optional environment mapping
//! into a typed, validated [`ParsedArgs`] record.
//!
//! Layers are applied in order, each overriding the previous one:
//! declared defaults, then environment variables, then argv.

pub mod args;
pub mod casing;
pub mod coerce;
pub mod lexer;

// Re-export main types
pub use args::*;
pub use casing::*;
pub use coerce::*;
pub use lexer::*;

use crate::error::{ValidationError, ValidationResult};
use crate::option::Options;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Environment variables, keyed by their (usually upper case) names
pub type Env = HashMap<String, String>;

/// Layer of declared defaults
fn default_layer(params: &Options) -> BTreeMap<String, RawValue> {
    params
        .iter()
        .filter_map(|(key, option)| {
            option
                .default_value()
                .map(|value| (key.clone(), RawValue::Typed(value.clone())))
        })
        .collect()
}

/// Layer of environment variables matching a declared option
///
/// `LOG_LEVEL` satisfies the option `log-level`. Empty values count as absent.
fn env_layer(env: Option<&Env>, params: &Options) -> BTreeMap<String, RawValue> {
    let mut layer = BTreeMap::new();

    let Some(env) = env else {
        return layer;
    };

    // Sorted so that two names mapping to one key resolve the same way every run
    let mut names: Vec<&String> = env.keys().collect();
    names.sort();

    for name in names {
        let key = env_to_option_key(name);
        let value = &env[name];

        if params.contains_key(&key) && !value.is_empty() {
            layer.insert(key, RawValue::Text(value.clone()));
        }
    }

    layer
}

/// Resolve `argv` against `options`
///
/// Option keys may be declared in either casing; they are matched against
/// argv and the environment in hyphenated form and returned in camel case.
pub fn resolve(argv: &[String], options: &Options, env: Option<&Env>) -> ValidationResult<ParsedArgs> {
    let params: Options = options
        .iter()
        .map(|(key, option)| (to_kebab_case(key), option.clone()))
        .collect();

    let tokens = tokenize(argv, &params);

    let mut raw = default_layer(&params);
    let env_values = env_layer(env, &params);
    debug!(
        defaults = raw.len(),
        environment = env_values.len(),
        argv = tokens.values.len(),
        "layering option values"
    );
    raw.extend(env_values);
    raw.extend(tokens.values);

    if let Some(unknown) = raw.keys().find(|key| !params.contains_key(key)) {
        return Err(ValidationError::UnknownOption(unknown.clone()));
    }

    let mut values = BTreeMap::new();

    for (key, option) in &params {
        let Some(value) = raw.remove(key) else {
            if option.is_required() {
                return Err(ValidationError::RequiredOptionMissing(key.clone()));
            }
            continue;
        };

        let value = coerce(key, value, option)?;

        if !option.accepts(&value) {
            return Err(ValidationError::InvalidValue(key.clone()));
        }

        values.insert(to_camel_case(key), value);
    }

    Ok(ParsedArgs::new(tokens.positional, tokens.passthrough, values))
}

/// Check that every required option in `options` has a value in `args`
pub fn ensure_required(args: &ParsedArgs, options: &Options) -> ValidationResult<()> {
    for (key, option) in options {
        if option.is_required() && !args.contains(&to_camel_case(key)) {
            return Err(ValidationError::RequiredOptionMissing(key.clone()));
        }
    }

    Ok(())
}
