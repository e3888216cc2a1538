//! Tree validation
//!
//! This module checks specs while the tree is constructed, so a built tree
//! never carries an ill-typed default or an ambiguous child.

use crate::error::{ConfigError, ConfigResult};
use crate::node::NodeSpec;
use crate::option::Options;
use crate::resolver::to_camel_case;
use std::collections::HashSet;

/// Keys that `ParsedArgs` keeps for its own fields
const RESERVED_KEYS: &[&str] = &["positional", "passthrough"];

/// Node names must be non-empty
pub fn validate_name(name: &str) -> ConfigResult<()> {
    if name.trim().is_empty() {
        return Err(ConfigError::EmptyName);
    }
    Ok(())
}

/// Every declared default must match its option's type
pub fn validate_defaults(options: &Options) -> ConfigResult<()> {
    for (key, option) in options {
        if let Some(default) = option.default_value() {
            if !default.fits(option.option_type()) {
                return Err(ConfigError::DefaultTypeMismatch {
                    option: key.clone(),
                    expected: option.option_type(),
                });
            }
        }
    }
    Ok(())
}

/// No option may shadow a reserved `ParsedArgs` field
pub fn validate_option_names(options: &Options) -> ConfigResult<()> {
    for (key, _) in options {
        if RESERVED_KEYS.contains(&to_camel_case(key).as_str()) {
            return Err(ConfigError::ReservedOptionName(key.clone()));
        }
    }
    Ok(())
}

/// Children of one group need unique names and at most one default
pub fn validate_children<C>(group: &str, children: &[NodeSpec<C>]) -> ConfigResult<()> {
    let mut names = HashSet::new();
    let mut has_default = false;

    for child in children {
        if !names.insert(child.name()) {
            return Err(ConfigError::DuplicateChild {
                group: group.to_string(),
                child: child.name().to_string(),
            });
        }

        if child.is_default() {
            if has_default {
                return Err(ConfigError::MultipleDefaults(group.to_string()));
            }
            has_default = true;
        }
    }

    Ok(())
}
