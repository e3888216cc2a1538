//! Tree definition validation
//!
//! Checks that only make sense for YAML definitions. Name, default and child
//! rules shared with programmatic trees are enforced while the tree is built.

use crate::config::types::{NodeConfig, NodeKind, TreeConfig};
use crate::error::{ConfigError, ConfigResult};

/// Validate a complete tree definition
pub fn validate_config(config: &TreeConfig) -> ConfigResult<()> {
    if let Some(interpreter) = &config.interpreter {
        if interpreter.is_empty() || interpreter[0].trim().is_empty() {
            return Err(ConfigError::Invalid(
                "interpreter must name a program".to_string(),
            ));
        }
    }

    for node in &config.children {
        validate_node(node, &node.name)?;
    }

    Ok(())
}

/// Validate a node and its subtree; `path` is used in messages
fn validate_node(node: &NodeConfig, path: &str) -> ConfigResult<()> {
    if node.include.is_some() {
        return Err(ConfigError::Invalid(format!(
            "'{}' still has an unresolved include",
            path
        )));
    }

    for (key, option) in &node.options {
        if key.trim().is_empty() {
            return Err(ConfigError::Invalid(format!(
                "'{}' declares an option with an empty name",
                path
            )));
        }
        if let Some(default) = &option.default {
            if !option.choices.is_empty() && !option.to_spec().accepts(default) {
                return Err(ConfigError::Invalid(format!(
                    "default of option '{}' in '{}' is not one of its choices",
                    key, path
                )));
            }
        }
    }

    if node.kind() == NodeKind::Group {
        if !node.run.is_empty() {
            return Err(ConfigError::Invalid(format!(
                "group '{}' cannot have run commands",
                path
            )));
        }
        for child in node.children.iter().flatten() {
            validate_node(child, &format!("{} {}", path, child.name))?;
        }
    }

    Ok(())
}
