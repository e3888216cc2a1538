//! Variable interpolation for run templates
//!
//! This module replaces `${var}` references with resolved option values.

use crate::option::Value;
use crate::resolver::{casing, ParsedArgs};
use crate::runner::shell_quote;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::OnceLock;

fn var_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").unwrap())
}

/// Render a value as shell words
///
/// Array elements are quoted one by one so each stays a separate word.
fn shell_words(value: &Value) -> String {
    match value {
        Value::Array(items) => items
            .iter()
            .map(|item| shell_quote(item))
            .collect::<Vec<_>>()
            .join(" "),
        other => shell_quote(&other.to_string()),
    }
}

/// Variables visible to a template: every resolved value, quoted for the
/// shell, under its camel key and its kebab-case spelling
pub fn template_vars(args: &ParsedArgs) -> HashMap<String, String> {
    let mut vars = HashMap::new();
    for (key, value) in args.values() {
        let rendered = shell_words(value);
        vars.insert(casing::to_kebab_case(key), rendered.clone());
        vars.insert(key.clone(), rendered);
    }
    vars
}

/// Interpolate variables in a string
///
/// Every reference is replaced in a single pass. Unknown variables are left
/// as written and substituted text is never expanded again.
pub fn interpolate(s: &str, vars: &HashMap<String, String>) -> String {
    var_re()
        .replace_all(s, |caps: &Captures| match vars.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}
