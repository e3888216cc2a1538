//! Key casing
//!
//! Options are matched in their readable hyphenated form (`log-level`) and
//! handed to handlers in programmatic camel form (`logLevel`).

use heck::{ToKebabCase, ToLowerCamelCase, ToUpperCamelCase};

/// Convert to hyphenated lower case: `logLevel` -> `log-level`
pub fn to_kebab_case(input: &str) -> String {
    input.to_kebab_case()
}

/// Convert to camel case: `log-level` -> `logLevel`
///
/// A word starting with a digit cannot open a hump, so it is joined with an
/// underscore: `retry-3-times` -> `retry_3Times`.
pub fn to_camel_case(input: &str) -> String {
    input
        .to_kebab_case()
        .split('-')
        .enumerate()
        .map(|(index, word)| match index {
            0 => word.to_lower_camel_case(),
            _ if word.starts_with(|c: char| c.is_ascii_digit()) => {
                format!("_{}", word.to_upper_camel_case())
            }
            _ => word.to_upper_camel_case(),
        })
        .collect()
}

/// Option key an environment variable name maps to: `LOG_LEVEL` -> `log-level`
pub fn env_to_option_key(name: &str) -> String {
    name.to_lowercase().to_kebab_case()
}
