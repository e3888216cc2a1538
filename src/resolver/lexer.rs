//! Argv tokenizer
//!
//! Splits raw tokens into positional words, flag values and passthrough
//! tokens. Scanning stops at the first positional word: it and everything
//! after it stay positional so a group can hand them to a child untouched.
//!
//! Recognized shapes:
//! - `--key value`, `--key=value`: value flags (string, number, array)
//! - `--key`, `--key=false`, `--key true|false`, `--no-key`: boolean flags
//! - `-abc`: short cluster, every letter a flag; the last one may take a value
//! - `--`: everything after it is passthrough and never parsed

use crate::option::{OptionType, Options, Value};
use std::collections::BTreeMap;
use tracing::trace;

/// Untyped value of one option before coercion
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    /// A single textual occurrence (argv or environment)
    Text(String),
    /// A boolean flag occurrence
    Switch(bool),
    /// Two or more textual occurrences
    Repeated(Vec<String>),
    /// A declared default, already typed
    Typed(Value),
}

/// Result of tokenizing one argv sequence
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tokens {
    pub positional: Vec<String>,
    pub passthrough: Vec<String>,
    pub values: BTreeMap<String, RawValue>,
}

/// Whether a token looks like the start of another flag
fn looks_like_flag(token: &str) -> bool {
    let mut chars = token.chars();
    match (chars.next(), chars.next(), chars.next()) {
        (Some('-'), Some(c), _) if c != '-' => true,
        (Some('-'), Some('-'), Some(c)) => c != '-',
        _ => false,
    }
}

fn looks_like_number(token: &str) -> bool {
    token.len() > 1 && token.starts_with('-') && token[1..].starts_with(|c: char| c.is_ascii_digit() || c == '.')
}

struct Lexer<'a> {
    params: &'a Options,
    tokens: Tokens,
}

impl<'a> Lexer<'a> {
    fn option_type(&self, key: &str) -> Option<OptionType> {
        self.params.get(key).map(|o| o.option_type())
    }

    fn is_boolean(&self, key: &str) -> bool {
        self.option_type(key) == Some(OptionType::Boolean)
    }

    fn set(&mut self, key: &str, value: RawValue) {
        trace!(key, ?value, "token");

        let overwrite = self.is_boolean(key) || matches!(value, RawValue::Switch(_));
        let entry = self.tokens.values.remove(key);

        let merged = match (entry, value) {
            (None, value) => value,
            (Some(_), value) if overwrite => value,
            (Some(RawValue::Text(first)), RawValue::Text(second)) => {
                RawValue::Repeated(vec![first, second])
            }
            (Some(RawValue::Repeated(mut items)), RawValue::Text(next)) => {
                items.push(next);
                RawValue::Repeated(items)
            }
            (Some(_), value) => value,
        };

        self.tokens.values.insert(key.to_string(), merged);
    }

    /// Set `key` from an explicit `key=value` occurrence
    fn set_inline(&mut self, key: &str, value: &str) {
        if self.is_boolean(key) {
            self.set(key, RawValue::Switch(value != "false"));
        } else {
            self.set(key, RawValue::Text(value.to_string()));
        }
    }

    /// Set `key` from a bare occurrence, consuming the following token when
    /// the flag takes a value. Returns whether `next` was consumed.
    fn set_bare(&mut self, key: &str, next: Option<&String>) -> bool {
        match self.option_type(key) {
            Some(OptionType::Boolean) => match next.map(String::as_str) {
                Some(literal @ ("true" | "false")) => {
                    self.set(key, RawValue::Switch(literal == "true"));
                    true
                }
                _ => {
                    self.set(key, RawValue::Switch(true));
                    false
                }
            },
            ty => {
                let takes = match next {
                    Some(n) if !looks_like_flag(n) => true,
                    Some(n) => ty == Some(OptionType::Number) && looks_like_number(n),
                    None => false,
                };

                match (takes, next) {
                    (true, Some(n)) => {
                        self.set(key, RawValue::Text(n.clone()));
                        true
                    }
                    // Undeclared keys are recorded so resolution can reject them
                    _ if ty.is_none() => {
                        self.set(key, RawValue::Switch(true));
                        false
                    }
                    _ => {
                        self.set(key, RawValue::Text(String::new()));
                        false
                    }
                }
            }
        }
    }

    fn long(&mut self, body: &str, next: Option<&String>) -> bool {
        if let Some((key, value)) = body.split_once('=') {
            self.set_inline(key, value);
            return false;
        }

        if !self.params.contains_key(body) {
            if let Some(negated) = body.strip_prefix("no-") {
                if self.is_boolean(negated) {
                    self.set(negated, RawValue::Switch(false));
                    return false;
                }
            }
        }

        self.set_bare(body, next)
    }

    fn short(&mut self, letters: &str, next: Option<&String>) -> bool {
        let chars: Vec<(usize, char)> = letters.char_indices().collect();

        for (pos, &(offset, letter)) in chars.iter().enumerate() {
            let key = letter.to_string();
            let rest = &letters[offset + letter.len_utf8()..];

            if let Some(value) = rest.strip_prefix('=') {
                self.set_inline(&key, value);
                return false;
            }

            if pos + 1 == chars.len() {
                return self.set_bare(&key, next);
            }

            if self.is_boolean(&key) || self.option_type(&key).is_none() {
                self.set(&key, RawValue::Switch(true));
            } else {
                // A value letter inside a cluster swallows the rest: `-n5`
                self.set(&key, RawValue::Text(rest.to_string()));
                return false;
            }
        }

        false
    }

    fn run(mut self, argv: &[String]) -> Tokens {
        let (args, passthrough) = match argv.iter().position(|t| t == "--") {
            Some(idx) => (&argv[..idx], &argv[idx + 1..]),
            None => (argv, &argv[argv.len()..]),
        };
        self.tokens.passthrough = passthrough.to_vec();

        let mut i = 0;
        while i < args.len() {
            let arg = &args[i];
            let next = args.get(i + 1);

            let consumed = if let Some(body) = arg.strip_prefix("--").filter(|b| !b.is_empty()) {
                self.long(body, next)
            } else if let Some(letters) = arg.strip_prefix('-').filter(|l| !l.is_empty()) {
                self.short(letters, next)
            } else {
                self.tokens.positional.extend(args[i..].iter().cloned());
                break;
            };

            i += if consumed { 2 } else { 1 };
        }

        self.tokens
    }
}

/// Tokenize `argv` against options keyed in hyphenated form
pub fn tokenize(argv: &[String], params: &Options) -> Tokens {
    Lexer {
        params,
        tokens: Tokens::default(),
    }
    .run(argv)
}
