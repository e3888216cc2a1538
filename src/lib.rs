//! cmdtree - A declarative command tree builder
//!
//! Describe a tree of groups and commands with typed options, then hand it
//! argv tokens and an environment mapping. cmdtree resolves option values
//! (argv over environment over defaults), validates them, runs plugin
//! middleware and dispatches to the matching command's handler.

// Public modules
pub mod cli;
pub mod config;
pub mod error;
pub mod node;
pub mod option;
pub mod resolver;
pub mod runner;

// Re-export commonly used types
pub use error::{CliError, Result};
pub use node::{app, CommandSpec, Group, GroupSpec, Lifecycle, Next, Node, Outcome, Plugin};
pub use option::{OptionSpec, OptionType, Options, Value};
pub use resolver::{resolve, Env, ParsedArgs};

/// Current version of cmdtree
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
