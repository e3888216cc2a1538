//! Error types for cmdtree

use crate::option::OptionType;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for cmdtree operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Main error type for cmdtree
#[derive(Error, Debug)]
pub enum CliError {
    /// Argument resolution errors
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Group dispatch errors
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    /// Invalid tree or option definitions
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Failures raised by handlers and plugin middleware
    #[error(transparent)]
    Action(#[from] anyhow::Error),

    /// Shell command errors
    #[error("Run error: {0}")]
    Run(#[from] RunError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// YAML parsing errors
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Errors produced while turning argv into a typed argument record
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("unknown option '{0}'")]
    UnknownOption(String),

    #[error("option '{option}' must be a {expected}")]
    TypeCoercion { option: String, expected: OptionType },

    #[error("option '{0}' must be specified only once")]
    MultipleValues(String),

    #[error("option '{0}' has invalid value")]
    InvalidValue(String),

    #[error("option '{0}' is required")]
    RequiredOptionMissing(String),
}

/// Errors produced while routing a command line to a child node
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    #[error("command required")]
    CommandRequired,
}

/// Tree definition and configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to find tree file (searched: {0})")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Node name must not be empty")]
    EmptyName,

    #[error("Default value of option '{option}' does not match its type '{expected}'")]
    DefaultTypeMismatch { option: String, expected: OptionType },

    #[error("Group '{group}' has more than one child named '{child}'")]
    DuplicateChild { group: String, child: String },

    #[error("Group '{0}' has more than one default child")]
    MultipleDefaults(String),

    #[error("Option name '{0}' is reserved")]
    ReservedOptionName(String),

    #[error("Failed to include file '{path}': {error}")]
    IncludeFile { path: PathBuf, error: String },
}

/// Shell command errors raised by tree-defined `run` templates
#[derive(Error, Debug)]
pub enum RunError {
    #[error("Command failed with exit code {0:?}")]
    CommandFailed(Option<i32>),

    #[error("Failed to spawn '{program}': {error}")]
    Spawn { program: String, error: String },
}

/// Specialized result type for argument resolution
pub type ValidationResult<T> = std::result::Result<T, ValidationError>;

/// Specialized result type for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Specialized result type for shell execution
pub type RunResult<T> = std::result::Result<T, RunError>;

impl CliError {
    /// Returns the resolution error, if this is one
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            CliError::Validation(err) => Some(err),
            _ => None,
        }
    }

    /// Returns the dispatch error, if this is one
    pub fn as_dispatch(&self) -> Option<&DispatchError> {
        match self {
            CliError::Dispatch(err) => Some(err),
            _ => None,
        }
    }
}
