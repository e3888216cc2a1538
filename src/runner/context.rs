//! Execution context for tree-defined commands
//!
//! The context is the value handed to every handler of a YAML tree. It holds
//! what a shell command needs besides its resolved arguments.

use std::env;
use std::path::PathBuf;

/// Shell settings shared by every command of a tree
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Directory commands run in
    pub working_dir: PathBuf,

    /// Tree file the commands came from
    pub config_path: Option<PathBuf>,

    /// Program and leading args each command string is appended to
    pub interpreter: Vec<String>,
}

impl RunContext {
    /// Create a new context with default settings
    pub fn new() -> Self {
        RunContext {
            working_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_path: None,
            interpreter: vec!["sh".to_string(), "-c".to_string()],
        }
    }

    /// Create a context with a specific working directory
    pub fn with_working_dir(mut self, dir: PathBuf) -> Self {
        self.working_dir = dir;
        self
    }

    /// Set the tree file path
    pub fn with_config_path(mut self, path: PathBuf) -> Self {
        self.config_path = Some(path);
        self
    }

    /// Set the interpreter
    pub fn with_interpreter(mut self, interpreter: Vec<String>) -> Self {
        self.interpreter = interpreter;
        self
    }

    /// Get the directory of the tree file (or the working dir)
    pub fn config_dir(&self) -> PathBuf {
        self.config_path
            .as_ref()
            .and_then(|p| p.parent())
            .filter(|p| !p.as_os_str().is_empty())
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| self.working_dir.clone())
    }
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new()
    }
}
