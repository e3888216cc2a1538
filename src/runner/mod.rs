//! Shell execution of tree-defined commands
//!
//! This module runs the `run` templates of YAML commands, including
//! variable interpolation and passthrough quoting.

pub mod command;
pub mod context;
pub mod interpolate;

// Re-export main types
pub use command::*;
pub use context::*;
pub use interpolate::*;
