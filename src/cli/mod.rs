//! CLI interface and argument parsing
//!
//! This module handles cmdtree's own flags, logging setup and the hand-off
//! of the remaining argv to the tree.

pub mod app;
pub mod logging;

// Re-export main types
pub use app::*;
pub use logging::*;
