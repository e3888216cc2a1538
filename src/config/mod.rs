//! Tree definition files
//!
//! This module handles discovery and parsing of cmdtree.yml files, their
//! validation, and their conversion into a command tree.

pub mod parse;
pub mod schema;
pub mod tree;
pub mod types;

// Re-export main types
pub use parse::*;
pub use schema::*;
pub use tree::*;
pub use types::*;
