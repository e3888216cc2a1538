//! Option model
//!
//! Describes the named parameters a node accepts: their type, default,
//! validator and whether they are required.

pub mod options;
pub mod types;

// Re-export main types
pub use options::*;
pub use types::*;
