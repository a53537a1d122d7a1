//! Runfile parsing
//!
//! This module is the thin adapter between the Runfile.yml document and
//! the execution engine: it discovers and parses the file into raw task
//! records. Validation of the records happens when the task graph is
//! built in [`crate::runner`].

pub mod parse;
pub mod types;

// Re-export main types
pub use parse::*;
pub use types::*;
