//! runfile - a dependency-aware task runner
//!
//! A Runfile declares named tasks with `requires` edges, an `expires`
//! caching policy, and `invalidates` lists. The engine plans the minimal
//! execution order for a target, runs each body under its interpreter,
//! persists per-task success metadata across invocations, and threads
//! key/value state from a task to its dependents.

// Public modules
pub mod cli;
pub mod config;
pub mod error;
pub mod runner;
pub mod ui;
pub mod utils;

// Re-export commonly used types
pub use error::{Result, RunfileError};

/// Current version of runfile
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
