//! Execution context
//!
//! The context carries the per-invocation state every component reads:
//! working directory, Runfile location, the value store, and verbosity.

use colored::Colorize;
use std::env;
use std::path::PathBuf;

use crate::runner::values::ValueStore;

/// Per-invocation execution state
pub struct Context {
    /// Directory the engine was invoked from
    pub working_dir: PathBuf,

    /// Path of the Runfile driving this invocation
    pub runfile_path: Option<PathBuf>,

    /// Cross-task key/value state
    pub values: ValueStore,

    /// Verbosity level
    pub verbosity: Verbosity,
}

/// Verbosity levels for output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Silent = 0,
    Quiet = 1,
    Normal = 2,
    Verbose = 3,
}

impl Context {
    /// Create a new context with default settings
    pub fn new() -> Self {
        Context {
            working_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            runfile_path: None,
            values: ValueStore::new(),
            verbosity: Verbosity::Normal,
        }
    }

    /// Use a specific working directory
    pub fn with_working_dir(mut self, dir: PathBuf) -> Self {
        self.working_dir = dir;
        self
    }

    /// Record the Runfile path
    pub fn with_runfile_path(mut self, path: PathBuf) -> Self {
        self.runfile_path = Some(path);
        self
    }

    /// Set verbosity level
    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Directory containing the Runfile (or the working dir)
    pub fn runfile_dir(&self) -> PathBuf {
        self.runfile_path
            .as_ref()
            .and_then(|p| p.parent())
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| self.working_dir.clone())
    }

    /// Print an informational message
    pub fn print_info(&self, message: &str) {
        if self.verbosity >= Verbosity::Normal {
            eprintln!("{}", message);
        }
    }

    /// Print an error message
    pub fn print_error(&self, message: &str) {
        if self.verbosity >= Verbosity::Quiet {
            eprintln!("{} {}", "error:".red().bold(), message);
        }
    }

    /// Print a warning message
    pub fn print_warning(&self, message: &str) {
        if self.verbosity >= Verbosity::Quiet {
            eprintln!("{} {}", "warning:".yellow().bold(), message);
        }
    }

    /// Print a debug message (only in verbose mode)
    pub fn print_debug(&self, message: &str) {
        if self.verbosity >= Verbosity::Verbose {
            eprintln!("{}", message.dimmed());
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
