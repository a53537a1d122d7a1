//! Error types for runfile

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for runfile operations
pub type Result<T> = std::result::Result<T, RunfileError>;

/// Main error type for runfile
#[derive(Error, Debug)]
pub enum RunfileError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Task graph construction and planning errors
    #[error("{0}")]
    Graph(#[from] GraphError),

    /// Task execution errors
    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),

    /// Cache store errors
    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    /// Variable interpolation errors
    #[error("Interpolation error: {0}")]
    Interpolation(#[from] InterpolationError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// YAML parsing errors
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Exit code for an invocation where every reached task was still
/// cache-valid and nothing ran.
pub const EXIT_NOTHING_TO_DO: i32 = 3;

/// Exit code for errors that abort before any task executes.
pub const EXIT_CONFIG: i32 = 2;

impl RunfileError {
    /// Map this error to a process exit code.
    ///
    /// A failing task forwards its own exit code (1 when the body was
    /// killed by a signal); everything that aborts before execution
    /// begins exits with [`EXIT_CONFIG`].
    pub fn exit_code(&self) -> i32 {
        match self {
            RunfileError::Execution(ExecutionError::TaskFailed { code, .. }) => code.unwrap_or(1),
            RunfileError::Execution(_) => 1,
            _ => EXIT_CONFIG,
        }
    }
}

/// Configuration parsing and validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to find a Runfile (searched: {0})")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Task name '{0}' can only contain alphanumeric characters and underscores")]
    InvalidTaskName(String),

    #[error("Task '{task}' has an invalid expires value '{value}'")]
    InvalidExpiry { task: String, value: String },

    #[error("Task '{0}' has an empty interpreter")]
    EmptyInterpreter(String),
}

/// Graph construction and scheduling errors
#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Duplicate task name: {0}")]
    DuplicateTask(String),

    #[error("Task '{task}' references unknown task '{reference}'")]
    UnknownReference { task: String, reference: String },

    #[error("Task loop detected: {0}")]
    Cycle(String),

    #[error("Target not found: {0}")]
    UnknownTarget(String),
}

/// Task execution errors
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Task '{name}' failed with exit code {code:?}")]
    TaskFailed {
        name: String,
        code: Option<i32>,
        output: String,
    },

    #[error("Failed to launch interpreter for task '{name}': {error}")]
    Spawn { name: String, error: String },

    #[error("Failed to read value mutations for task '{name}': {error}")]
    Values { name: String, error: String },
}

/// Cache store errors
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cache file {path} is unreadable: {error}")]
    Corrupt { path: PathBuf, error: String },

    #[error("Failed to write cache file {path}: {error}")]
    Write { path: PathBuf, error: String },
}

/// Variable interpolation errors
#[derive(Error, Debug)]
pub enum InterpolationError {
    #[error("Variable '{0}' is not defined")]
    UndefinedVariable(String),

    #[error("Recursive interpolation detected")]
    RecursiveInterpolation,
}

/// Specialized result type for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Specialized result type for graph operations
pub type GraphResult<T> = std::result::Result<T, GraphError>;

/// Specialized result type for execution operations
pub type ExecutionResult<T> = std::result::Result<T, ExecutionError>;

/// Specialized result type for cache operations
pub type CacheResult<T> = std::result::Result<T, CacheError>;

/// Specialized result type for interpolation operations
pub type InterpolationResult<T> = std::result::Result<T, InterpolationError>;
