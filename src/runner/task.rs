//! Runtime task representation
//!
//! Tasks are built once from the parsed Runfile records and stay
//! immutable for the lifetime of the invocation.

use crate::config;
use crate::error::{ConfigError, ConfigResult};
use crate::utils::parse_duration;
use std::time::Duration;

/// The wildcard token in an `invalidates` list
pub const WILDCARD: &str = "*";

/// Caching policy for a task.
///
/// `Always` and `Never` are deliberately distinct variants: an absent
/// `expires` key means "always run", the literal `never` means "run once,
/// forever valid", and neither is inferred from the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expires {
    /// Never cached: the task runs every time it is reached (default)
    Always,

    /// Run at most once; a successful result never goes stale
    Never,

    /// A successful result stays valid for this long
    After(Duration),
}

/// A single entry in a task's `invalidates` list.
///
/// The wildcard is a tagged variant rather than a sentinel string; task
/// names cannot contain `*`, so there is no ambiguity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invalidation {
    /// Clear the cached result of one named task
    Named(String),

    /// Clear every task's cached result
    All,
}

/// Runtime task: one unit of work in the graph
#[derive(Debug, Clone)]
pub struct Task {
    /// Unique task name
    pub name: String,

    /// One-line description for listings
    pub description: Option<String>,

    /// Tasks that must be resolved (executed or cache-valid) first,
    /// in declared order
    pub requires: Vec<String>,

    /// Caching policy
    pub expires: Expires,

    /// Cached results cleared when this task succeeds
    pub invalidates: Vec<Invalidation>,

    /// Interpreter argv prefix; the script is appended as the last argument
    pub interpreter: Vec<String>,

    /// Working directory for the body, relative to the invocation directory
    pub workdir: Option<String>,

    /// The body script
    pub script: String,
}

impl Task {
    /// Build a runtime task from a parsed Runfile record.
    ///
    /// `default_interpreter` is the Runfile-level interpreter, if any.
    pub fn from_config(
        name: String,
        config: config::Task,
        default_interpreter: Option<&config::Interpreter>,
    ) -> ConfigResult<Self> {
        validate_name(&name)?;

        let expires = match config.expires.as_deref() {
            None => Expires::Always,
            Some(s) if s.eq_ignore_ascii_case("never") => Expires::Never,
            Some(s) => match parse_duration(s) {
                Some(d) => Expires::After(d),
                None => {
                    return Err(ConfigError::InvalidExpiry {
                        task: name,
                        value: s.to_string(),
                    })
                }
            },
        };

        let invalidates = config
            .invalidates
            .into_iter()
            .map(|target| {
                if target == WILDCARD {
                    Invalidation::All
                } else {
                    Invalidation::Named(target)
                }
            })
            .collect();

        let interpreter = resolve_interpreter(
            &name,
            config.interpreter.as_ref().or(default_interpreter),
        )?;

        Ok(Task {
            name,
            description: config.description,
            requires: config.requires,
            expires,
            invalidates,
            interpreter,
            workdir: config.workdir,
            script: config.run,
        })
    }

    /// Whether this task clears every cached result on success
    pub fn invalidates_all(&self) -> bool {
        self.invalidates.contains(&Invalidation::All)
    }
}

/// Task names can only contain alphanumeric characters and underscores
fn validate_name(name: &str) -> ConfigResult<()> {
    if name.is_empty()
        || !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(ConfigError::InvalidTaskName(name.to_string()));
    }
    Ok(())
}

/// Resolve an interpreter specification to an argv prefix.
///
/// Bare tags get the flag their interpreter expects for inline scripts;
/// shells additionally get `-e` so a failing line fails the body.
fn resolve_interpreter(
    task: &str,
    spec: Option<&config::Interpreter>,
) -> ConfigResult<Vec<String>> {
    let argv = match spec {
        None => vec!["sh".to_string(), "-ec".to_string()],
        Some(config::Interpreter::Tag(tag)) => {
            let flag = match tag.as_str() {
                "sh" | "bash" | "zsh" | "dash" => "-ec",
                "node" => "-e",
                _ => "-c",
            };
            vec![tag.clone(), flag.to_string()]
        }
        Some(config::Interpreter::Argv(argv)) => argv.clone(),
    };

    if argv.is_empty() || argv[0].is_empty() {
        return Err(ConfigError::EmptyInterpreter(task.to_string()));
    }

    Ok(argv)
}
