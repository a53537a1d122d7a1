//! Core configuration types
//!
//! This module defines the data structures that represent a Runfile.yml
//! document. These are the raw parsed records; the runtime task
//! representation lives in [`crate::runner::task`].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Top-level configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Project name (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Project description (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Default interpreter for task bodies (e.g. ["bash", "-ec"])
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interpreter: Option<Interpreter>,

    /// Tasks defined in the Runfile
    #[serde(default)]
    pub tasks: HashMap<String, Task>,
}

/// A task definition
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Task {
    /// One-line description for listings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Names of tasks that must be resolved before this one runs
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<String>,

    /// Caching policy: absent (always run), "never" (run once), or a
    /// duration expression such as "30m" or "1h30m"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<String>,

    /// Task names whose cached results are cleared when this task
    /// succeeds; "*" clears every task
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub invalidates: Vec<String>,

    /// Interpreter override for this task's body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interpreter: Option<Interpreter>,

    /// Working directory for the body, relative to the Runfile
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workdir: Option<String>,

    /// The executable body
    #[serde(default, deserialize_with = "deserialize_script")]
    pub run: String,
}

/// An interpreter specification
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Interpreter {
    /// A bare tag such as "bash" or "python3"
    Tag(String),

    /// A full argv prefix such as ["bash", "-ec"]
    Argv(Vec<String>),
}

/// Custom deserializer for task bodies that accepts a single string or a
/// list of lines (joined with newlines)
fn deserialize_script<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;
    use serde_yaml::Value;

    let value = Value::deserialize(deserializer)?;

    match value {
        Value::String(s) => Ok(s),
        Value::Sequence(seq) => {
            let mut lines = Vec::with_capacity(seq.len());
            for item in seq {
                match item {
                    Value::String(s) => lines.push(s),
                    _ => return Err(D::Error::custom("run lines must be strings")),
                }
            }
            Ok(lines.join("\n"))
        }
        Value::Null => Ok(String::new()),
        _ => Err(D::Error::custom("run must be a string or list of strings")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_simple_config() {
        let yaml = r#"
tasks:
  hello:
    run: echo "hello"
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.tasks.len(), 1);
        assert_eq!(config.tasks["hello"].run, "echo \"hello\"");
    }

    #[test]
    fn test_deserialize_full_task() {
        let yaml = r#"
name: myproject
tasks:
  build:
    description: Build the project
    requires: [deps]
    expires: 30m
    invalidates: [test]
    workdir: crates/core
    run: |
      cargo build
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        let task = config.tasks.get("build").unwrap();
        assert_eq!(task.requires, vec!["deps"]);
        assert_eq!(task.expires.as_deref(), Some("30m"));
        assert_eq!(task.invalidates, vec!["test"]);
        assert_eq!(task.workdir.as_deref(), Some("crates/core"));
    }

    #[test]
    fn test_deserialize_run_as_list() {
        let yaml = r#"
tasks:
  multi:
    run:
      - echo one
      - echo two
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.tasks["multi"].run, "echo one\necho two");
    }

    #[test]
    fn test_deserialize_interpreter_forms() {
        let yaml = r#"
interpreter: [bash, -ec]
tasks:
  script:
    interpreter: python3
    run: print("hi")
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(matches!(config.interpreter, Some(Interpreter::Argv(_))));
        assert!(matches!(
            config.tasks["script"].interpreter,
            Some(Interpreter::Tag(_))
        ));
    }

    #[test]
    fn test_deserialize_wildcard_invalidation() {
        let yaml = r#"
tasks:
  clean:
    invalidates: ["*"]
    run: rm -rf target
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.tasks["clean"].invalidates, vec!["*"]);
    }
}
