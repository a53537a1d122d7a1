//! Cross-task value store
//!
//! An in-memory string map scoped to one invocation. Task bodies mutate
//! it by appending `KEY=VALUE` lines to the file named by the
//! `RUNFILE_VALUES` environment variable; after a body exits zero the
//! lines are merged back, last writer wins. The whole store is injected
//! into every body's environment, and can be written out as
//! shell-sourceable `export` lines for the invoking shell to adopt.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

/// Environment variable naming the mutation file handed to each body
pub const VALUES_FILE_ENV: &str = "RUNFILE_VALUES";

/// Invocation-scoped key/value state shared across a plan
#[derive(Debug, Clone, Default)]
pub struct ValueStore {
    values: BTreeMap<String, String>,
}

impl ValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value; later calls overwrite earlier ones for the same key
    pub fn set(&mut self, key: String, value: String) {
        self.values.insert(key, value);
    }

    /// Look up a value
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// All pairs in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Merge `KEY=VALUE` lines into the store, returning how many keys
    /// were set. Later lines win. Blank lines and lines without `=` are
    /// ignored.
    pub fn merge_lines(&mut self, contents: &str) -> usize {
        let mut merged = 0;
        for line in contents.lines() {
            let line = line.trim_end_matches('\r');
            if let Some((key, value)) = line.split_once('=') {
                if key.is_empty() {
                    continue;
                }
                self.set(key.to_string(), value.to_string());
                merged += 1;
            }
        }
        merged
    }

    /// Merge mutations from a body's handoff file. A missing file means
    /// the body set nothing.
    pub fn merge_file(&mut self, path: &Path) -> io::Result<usize> {
        match fs::read_to_string(path) {
            Ok(contents) => Ok(self.merge_lines(&contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(0),
            Err(e) => Err(e),
        }
    }

    /// Write the store as `export KEY='VALUE'` lines for the parent
    /// shell to source.
    pub fn write_exports(&self, path: &Path) -> io::Result<()> {
        let mut out = String::new();
        for (key, value) in self.iter() {
            out.push_str(&format!("export {}={}\n", key, shell_quote(value)));
        }
        fs::write(path, out)
    }
}

/// Single-quote a value for POSIX shells
fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}
