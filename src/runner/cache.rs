//! Persisted per-task cache store
//!
//! For every task that has succeeded at least once the store keeps the
//! timestamp of the last success and a fingerprint of the body at that
//! time. The store is one YAML file per Runfile, written with
//! atomic-replace semantics (temp file + rename) so a crash cannot leave
//! a half-written file behind. An unreadable store is reported to the
//! caller, which treats it as empty rather than fatal.

use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::error::{CacheError, CacheResult};
use crate::runner::task::{Expires, Task};

/// Cached metadata for one task's last successful run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// When the task last exited zero
    pub last_success: DateTime<Utc>,

    /// Fingerprint of the body at that time
    pub fingerprint: String,
}

/// The persisted cache, keyed by task name
#[derive(Debug)]
pub struct CacheStore {
    path: PathBuf,
    entries: BTreeMap<String, CacheEntry>,
}

/// Fingerprint a task body: sha256 over the interpreter argv and script.
///
/// A changed fingerprint always invalidates the cached result, whatever
/// the expiry policy says.
pub fn fingerprint(task: &Task) -> String {
    let mut hasher = Sha256::new();
    for arg in &task.interpreter {
        hasher.update(arg.as_bytes());
        hasher.update([0]);
    }
    hasher.update(task.script.as_bytes());
    hex::encode(hasher.finalize())
}

impl CacheStore {
    /// An empty store that will save to `path`
    pub fn empty(path: PathBuf) -> Self {
        CacheStore {
            path,
            entries: BTreeMap::new(),
        }
    }

    /// Load the store from `path`.
    ///
    /// A missing file is an empty store. An existing but unreadable or
    /// unparseable file is a [`CacheError::Corrupt`]; callers are expected
    /// to report it and continue with [`CacheStore::empty`].
    pub fn load(path: PathBuf) -> CacheResult<Self> {
        if !path.exists() {
            return Ok(Self::empty(path));
        }

        let contents = fs::read_to_string(&path).map_err(|e| CacheError::Corrupt {
            path: path.clone(),
            error: e.to_string(),
        })?;

        let entries: BTreeMap<String, CacheEntry> =
            serde_yaml::from_str(&contents).map_err(|e| CacheError::Corrupt {
                path: path.clone(),
                error: e.to_string(),
            })?;

        Ok(CacheStore { path, entries })
    }

    /// Persist the store with atomic-replace semantics
    pub fn save(&self) -> CacheResult<()> {
        let write_err = |e: &dyn std::fmt::Display| CacheError::Write {
            path: self.path.clone(),
            error: e.to_string(),
        };

        let parent = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent).map_err(|e| write_err(&e))?;

        let yaml = serde_yaml::to_string(&self.entries).map_err(|e| write_err(&e))?;

        // Written next to the destination so the rename stays on one
        // filesystem.
        let mut tmp = NamedTempFile::new_in(parent).map_err(|e| write_err(&e))?;
        tmp.write_all(yaml.as_bytes()).map_err(|e| write_err(&e))?;
        tmp.persist(&self.path).map_err(|e| write_err(&e))?;

        Ok(())
    }

    /// Is the task's cached result still valid at `now`?
    pub fn is_valid(&self, task: &Task, now: DateTime<Utc>) -> bool {
        let entry = match self.entries.get(&task.name) {
            Some(entry) => entry,
            None => return false,
        };

        if entry.fingerprint != fingerprint(task) {
            return false;
        }

        match task.expires {
            Expires::Always => false,
            Expires::Never => true,
            Expires::After(window) => {
                match now.signed_duration_since(entry.last_success).to_std() {
                    Ok(age) => age < window,
                    // last_success in the future (clock skew): still fresh
                    Err(_) => true,
                }
            }
        }
    }

    /// Record a successful run, overwriting any prior entry
    pub fn record_success(&mut self, task: &Task, now: DateTime<Utc>) {
        self.entries.insert(
            task.name.clone(),
            CacheEntry {
                last_success: now,
                fingerprint: fingerprint(task),
            },
        );
    }

    /// Remove one task's entry; subsequent `is_valid` returns false
    pub fn invalidate(&mut self, name: &str) {
        self.entries.remove(name);
    }

    /// Remove every entry
    pub fn invalidate_all(&mut self) {
        self.entries.clear();
    }

    /// Look up the raw entry for a task
    pub fn entry(&self, name: &str) -> Option<&CacheEntry> {
        self.entries.get(name)
    }

    /// The file this store loads from and saves to
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Default store location for a given Runfile: one file per Runfile
    /// path in the user cache directory, falling back to a dotfile next
    /// to the Runfile when no home directory is available.
    pub fn default_path(runfile_path: &Path) -> PathBuf {
        let canonical = runfile_path
            .canonicalize()
            .unwrap_or_else(|_| runfile_path.to_path_buf());

        let mut hasher = Sha256::new();
        hasher.update(canonical.to_string_lossy().as_bytes());
        let key = hex::encode(&hasher.finalize()[..8]);

        match ProjectDirs::from("", "", "runfile") {
            Some(dirs) => dirs.cache_dir().join(format!("{}.yml", key)),
            None => canonical.with_file_name(format!(".runfile-cache-{}.yml", key)),
        }
    }
}
