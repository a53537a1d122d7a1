//! Common test utilities

use runfile::config::{parse_config, Config};
use runfile::runner::{CacheStore, Context, Runner, Task, TaskGraph, Verbosity};
use std::path::PathBuf;
use tempfile::TempDir;

/// Build a validated task graph from a Runfile document
pub fn graph_from_yaml(yaml: &str) -> TaskGraph {
    let config: Config = parse_config(yaml).unwrap();
    let default_interpreter = config.interpreter.clone();

    let mut records = Vec::new();
    for (name, task) in config.tasks {
        records.push(Task::from_config(name, task, default_interpreter.as_ref()).unwrap());
    }
    TaskGraph::build(records).unwrap()
}

/// A runner wired to a temp working dir with its cache inside it
pub fn runner_in(dir: &TempDir, yaml: &str) -> Runner {
    runner_with_cache(dir, yaml, dir.path().join("cache.yml"))
}

/// A runner with an explicit cache path, reloading whatever is there
pub fn runner_with_cache(dir: &TempDir, yaml: &str, cache_path: PathBuf) -> Runner {
    let graph = graph_from_yaml(yaml);
    let cache = CacheStore::load(cache_path.clone())
        .unwrap_or_else(|_| CacheStore::empty(cache_path));
    let ctx = Context::new()
        .with_working_dir(dir.path().to_path_buf())
        .with_verbosity(Verbosity::Silent);
    Runner::new(graph, cache, ctx)
}
