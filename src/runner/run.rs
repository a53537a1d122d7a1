//! Plan-driving runner
//!
//! Ties the engine together for one invocation: resolve the target
//! expression, compute the plan, execute it sequentially, and keep the
//! cache store and value store up to date after every task. Execution is
//! fail-fast; earlier successes keep their cache entries.

use chrono::Utc;
use globset::Glob;
use std::path::Path;
use std::time::Instant;

use crate::error::{GraphError, Result};
use crate::runner::cache::CacheStore;
use crate::runner::command::execute_body;
use crate::runner::context::Context;
use crate::runner::graph::TaskGraph;
use crate::runner::invalidate;
use crate::runner::plan::plan_many;
use crate::runner::values::ValueStore;
use crate::ui::TaskOutcome;

/// How a run ended when no error was raised
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Every planned task executed and succeeded
    Completed,

    /// Every reached task was cache-valid; nothing ran
    NothingToDo,
}

/// Drives one invocation against a graph, cache store, and context
pub struct Runner {
    graph: TaskGraph,
    cache: CacheStore,
    ctx: Context,
    outcomes: Vec<TaskOutcome>,
}

impl Runner {
    pub fn new(graph: TaskGraph, cache: CacheStore, ctx: Context) -> Self {
        Runner {
            graph,
            cache,
            ctx,
            outcomes: Vec::new(),
        }
    }

    /// The task graph this runner executes against
    pub fn graph(&self) -> &TaskGraph {
        &self.graph
    }

    /// The cache store as of the tasks that have run so far
    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    /// Results accumulated so far, in reach order
    pub fn outcomes(&self) -> &[TaskOutcome] {
        &self.outcomes
    }

    /// The value store after the tasks that have run so far
    pub fn values(&self) -> &ValueStore {
        &self.ctx.values
    }

    /// Resolve a target expression to task names.
    ///
    /// An exact name wins; otherwise the expression is a glob pattern
    /// matched against every task name (so `test*` fans out). No match
    /// is an unknown target.
    pub fn resolve_targets(&self, expr: &str) -> Result<Vec<String>> {
        if self.graph.contains(expr) {
            return Ok(vec![expr.to_string()]);
        }

        let matcher = Glob::new(expr)
            .map_err(|_| GraphError::UnknownTarget(expr.to_string()))?
            .compile_matcher();

        let matches: Vec<String> = self
            .graph
            .names()
            .into_iter()
            .filter(|name| matcher.is_match(name))
            .map(str::to_string)
            .collect();

        if matches.is_empty() {
            return Err(GraphError::UnknownTarget(expr.to_string()).into());
        }
        Ok(matches)
    }

    /// Plan and execute one target expression.
    ///
    /// Fails fast on the first failing task; the error carries the task
    /// name, exit code, and captured output, and the failed task is not
    /// recorded as a cache success.
    pub fn run_target(&mut self, expr: &str) -> Result<RunStatus> {
        let targets = self.resolve_targets(expr)?;
        let now = Utc::now();
        let plan = plan_many(&self.graph, &targets, &self.cache, now)?;

        for name in &plan.cached {
            let outcome = TaskOutcome::cached(name.clone());
            self.ctx.print_info(&outcome.status_line());
            self.outcomes.push(outcome);
        }

        if plan.is_empty() {
            return Ok(RunStatus::NothingToDo);
        }

        for name in &plan.steps {
            let task = self
                .graph
                .get(name)
                .ok_or_else(|| GraphError::UnknownTarget(name.clone()))?
                .clone();

            self.ctx
                .print_info(&format!("⏳ Executing target {}...", name));
            let started = Instant::now();

            match execute_body(&task, &mut self.ctx) {
                Ok(body) => {
                    if body.mutations > 0 {
                        self.ctx.print_debug(&format!(
                            "{} set {} value(s)",
                            name, body.mutations
                        ));
                    }

                    self.cache.record_success(&task, Utc::now());
                    invalidate::apply(&task, &mut self.cache);
                    self.cache.save()?;

                    let outcome = TaskOutcome::succeeded(name.clone(), started.elapsed());
                    self.ctx.print_info(&outcome.status_line());
                    self.outcomes.push(outcome);
                }
                Err(e) => {
                    let outcome = TaskOutcome::failed(name.clone(), started.elapsed());
                    self.ctx.print_info(&outcome.status_line());
                    self.outcomes.push(outcome);
                    return Err(e.into());
                }
            }
        }

        Ok(RunStatus::Completed)
    }

    /// Write the accumulated value store as shell-sourceable exports
    pub fn write_exports(&self, path: &Path) -> Result<()> {
        self.ctx.values.write_exports(path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config;
    use crate::runner::context::Verbosity;
    use crate::runner::task::Task;
    use tempfile::TempDir;

    fn task(name: &str, requires: &[&str], expires: Option<&str>, script: &str) -> Task {
        let config = config::Task {
            requires: requires.iter().map(|s| s.to_string()).collect(),
            expires: expires.map(str::to_string),
            run: script.to_string(),
            ..Default::default()
        };
        Task::from_config(name.to_string(), config, None).unwrap()
    }

    fn runner(tasks: Vec<Task>, dir: &TempDir) -> Runner {
        let graph = TaskGraph::build(tasks).unwrap();
        let cache = CacheStore::empty(dir.path().join("cache.yml"));
        let ctx = Context::new()
            .with_working_dir(dir.path().to_path_buf())
            .with_verbosity(Verbosity::Silent);
        Runner::new(graph, cache, ctx)
    }

    #[test]
    fn test_run_chain_in_order() {
        let dir = TempDir::new().unwrap();
        let mut r = runner(
            vec![
                task("a", &[], None, "echo a >> order.txt"),
                task("b", &["a"], None, "echo b >> order.txt"),
            ],
            &dir,
        );

        let status = r.run_target("b").unwrap();
        assert_eq!(status, RunStatus::Completed);

        let order = std::fs::read_to_string(dir.path().join("order.txt")).unwrap();
        assert_eq!(order, "a\nb\n");
        assert_eq!(r.outcomes().len(), 2);
    }

    #[test]
    fn test_nothing_to_do_when_target_cached() {
        let dir = TempDir::new().unwrap();
        let mut r = runner(vec![task("once", &[], Some("never"), "true")], &dir);

        assert_eq!(r.run_target("once").unwrap(), RunStatus::Completed);
        assert_eq!(r.run_target("once").unwrap(), RunStatus::NothingToDo);
    }

    #[test]
    fn test_glob_target_resolution() {
        let dir = TempDir::new().unwrap();
        let r = runner(
            vec![
                task("test_unit", &[], None, "true"),
                task("test_int", &[], None, "true"),
                task("build", &[], None, "true"),
            ],
            &dir,
        );

        let mut targets = r.resolve_targets("test*").unwrap();
        targets.sort();
        assert_eq!(targets, vec!["test_int", "test_unit"]);

        assert!(r.resolve_targets("deploy*").is_err());
    }

    #[test]
    fn test_exact_name_beats_glob() {
        let dir = TempDir::new().unwrap();
        let r = runner(vec![task("all", &[], None, "true")], &dir);
        assert_eq!(r.resolve_targets("all").unwrap(), vec!["all"]);
    }

    #[test]
    fn test_values_flow_downstream() {
        let dir = TempDir::new().unwrap();
        let mut r = runner(
            vec![
                task(
                    "producer",
                    &[],
                    None,
                    r#"echo "TOKEN=abc123" >> "$RUNFILE_VALUES""#,
                ),
                task(
                    "consumer",
                    &["producer"],
                    None,
                    r#"test "$TOKEN" = abc123"#,
                ),
            ],
            &dir,
        );

        assert_eq!(r.run_target("consumer").unwrap(), RunStatus::Completed);
        assert_eq!(r.values().get("TOKEN"), Some("abc123"));
    }

    #[test]
    fn test_failure_halts_plan() {
        let dir = TempDir::new().unwrap();
        let mut r = runner(
            vec![
                task("bad", &[], None, "exit 3"),
                task("after", &["bad"], None, "touch ran.txt"),
            ],
            &dir,
        );

        assert!(r.run_target("after").is_err());
        assert!(!dir.path().join("ran.txt").exists());
    }
}
