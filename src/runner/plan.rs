//! Execution planning
//!
//! The scheduler walks `requires` edges depth-first from the requested
//! targets and emits a post-order plan: every dependency appears before
//! its dependents, each task at most once, and a task is planned only
//! when its cached result is no longer valid. Branches are visited in
//! the order the `requires` lists declare them, so identical inputs
//! always produce identical plans.

use chrono::{DateTime, Utc};
use std::collections::HashSet;

use crate::error::{GraphError, GraphResult};
use crate::runner::cache::CacheStore;
use crate::runner::graph::TaskGraph;

/// The ordered outcome of planning one invocation. Never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionPlan {
    /// Task names to execute, dependencies first
    pub steps: Vec<String>,

    /// Tasks reached by the traversal whose cached result is still
    /// valid; reported as cache hits, not executed
    pub cached: Vec<String>,
}

impl ExecutionPlan {
    /// True when nothing needs to run
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Plan a single target
pub fn plan(
    graph: &TaskGraph,
    target: &str,
    cache: &CacheStore,
    now: DateTime<Utc>,
) -> GraphResult<ExecutionPlan> {
    plan_many(graph, std::slice::from_ref(&target.to_string()), cache, now)
}

/// Plan several targets as one combined traversal.
///
/// Targets share a visited set, so a task reached from two targets is
/// still planned exactly once, at its first reachable position.
pub fn plan_many(
    graph: &TaskGraph,
    targets: &[String],
    cache: &CacheStore,
    now: DateTime<Utc>,
) -> GraphResult<ExecutionPlan> {
    let mut plan = ExecutionPlan::default();
    let mut visited = HashSet::new();
    let mut stack = Vec::new();

    for target in targets {
        if !graph.contains(target) {
            return Err(GraphError::UnknownTarget(target.clone()));
        }
        visit(graph, target, cache, now, &mut visited, &mut stack, &mut plan)?;
    }

    Ok(plan)
}

fn visit(
    graph: &TaskGraph,
    name: &str,
    cache: &CacheStore,
    now: DateTime<Utc>,
    visited: &mut HashSet<String>,
    stack: &mut Vec<String>,
    plan: &mut ExecutionPlan,
) -> GraphResult<()> {
    // First visit wins; later reaches are no-ops.
    if visited.contains(name) {
        return Ok(());
    }

    if let Some(pos) = stack.iter().position(|n| n == name) {
        let mut cycle: Vec<String> = stack[pos..].to_vec();
        cycle.push(name.to_string());
        return Err(GraphError::Cycle(cycle.join(" -> ")));
    }

    let task = graph
        .get(name)
        .ok_or_else(|| GraphError::UnknownTarget(name.to_string()))?;

    stack.push(name.to_string());
    for dependency in &task.requires {
        visit(graph, dependency, cache, now, visited, stack, plan)?;
    }
    stack.pop();

    visited.insert(name.to_string());

    if cache.is_valid(task, now) {
        plan.cached.push(name.to_string());
    } else {
        plan.steps.push(name.to_string());
    }

    Ok(())
}
