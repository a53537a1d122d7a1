//! Task graph construction
//!
//! Turns the set of runtime tasks into a validated graph keyed by name.
//! Building performs no execution; it only checks that names are unique
//! and that every `requires`/`invalidates` reference resolves.

use crate::error::{GraphError, GraphResult};
use crate::runner::task::{Invalidation, Task};
use std::collections::HashMap;

/// A validated set of tasks keyed by name
#[derive(Debug, Clone)]
pub struct TaskGraph {
    tasks: HashMap<String, Task>,
}

impl TaskGraph {
    /// Build and validate a graph from task records.
    ///
    /// Fails with [`GraphError::DuplicateTask`] on a name collision and
    /// [`GraphError::UnknownReference`] when a `requires` entry or a named
    /// `invalidates` entry does not resolve to a task. Cycles are detected
    /// later, during planning, so the offending path can be reported.
    pub fn build(records: Vec<Task>) -> GraphResult<Self> {
        let mut tasks: HashMap<String, Task> = HashMap::with_capacity(records.len());

        for task in records {
            if tasks.contains_key(&task.name) {
                return Err(GraphError::DuplicateTask(task.name));
            }
            tasks.insert(task.name.clone(), task);
        }

        for task in tasks.values() {
            for reference in &task.requires {
                if !tasks.contains_key(reference) {
                    return Err(GraphError::UnknownReference {
                        task: task.name.clone(),
                        reference: reference.clone(),
                    });
                }
            }

            for invalidation in &task.invalidates {
                if let Invalidation::Named(reference) = invalidation {
                    if !tasks.contains_key(reference) {
                        return Err(GraphError::UnknownReference {
                            task: task.name.clone(),
                            reference: reference.clone(),
                        });
                    }
                }
            }
        }

        Ok(TaskGraph { tasks })
    }

    /// Look up a task by name
    pub fn get(&self, name: &str) -> Option<&Task> {
        self.tasks.get(name)
    }

    /// Whether a task with this name exists
    pub fn contains(&self, name: &str) -> bool {
        self.tasks.contains_key(name)
    }

    /// Number of tasks in the graph
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the graph has no tasks
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Task names in sorted order, for deterministic listings
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tasks.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// All tasks, in sorted name order
    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        let mut tasks: Vec<&Task> = self.tasks.values().collect();
        tasks.sort_unstable_by(|a, b| a.name.cmp(&b.name));
        tasks.into_iter()
    }
}
