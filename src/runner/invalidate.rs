//! Invalidation propagation
//!
//! Applies a task's `invalidates` list to the cache store after the task
//! has executed successfully.

use crate::runner::cache::CacheStore;
use crate::runner::task::{Invalidation, Task};

/// Apply `task.invalidates` to the store.
///
/// A wildcard entry clears everything and short-circuits the rest of the
/// list. Invalidation never cascades through `requires` edges: only the
/// entries the task declares are cleared, and dependents of a cleared
/// task keep their own entries.
pub fn apply(task: &Task, cache: &mut CacheStore) {
    if task.invalidates_all() {
        cache.invalidate_all();
        return;
    }

    for invalidation in &task.invalidates {
        if let Invalidation::Named(name) = invalidation {
            cache.invalidate(name);
        }
    }
}
