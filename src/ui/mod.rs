//! Run outcome rendering
//!
//! Status lines and the end-of-run summary.

use colored::Colorize;
use std::time::Duration;

use crate::utils::format_duration;

/// How one reached task ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeStatus {
    /// Ran and exited zero
    Succeeded,

    /// Body exited non-zero
    Failed,

    /// Cached result was still valid; not executed
    Cached,
}

/// One task's result within a run
#[derive(Debug, Clone)]
pub struct TaskOutcome {
    pub name: String,
    pub status: OutcomeStatus,
    pub elapsed: Option<Duration>,
}

impl TaskOutcome {
    pub fn succeeded(name: impl Into<String>, elapsed: Duration) -> Self {
        TaskOutcome {
            name: name.into(),
            status: OutcomeStatus::Succeeded,
            elapsed: Some(elapsed),
        }
    }

    pub fn failed(name: impl Into<String>, elapsed: Duration) -> Self {
        TaskOutcome {
            name: name.into(),
            status: OutcomeStatus::Failed,
            elapsed: Some(elapsed),
        }
    }

    pub fn cached(name: impl Into<String>) -> Self {
        TaskOutcome {
            name: name.into(),
            status: OutcomeStatus::Cached,
            elapsed: None,
        }
    }

    /// One-line status in the runner's reporting style
    pub fn status_line(&self) -> String {
        let time = self
            .elapsed
            .map(format_duration)
            .unwrap_or_default();

        match self.status {
            OutcomeStatus::Succeeded => {
                format!("✅ Completed {}. ({})", self.name, time)
            }
            OutcomeStatus::Failed => {
                format!("❌ Failed executing {}. ({})", self.name, time)
            }
            OutcomeStatus::Cached => format!("💾 Used cache for {}", self.name),
        }
    }
}

/// Render the end-of-run summary banner plus one line per outcome
pub fn render_summary(outcomes: &[TaskOutcome], elapsed: Duration) -> String {
    let failed = outcomes
        .iter()
        .any(|o| o.status == OutcomeStatus::Failed);

    let banner = if failed {
        "FAILURE".red().bold()
    } else {
        "SUCCESS".green().bold()
    };

    let mut out = format!("{} in {}\n---\n", banner, format_duration(elapsed));
    for outcome in outcomes {
        out.push_str(&outcome.status_line());
        out.push('\n');
    }
    out
}
