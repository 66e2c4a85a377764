use tokio::time::Instant;

use filmdex_model::DurationBudget;

/// Wall-clock cutoff computed from a job's duration budget.
///
/// Cancellation is cooperative: the job runner checks `expired` at adapter
/// call boundaries and stops promptly, keeping whatever it already wrote.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    at: Option<Instant>,
}

impl Deadline {
    pub fn from_budget(budget: DurationBudget) -> Self {
        match budget {
            DurationBudget::Unbounded => Self { at: None },
            DurationBudget::Bounded(d) => Self {
                at: Some(Instant::now() + d),
            },
        }
    }

    pub fn unbounded() -> Self {
        Self { at: None }
    }

    pub fn expired(&self) -> bool {
        self.at.is_some_and(|at| Instant::now() >= at)
    }
}
