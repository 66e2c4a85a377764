use std::collections::VecDeque;
use std::sync::Mutex;

use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::debug;

use filmdex_model::{CollectJob, JobStatus, SiteId};

use crate::error::{CollectError, Result};

/// How many terminal job outcomes the registry keeps for status inspection.
const HISTORY_CAPACITY: usize = 64;

/// Tracks at most one active collection job per site.
///
/// The entry-based insert is the single synchronization point that enforces
/// the one-job-per-site invariant; removing the entry on terminal state is
/// the only way a site becomes eligible for new work.
pub struct JobRegistry {
    active: DashMap<SiteId, CollectJob>,
    history: Mutex<VecDeque<CollectJob>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self {
            active: DashMap::new(),
            history: Mutex::new(VecDeque::with_capacity(HISTORY_CAPACITY)),
        }
    }

    /// Atomic check-and-set: registers `job` unless its site already has an
    /// active entry. No side effects on failure.
    pub fn try_register(&self, job: CollectJob) -> Result<()> {
        match self.active.entry(job.site_id.clone()) {
            Entry::Occupied(_) => Err(CollectError::AlreadyRunning(job.site_id)),
            Entry::Vacant(slot) => {
                debug!(site = %job.site_id, mode = ?job.mode, "registered collection job");
                slot.insert(job);
                Ok(())
            }
        }
    }

    /// Transition the site's job to running, on pool dispatch.
    pub fn mark_running(&self, site_id: &SiteId) {
        if let Some(mut entry) = self.active.get_mut(site_id) {
            entry.status = JobStatus::Running;
            entry.started_at = Utc::now();
        }
    }

    /// Record the terminal outcome and free the site. The finished job is
    /// retained in a bounded history buffer for aggregate reporting.
    pub fn complete(&self, site_id: &SiteId, status: JobStatus, error: Option<String>) {
        debug_assert!(status.is_terminal());
        if let Some((_, mut job)) = self.active.remove(site_id) {
            job.status = status;
            job.finished_at = Some(Utc::now());
            job.error = error;

            let mut history = self.history.lock().expect("job history mutex poisoned");
            if history.len() == HISTORY_CAPACITY {
                history.pop_front();
            }
            history.push_back(job);
        }
    }

    pub fn is_active(&self, site_id: &SiteId) -> bool {
        self.active.contains_key(site_id)
    }

    pub fn active(&self) -> Vec<CollectJob> {
        self.active.iter().map(|e| e.value().clone()).collect()
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Most recent terminal outcomes, newest last.
    pub fn history(&self) -> Vec<CollectJob> {
        self.history
            .lock()
            .expect("job history mutex poisoned")
            .iter()
            .cloned()
            .collect()
    }
}

impl Default for JobRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filmdex_model::{CollectMode, DurationBudget};

    fn job(site: &str) -> CollectJob {
        CollectJob::new(
            SiteId::from(site),
            CollectMode::Full,
            DurationBudget::Unbounded,
        )
    }

    #[test]
    fn second_registration_for_a_site_is_rejected() {
        let registry = JobRegistry::new();
        registry.try_register(job("alpha")).expect("first insert");

        let err = registry.try_register(job("alpha")).unwrap_err();
        assert!(matches!(err, CollectError::AlreadyRunning(id) if id.as_str() == "alpha"));
        assert_eq!(registry.active_count(), 1);
    }

    #[test]
    fn completion_frees_the_site_and_records_history() {
        let registry = JobRegistry::new();
        registry.try_register(job("alpha")).expect("first insert");

        registry.complete(&SiteId::from("alpha"), JobStatus::Failed, Some("boom".into()));

        assert!(!registry.is_active(&SiteId::from("alpha")));
        registry.try_register(job("alpha")).expect("site reusable");

        let history = registry.history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].status, JobStatus::Failed);
        assert_eq!(history[0].error.as_deref(), Some("boom"));
    }

    #[test]
    fn history_is_bounded() {
        let registry = JobRegistry::new();
        for i in 0..(HISTORY_CAPACITY + 10) {
            let site = format!("site-{i}");
            registry
                .try_register(job(&site))
                .expect("distinct sites register");
            registry.complete(&SiteId::new(site), JobStatus::Succeeded, None);
        }

        assert_eq!(registry.history().len(), HISTORY_CAPACITY);
    }
}
