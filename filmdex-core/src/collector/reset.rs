use tracing::{info, warn};

use filmdex_model::DurationBudget;

use super::{BatchFailure, BatchReport, Collector};
use crate::error::{CollectError, Result};

impl Collector {
    /// Delete every film record. Idempotent. Takes the exclusive barrier so
    /// the wipe cannot interleave with an in-flight job write.
    pub async fn clear_films(&self) -> Result<()> {
        let _exclusive = self.barrier.write().await;
        warn!("clearing all film records");
        self.store.delete_all_films().await
    }

    /// Wipe the catalog and re-collect everything from every enabled site.
    ///
    /// The exclusive barrier blocks new admissions and waits out running
    /// jobs, so wipe-then-recollect is atomic with respect to writers. The
    /// barrier is released once the reset jobs are *submitted* — the
    /// recollection itself runs at its own pace on the pool.
    pub async fn zero_collect(&self, budget: DurationBudget) -> Result<BatchReport> {
        budget
            .validate()
            .map_err(|err| CollectError::Validation(err.to_string()))?;

        let exclusive = self.barrier.write().await;
        warn!("catalog reset started, admissions blocked");
        self.store.delete_all_films().await?;

        let mut report = BatchReport::default();
        for site in self.registry.enabled_sites() {
            match self.admit(&site.id, budget) {
                Ok(()) => report.dispatched.push(site.id.clone()),
                Err(err) => {
                    warn!(site = %site.id, error = %err, "reset dispatch failed for site");
                    report.failures.push(BatchFailure {
                        site_id: site.id.clone(),
                        error: err.to_string(),
                    });
                }
            }
        }
        drop(exclusive);

        info!(
            dispatched = report.dispatched.len(),
            failed = report.failures.len(),
            "catalog reset jobs submitted, admissions reopened"
        );
        Ok(report)
    }
}
