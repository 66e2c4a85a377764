use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{error, info, warn};

use filmdex_model::{
    CollectJob, CollectMode, DurationBudget, FilmKey, JobStatus, Site, SiteId,
};

use crate::adapters::{build_adapter, SiteAdapter};
use crate::classification::ClassificationSyncer;
use crate::config::CollectorConfig;
use crate::error::{CollectError, Result};
use crate::jobs::JobRegistry;
use crate::registry::SiteRegistry;
use crate::storage::CatalogStore;

mod deadline;
mod pool;
mod reset;
mod run;
#[cfg(test)]
pub(crate) mod test_support;

pub use deadline::Deadline;
pub use pool::WorkerPool;

use run::JobOutcome;

/// One site that could not be dispatched or finished badly during a batch.
#[derive(Debug, Clone)]
pub struct BatchFailure {
    pub site_id: SiteId,
    pub error: String,
}

/// Aggregate outcome of a batch dispatch. Per-site failures never abort
/// sibling sites; callers inspect this report and the job history.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub dispatched: Vec<SiteId>,
    pub failures: Vec<BatchFailure>,
}

#[derive(Debug, Clone)]
pub struct SyncFailure {
    pub key: FilmKey,
    pub error: String,
}

/// Aggregate outcome of a targeted film sync.
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    pub updated: Vec<FilmKey>,
    pub failures: Vec<SyncFailure>,
    /// Sites skipped because a collection job was already active for them.
    pub skipped_sites: Vec<SiteId>,
}

/// Snapshot of orchestrator activity for status inspection.
#[derive(Debug, Clone)]
pub struct CollectStats {
    pub active: Vec<CollectJob>,
    pub recent: Vec<CollectJob>,
}

/// The collection orchestrator facade.
///
/// Composes the site registry, per-site adapters, the dedup job registry,
/// a bounded worker pool, and the admission barrier that serializes
/// destructive operations against in-flight catalog writers.
pub struct Collector {
    registry: Arc<SiteRegistry>,
    jobs: Arc<JobRegistry>,
    store: Arc<dyn CatalogStore>,
    adapters: HashMap<SiteId, Arc<dyn SiteAdapter>>,
    pool: WorkerPool,
    // Admissions and running jobs hold the read half; catalog wipes take
    // the write half, so a wipe can never interleave with a job write.
    barrier: Arc<RwLock<()>>,
    config: CollectorConfig,
}

impl Collector {
    /// Build a collector with adapters constructed from each enabled site's
    /// configuration.
    pub fn new(
        registry: Arc<SiteRegistry>,
        store: Arc<dyn CatalogStore>,
        config: CollectorConfig,
    ) -> Result<Self> {
        let mut adapters = HashMap::new();
        for site in registry.enabled_sites() {
            adapters.insert(site.id.clone(), build_adapter(&site)?);
        }
        Ok(Self::with_collaborators(
            registry,
            Arc::new(JobRegistry::new()),
            store,
            adapters,
            config,
        ))
    }

    /// Full-injection constructor; used by tests and anyone who needs to
    /// supply custom adapters or share a job registry.
    pub fn with_collaborators(
        registry: Arc<SiteRegistry>,
        jobs: Arc<JobRegistry>,
        store: Arc<dyn CatalogStore>,
        adapters: HashMap<SiteId, Arc<dyn SiteAdapter>>,
        config: CollectorConfig,
    ) -> Self {
        let pool = WorkerPool::new(config.max_concurrent_jobs);
        Self {
            registry,
            jobs,
            store,
            adapters,
            pool,
            barrier: Arc::new(RwLock::new(())),
            config,
        }
    }

    /// Start a full collection job for one site. Returns as soon as the job
    /// is registered and submitted; the job itself runs asynchronously.
    pub async fn start_collect(&self, site_id: &SiteId, budget: DurationBudget) -> Result<()> {
        let _admission = self.barrier.read().await;
        self.admit(site_id, budget)
    }

    /// Dispatch full collection jobs for every listed site. Best effort and
    /// fully parallel: one site failing to dispatch neither aborts nor
    /// delays its siblings.
    pub async fn batch_collect(
        &self,
        budget: DurationBudget,
        site_ids: &[SiteId],
    ) -> Result<BatchReport> {
        if site_ids.is_empty() {
            return Err(CollectError::Validation(
                "batch collect requires at least one site id".to_string(),
            ));
        }

        let _admission = self.barrier.read().await;
        let mut report = BatchReport::default();
        for site_id in site_ids {
            match self.admit(site_id, budget) {
                Ok(()) => report.dispatched.push(site_id.clone()),
                Err(err) => {
                    warn!(site = %site_id, error = %err, "batch dispatch failed for site");
                    report.failures.push(BatchFailure {
                        site_id: site_id.clone(),
                        error: err.to_string(),
                    });
                }
            }
        }
        info!(
            dispatched = report.dispatched.len(),
            failed = report.failures.len(),
            "batch collect submitted"
        );
        Ok(report)
    }

    /// Rebuild the classification taxonomy from all enabled sites and swap
    /// it in atomically. On any fetch or build error the previous tree
    /// stays authoritative.
    pub async fn sync_classification(&self) -> Result<usize> {
        let sources = self
            .registry
            .enabled_sites()
            .into_iter()
            .filter_map(|site| {
                self.adapters
                    .get(&site.id)
                    .map(|adapter| (site.id.clone(), adapter.clone()))
            })
            .collect();
        ClassificationSyncer::new(sources, self.store.clone())
            .sync()
            .await
    }

    /// Refresh specific catalog records from their owning sites, merging
    /// fetched fields over the stored ones. Sites with an active collection
    /// job are skipped rather than raced.
    pub async fn sync_films(&self, keys: &[FilmKey]) -> Result<SyncReport> {
        if keys.is_empty() {
            return Err(CollectError::Validation(
                "film sync requires at least one film key".to_string(),
            ));
        }

        let _admission = self.barrier.read().await;

        let mut by_site: BTreeMap<SiteId, Vec<&FilmKey>> = BTreeMap::new();
        for key in keys {
            by_site.entry(key.site_id.clone()).or_default().push(key);
        }

        let mut report = SyncReport::default();
        for (site_id, site_keys) in by_site {
            let adapter = match self.adapter_for(&site_id) {
                Ok(adapter) => adapter,
                Err(err) => {
                    for key in site_keys {
                        report.failures.push(SyncFailure {
                            key: key.clone(),
                            error: err.to_string(),
                        });
                    }
                    continue;
                }
            };

            // Site-level mutual exclusion with whole-site crawls goes
            // through the same check-and-set registry.
            let marker = CollectJob::new(
                site_id.clone(),
                CollectMode::Incremental,
                DurationBudget::Unbounded,
            );
            if self.jobs.try_register(marker).is_err() {
                info!(site = %site_id, "skipping film sync, collection in progress");
                report.skipped_sites.push(site_id);
                continue;
            }
            self.jobs.mark_running(&site_id);

            let mut site_errors = 0usize;
            for key in site_keys {
                let fetched = run::with_retry(&self.config.retry, &site_id, || {
                    adapter.fetch_detail(&key.external_id)
                })
                .await;
                match fetched {
                    Ok(film) => match self.store.merge_film(film).await {
                        Ok(()) => report.updated.push(key.clone()),
                        Err(err) => {
                            site_errors += 1;
                            report.failures.push(SyncFailure {
                                key: key.clone(),
                                error: err.to_string(),
                            });
                        }
                    },
                    Err(err) => {
                        site_errors += 1;
                        report.failures.push(SyncFailure {
                            key: key.clone(),
                            error: err.to_string(),
                        });
                    }
                }
            }

            let status = if site_errors == 0 {
                JobStatus::Succeeded
            } else {
                JobStatus::Failed
            };
            self.jobs.complete(
                &site_id,
                status,
                (site_errors > 0).then(|| format!("{site_errors} records failed to sync")),
            );
        }

        Ok(report)
    }

    pub fn stats(&self) -> CollectStats {
        CollectStats {
            active: self.jobs.active(),
            recent: self.jobs.history(),
        }
    }

    pub fn job_registry(&self) -> Arc<JobRegistry> {
        self.jobs.clone()
    }

    /// Validate, register, and submit one full-mode job. Synchronous so the
    /// caller observes validation and dedup failures before any side
    /// effect; the job itself runs on the pool.
    fn admit(&self, site_id: &SiteId, budget: DurationBudget) -> Result<()> {
        budget
            .validate()
            .map_err(|err| CollectError::Validation(err.to_string()))?;
        let site = self
            .registry
            .get(site_id)
            .ok_or_else(|| CollectError::UnknownSite(site_id.clone()))?;
        if !site.enabled {
            return Err(CollectError::SiteDisabled(site_id.clone()));
        }
        let adapter = self.adapters.get(site_id).cloned().ok_or_else(|| {
            CollectError::Config(format!("no adapter constructed for site {site_id}"))
        })?;

        self.jobs
            .try_register(CollectJob::new(site_id.clone(), CollectMode::Full, budget))?;
        self.spawn_job(site, adapter, budget);
        Ok(())
    }

    fn adapter_for(&self, site_id: &SiteId) -> Result<Arc<dyn SiteAdapter>> {
        let site = self
            .registry
            .get(site_id)
            .ok_or_else(|| CollectError::UnknownSite(site_id.clone()))?;
        if !site.enabled {
            return Err(CollectError::SiteDisabled(site_id.clone()));
        }
        self.adapters.get(site_id).cloned().ok_or_else(|| {
            CollectError::Config(format!("no adapter constructed for site {site_id}"))
        })
    }

    fn spawn_job(&self, site: Arc<Site>, adapter: Arc<dyn SiteAdapter>, budget: DurationBudget) {
        let jobs = self.jobs.clone();
        let store = self.store.clone();
        let barrier = self.barrier.clone();
        let retry = self.config.retry.clone();

        // Fire-and-forget: outcome lands in the job registry, not a handle.
        let _ = self.pool.spawn(async move {
            // Held for the whole run: a catalog wipe waits for this job's
            // writes to finish before it may proceed.
            let _writer = barrier.read().await;

            jobs.mark_running(&site.id);
            let deadline = Deadline::from_budget(budget);
            info!(site = %site.id, name = %site.display_name, "collection job started");

            match run::run_full_collect(&site.id, adapter, store, deadline, &retry).await {
                Ok(JobOutcome::Completed { films }) => {
                    info!(site = %site.id, films, "collection job succeeded");
                    jobs.complete(&site.id, JobStatus::Succeeded, None);
                }
                Ok(JobOutcome::DeadlineReached { films }) => {
                    warn!(
                        site = %site.id,
                        films,
                        "collection job hit its duration budget, partial results kept"
                    );
                    jobs.complete(&site.id, JobStatus::Canceled, None);
                }
                Err(err) => {
                    error!(site = %site.id, error = %err, "collection job failed");
                    jobs.complete(&site.id, JobStatus::Failed, Some(err.to_string()));
                }
            }
        });
    }
}
