use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::ids::SiteId;

/// What a collection job does against its site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectMode {
    /// Re-crawl the site's full listing.
    Full,
    /// Refresh specific records only.
    Incremental,
    /// Rebuild the classification taxonomy.
    Classification,
}

/// Lifecycle state of a collection job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
    Canceled,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Succeeded | JobStatus::Failed | JobStatus::Canceled
        )
    }
}

/// How long a job may run before cooperative cancellation kicks in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DurationBudget {
    /// Run to natural completion.
    Unbounded,
    /// Time-boxed; the budget must be positive.
    Bounded(Duration),
}

impl DurationBudget {
    /// Parse the transport-level hour count: `-1` is the unbounded
    /// sentinel, positive values are a bounded budget, everything else is
    /// rejected before any job exists.
    pub fn from_hours(hours: i64) -> Result<Self> {
        match hours {
            -1 => Ok(DurationBudget::Unbounded),
            h if h > 0 => Ok(DurationBudget::Bounded(Duration::from_secs(
                h as u64 * 3600,
            ))),
            h => Err(ModelError::InvalidDuration(format!(
                "duration must be positive or the -1 sentinel, got {h}"
            ))),
        }
    }

    /// Reject the zero (or otherwise empty) bounded budget.
    pub fn validate(&self) -> Result<()> {
        match self {
            DurationBudget::Unbounded => Ok(()),
            DurationBudget::Bounded(d) if !d.is_zero() => Ok(()),
            DurationBudget::Bounded(_) => Err(ModelError::InvalidDuration(
                "bounded duration must be greater than zero".to_string(),
            )),
        }
    }
}

/// One execution of a collection task against a single site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectJob {
    pub site_id: SiteId,
    pub mode: CollectMode,
    pub budget: DurationBudget,
    pub status: JobStatus,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

impl CollectJob {
    pub fn new(site_id: SiteId, mode: CollectMode, budget: DurationBudget) -> Self {
        Self {
            site_id,
            mode,
            budget,
            status: JobStatus::Pending,
            started_at: Utc::now(),
            finished_at: None,
            error: None,
        }
    }
}
