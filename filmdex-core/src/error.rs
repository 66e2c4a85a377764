use filmdex_model::{ModelError, SiteId};
use thiserror::Error;

/// Failure surfaced by a site adapter.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("upstream returned status {status}")]
    Http { status: u16 },

    #[error("rate limited by upstream")]
    RateLimited,

    #[error("parse error: {0}")]
    Parse(String),

    #[error("record not found upstream: {0}")]
    NotFound(String),
}

impl AdapterError {
    /// Transient failures are worth a bounded retry inside a running job;
    /// permanent ones fail the call immediately.
    pub fn is_transient(&self) -> bool {
        match self {
            AdapterError::Network(_) | AdapterError::RateLimited => true,
            AdapterError::Http { status } => *status >= 500,
            AdapterError::Parse(_) | AdapterError::NotFound(_) => false,
        }
    }
}

#[derive(Debug, Error)]
pub enum CollectError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("a collection job is already running for site {0}")]
    AlreadyRunning(SiteId),

    #[error("unknown site: {0}")]
    UnknownSite(SiteId),

    #[error("site {0} is disabled")]
    SiteDisabled(SiteId),

    #[error("adapter error: {0}")]
    Adapter(#[from] AdapterError),

    #[error("job for site {site_id} exceeded its duration budget")]
    Timeout { site_id: SiteId },

    #[error("storage error: {0}")]
    Storage(String),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, CollectError>;
