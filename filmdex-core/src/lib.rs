//! # Filmdex Core
//!
//! Collection orchestrator for the Filmdex catalog: accepts collection
//! requests, enforces one active job per site, fans batch jobs out onto a
//! bounded worker pool, time-boxes job execution, and sequences the two
//! destructive operations (full reset, classification replacement) so they
//! never interleave with in-flight catalog writes.
//!
//! ## Architecture
//!
//! - [`registry`]: immutable per-run configuration of resource sites
//! - [`adapters`]: the per-site fetch capability (`fetch_list`,
//!   `fetch_detail`, `fetch_classification`) and its JSON-API implementation
//! - [`storage`]: the catalog gateway trait plus an in-memory backend
//! - [`jobs`]: the dedup registry — at most one active job per site
//! - [`collector`]: the orchestrator facade, worker pool, deadlines, and
//!   the reset coordinator
//! - [`classification`]: offline taxonomy rebuild with an atomic swap

pub mod adapters;
pub mod classification;
pub mod collector;
pub mod config;
pub mod error;
pub mod jobs;
pub mod registry;
pub mod storage;

pub use adapters::{build_adapter, FilmPage, JsonApiAdapter, PageCursor, SiteAdapter};
pub use classification::ClassificationSyncer;
pub use collector::{
    BatchFailure, BatchReport, CollectStats, Collector, SyncFailure, SyncReport,
};
pub use config::{CollectorConfig, RetryPolicy};
pub use error::{AdapterError, CollectError, Result};
pub use jobs::JobRegistry;
pub use registry::SiteRegistry;
pub use storage::{CatalogStore, MemoryCatalog};

pub use filmdex_model as model;
