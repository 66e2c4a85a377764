//! Core data model definitions shared across Filmdex crates.

pub mod classification;
pub mod error;
pub mod film;
pub mod ids;
pub mod job;
pub mod site;

// Intentionally curated re-exports for downstream consumers.
pub use classification::{ClassificationId, ClassificationNode, ClassificationTree};
pub use error::{ModelError, Result as ModelResult};
pub use film::{Film, FilmMetadata, FilmSummary};
pub use ids::{FilmKey, SiteId};
pub use job::{CollectJob, CollectMode, DurationBudget, JobStatus};
pub use site::{AdapterKind, Site, SiteConfig};
