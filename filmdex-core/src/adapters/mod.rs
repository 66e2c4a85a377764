use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use filmdex_model::{AdapterKind, ClassificationNode, Film, FilmSummary, Site};

use crate::error::AdapterError;

mod json_api;

pub use json_api::JsonApiAdapter;

/// Position within a site's paged listing. Pages are 1-based upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageCursor {
    pub page: u32,
}

impl PageCursor {
    pub fn first() -> Self {
        Self { page: 1 }
    }

    pub fn next(self) -> Self {
        Self {
            page: self.page + 1,
        }
    }
}

/// One page of listing results plus the cursor for the following page, if
/// any. This is the lazy-sequence surface of `fetch_list`.
#[derive(Debug, Clone)]
pub struct FilmPage {
    pub summaries: Vec<FilmSummary>,
    pub next: Option<PageCursor>,
}

/// Per-site fetch capability. One implementation per adapter kind, selected
/// through the site registry.
#[async_trait]
pub trait SiteAdapter: Send + Sync {
    async fn fetch_list(&self, cursor: PageCursor) -> Result<FilmPage, AdapterError>;

    async fn fetch_detail(&self, external_id: &str) -> Result<Film, AdapterError>;

    async fn fetch_classification(&self) -> Result<Vec<ClassificationNode>, AdapterError>;
}

/// Construct the adapter a site's configuration calls for.
pub fn build_adapter(site: &Site) -> Result<Arc<dyn SiteAdapter>, AdapterError> {
    match site.adapter_kind {
        AdapterKind::JsonApi => Ok(Arc::new(JsonApiAdapter::new(site)?)),
    }
}
