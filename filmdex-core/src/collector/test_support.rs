use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use filmdex_model::{ClassificationNode, Film, FilmMetadata, FilmSummary, SiteId};

use crate::adapters::{FilmPage, PageCursor, SiteAdapter};
use crate::error::AdapterError;

pub(crate) fn sample_film(site: &str, external_id: &str) -> Film {
    Film {
        external_id: external_id.to_string(),
        site_id: SiteId::from(site),
        title: format!("Film {external_id}"),
        metadata: FilmMetadata {
            overview: Some(format!("Overview of film {external_id}")),
            ..FilmMetadata::default()
        },
        classification_refs: vec![],
        last_synced_at: Utc::now(),
    }
}

/// Scriptable in-memory adapter for orchestrator tests.
pub(crate) struct FakeAdapter {
    site_id: SiteId,
    pages: Vec<Vec<Film>>,
    class_nodes: Vec<ClassificationNode>,
    call_delay: Duration,
    transient_list_failures: AtomicU32,
    permanent_failure: bool,
    fail_classification: bool,
    list_calls: AtomicUsize,
    detail_calls: AtomicUsize,
}

impl FakeAdapter {
    pub(crate) fn new(site_id: SiteId) -> Self {
        Self {
            site_id,
            pages: Vec::new(),
            class_nodes: Vec::new(),
            call_delay: Duration::ZERO,
            transient_list_failures: AtomicU32::new(0),
            permanent_failure: false,
            fail_classification: false,
            list_calls: AtomicUsize::new(0),
            detail_calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn with_pages(mut self, pages: Vec<Vec<Film>>) -> Self {
        self.pages = pages;
        self
    }

    pub(crate) fn with_classification(mut self, nodes: Vec<ClassificationNode>) -> Self {
        self.class_nodes = nodes;
        self
    }

    pub(crate) fn with_call_delay(mut self, delay: Duration) -> Self {
        self.call_delay = delay;
        self
    }

    pub(crate) fn with_transient_list_failures(self, count: u32) -> Self {
        self.transient_list_failures.store(count, Ordering::SeqCst);
        self
    }

    pub(crate) fn with_permanent_failure(mut self) -> Self {
        self.permanent_failure = true;
        self
    }

    pub(crate) fn with_classification_failure(mut self) -> Self {
        self.fail_classification = true;
        self
    }

    pub(crate) fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn detail_calls(&self) -> usize {
        self.detail_calls.load(Ordering::SeqCst)
    }

    async fn simulate_latency(&self) {
        if !self.call_delay.is_zero() {
            tokio::time::sleep(self.call_delay).await;
        }
    }
}

#[async_trait]
impl SiteAdapter for FakeAdapter {
    async fn fetch_list(&self, cursor: PageCursor) -> Result<FilmPage, AdapterError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;

        if self.permanent_failure {
            return Err(AdapterError::Parse("scripted permanent failure".into()));
        }
        if self
            .transient_list_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(AdapterError::RateLimited);
        }

        let index = cursor.page.saturating_sub(1) as usize;
        let summaries = self
            .pages
            .get(index)
            .map(|films| {
                films
                    .iter()
                    .map(|f| FilmSummary {
                        external_id: f.external_id.clone(),
                        title: f.title.clone(),
                        updated_at: Some(f.last_synced_at),
                    })
                    .collect()
            })
            .unwrap_or_default();
        let next = (index + 1 < self.pages.len()).then(|| cursor.next());

        Ok(FilmPage { summaries, next })
    }

    async fn fetch_detail(&self, external_id: &str) -> Result<Film, AdapterError> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;

        if self.permanent_failure {
            return Err(AdapterError::Parse("scripted permanent failure".into()));
        }

        self.pages
            .iter()
            .flatten()
            .find(|f| f.external_id == external_id)
            .map(|f| {
                let mut film = f.clone();
                film.site_id = self.site_id.clone();
                film.last_synced_at = Utc::now();
                film
            })
            .ok_or_else(|| AdapterError::NotFound(external_id.to_string()))
    }

    async fn fetch_classification(&self) -> Result<Vec<ClassificationNode>, AdapterError> {
        self.simulate_latency().await;

        if self.fail_classification || self.permanent_failure {
            return Err(AdapterError::Parse("scripted classification failure".into()));
        }
        Ok(self.class_nodes.clone())
    }
}
