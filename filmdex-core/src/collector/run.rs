use std::future::Future;
use std::sync::Arc;

use tracing::{debug, warn};

use filmdex_model::SiteId;

use super::deadline::Deadline;
use crate::adapters::{PageCursor, SiteAdapter};
use crate::config::RetryPolicy;
use crate::error::AdapterError;
use crate::storage::CatalogStore;

/// How a job run ended, short of an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum JobOutcome {
    Completed { films: usize },
    DeadlineReached { films: usize },
}

/// Retry `op` through transient adapter failures, up to the policy's
/// attempt bound with linear backoff. Permanent failures return immediately.
pub(crate) async fn with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    site_id: &SiteId,
    mut op: F,
) -> Result<T, AdapterError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AdapterError>>,
{
    let mut attempt: u32 = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_transient() && attempt < policy.max_attempts => {
                warn!(
                    site = %site_id,
                    attempt,
                    max_attempts = policy.max_attempts,
                    error = %err,
                    "transient adapter error, retrying"
                );
                tokio::time::sleep(policy.backoff * attempt).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

/// Execute one full-mode collection: page through the site's listing, fetch
/// detail per entry, and upsert into the catalog. The deadline is checked
/// before every adapter call; expiry keeps partial writes and reports back
/// as a deadline outcome rather than an error.
pub(crate) async fn run_full_collect(
    site_id: &SiteId,
    adapter: Arc<dyn SiteAdapter>,
    store: Arc<dyn CatalogStore>,
    deadline: Deadline,
    retry: &RetryPolicy,
) -> crate::error::Result<JobOutcome> {
    let mut films = 0usize;
    let mut cursor = Some(PageCursor::first());

    while let Some(page_cursor) = cursor {
        if deadline.expired() {
            return Ok(JobOutcome::DeadlineReached { films });
        }

        let page = with_retry(retry, site_id, || adapter.fetch_list(page_cursor)).await?;
        debug!(
            site = %site_id,
            page = page_cursor.page,
            entries = page.summaries.len(),
            "fetched listing page"
        );

        for summary in &page.summaries {
            if deadline.expired() {
                return Ok(JobOutcome::DeadlineReached { films });
            }

            let film = with_retry(retry, site_id, || {
                adapter.fetch_detail(&summary.external_id)
            })
            .await?;
            store.upsert_film(film).await?;
            films += 1;
        }

        cursor = page.next;
    }

    Ok(JobOutcome::Completed { films })
}
