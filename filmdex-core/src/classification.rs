use std::sync::Arc;

use futures::future::join_all;
use tracing::{error, info};

use filmdex_model::{ClassificationNode, ClassificationTree, SiteId};

use crate::adapters::SiteAdapter;
use crate::error::{CollectError, Result};
use crate::storage::CatalogStore;

/// Rebuilds the classification taxonomy as a whole.
///
/// Fetches every source taxonomy, assembles the replacement tree entirely
/// offline, and only then swaps it in through the store — readers see the
/// old tree or the new one, never a mix. Any fetch or build failure skips
/// the swap and leaves the previous tree authoritative.
pub struct ClassificationSyncer {
    sources: Vec<(SiteId, Arc<dyn SiteAdapter>)>,
    store: Arc<dyn CatalogStore>,
}

impl ClassificationSyncer {
    pub fn new(sources: Vec<(SiteId, Arc<dyn SiteAdapter>)>, store: Arc<dyn CatalogStore>) -> Self {
        Self { sources, store }
    }

    /// Returns the node count of the freshly installed tree.
    pub async fn sync(&self) -> Result<usize> {
        if self.sources.is_empty() {
            return Err(CollectError::Validation(
                "no enabled sites to fetch classifications from".to_string(),
            ));
        }

        let fetches = self.sources.iter().map(|(site_id, adapter)| async move {
            adapter
                .fetch_classification()
                .await
                .map_err(|err| (site_id.clone(), err))
        });

        let mut nodes: Vec<ClassificationNode> = Vec::new();
        for result in join_all(fetches).await {
            match result {
                Ok(site_nodes) => nodes.extend(site_nodes),
                Err((site_id, err)) => {
                    error!(site = %site_id, error = %err, "classification fetch failed, keeping previous tree");
                    return Err(CollectError::Adapter(err));
                }
            }
        }

        let tree = ClassificationTree::from_nodes(nodes)?;
        let node_count = tree.len();
        self.store.replace_classification_tree(tree).await?;
        info!(nodes = node_count, "classification tree replaced");
        Ok(node_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::test_support::FakeAdapter;
    use crate::storage::MemoryCatalog;
    use filmdex_model::ClassificationId;

    fn node(id: i64, parent: Option<i64>, name: &str) -> ClassificationNode {
        ClassificationNode {
            id: ClassificationId(id),
            name: name.to_string(),
            parent: parent.map(ClassificationId),
        }
    }

    fn source(site: &str, nodes: Vec<ClassificationNode>) -> (SiteId, Arc<dyn SiteAdapter>) {
        (
            SiteId::from(site),
            Arc::new(FakeAdapter::new(SiteId::from(site)).with_classification(nodes)),
        )
    }

    #[tokio::test]
    async fn merges_taxonomies_from_every_source_and_swaps_once() {
        let store = Arc::new(MemoryCatalog::new());
        let syncer = ClassificationSyncer::new(
            vec![
                source("alpha", vec![node(1, None, "Films"), node(6, Some(1), "Drama")]),
                source("beta", vec![node(20, None, "Shows")]),
            ],
            store.clone(),
        );

        let count = syncer.sync().await.expect("sync succeeds");

        assert_eq!(count, 3);
        let tree = store.classification_tree().await.unwrap();
        assert!(tree.contains(ClassificationId(6)));
        assert!(tree.contains(ClassificationId(20)));
    }

    #[tokio::test]
    async fn fetch_failure_keeps_the_previous_tree() {
        let store = Arc::new(MemoryCatalog::new());
        ClassificationSyncer::new(
            vec![source("alpha", vec![node(1, None, "Films")])],
            store.clone(),
        )
        .sync()
        .await
        .expect("initial sync succeeds");
        let before = store.classification_tree().await.unwrap();

        let failing: (SiteId, Arc<dyn SiteAdapter>) = (
            SiteId::from("beta"),
            Arc::new(
                FakeAdapter::new(SiteId::from("beta")).with_classification_failure(),
            ),
        );
        let result = ClassificationSyncer::new(
            vec![source("alpha", vec![node(2, None, "Other")]), failing],
            store.clone(),
        )
        .sync()
        .await;

        assert!(result.is_err());
        let after = store.classification_tree().await.unwrap();
        assert_eq!(before.generation(), after.generation());
        assert!(after.contains(ClassificationId(1)));
    }

    #[tokio::test]
    async fn dangling_parent_across_sources_skips_the_swap() {
        let store = Arc::new(MemoryCatalog::new());
        let result = ClassificationSyncer::new(
            vec![source("alpha", vec![node(6, Some(99), "Orphan")])],
            store.clone(),
        )
        .sync()
        .await;

        assert!(matches!(result, Err(CollectError::Model(_))));
        assert!(store.classification_tree().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn readers_holding_a_snapshot_never_see_generation_mixing() {
        let store = Arc::new(MemoryCatalog::new());
        ClassificationSyncer::new(
            vec![source("alpha", vec![node(1, None, "Films"), node(6, Some(1), "Drama")])],
            store.clone(),
        )
        .sync()
        .await
        .expect("first generation installs");

        let snapshot = store.classification_tree().await.unwrap();

        ClassificationSyncer::new(
            vec![source("alpha", vec![node(40, None, "Shows"), node(41, Some(40), "Anime")])],
            store.clone(),
        )
        .sync()
        .await
        .expect("second generation installs");

        // The held snapshot stays internally consistent: every parent
        // reference resolves inside that same snapshot.
        for node in snapshot.iter() {
            if let Some(parent) = node.parent {
                assert!(snapshot.contains(parent));
            }
        }
        let fresh = store.classification_tree().await.unwrap();
        assert_ne!(snapshot.generation(), fresh.generation());
        for node in fresh.iter() {
            if let Some(parent) = node.parent {
                assert!(fresh.contains(parent));
            }
        }
        assert!(!fresh.contains(ClassificationId(1)));
    }
}
