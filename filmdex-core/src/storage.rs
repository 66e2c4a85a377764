use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use filmdex_model::{ClassificationTree, Film, FilmKey};

use crate::error::Result;

/// Gateway to the durable film catalog. Each call is individually atomic;
/// there is no cross-record transaction, which is why destructive sequences
/// run under the collector's admission barrier.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn upsert_film(&self, film: Film) -> Result<()>;

    async fn get_film(&self, key: &FilmKey) -> Result<Option<Film>>;

    /// Field-wise merge for incremental sync: fetched fields update the
    /// stored record, absent fields stay. Inserts when the record is new.
    async fn merge_film(&self, film: Film) -> Result<()>;

    async fn delete_all_films(&self) -> Result<()>;

    async fn film_count(&self) -> Result<usize>;

    /// Swap in a wholly new taxonomy. Readers holding a previous snapshot
    /// keep it; new readers see only the new tree.
    async fn replace_classification_tree(&self, tree: ClassificationTree) -> Result<()>;

    async fn classification_tree(&self) -> Result<Arc<ClassificationTree>>;
}

/// In-memory catalog backend.
pub struct MemoryCatalog {
    films: RwLock<HashMap<FilmKey, Film>>,
    tree: RwLock<Arc<ClassificationTree>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self {
            films: RwLock::new(HashMap::new()),
            tree: RwLock::new(Arc::new(ClassificationTree::empty())),
        }
    }
}

impl Default for MemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalog {
    async fn upsert_film(&self, film: Film) -> Result<()> {
        self.films.write().await.insert(film.key(), film);
        Ok(())
    }

    async fn get_film(&self, key: &FilmKey) -> Result<Option<Film>> {
        Ok(self.films.read().await.get(key).cloned())
    }

    async fn merge_film(&self, film: Film) -> Result<()> {
        let mut films = self.films.write().await;
        match films.get_mut(&film.key()) {
            Some(existing) => existing.merge_from(&film),
            None => {
                films.insert(film.key(), film);
            }
        }
        Ok(())
    }

    async fn delete_all_films(&self) -> Result<()> {
        self.films.write().await.clear();
        Ok(())
    }

    async fn film_count(&self) -> Result<usize> {
        Ok(self.films.read().await.len())
    }

    async fn replace_classification_tree(&self, tree: ClassificationTree) -> Result<()> {
        *self.tree.write().await = Arc::new(tree);
        Ok(())
    }

    async fn classification_tree(&self) -> Result<Arc<ClassificationTree>> {
        Ok(self.tree.read().await.clone())
    }
}
