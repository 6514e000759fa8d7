//! Process-lifetime memoization of catalog lookups.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use crate::{CatalogItem, CatalogStore, ResultEngine};

/// [`CatalogStore`] decorator remembering every successful lookup.
///
/// Entries never expire. Concurrent misses for one name may both reach the
/// store; the last insert wins, which is harmless since the value is the same.
/// Not-found results are not remembered.
pub struct MemoCatalog {
    inner: Arc<dyn CatalogStore>,
    items: DashMap<String, CatalogItem>,
}

impl MemoCatalog {
    pub fn new(inner: Arc<dyn CatalogStore>) -> Self {
        Self {
            inner,
            items: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[async_trait]
impl CatalogStore for MemoCatalog {
    async fn get_by_name(&self, name: &str) -> ResultEngine<CatalogItem> {
        if let Some(item) = self.items.get(name) {
            return Ok(item.clone());
        }
        let item = self.inner.get_by_name(name).await?;
        self.items.insert(name.to_string(), item.clone());
        Ok(item)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::EngineError;

    #[derive(Default)]
    struct CountingCatalog {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl CatalogStore for CountingCatalog {
        async fn get_by_name(&self, name: &str) -> ResultEngine<CatalogItem> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match name {
                "cup" => Ok(CatalogItem {
                    id: 2,
                    name: "cup".to_string(),
                    price: 20,
                }),
                _ => Err(EngineError::ItemNotFound(name.to_string())),
            }
        }
    }

    #[tokio::test]
    async fn hits_skip_the_store() {
        let store = Arc::new(CountingCatalog::default());
        let memo = MemoCatalog::new(store.clone());

        for _ in 0..3 {
            assert_eq!(memo.get_by_name("cup").await.unwrap().price, 20);
        }

        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
        assert_eq!(memo.len(), 1);
    }

    #[tokio::test]
    async fn misses_are_not_remembered() {
        let store = Arc::new(CountingCatalog::default());
        let memo = MemoCatalog::new(store.clone());

        for _ in 0..2 {
            assert_eq!(
                memo.get_by_name("yacht").await,
                Err(EngineError::ItemNotFound("yacht".to_string()))
            );
        }

        assert_eq!(store.calls.load(Ordering::SeqCst), 2);
        assert!(memo.is_empty());
    }
}
