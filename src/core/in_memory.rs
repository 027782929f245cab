use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::core::entity::Entity;
use crate::core::traits::Repository;
use crate::core::{AppError, Result};

struct Stored<T> {
    entity: T,
    /// Write sequence, bumped on every upsert
    seq: u64,
}

/// A thread-safe in-memory table keyed by entity id.
///
/// Every entity repository has an in-memory flavour built on this type; it
/// backs the test-suite and `STORAGE=memory` local runs.
pub struct InMemoryRepository<T> {
    rows: Arc<RwLock<HashMap<String, Stored<T>>>>,
    sequence: Arc<AtomicU64>,
}

impl<T> Clone for InMemoryRepository<T> {
    fn clone(&self) -> Self {
        Self {
            rows: Arc::clone(&self.rows),
            sequence: Arc::clone(&self.sequence),
        }
    }
}

impl<T> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self {
            rows: Arc::new(RwLock::new(HashMap::new())),
            sequence: Arc::new(AtomicU64::new(0)),
        }
    }
}

impl<T: Entity> InMemoryRepository<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }

    /// Rows matching `predicate`, ordered by creation time then id
    pub async fn filter<F>(&self, predicate: F) -> Vec<T>
    where
        F: Fn(&T) -> bool,
    {
        let rows = self.rows.read().await;
        let mut matches: Vec<T> = rows
            .values()
            .map(|stored| &stored.entity)
            .filter(|entity| predicate(entity))
            .cloned()
            .collect();

        matches.sort_by(|a, b| {
            a.meta()
                .created_at
                .cmp(&b.meta().created_at)
                .then_with(|| a.id().cmp(b.id()))
        });
        matches
    }

    /// The most recently written row matching `predicate`
    pub async fn find_latest<F>(&self, predicate: F) -> Option<T>
    where
        F: Fn(&T) -> bool,
    {
        let rows = self.rows.read().await;
        rows.values()
            .filter(|stored| predicate(&stored.entity))
            .max_by_key(|stored| stored.seq)
            .map(|stored| stored.entity.clone())
    }
}

#[async_trait]
impl<T: Entity> Repository<T> for InMemoryRepository<T> {
    async fn get_by_id(&self, id: &str) -> Result<T> {
        let rows = self.rows.read().await;
        rows.get(id)
            .map(|stored| stored.entity.clone())
            .ok_or_else(|| AppError::not_found(format!("{} '{}' not found", T::KIND, id)))
    }

    async fn search(&self, query: &str) -> Result<Vec<T>> {
        let needle = query.trim().to_lowercase();
        Ok(self
            .filter(|entity| {
                entity
                    .search_text()
                    .iter()
                    .any(|text| text.to_lowercase().contains(&needle))
            })
            .await)
    }

    async fn save(&self, entity: &T) -> Result<()> {
        let mut rows = self.rows.write().await;
        let seq = self.sequence.fetch_add(1, Ordering::SeqCst);
        rows.insert(
            entity.id().to_string(),
            Stored {
                entity: entity.clone(),
                seq,
            },
        );
        Ok(())
    }
}
