use crate::core::errors::ApprovalError;
use crate::core::models::batch::{Batch, BatchStatus};
use crate::infrastructure::cache::{Cache, cache_keys::batches_by_status_key};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

struct Listings {
    generation: u64,
    entries: HashMap<String, (Vec<Batch>, chrono::DateTime<chrono::Utc>)>,
}

#[derive(Clone)]
pub struct InMemoryCache {
    cache: Arc<RwLock<Listings>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        InMemoryCache {
            cache: Arc::new(RwLock::new(Listings {
                generation: 0,
                entries: HashMap::new(),
            })),
        }
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Cache for InMemoryCache {
    async fn get_batches_by_status(&self, status: BatchStatus) -> Result<Option<Vec<Batch>>, ApprovalError> {
        let cache = self.cache.read().await;
        let key = batches_by_status_key(status);
        Ok(cache
            .entries
            .get(&key)
            .filter(|(_, expiry)| *expiry > chrono::Utc::now())
            .map(|(batches, _)| batches.clone()))
    }

    async fn listing_generation(&self) -> u64 {
        self.cache.read().await.generation
    }

    async fn save_batches_by_status(
        &self,
        status: BatchStatus,
        batches: &[Batch],
        ttl: std::time::Duration,
        generation: u64,
    ) -> Result<bool, ApprovalError> {
        let expiry = chrono::Utc::now()
            + chrono::Duration::from_std(ttl)
                .map_err(|e| ApprovalError::CacheError(format!("Failed to convert TTL: {}", e)))?;
        let mut cache = self.cache.write().await;
        if cache.generation != generation {
            return Ok(false);
        }
        cache
            .entries
            .insert(batches_by_status_key(status), (batches.to_vec(), expiry));
        Ok(true)
    }

    async fn invalidate_batch_listings(&self) -> Result<(), ApprovalError> {
        let mut cache = self.cache.write().await;
        cache.generation += 1;
        cache.entries.clear();
        Ok(())
    }
}
