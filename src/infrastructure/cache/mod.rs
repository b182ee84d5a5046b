pub mod cache_keys;
pub mod in_memory;

use crate::core::errors::ApprovalError;
use crate::core::models::batch::{Batch, BatchStatus};
use async_trait::async_trait;

#[async_trait]
pub trait Cache: Send + Sync {
    async fn get_batches_by_status(&self, status: BatchStatus) -> Result<Option<Vec<Batch>>, ApprovalError>;

    /// Current listing generation. Every invalidation moves it forward.
    async fn listing_generation(&self) -> u64;

    /// Stores `batches` only if no invalidation happened since `generation`
    /// was read. Returns whether the listing was stored.
    async fn save_batches_by_status(
        &self,
        status: BatchStatus,
        batches: &[Batch],
        ttl: std::time::Duration,
        generation: u64,
    ) -> Result<bool, ApprovalError>;

    async fn invalidate_batch_listings(&self) -> Result<(), ApprovalError>;
}
