use crate::core::errors::ApprovalError;
use crate::core::models::{
    approval_log::{ApprovalLogEntry, NewApprovalLogEntry},
    approver::Approver,
    batch::{Batch, BatchStatus},
};
use async_trait::async_trait;

#[async_trait]
pub trait Storage: Send + Sync {
    async fn get_batch(&self, batch_id: &str) -> Result<Option<Batch>, ApprovalError>;
    async fn list_batches_by_status(&self, status: BatchStatus) -> Result<Vec<Batch>, ApprovalError>;
    async fn save_batch(&self, batch: Batch) -> Result<(), ApprovalError>;
    /// Inserts a batch only if its id is unused. Returns `false` when the id is taken.
    async fn insert_batch_if_absent(&self, batch: Batch) -> Result<bool, ApprovalError>;

    async fn append_log(&self, entry: NewApprovalLogEntry) -> Result<ApprovalLogEntry, ApprovalError>;
    async fn list_logs_by_batch_id(&self, batch_id: &str) -> Result<Vec<ApprovalLogEntry>, ApprovalError>;

    /// Persists a decided batch together with its log entry.
    ///
    /// When `expected` is set, the stored status must still equal it or the call
    /// fails with `StatusConflict` before anything is written. This default runs
    /// the writes one after another; stores with transactions should override it
    /// so both land or neither does.
    async fn commit_decision(
        &self,
        batch: Batch,
        expected: Option<BatchStatus>,
        entry: NewApprovalLogEntry,
    ) -> Result<ApprovalLogEntry, ApprovalError> {
        let current = self
            .get_batch(&batch.id)
            .await?
            .ok_or_else(|| ApprovalError::BatchNotFound(batch.id.clone()))?;
        if let Some(expected) = expected {
            if current.status != expected {
                return Err(ApprovalError::StatusConflict {
                    batch_id: batch.id,
                    expected: expected.to_string(),
                    actual: current.status.to_string(),
                });
            }
        }
        self.save_batch(batch).await?;
        self.append_log(entry).await
    }

    async fn create_approver_if_not_exists(&self, approver: Approver) -> Result<Option<Approver>, ApprovalError>;
    async fn get_approver(&self, approver_id: &str) -> Result<Option<Approver>, ApprovalError>;
    async fn get_approver_by_email(&self, email: &str) -> Result<Option<Approver>, ApprovalError>;
}

pub mod in_memory;
