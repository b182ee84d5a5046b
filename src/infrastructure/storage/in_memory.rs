use crate::core::errors::ApprovalError;
use crate::core::models::{
    approval_log::{ApprovalLogEntry, NewApprovalLogEntry},
    approver::Approver,
    batch::{Batch, BatchStatus},
};
use crate::infrastructure::storage::Storage;
use async_trait::async_trait;
use bcrypt::hash;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

// Lock order is always batches -> approval_logs.
#[derive(Clone)]
pub struct InMemoryStorage {
    batches: Arc<RwLock<HashMap<String, Batch>>>,
    approval_logs: Arc<RwLock<HashMap<String, Vec<ApprovalLogEntry>>>>,
    next_log_id: Arc<AtomicU64>,
    approvers: Arc<RwLock<HashMap<String, Approver>>>,
    approvers_by_email: Arc<RwLock<HashMap<String, Approver>>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        InMemoryStorage {
            batches: Arc::new(RwLock::new(HashMap::new())),
            approval_logs: Arc::new(RwLock::new(HashMap::new())),
            next_log_id: Arc::new(AtomicU64::new(1)),
            approvers: Arc::new(RwLock::new(HashMap::new())),
            approvers_by_email: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    fn push_log(
        &self,
        logs: &mut HashMap<String, Vec<ApprovalLogEntry>>,
        entry: NewApprovalLogEntry,
    ) -> ApprovalLogEntry {
        let id = self.next_log_id.fetch_add(1, Ordering::SeqCst);
        let stored = entry.with_id(id);
        logs.entry(stored.batch_id.clone())
            .or_insert_with(Vec::new)
            .push(stored.clone());
        stored
    }
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn get_batch(&self, batch_id: &str) -> Result<Option<Batch>, ApprovalError> {
        let batches = self.batches.read().await;
        Ok(batches.get(batch_id).cloned())
    }

    async fn list_batches_by_status(&self, status: BatchStatus) -> Result<Vec<Batch>, ApprovalError> {
        let batches = self.batches.read().await;
        let mut matching: Vec<Batch> = batches.values().filter(|b| b.status == status).cloned().collect();
        matching.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(matching)
    }

    async fn save_batch(&self, batch: Batch) -> Result<(), ApprovalError> {
        let mut batches = self.batches.write().await;
        batches.insert(batch.id.clone(), batch);
        Ok(())
    }

    async fn insert_batch_if_absent(&self, batch: Batch) -> Result<bool, ApprovalError> {
        let mut batches = self.batches.write().await;
        if batches.contains_key(&batch.id) {
            return Ok(false);
        }
        batches.insert(batch.id.clone(), batch);
        Ok(true)
    }

    async fn append_log(&self, entry: NewApprovalLogEntry) -> Result<ApprovalLogEntry, ApprovalError> {
        let mut logs = self.approval_logs.write().await;
        Ok(self.push_log(&mut logs, entry))
    }

    async fn list_logs_by_batch_id(&self, batch_id: &str) -> Result<Vec<ApprovalLogEntry>, ApprovalError> {
        let logs = self.approval_logs.read().await;
        Ok(logs.get(batch_id).cloned().unwrap_or_default())
    }

    async fn commit_decision(
        &self,
        batch: Batch,
        expected: Option<BatchStatus>,
        entry: NewApprovalLogEntry,
    ) -> Result<ApprovalLogEntry, ApprovalError> {
        let mut batches = self.batches.write().await;
        let current = batches
            .get(&batch.id)
            .ok_or_else(|| ApprovalError::BatchNotFound(batch.id.clone()))?;
        if let Some(expected) = expected {
            if current.status != expected {
                return Err(ApprovalError::StatusConflict {
                    batch_id: batch.id.clone(),
                    expected: expected.to_string(),
                    actual: current.status.to_string(),
                });
            }
        }
        let mut logs = self.approval_logs.write().await;
        batches.insert(batch.id.clone(), batch);
        Ok(self.push_log(&mut logs, entry))
    }

    async fn create_approver_if_not_exists(&self, approver: Approver) -> Result<Option<Approver>, ApprovalError> {
        let mut approvers_by_email = self.approvers_by_email.write().await;
        if approvers_by_email.contains_key(&approver.email) {
            return Ok(None);
        }
        let hashed = Approver {
            password: hash(&approver.password, bcrypt::DEFAULT_COST)
                .map_err(|e| ApprovalError::InternalServerError(format!("Password hashing error: {}", e)))?,
            ..approver
        };
        approvers_by_email.insert(hashed.email.clone(), hashed.clone());
        let mut approvers = self.approvers.write().await;
        approvers.insert(hashed.id.clone(), hashed.clone());
        Ok(Some(hashed))
    }

    async fn get_approver(&self, approver_id: &str) -> Result<Option<Approver>, ApprovalError> {
        let approvers = self.approvers.read().await;
        Ok(approvers.get(approver_id).cloned())
    }

    async fn get_approver_by_email(&self, email: &str) -> Result<Option<Approver>, ApprovalError> {
        let approvers_by_email = self.approvers_by_email.read().await;
        Ok(approvers_by_email.get(email).cloned())
    }
}
