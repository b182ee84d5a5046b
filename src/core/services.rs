use crate::auth::jwt::{Claims, JwtService};
use crate::core::constants::{
    APPROVER_ADDED, APPROVER_LOGGED_IN, BATCH_APPROVED, BATCH_REJECTED, BATCH_SUBMITTED, BULK_DECISION_APPLIED,
    DEFAULT_PAGE_SIZE, MAX_NAME_LEN, MAX_PAGE_SIZE, MAX_REMARKS_LEN, SUMMARY_EXPORTED,
};
use crate::core::errors::ApprovalError;
use crate::core::models::{
    approval_log::{ApprovalLogEntry, Decision, NewApprovalLogEntry},
    approver::{Approver, Role},
    audit::AppLog,
    batch::{Batch, BatchPage, BatchStatus, NewBatch},
};
use crate::core::summary::render_batch_summary;
use crate::infrastructure::cache::Cache;
use crate::infrastructure::logging::LoggingService;
use crate::infrastructure::storage::Storage;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use std::time::Duration;
use utoipa::ToSchema;

const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60);

/// Result of one batch within a bulk decision.
#[derive(Serialize, Deserialize, Debug, ToSchema, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BulkDecisionOutcome {
    pub batch_id: String,
    pub status: Option<BatchStatus>,
    pub error: Option<String>,
}

impl BulkDecisionOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Validated inputs shared by single and bulk decisions.
struct DecisionInput<'a> {
    decision: Decision,
    remarks: Option<String>,
    actor: &'a str,
    timestamp: DateTime<Utc>,
}

pub struct ApprovalService<L: LoggingService, S: Storage, C: Cache> {
    storage: S,
    logging: L,
    cache: C,
    jwt_service: JwtService,
    cache_ttl: Duration,
}

impl<L: LoggingService, S: Storage, C: Cache> ApprovalService<L, S, C> {
    pub fn new(storage: S, logging: L, cache: C, jwt_secret: String) -> Self {
        info!("Initializing ApprovalService");
        ApprovalService {
            storage,
            logging,
            cache,
            jwt_service: JwtService::new(jwt_secret),
            cache_ttl: DEFAULT_CACHE_TTL,
        }
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, ApprovalError> {
        self.jwt_service.validate_token(token)
    }

    fn validate_string_input(&self, field: &str, value: &str, max_length: usize) -> Result<(), ApprovalError> {
        if value.trim().is_empty() {
            return Err(ApprovalError::invalid_input(
                field,
                format!("Invalid {}", field),
                format!("{} cannot be empty", field),
            ));
        }
        if value.chars().count() > max_length {
            return Err(ApprovalError::invalid_input(
                field,
                format!("{} Too Long", field),
                format!("{} cannot exceed {} characters", field, max_length),
            ));
        }
        if value.chars().any(|c| c.is_control()) {
            return Err(ApprovalError::invalid_input(
                field,
                format!("Invalid {}", field),
                format!("{} contains invalid characters", field),
            ));
        }
        Ok(())
    }

    /// Trims remarks and drops them when blank. Over-long remarks are rejected, never truncated.
    fn normalize_remarks(&self, remarks: Option<String>) -> Result<Option<String>, ApprovalError> {
        let Some(remarks) = remarks else {
            return Ok(None);
        };
        let trimmed = remarks.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        let len = trimmed.chars().count();
        if len > MAX_REMARKS_LEN {
            return Err(ApprovalError::invalid_input(
                "remarks",
                "remarks Too Long",
                format!("remarks cannot exceed {} characters (got {})", MAX_REMARKS_LEN, len),
            ));
        }
        Ok(Some(trimmed.to_string()))
    }

    fn validate_new_batch(&self, batch: &NewBatch) -> Result<(), ApprovalError> {
        self.validate_string_input("id", &batch.id, MAX_NAME_LEN)?;
        self.validate_string_input("paymentType", &batch.instruction.payment_type, MAX_NAME_LEN)?;
        self.validate_string_input("paymentCurrency", &batch.instruction.payment_currency, MAX_NAME_LEN)?;
        self.validate_string_input("debitAccount", &batch.instruction.debit_account, MAX_NAME_LEN)?;
        self.validate_string_input("date", &batch.instruction.date, MAX_NAME_LEN)?;
        if batch.payments.is_empty() {
            return Err(ApprovalError::invalid_input(
                "payments",
                "Invalid payments",
                "A batch needs at least one payment",
            ));
        }
        for payment in &batch.payments {
            self.validate_string_input("payeeName", &payment.payee_name, MAX_NAME_LEN)?;
            if !payment.amount.is_finite() || payment.amount <= 0.0 {
                return Err(ApprovalError::invalid_input(
                    "amount",
                    "Invalid Amount",
                    "Amount must be a finite number greater than 0",
                ));
            }
        }
        Ok(())
    }

    fn parse_decision_input<'a>(
        &self,
        decision: &str,
        remarks: Option<String>,
        actor: &'a str,
        timestamp: DateTime<Utc>,
    ) -> Result<DecisionInput<'a>, ApprovalError> {
        let decision: Decision = decision.parse()?;
        let remarks = self.normalize_remarks(remarks)?;
        if decision == Decision::Rejected && remarks.is_none() {
            return Err(ApprovalError::invalid_input(
                "remarks",
                "Reason required",
                "Please provide a reason for rejecting the batch",
            ));
        }
        self.validate_string_input("actor", actor, MAX_NAME_LEN)?;
        Ok(DecisionInput {
            decision,
            remarks,
            actor,
            timestamp,
        })
    }

    async fn record(&self, action: &str, details: serde_json::Value, user_id: Option<&str>) {
        if let Err(e) = self.logging.log_action(action, details, user_id).await {
            warn!("Failed to record {}: {}", action, e);
        }
    }

    async fn invalidate_listings(&self) {
        if let Err(e) = self.cache.invalidate_batch_listings().await {
            warn!("Failed to invalidate batch listings: {}", e);
        }
    }

    pub async fn add_approver(&self, approver: Approver) -> Result<Approver, ApprovalError> {
        if approver.email.is_empty() || !approver.email.contains('@') || approver.email.len() < 5 {
            return Err(ApprovalError::invalid_input(
                "email",
                "Invalid email",
                format!("`{}` is not a valid email", approver.email),
            ));
        }
        if approver.password.is_empty() {
            return Err(ApprovalError::invalid_input(
                "password",
                "Invalid password",
                "Password cannot be empty",
            ));
        }
        self.validate_string_input("id", &approver.id, MAX_NAME_LEN)?;
        self.validate_string_input("name", &approver.name, MAX_NAME_LEN)?;

        let email = approver.email.clone();
        let created = self
            .storage
            .create_approver_if_not_exists(approver)
            .await?
            .ok_or_else(|| ApprovalError::EmailAlreadyRegistered(email))?;
        info!("Approver {} registered with role {}", created.id, created.role);
        self.record(
            APPROVER_ADDED,
            json!({ "approver_id": created.id, "name": created.name, "role": created.role.to_string() }),
            None,
        )
        .await;
        Ok(created)
    }

    /// Creates the first APPROVER account. Already being registered is not an
    /// error, so this is safe to run on every start.
    pub async fn bootstrap_approver(&self, mut approver: Approver) -> Result<(), ApprovalError> {
        approver.role = Role::Approver;
        match self.add_approver(approver).await {
            Ok(created) => {
                info!("Bootstrap approver {} created", created.id);
                Ok(())
            }
            Err(ApprovalError::EmailAlreadyRegistered(email)) => {
                debug!("Bootstrap approver {} already registered", email);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    pub async fn get_approver(&self, approver_id: &str) -> Result<Approver, ApprovalError> {
        self.storage
            .get_approver(approver_id)
            .await?
            .ok_or_else(|| ApprovalError::ApproverNotFound(approver_id.to_string()))
    }

    pub async fn authenticate(&self, email: &str, password: &str) -> Result<String, ApprovalError> {
        let approver = self
            .storage
            .get_approver_by_email(email)
            .await?
            .ok_or(ApprovalError::InvalidCredentials)?;

        let verified = bcrypt::verify(password, &approver.password)
            .map_err(|e| ApprovalError::InternalServerError(format!("Password verification error: {}", e)))?;
        if !verified {
            warn!("Failed login for {}", email);
            return Err(ApprovalError::InvalidCredentials);
        }
        let token = self.jwt_service.generate_token(&approver)?;
        self.record(APPROVER_LOGGED_IN, json!({}), Some(approver.id.as_str())).await;
        Ok(token)
    }

    pub async fn submit_batch(&self, new_batch: NewBatch, submitted_by: &str) -> Result<Batch, ApprovalError> {
        self.validate_new_batch(&new_batch)?;
        let batch = new_batch.into_submitted(Utc::now());
        if !self.storage.insert_batch_if_absent(batch.clone()).await? {
            return Err(ApprovalError::BatchAlreadyExists(batch.id));
        }
        info!("Batch {} submitted with {} payments", batch.id, batch.payments.len());
        self.invalidate_listings().await;
        self.record(
            BATCH_SUBMITTED,
            json!({ "batch_id": batch.id, "payments": batch.payments.len(), "total": batch.total_amount() }),
            Some(submitted_by),
        )
        .await;
        Ok(batch)
    }

    pub async fn get_batch(&self, batch_id: &str) -> Result<Batch, ApprovalError> {
        self.storage
            .get_batch(batch_id)
            .await?
            .ok_or_else(|| ApprovalError::BatchNotFound(batch_id.to_string()))
    }

    async fn batches_by_status(&self, status: BatchStatus) -> Result<Vec<Batch>, ApprovalError> {
        match self.cache.get_batches_by_status(status).await {
            Ok(Some(cached)) => {
                debug!("Serving {} batches from cache", status);
                return Ok(cached);
            }
            Ok(None) => {}
            Err(e) => warn!("Cache read failed for {} batches: {}", status, e),
        }
        // Read before storage so a decision landing in between discards this snapshot.
        let generation = self.cache.listing_generation().await;
        let batches = self.storage.list_batches_by_status(status).await?;
        match self
            .cache
            .save_batches_by_status(status, &batches, self.cache_ttl, generation)
            .await
        {
            Ok(true) => {}
            Ok(false) => debug!("Listing of {} batches went stale before caching", status),
            Err(e) => warn!("Cache write failed for {} batches: {}", status, e),
        }
        Ok(batches)
    }

    /// Lists batches in `status`, oldest first. `page` is 1-based.
    pub async fn list_batches(
        &self,
        status: BatchStatus,
        page: Option<usize>,
        per_page: Option<usize>,
    ) -> Result<BatchPage, ApprovalError> {
        let page = page.unwrap_or(1);
        let per_page = per_page.unwrap_or(DEFAULT_PAGE_SIZE);
        if page == 0 {
            return Err(ApprovalError::invalid_input("page", "Invalid page", "page starts at 1"));
        }
        if per_page == 0 || per_page > MAX_PAGE_SIZE {
            return Err(ApprovalError::invalid_input(
                "perPage",
                "Invalid page size",
                format!("perPage must be between 1 and {}", MAX_PAGE_SIZE),
            ));
        }

        let batches = self.batches_by_status(status).await?;
        let total = batches.len();
        let items = batches
            .into_iter()
            .skip((page - 1).saturating_mul(per_page))
            .take(per_page)
            .collect();
        Ok(BatchPage {
            items,
            total,
            page,
            per_page,
        })
    }

    async fn apply_decision(
        &self,
        batch_id: &str,
        input: &DecisionInput<'_>,
        expected_status: Option<BatchStatus>,
    ) -> Result<Batch, ApprovalError> {
        let mut batch = self.get_batch(batch_id).await?;
        if batch.status.is_terminal() && expected_status.is_none() {
            warn!(
                "Batch {} is already {}; overwriting with {}",
                batch.id, batch.status, input.decision
            );
        }

        batch.status = input.decision.target_status();
        batch.approved_by = Some(input.actor.to_string());
        batch.approved_at = Some(input.timestamp);
        batch.remarks = input.remarks.clone();

        let entry = NewApprovalLogEntry {
            batch_id: batch.id.clone(),
            action: input.decision,
            remarks: input.remarks.clone(),
            approved_by: input.actor.to_string(),
            approved_at: input.timestamp,
        };
        let logged = self
            .storage
            .commit_decision(batch.clone(), expected_status, entry)
            .await?;
        info!("Batch {} {} by {} (log entry {})", batch.id, input.decision, input.actor, logged.id);

        self.invalidate_listings().await;
        let action = match input.decision {
            Decision::Approved => BATCH_APPROVED,
            Decision::Rejected => BATCH_REJECTED,
        };
        self.record(
            action,
            json!({ "batch_id": batch.id, "log_id": logged.id, "remarks": input.remarks }),
            Some(input.actor),
        )
        .await;
        Ok(batch)
    }

    /// Applies `decision` to a batch and appends the matching approval log entry.
    ///
    /// With `expected_status` set the call fails with `StatusConflict` if the
    /// batch has moved on in the meantime. Without it an already decided batch
    /// is decided again: its fields are overwritten and a further log entry is
    /// appended.
    pub async fn decide(
        &self,
        batch_id: &str,
        decision: &str,
        remarks: Option<String>,
        actor: &str,
        timestamp: DateTime<Utc>,
        expected_status: Option<BatchStatus>,
    ) -> Result<Batch, ApprovalError> {
        let input = self.parse_decision_input(decision, remarks, actor, timestamp)?;
        self.apply_decision(batch_id, &input, expected_status).await
    }

    /// Decides every listed batch that is still `Submitted`. Per-batch failures
    /// are reported in the outcomes; bad input for any batch fails the whole call.
    ///
    /// Each batch takes its non-blank entry in `remarks_by_batch` when present
    /// and the shared `remarks` otherwise.
    pub async fn decide_many(
        &self,
        batch_ids: &[String],
        decision: &str,
        remarks: Option<String>,
        remarks_by_batch: &HashMap<String, String>,
        actor: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<Vec<BulkDecisionOutcome>, ApprovalError> {
        if batch_ids.is_empty() {
            return Err(ApprovalError::invalid_input(
                "batchIds",
                "Invalid selection",
                "Select at least one batch",
            ));
        }
        let inputs = batch_ids
            .iter()
            .map(|batch_id| {
                let remarks = remarks_by_batch
                    .get(batch_id)
                    .filter(|r| !r.trim().is_empty())
                    .cloned()
                    .or_else(|| remarks.clone());
                self.parse_decision_input(decision, remarks, actor, timestamp)
                    .map(|input| (batch_id, input))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let decided = inputs.first().map(|(_, input)| input.decision);

        let decisions = inputs.iter().map(|(batch_id, input)| async move {
            match self.apply_decision(batch_id, input, Some(BatchStatus::Submitted)).await {
                Ok(batch) => BulkDecisionOutcome {
                    batch_id: batch_id.to_string(),
                    status: Some(batch.status),
                    error: None,
                },
                Err(e) => {
                    warn!("Bulk decision skipped batch {}: {}", batch_id, e);
                    BulkDecisionOutcome {
                        batch_id: batch_id.to_string(),
                        status: None,
                        error: Some(e.to_string()),
                    }
                }
            }
        });
        let outcomes = futures::future::join_all(decisions).await;

        let succeeded = outcomes.iter().filter(|o| o.is_success()).count();
        self.record(
            BULK_DECISION_APPLIED,
            json!({ "decision": decided.map(|d| d.as_str()), "requested": batch_ids.len(), "succeeded": succeeded }),
            Some(actor),
        )
        .await;
        Ok(outcomes)
    }

    /// Approval history of a batch in the order decisions were made.
    pub async fn list_logs(&self, batch_id: &str) -> Result<Vec<ApprovalLogEntry>, ApprovalError> {
        self.storage.list_logs_by_batch_id(batch_id).await.map_err(|e| match e {
            ApprovalError::StorageUnavailable(msg) => ApprovalError::StorageUnavailable(msg),
            other => ApprovalError::StorageUnavailable(other.to_string()),
        })
    }

    pub async fn batch_summary(&self, batch_id: &str, requested_by: &str) -> Result<String, ApprovalError> {
        let batch = self.get_batch(batch_id).await?;
        self.record(SUMMARY_EXPORTED, json!({ "batch_id": batch.id }), Some(requested_by))
            .await;
        Ok(render_batch_summary(&batch))
    }

    pub async fn get_app_logs(&self) -> Result<Vec<AppLog>, ApprovalError> {
        self.logging.get_logs().await
    }
}
