use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::{IntoParams, ToSchema};

use crate::core::errors::ApprovalError;
use crate::core::models::{approver::Role, batch::BatchStatus};

// Request structs for JSON payloads
#[derive(Deserialize, ToSchema)]
pub struct RegisterApproverRequest {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password: String,
    /// Defaults to VIEWER
    pub role: Option<Role>,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DecisionRequest {
    /// "Approved" or "Rejected"
    pub action: String,
    pub remarks: Option<String>,
    /// Must match the authenticated approver id when present
    pub approved_by: Option<String>,
    /// RFC 3339 timestamp; defaults to the time the request is handled
    pub approved_at: Option<String>,
    /// Fail with 409 unless the batch is still in this status
    pub expected_status: Option<BatchStatus>,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkDecisionRequest {
    pub batch_ids: Vec<String>,
    pub action: String,
    /// Applied to every batch without its own entry in `remarksByBatch`
    pub remarks: Option<String>,
    #[serde(default)]
    pub remarks_by_batch: HashMap<String, String>,
}

#[derive(Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListBatchesQuery {
    /// Defaults to "Submitted"
    pub status: Option<String>,
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

// Error response struct
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

// Newtype wrapper for ApprovalError to implement IntoResponse
pub struct ApiError(pub ApprovalError);

impl From<ApprovalError> for ApiError {
    fn from(err: ApprovalError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self.0 {
            ApprovalError::BatchNotFound(_) | ApprovalError::ApproverNotFound(_) => StatusCode::NOT_FOUND,
            ApprovalError::InvalidDecision(_) | ApprovalError::InvalidInput(..) => StatusCode::BAD_REQUEST,
            ApprovalError::StatusConflict { .. }
            | ApprovalError::BatchAlreadyExists(_)
            | ApprovalError::EmailAlreadyRegistered(_) => StatusCode::CONFLICT,
            ApprovalError::InvalidCredentials | ApprovalError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApprovalError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApprovalError::StorageUnavailable(_)
            | ApprovalError::LoggingError(_)
            | ApprovalError::CacheError(_)
            | ApprovalError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let error_message = match self.0 {
            ApprovalError::InvalidInput(_, detail) => detail.description,
            ApprovalError::InvalidCredentials => "Invalid email or password".to_string(),
            other => other.to_string(),
        };
        (status, Json(ErrorResponse { error: error_message })).into_response()
    }
}
