use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub title: String,
    pub description: String,
}

impl FieldError {
    pub fn new(field: &str, title: impl Into<String>, description: impl Into<String>) -> Self {
        FieldError {
            field: field.to_string(),
            title: title.into(),
            description: description.into(),
        }
    }
}

#[derive(Error, Debug, Serialize)]
pub enum ApprovalError {
    /// Batch with given ID not found
    #[error("Batch {0} not found")]
    BatchNotFound(String),

    /// Approver with given ID not found
    #[error("Approver {0} not found")]
    ApproverNotFound(String),

    /// Decision value is not one of Approved / Rejected
    #[error("Invalid decision: {0}")]
    InvalidDecision(String),

    /// Generic input validation error with detailed field information
    #[error("Invalid input for field `{0}`: {1:?}")]
    InvalidInput(String, FieldError),

    /// Batch status no longer matches what the caller expected
    #[error("Batch {batch_id} is {actual}, expected {expected}")]
    StatusConflict {
        batch_id: String,
        expected: String,
        actual: String,
    },

    /// A batch with the same ID already exists
    #[error("Batch {0} already exists")]
    BatchAlreadyExists(String),

    /// Email is already registered to another approver
    #[error("Email {0} already registered")]
    EmailAlreadyRegistered(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Missing or invalid bearer token
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated caller is not allowed to perform the action
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Logging error: {0}")]
    LoggingError(String),

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Internal server error: {0}")]
    InternalServerError(String),
}

impl ApprovalError {
    pub fn invalid_input(field: &str, title: impl Into<String>, description: impl Into<String>) -> Self {
        ApprovalError::InvalidInput(field.to_string(), FieldError::new(field, title, description))
    }
}
