use super::batch::BatchStatus;
use crate::core::errors::ApprovalError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub enum Decision {
    Approved,
    Rejected,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Approved => "Approved",
            Decision::Rejected => "Rejected",
        }
    }

    /// Status a batch lands in once this decision is applied.
    pub fn target_status(&self) -> BatchStatus {
        match self {
            Decision::Approved => BatchStatus::Approved,
            Decision::Rejected => BatchStatus::Rejected,
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Decision {
    type Err = ApprovalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Approved" => Ok(Decision::Approved),
            "Rejected" => Ok(Decision::Rejected),
            other => Err(ApprovalError::InvalidDecision(other.to_string())),
        }
    }
}

/// Immutable record of a single decision on a batch.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalLogEntry {
    pub id: u64,
    pub batch_id: String,
    pub action: Decision,
    pub remarks: Option<String>,
    pub approved_by: String,
    #[schema(value_type = String, example = "2024-01-01T00:00:00Z")]
    pub approved_at: DateTime<Utc>,
}

/// Log entry before the store has assigned it an id.
#[derive(Clone, Debug, PartialEq)]
pub struct NewApprovalLogEntry {
    pub batch_id: String,
    pub action: Decision,
    pub remarks: Option<String>,
    pub approved_by: String,
    pub approved_at: DateTime<Utc>,
}

impl NewApprovalLogEntry {
    pub fn with_id(self, id: u64) -> ApprovalLogEntry {
        ApprovalLogEntry {
            id,
            batch_id: self.batch_id,
            action: self.action,
            remarks: self.remarks,
            approved_by: self.approved_by,
            approved_at: self.approved_at,
        }
    }
}
