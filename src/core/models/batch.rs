use crate::core::errors::ApprovalError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Workflow state of a payroll batch. `Submitted` is the only initial state;
/// the other two are terminal.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq, Hash)]
pub enum BatchStatus {
    Submitted,
    Approved,
    Rejected,
}

impl BatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchStatus::Submitted => "Submitted",
            BatchStatus::Approved => "Approved",
            BatchStatus::Rejected => "Rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, BatchStatus::Submitted)
    }
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BatchStatus {
    type Err = ApprovalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Submitted" => Ok(BatchStatus::Submitted),
            "Approved" => Ok(BatchStatus::Approved),
            "Rejected" => Ok(BatchStatus::Rejected),
            other => Err(ApprovalError::invalid_input(
                "status",
                "Invalid status",
                format!("Unknown batch status `{}`", other),
            )),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Instruction {
    pub payment_type: String,
    pub payment_currency: String,
    pub debit_account: String,
    pub date: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub payee_name: String,
    pub amount: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Batch {
    pub id: String,
    pub status: BatchStatus,
    pub instruction: Instruction,
    pub payments: Vec<Payment>,
    #[schema(value_type = String, example = "2024-01-01T00:00:00Z")]
    pub created_at: DateTime<Utc>,
    pub approved_by: Option<String>,
    #[schema(value_type = Option<String>, example = "2024-01-01T00:00:00Z")]
    pub approved_at: Option<DateTime<Utc>>,
    pub remarks: Option<String>,
}

impl Batch {
    pub fn total_amount(&self) -> f64 {
        self.payments.iter().map(|p| p.amount).sum()
    }
}

/// A batch as handed over by the submission flow, before it enters the workflow.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewBatch {
    pub id: String,
    pub instruction: Instruction,
    pub payments: Vec<Payment>,
    #[schema(value_type = Option<String>, example = "2024-01-01T00:00:00Z")]
    pub created_at: Option<DateTime<Utc>>,
}

impl NewBatch {
    pub fn into_submitted(self, now: DateTime<Utc>) -> Batch {
        Batch {
            id: self.id,
            status: BatchStatus::Submitted,
            instruction: self.instruction,
            payments: self.payments,
            created_at: self.created_at.unwrap_or(now),
            approved_by: None,
            approved_at: None,
            remarks: None,
        }
    }
}

/// One page of a status listing.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BatchPage {
    pub items: Vec<Batch>,
    pub total: usize,
    pub page: usize,
    pub per_page: usize,
}
