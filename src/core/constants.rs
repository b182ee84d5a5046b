pub const APPROVER_ADDED: &str = "APPROVER_ADDED";
pub const APPROVER_LOGGED_IN: &str = "APPROVER_LOGGED_IN";
pub const BATCH_SUBMITTED: &str = "BATCH_SUBMITTED";
pub const BATCH_APPROVED: &str = "BATCH_APPROVED";
pub const BATCH_REJECTED: &str = "BATCH_REJECTED";
pub const BULK_DECISION_APPLIED: &str = "BULK_DECISION_APPLIED";
pub const SUMMARY_EXPORTED: &str = "SUMMARY_EXPORTED";

/// Upper bound on decision remarks, in characters. Longer remarks are rejected.
pub const MAX_REMARKS_LEN: usize = 500;
pub const MAX_NAME_LEN: usize = 100;

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const MAX_PAGE_SIZE: usize = 100;
