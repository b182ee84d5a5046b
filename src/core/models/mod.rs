pub mod approval_log;
pub mod approver;
pub mod audit;
pub mod batch;
