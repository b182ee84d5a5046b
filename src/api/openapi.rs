use utoipa::OpenApi;

use crate::{
    api::models::{BulkDecisionRequest, DecisionRequest, ErrorResponse, LoginRequest, LoginResponse, RegisterApproverRequest},
    core::{
        models::{
            approval_log::{ApprovalLogEntry, Decision},
            approver::{Approver, Role},
            audit::AppLog,
            batch::{Batch, BatchPage, BatchStatus, Instruction, NewBatch, Payment},
        },
        services::BulkDecisionOutcome,
    },
};

#[derive(OpenApi)]
#[openapi(
    paths(
        super::handlers::login,
        super::handlers::register_approver,
        super::handlers::decide_batch,
        super::handlers::decide_batches,
        super::handlers::get_batch_logs,
        super::handlers::list_batches,
        super::handlers::submit_batch,
        super::handlers::get_batch,
        super::handlers::download_batch_summary,
        super::handlers::get_app_logs
    ),
    components(schemas(
        LoginRequest,
        LoginResponse,
        RegisterApproverRequest,
        DecisionRequest,
        BulkDecisionRequest,
        BulkDecisionOutcome,
        ErrorResponse,
        Approver,
        Role,
        Batch,
        BatchPage,
        BatchStatus,
        NewBatch,
        Instruction,
        Payment,
        Decision,
        ApprovalLogEntry,
        AppLog
    )),
    info(
        title = "Payroll Approval API",
        description = "API for approving and rejecting submitted payroll batches",
        version = "0.1.0"
    )
)]
pub struct ApiDoc;
