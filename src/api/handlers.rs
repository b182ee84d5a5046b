use crate::{
    api::models::*,
    auth::jwt::Claims,
    core::{
        errors::ApprovalError,
        models::{
            approval_log::ApprovalLogEntry,
            approver::{Approver, Role},
            audit::AppLog,
            batch::{Batch, BatchPage, BatchStatus, NewBatch},
        },
        services::{ApprovalService, BulkDecisionOutcome},
        summary::summary_file_name,
    },
    infrastructure::{
        cache::in_memory::InMemoryCache, logging::in_memory::InMemoryLogging, storage::in_memory::InMemoryStorage,
    },
};
use axum::{
    Extension, Json, Router,
    extract::{Path, Query, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::IntoResponse,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use http::header;
use std::sync::Arc;

pub type AppService = ApprovalService<InMemoryLogging, InMemoryStorage, InMemoryCache>;

// Middleware to validate JWT
async fn auth_middleware(
    State(service): State<Arc<AppService>>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<impl IntoResponse, ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| ApprovalError::Unauthorized("Missing Authorization header".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApprovalError::Unauthorized("Invalid Authorization header".to_string()))?;

    let claims = service.validate_token(token)?;
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

fn require_approver(claims: &Claims, what: &str) -> Result<(), ApprovalError> {
    if claims.can_decide() {
        Ok(())
    } else {
        Err(ApprovalError::Forbidden(format!("{} is not allowed to {}", claims.sub, what)))
    }
}

fn parse_approved_at(raw: Option<&str>) -> Result<DateTime<Utc>, ApprovalError> {
    match raw {
        None => Ok(Utc::now()),
        Some(value) => DateTime::parse_from_rfc3339(value)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|e| {
                ApprovalError::invalid_input(
                    "approvedAt",
                    "Invalid approvedAt",
                    format!("approvedAt must be an RFC 3339 timestamp: {}", e),
                )
            }),
    }
}

// Define API routes
pub fn api_routes(service: Arc<AppService>) -> Router {
    let protected_routes = Router::new()
        .route("/approval/batch/{batch_id}/action", post(decide_batch))
        .route("/approval/batch/actions", post(decide_batches))
        .route("/approval/batch/{batch_id}/logs", get(get_batch_logs))
        .route("/payroll/batches", get(list_batches).post(submit_batch))
        .route("/payroll/batches/{batch_id}", get(get_batch))
        .route("/payroll/batches/{batch_id}/summary", get(download_batch_summary))
        .route("/logs", get(get_app_logs))
        .route("/approvers", post(register_approver))
        .route_layer(middleware::from_fn_with_state(service.clone(), auth_middleware));

    Router::new()
        .route("/login", post(login)) // Unprotected
        .merge(protected_routes)
        .with_state(service)
}

#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub(crate) async fn login(
    State(service): State<Arc<AppService>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let token = service.authenticate(&req.email, &req.password).await?;
    Ok(Json(LoginResponse { token }))
}

#[utoipa::path(
    post,
    path = "/api/approvers",
    request_body = RegisterApproverRequest,
    responses(
        (status = 201, description = "Approver registered", body = Approver),
        (status = 400, description = "Bad request", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Caller may not register approvers", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub(crate) async fn register_approver(
    State(service): State<Arc<AppService>>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<RegisterApproverRequest>,
) -> Result<(StatusCode, Json<Approver>), ApiError> {
    require_approver(&claims, "register approvers")?;
    let approver = Approver {
        id: req.id,
        name: req.name,
        email: req.email,
        password: req.password,
        role: req.role.unwrap_or(Role::Viewer),
    };
    let created = service.add_approver(approver).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    post,
    path = "/api/approval/batch/{batch_id}/action",
    params(
        ("batch_id" = String, Path, description = "ID of the batch to decide")
    ),
    request_body = DecisionRequest,
    responses(
        (status = 200, description = "Decision recorded", body = Batch),
        (status = 400, description = "Invalid action, remarks or timestamp", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Caller may not decide this batch", body = ErrorResponse),
        (status = 404, description = "Batch not found", body = ErrorResponse),
        (status = 409, description = "Batch status changed", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub(crate) async fn decide_batch(
    State(service): State<Arc<AppService>>,
    Extension(claims): Extension<Claims>,
    Path(batch_id): Path<String>,
    Json(req): Json<DecisionRequest>,
) -> Result<Json<Batch>, ApiError> {
    require_approver(&claims, "approve or reject batches")?;
    if let Some(approved_by) = req.approved_by.as_deref() {
        if approved_by != claims.sub {
            return Err(ApprovalError::Forbidden(format!(
                "{} cannot record a decision on behalf of {}",
                claims.sub, approved_by
            ))
            .into());
        }
    }
    let approved_at = parse_approved_at(req.approved_at.as_deref())?;
    let batch = service
        .decide(
            &batch_id,
            &req.action,
            req.remarks,
            &claims.sub,
            approved_at,
            req.expected_status,
        )
        .await?;
    Ok(Json(batch))
}

#[utoipa::path(
    post,
    path = "/api/approval/batch/actions",
    request_body = BulkDecisionRequest,
    responses(
        (status = 200, description = "Per-batch outcomes", body = Vec<BulkDecisionOutcome>),
        (status = 400, description = "Invalid action, remarks or empty selection", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Caller may not decide batches", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub(crate) async fn decide_batches(
    State(service): State<Arc<AppService>>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<BulkDecisionRequest>,
) -> Result<Json<Vec<BulkDecisionOutcome>>, ApiError> {
    require_approver(&claims, "approve or reject batches")?;
    let outcomes = service
        .decide_many(
            &req.batch_ids,
            &req.action,
            req.remarks,
            &req.remarks_by_batch,
            &claims.sub,
            Utc::now(),
        )
        .await?;
    Ok(Json(outcomes))
}

#[utoipa::path(
    get,
    path = "/api/approval/batch/{batch_id}/logs",
    params(
        ("batch_id" = String, Path, description = "ID of the batch")
    ),
    responses(
        (status = 200, description = "Approval history, oldest first", body = Vec<ApprovalLogEntry>),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub(crate) async fn get_batch_logs(
    State(service): State<Arc<AppService>>,
    Path(batch_id): Path<String>,
) -> Result<Json<Vec<ApprovalLogEntry>>, ApiError> {
    let logs = service.list_logs(&batch_id).await?;
    Ok(Json(logs))
}

#[utoipa::path(
    get,
    path = "/api/payroll/batches",
    params(ListBatchesQuery),
    responses(
        (status = 200, description = "Batches in the requested status", body = BatchPage),
        (status = 400, description = "Invalid status or paging", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub(crate) async fn list_batches(
    State(service): State<Arc<AppService>>,
    Query(query): Query<ListBatchesQuery>,
) -> Result<Json<BatchPage>, ApiError> {
    let status = match query.status.as_deref() {
        Some(raw) => raw.parse()?,
        None => BatchStatus::Submitted,
    };
    let page = service.list_batches(status, query.page, query.per_page).await?;
    Ok(Json(page))
}

#[utoipa::path(
    post,
    path = "/api/payroll/batches",
    request_body = NewBatch,
    responses(
        (status = 201, description = "Batch submitted for approval", body = Batch),
        (status = 400, description = "Invalid batch", body = ErrorResponse),
        (status = 409, description = "Batch already exists", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub(crate) async fn submit_batch(
    State(service): State<Arc<AppService>>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<NewBatch>,
) -> Result<(StatusCode, Json<Batch>), ApiError> {
    let batch = service.submit_batch(req, &claims.sub).await?;
    Ok((StatusCode::CREATED, Json(batch)))
}

#[utoipa::path(
    get,
    path = "/api/payroll/batches/{batch_id}",
    params(
        ("batch_id" = String, Path, description = "ID of the batch")
    ),
    responses(
        (status = 200, description = "Batch retrieved", body = Batch),
        (status = 404, description = "Batch not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub(crate) async fn get_batch(
    State(service): State<Arc<AppService>>,
    Path(batch_id): Path<String>,
) -> Result<Json<Batch>, ApiError> {
    let batch = service.get_batch(&batch_id).await?;
    Ok(Json(batch))
}

#[utoipa::path(
    get,
    path = "/api/payroll/batches/{batch_id}/summary",
    params(
        ("batch_id" = String, Path, description = "ID of the batch")
    ),
    responses(
        (status = 200, description = "Plain-text summary", body = String, content_type = "text/plain"),
        (status = 404, description = "Batch not found", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub(crate) async fn download_batch_summary(
    State(service): State<Arc<AppService>>,
    Extension(claims): Extension<Claims>,
    Path(batch_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let text = service.batch_summary(&batch_id, &claims.sub).await?;
    let headers = [
        (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", summary_file_name(&batch_id)),
        ),
    ];
    Ok((headers, text))
}

#[utoipa::path(
    get,
    path = "/api/logs",
    responses(
        (status = 200, description = "Application logs retrieved successfully", body = Vec<AppLog>),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("Bearer" = []))
)]
pub(crate) async fn get_app_logs(State(service): State<Arc<AppService>>) -> Result<Json<Vec<AppLog>>, ApiError> {
    let logs = service.get_app_logs().await?;
    Ok(Json(logs))
}
