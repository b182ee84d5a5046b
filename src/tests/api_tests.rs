use crate::api::handlers::api_routes;
use crate::api::models::ErrorResponse;
use crate::core::models::{
    approval_log::ApprovalLogEntry,
    approver::{Approver, Role},
    batch::{Batch, BatchPage, BatchStatus},
};
use crate::core::services::BulkDecisionOutcome;
use crate::tests::{create_test_service, sample_batch};
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

struct TestApp {
    router: Router,
    approver_token: String,
    viewer_token: String,
}

async fn create_test_app() -> TestApp {
    let service = create_test_service();
    for (id, name, email, role) in [
        ("a1", "alice", "alice@example.com", Role::Approver),
        ("v1", "victor", "victor@example.com", Role::Viewer),
    ] {
        service
            .add_approver(Approver {
                id: id.to_string(),
                name: name.to_string(),
                email: email.to_string(),
                password: "hunter2".to_string(),
                role,
            })
            .await
            .unwrap();
    }
    service.submit_batch(sample_batch("B1"), "seed").await.unwrap();
    service.submit_batch(sample_batch("B2"), "seed").await.unwrap();

    let approver_token = service.authenticate("alice@example.com", "hunter2").await.unwrap();
    let viewer_token = service.authenticate("victor@example.com", "hunter2").await.unwrap();
    TestApp {
        router: Router::new().nest("/api", api_routes(Arc::new(service))),
        approver_token,
        viewer_token,
    }
}

impl TestApp {
    async fn send(&self, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Vec<u8>) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, T) {
        let (status, bytes) = self.send(method, uri, token, body).await;
        (status, serde_json::from_slice(&bytes).unwrap())
    }
}

#[tokio::test]
async fn test_login_returns_token() {
    let app = create_test_app().await;
    let (status, body): (_, Value) = app
        .send_json(
            "POST",
            "/api/login",
            None,
            Some(json!({ "email": "alice@example.com", "password": "hunter2" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));

    let (status, body): (_, ErrorResponse) = app
        .send_json(
            "POST",
            "/api/login",
            None,
            Some(json!({ "email": "alice@example.com", "password": "1234" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body.error, "Invalid email or password");
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = create_test_app().await;
    let (status, _) = app.send("GET", "/api/payroll/batches", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .send("GET", "/api/payroll/batches", Some("not-a-jwt"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_approve_then_read_logs() {
    let app = create_test_app().await;
    let token = Some(app.approver_token.as_str());

    let (status, batch): (_, Batch) = app
        .send_json(
            "POST",
            "/api/approval/batch/B1/action",
            token,
            Some(json!({ "action": "Approved", "remarks": "", "approvedAt": "2024-01-01T00:00:00Z" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(batch.status, BatchStatus::Approved);
    assert_eq!(batch.approved_by.as_deref(), Some("a1"));

    let (status, logs): (_, Vec<ApprovalLogEntry>) = app
        .send_json("GET", "/api/approval/batch/B1/logs", token, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].approved_by, "a1");
    assert_eq!(logs[0].approved_at.to_rfc3339(), "2024-01-01T00:00:00+00:00");

    let (status, page): (_, BatchPage) = app
        .send_json("GET", "/api/payroll/batches?status=Submitted", token, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].id, "B2");
}

#[tokio::test]
async fn test_decision_error_statuses() {
    let app = create_test_app().await;
    let token = Some(app.approver_token.as_str());

    let (status, _) = app
        .send(
            "POST",
            "/api/approval/batch/missing-id/action",
            token,
            Some(json!({ "action": "Approved" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .send(
            "POST",
            "/api/approval/batch/B1/action",
            token,
            Some(json!({ "action": "Escalated" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send(
            "POST",
            "/api/approval/batch/B1/action",
            token,
            Some(json!({ "action": "Approved", "remarks": "r".repeat(501) })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send(
            "POST",
            "/api/approval/batch/B1/action",
            token,
            Some(json!({ "action": "Approved", "approvedAt": "yesterday" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send(
            "POST",
            "/api/approval/batch/B1/action",
            token,
            Some(json!({ "action": "Approved", "approvedBy": "mallory" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .send(
            "POST",
            "/api/approval/batch/B1/action",
            Some(app.viewer_token.as_str()),
            Some(json!({ "action": "Approved" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .send(
            "POST",
            "/api/approval/batch/B1/action",
            token,
            Some(json!({ "action": "Rejected", "expectedStatus": "Submitted" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send(
            "POST",
            "/api/approval/batch/B1/action",
            token,
            Some(json!({ "action": "Rejected", "remarks": "wrong account", "approvedBy": "a1", "expectedStatus": "Submitted" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body): (_, ErrorResponse) = app
        .send_json(
            "POST",
            "/api/approval/batch/B1/action",
            token,
            Some(json!({ "action": "Approved", "expectedStatus": "Submitted" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body.error, "Batch B1 is Rejected, expected Submitted");
}

#[tokio::test]
async fn test_bulk_decision_endpoint() {
    let app = create_test_app().await;
    let (status, outcomes): (_, Vec<BulkDecisionOutcome>) = app
        .send_json(
            "POST",
            "/api/approval/batch/actions",
            Some(app.approver_token.as_str()),
            Some(json!({ "batchIds": ["B1", "B2", "B9"], "action": "Rejected", "remarks": "duplicate run" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let succeeded: Vec<&str> = outcomes
        .iter()
        .filter(|o| o.is_success())
        .map(|o| o.batch_id.as_str())
        .collect();
    assert_eq!(succeeded, vec!["B1", "B2"]);
}

#[tokio::test]
async fn test_submit_and_fetch_batch() {
    let app = create_test_app().await;
    let token = Some(app.viewer_token.as_str());
    let body = serde_json::to_value(sample_batch("B7")).unwrap();

    let (status, created): (_, Batch) = app.send_json("POST", "/api/payroll/batches", token, Some(body.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created.status, BatchStatus::Submitted);

    let (status, _) = app.send("POST", "/api/payroll/batches", token, Some(body)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, fetched): (_, Batch) = app.send_json("GET", "/api/payroll/batches/B7", token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched.payments.len(), 2);

    let (status, _) = app
        .send("GET", "/api/payroll/batches?status=Pending", token, None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_summary_download() {
    let app = create_test_app().await;
    let request = Request::builder()
        .method("GET")
        .uri("/api/payroll/batches/B1/summary")
        .header(header::AUTHORIZATION, format!("Bearer {}", app.approver_token))
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"Payroll_B1_Summary.txt\""
    );
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.starts_with("Payroll Batch Summary - B1\nStatus: Submitted"));
}

#[tokio::test]
async fn test_bulk_decision_with_per_batch_remarks() {
    let app = create_test_app().await;
    let token = Some(app.approver_token.as_str());
    let (status, _) = app
        .send(
            "POST",
            "/api/approval/batch/actions",
            token,
            Some(json!({ "batchIds": ["B1", "B2"], "action": "Rejected", "remarksByBatch": { "B1": "wrong amount" } })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, outcomes): (_, Vec<BulkDecisionOutcome>) = app
        .send_json(
            "POST",
            "/api/approval/batch/actions",
            token,
            Some(json!({
                "batchIds": ["B1", "B2"],
                "action": "Rejected",
                "remarks": "duplicate run",
                "remarksByBatch": { "B1": "wrong amount" }
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(outcomes.iter().all(|o| o.is_success()));

    let (_, b1): (_, Batch) = app.send_json("GET", "/api/payroll/batches/B1", token, None).await;
    let (_, b2): (_, Batch) = app.send_json("GET", "/api/payroll/batches/B2", token, None).await;
    assert_eq!(b1.remarks.as_deref(), Some("wrong amount"));
    assert_eq!(b2.remarks.as_deref(), Some("duplicate run"));
    assert_eq!(b1.approved_by.as_deref(), Some("a1"));
}

#[tokio::test]
async fn test_register_approver_endpoint() {
    let app = create_test_app().await;
    let (status, body): (_, Value) = app
        .send_json(
            "POST",
            "/api/approvers",
            Some(app.approver_token.as_str()),
            Some(json!({ "id": "a2", "name": "bea", "email": "bea@example.com", "password": "pw", "role": "APPROVER" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["role"], "APPROVER");
    assert!(body.get("password").is_none());

    let (status, body): (_, Value) = app
        .send_json(
            "POST",
            "/api/approvers",
            Some(app.approver_token.as_str()),
            Some(json!({ "id": "v2", "name": "vic", "email": "vic@example.com", "password": "pw" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["role"], "VIEWER");
}

#[tokio::test]
async fn test_anonymous_caller_cannot_create_approver() {
    let app = create_test_app().await;
    let registration = json!({
        "id": "m1",
        "name": "mallory",
        "email": "mallory@example.com",
        "password": "pw",
        "role": "APPROVER"
    });

    let (status, _) = app
        .send("POST", "/api/approvers", None, Some(registration.clone()))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .send(
            "POST",
            "/api/approvers",
            Some(app.viewer_token.as_str()),
            Some(registration),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .send(
            "POST",
            "/api/login",
            None,
            Some(json!({ "email": "mallory@example.com", "password": "pw" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
