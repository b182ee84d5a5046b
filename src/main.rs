use axum::{Router, http::header, routing::get};
use payroll_approval::api::{handlers::api_routes, openapi::ApiDoc};
use payroll_approval::config::CONFIG;
use payroll_approval::core::models::approver::{Approver, Role};
use payroll_approval::{ApprovalService, InMemoryCache, InMemoryLogging, InMemoryStorage};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&CONFIG.log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    info!("Loaded configuration: {:?}", *CONFIG);

    let storage = InMemoryStorage::new();
    let logging = InMemoryLogging::new();
    let cache = InMemoryCache::new();
    let service = Arc::new(
        ApprovalService::new(storage, logging, cache, CONFIG.jwt_secret.clone()).with_cache_ttl(CONFIG.cache_ttl),
    );

    match &CONFIG.bootstrap_approver {
        Some(bootstrap) => {
            service
                .bootstrap_approver(Approver {
                    id: bootstrap.id.clone(),
                    name: bootstrap.name.clone(),
                    email: bootstrap.email.clone(),
                    password: bootstrap.password.clone(),
                    role: Role::Approver,
                })
                .await?;
        }
        None => warn!("BOOTSTRAP_APPROVER_EMAIL/PASSWORD not set; no approver can register others"),
    }

    let app = Router::new()
        .route("/", get(|| async { "OK" }))
        .nest("/api", api_routes(service))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(CONFIG.request_timeout))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([http::Method::GET, http::Method::POST])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
        )
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([127, 0, 0, 1], CONFIG.port));
    info!("Server running at http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
