//! API module for the certificate service

pub mod error;
pub mod handlers;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use handlers::AppState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Readiness check response
#[derive(Serialize)]
pub struct ReadyResponse {
    pub ready: bool,
    pub pre_issued_count: usize,
    pub verify_url: String,
}

/// Health check endpoint
///
/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
    })
}

/// Readiness check endpoint; ready once the certificate store answers
///
/// GET /ready
pub async fn ready(State(state): State<Arc<AppState>>) -> Json<ReadyResponse> {
    let pending = state.service.store().list_pre_issued().await;

    Json(ReadyResponse {
        ready: pending.is_ok(),
        pre_issued_count: pending.map(|v| v.len()).unwrap_or(0),
        verify_url: state.config.verify_url.clone(),
    })
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health endpoints
        .route("/health", get(health))
        .route("/ready", get(ready))
        // Certificate lifecycle
        .route("/v1/certificates", post(handlers::register_certificate))
        .route("/v1/certificates/pre", get(handlers::list_pre_certificates))
        .route("/v1/certificates/{id}", get(handlers::get_certificate))
        .route("/v1/certificates/{id}/issue", post(handlers::issue_certificate))
        .route("/v1/certificates/{id}/pdf", post(handlers::attach_pdf))
        .route("/v1/certificates/{id}/audit", post(handlers::audit_certificate))
        .route("/v1/certificates/{id}/revoke", post(handlers::revoke_certificate))
        // Public verification
        .route("/v1/verify/pdf", post(handlers::verify_pdf))
        .route("/v1/verify/{hash}", get(handlers::verify_hash))
        .route("/v1/qr/{key}", get(handlers::get_qr))
        // Directory intake
        .route("/v1/directory/{collection}", post(handlers::register_entity))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
