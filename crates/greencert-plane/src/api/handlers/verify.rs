//! Public verification handlers

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use greencert_core::Digest;
use std::sync::Arc;

use super::AppState;
use crate::api::error::ApiError;
use crate::core::{CertificateView, Verification};

/// Verify a certificate by canonical hash
///
/// GET /v1/verify/{hash}
pub async fn verify_hash(
    State(state): State<Arc<AppState>>,
    Path(hash): Path<String>,
) -> Result<Json<Verification>, ApiError> {
    let digest = Digest::from_hex(&hash)?;
    Ok(Json(state.service.verify_canonical_hash(&digest).await?))
}

/// Find the certificate a PDF was registered for
///
/// POST /v1/verify/pdf (raw PDF body)
pub async fn verify_pdf(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<CertificateView>, ApiError> {
    if body.is_empty() {
        return Err(ApiError::BadRequest("PDF body is empty".into()));
    }
    Ok(Json(state.service.verify_pdf(&body).await?))
}

/// Serve a stored QR artifact
///
/// GET /v1/qr/{key}
pub async fn get_qr(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Response, ApiError> {
    let object = state.service.qr_object(&key).await?;
    Ok(([(header::CONTENT_TYPE, object.content_type)], object.bytes).into_response())
}
