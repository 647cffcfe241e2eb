//! Certificate handlers
//!
//! Registration, issuance, lookup, PDF binding, audit and revocation.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use greencert_core::{CertifierAddress, NewCertificate};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use super::{parse_id, AppState};
use crate::api::error::ApiError;
use crate::core::CertificateView;

/// Request to issue a pre-certificate
#[derive(Debug, Deserialize)]
pub struct IssueCertificateRequest {
    /// Hex signature over the pre-issued hash, `0x` optional
    pub certifier_signature: String,

    /// Certifier ledger address (any case, `0x` optional)
    pub certifier_address: String,
}

/// Register a pre-certificate
///
/// POST /v1/certificates
pub async fn register_certificate(
    State(state): State<Arc<AppState>>,
    Json(request): Json<NewCertificate>,
) -> Result<(StatusCode, Json<CertificateView>), ApiError> {
    let view = state.service.register(request).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// List pre-certificates awaiting issuance
///
/// GET /v1/certificates/pre
pub async fn list_pre_certificates(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<CertificateView>>, ApiError> {
    Ok(Json(state.service.list_pre_issued().await?))
}

/// Fetch a certificate
///
/// GET /v1/certificates/{id}
pub async fn get_certificate(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<CertificateView>, ApiError> {
    let id = parse_id(&id)?;
    Ok(Json(state.service.find(id).await?))
}

/// Issue a pre-certificate
///
/// POST /v1/certificates/{id}/issue
///
/// 1. Normalizes the certifier address
/// 2. Runs the issuance workflow (signature check, hashing, ledger anchor)
/// 3. Returns the issued certificate
pub async fn issue_certificate(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<IssueCertificateRequest>,
) -> Result<Json<CertificateView>, ApiError> {
    let id = parse_id(&id)?;

    // Step 1: Normalize the address
    let address = CertifierAddress::parse(&request.certifier_address)?;

    // Step 2: Issue
    let view = state
        .service
        .issue(id, &request.certifier_signature, &address)
        .await?;

    info!(certificate_id = %id, certifier = %address, "Issued certificate via API");
    Ok(Json(view))
}

/// Bind the PDF rendering of an issued certificate
///
/// POST /v1/certificates/{id}/pdf (raw PDF body)
pub async fn attach_pdf(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<CertificateView>, ApiError> {
    let id = parse_id(&id)?;
    if body.is_empty() {
        return Err(ApiError::BadRequest("PDF body is empty".into()));
    }
    Ok(Json(state.service.attach_pdf(id, &body).await?))
}

/// Record an audit
///
/// POST /v1/certificates/{id}/audit
pub async fn audit_certificate(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<CertificateView>, ApiError> {
    let id = parse_id(&id)?;
    Ok(Json(state.service.audit(id).await?))
}

/// Revoke an issued certificate
///
/// POST /v1/certificates/{id}/revoke
pub async fn revoke_certificate(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<CertificateView>, ApiError> {
    let id = parse_id(&id)?;
    Ok(Json(state.service.revoke(id).await?))
}
