//! API error types and responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use greencert_core::CertificateError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// API error type
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Certificate(#[from] CertificateError),
}

/// API error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str, String, Option<serde_json::Value>) {
        let err = match self {
            ApiError::BadRequest(msg) => {
                return (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone(), None)
            }
            ApiError::Certificate(err) => err,
        };

        match err {
            CertificateError::NotFound { entity, id } => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                err.to_string(),
                Some(serde_json::json!({ "entity": entity.to_string(), "id": id })),
            ),
            CertificateError::ReferenceNotFound { entity, id } => (
                StatusCode::NOT_FOUND,
                "REFERENCE_NOT_FOUND",
                err.to_string(),
                Some(serde_json::json!({ "entity": entity.to_string(), "id": id })),
            ),
            CertificateError::InvalidState(_) => {
                (StatusCode::CONFLICT, "INVALID_STATE", err.to_string(), None)
            }
            CertificateError::Precondition(_) => (
                StatusCode::CONFLICT,
                "PRECONDITION_FAILED",
                err.to_string(),
                None,
            ),
            CertificateError::InvalidSignature(_) => (
                StatusCode::UNAUTHORIZED,
                "INVALID_SIGNATURE",
                err.to_string(),
                None,
            ),
            CertificateError::Ledger(_) => {
                (StatusCode::BAD_GATEWAY, "LEDGER_ERROR", err.to_string(), None)
            }
            CertificateError::DuplicateIntegrityProof(_) => (
                StatusCode::CONFLICT,
                "DUPLICATE_INTEGRITY_PROOF",
                err.to_string(),
                None,
            ),
            CertificateError::InvalidSnapshot { entity, .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "INVALID_SNAPSHOT",
                err.to_string(),
                Some(serde_json::json!({ "entity": entity.to_string() })),
            ),
            CertificateError::Validation(_) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                err.to_string(),
                None,
            ),
            CertificateError::Canonicalization(_)
            | CertificateError::Integrity(_)
            | CertificateError::Storage(_)
            | CertificateError::ObjectStorage(_) => {
                // Infrastructure detail stays in the logs
                error!(error = %err, "Internal failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Internal server error".to_string(),
                    None,
                )
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        self.parts().0
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = self.parts();

        let body = ErrorResponse {
            error: message,
            code: code.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<uuid::Error> for ApiError {
    fn from(err: uuid::Error) -> Self {
        ApiError::BadRequest(format!("Invalid id: {}", err))
    }
}
