//! API request handlers

pub mod certificates;
pub mod directory;
pub mod verify;

use std::sync::Arc;

use crate::config::PlaneConfig;
use crate::core::CertificateService;
use crate::directory::MemoryDirectory;

pub use certificates::{
    attach_pdf, audit_certificate, get_certificate, issue_certificate, list_pre_certificates,
    register_certificate, revoke_certificate, IssueCertificateRequest,
};
pub use directory::{register_entity, RegisterEntityResponse};
pub use verify::{get_qr, verify_hash, verify_pdf};

/// Application state shared across handlers
pub struct AppState {
    /// Certificate use cases
    pub service: CertificateService,
    /// Product, producer and certifier records
    pub directory: Arc<MemoryDirectory>,
    pub config: PlaneConfig,
}

/// Parse a path id into a UUID
pub(crate) fn parse_id(raw: &str) -> Result<uuid::Uuid, crate::api::error::ApiError> {
    Ok(uuid::Uuid::parse_str(raw)?)
}
