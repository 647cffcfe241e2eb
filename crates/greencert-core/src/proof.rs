//! Authenticity proof attached to an issued certificate

use crate::crypto::CertifierAddress;
use crate::digest::Digest;
use crate::error::{CertificateError, Result};
use serde::{Deserialize, Serialize};

/// Evidence binding a certificate to its certifier and its physical artifacts
///
/// Immutable: attaching a PDF hash produces a new instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticityProof {
    serial_code: String,
    qr_code_url: Option<String>,
    certifier_signature: String,
    certifier_address: CertifierAddress,
    pdf_hash: Option<Digest>,
}

impl AuthenticityProof {
    pub fn new(
        serial_code: impl Into<String>,
        qr_code_url: Option<String>,
        certifier_signature: impl Into<String>,
        certifier_address: CertifierAddress,
    ) -> Result<Self> {
        let serial_code = serial_code.into();
        if serial_code.trim().is_empty() {
            return Err(CertificateError::Validation(
                "serial code must not be empty".into(),
            ));
        }
        Ok(Self {
            serial_code,
            qr_code_url,
            certifier_signature: certifier_signature.into(),
            certifier_address,
            pdf_hash: None,
        })
    }

    pub fn serial_code(&self) -> &str {
        &self.serial_code
    }

    pub fn qr_code_url(&self) -> Option<&str> {
        self.qr_code_url.as_deref()
    }

    pub fn certifier_signature(&self) -> &str {
        &self.certifier_signature
    }

    pub fn certifier_address(&self) -> &CertifierAddress {
        &self.certifier_address
    }

    pub fn pdf_hash(&self) -> Option<&Digest> {
        self.pdf_hash.as_ref()
    }

    /// New proof carrying `pdf_hash`; fails if one is already attached
    pub fn with_pdf_hash(&self, pdf_hash: Digest) -> Result<Self> {
        if let Some(existing) = &self.pdf_hash {
            return Err(CertificateError::Precondition(format!(
                "PDF hash already set to {}",
                existing
            )));
        }
        Ok(Self {
            pdf_hash: Some(pdf_hash),
            ..self.clone()
        })
    }
}
