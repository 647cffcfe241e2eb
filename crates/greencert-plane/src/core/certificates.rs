//! Certificate use cases
//!
//! Registration, lookup, verification, PDF binding, audit and revocation,
//! plus issuance through the [`IssuanceOrchestrator`].

use greencert_core::{
    to_canonical_json, Certificate, CertificateError, CertificateRecord, CertifierAddress, Digest,
    EntityKind, NewCertificate, PdfPayload, Result,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::artifacts::{content_type_for_key, ObjectStore};
use crate::core::canonicalizer::Canonicalizer;
use crate::core::issuance::{pre_signature_digest, IssuanceOrchestrator};
use crate::integrity::IntegrityGateway;
use crate::storage::CertificateStore;

/// Public representation of a certificate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CertificateView {
    #[serde(flatten)]
    pub record: CertificateRecord,
    pub is_pre_issued: bool,
    /// Digest the certifier must sign; only for pre-issued certificates
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pre_issued_hash: Option<Digest>,
}

/// Outcome of verifying a canonical hash
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verification {
    pub certificate: Option<CertificateView>,
    pub is_valid: bool,
}

/// A stored QR artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrObject {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
}

#[derive(Debug, Clone)]
pub struct CertificateService {
    store: Arc<dyn CertificateStore>,
    canonicalizer: Canonicalizer,
    gateway: Arc<dyn IntegrityGateway>,
    objects: Arc<dyn ObjectStore>,
    orchestrator: IssuanceOrchestrator,
}

impl CertificateService {
    pub fn new(
        store: Arc<dyn CertificateStore>,
        canonicalizer: Canonicalizer,
        gateway: Arc<dyn IntegrityGateway>,
        objects: Arc<dyn ObjectStore>,
        orchestrator: IssuanceOrchestrator,
    ) -> Self {
        Self {
            store,
            canonicalizer,
            gateway,
            objects,
            orchestrator,
        }
    }

    async fn load(&self, id: Uuid) -> Result<Certificate> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| CertificateError::certificate_not_found(id))
    }

    /// Public view; pre-issued certificates get their pre-signature digest
    pub async fn view(&self, certificate: &Certificate) -> Result<CertificateView> {
        let pre_issued_hash = if certificate.is_pre_issued() {
            Some(pre_signature_digest(self.gateway.as_ref(), certificate).await?)
        } else {
            None
        };
        Ok(CertificateView {
            record: certificate.to_record(),
            is_pre_issued: certificate.is_pre_issued(),
            pre_issued_hash,
        })
    }

    /// Create a pre-certificate after checking its references exist
    pub async fn register(&self, input: NewCertificate) -> Result<CertificateView> {
        self.canonicalizer
            .ensure_references_exist(input.product_id, input.producer_id, input.certifier_id)
            .await?;

        let certificate = Certificate::register(input)?;
        self.store.save(&certificate).await?;
        info!(certificate_id = %certificate.id(), "Registered pre-certificate");
        self.view(&certificate).await
    }

    pub async fn issue(
        &self,
        id: Uuid,
        certifier_signature: &str,
        certifier_address: &CertifierAddress,
    ) -> Result<CertificateView> {
        let certificate = self
            .orchestrator
            .issue(id, certifier_signature, certifier_address)
            .await?;
        self.view(&certificate).await
    }

    pub async fn find(&self, id: Uuid) -> Result<CertificateView> {
        let certificate = self.load(id).await?;
        self.view(&certificate).await
    }

    pub async fn list_pre_issued(&self) -> Result<Vec<CertificateView>> {
        let certificates = self.store.list_pre_issued().await?;
        let mut views = Vec::with_capacity(certificates.len());
        for certificate in &certificates {
            views.push(self.view(certificate).await?);
        }
        Ok(views)
    }

    /// Valid iff found, issued and not expired
    pub async fn verify_canonical_hash(&self, hash: &Digest) -> Result<Verification> {
        match self.store.find_by_canonical_hash(hash).await? {
            Some(certificate) => {
                let is_valid = !certificate.is_pre_issued() && !certificate.has_expired();
                Ok(Verification {
                    certificate: Some(self.view(&certificate).await?),
                    is_valid,
                })
            }
            None => Ok(Verification {
                certificate: None,
                is_valid: false,
            }),
        }
    }

    pub async fn pdf_hash(&self, pdf: &[u8]) -> Result<Digest> {
        let text = to_canonical_json(&PdfPayload::from_bytes(pdf))?;
        self.gateway.hash(&text).await
    }

    /// Bind a PDF rendering to an issued certificate, once
    pub async fn attach_pdf(&self, id: Uuid, pdf: &[u8]) -> Result<CertificateView> {
        let mut certificate = self.load(id).await?;
        let hash = self.pdf_hash(pdf).await?;
        certificate.set_pdf_hash(hash).inspect_err(|e| {
            warn!(certificate_id = %id, error = %e, "PDF hash rejected");
        })?;
        self.store.save(&certificate).await?;
        info!(certificate_id = %id, pdf_hash = %hash, "PDF hash attached");
        self.view(&certificate).await
    }

    /// Certificate a PDF was registered for
    pub async fn verify_pdf(&self, pdf: &[u8]) -> Result<CertificateView> {
        let hash = self.pdf_hash(pdf).await?;
        let certificate = self
            .store
            .find_by_pdf_hash(&hash)
            .await?
            .ok_or_else(|| CertificateError::NotFound {
                entity: EntityKind::Certificate,
                id: format!("pdf:{}", hash),
            })?;
        self.view(&certificate).await
    }

    pub async fn audit(&self, id: Uuid) -> Result<CertificateView> {
        let mut certificate = self.load(id).await?;
        certificate.audit();
        self.store.save(&certificate).await?;
        info!(certificate_id = %id, "Certificate audited");
        self.view(&certificate).await
    }

    pub async fn revoke(&self, id: Uuid) -> Result<CertificateView> {
        let mut certificate = self.load(id).await?;
        certificate.revoke()?;
        self.store.save(&certificate).await?;
        warn!(certificate_id = %id, "Certificate revoked");
        self.view(&certificate).await
    }

    pub async fn qr_object(&self, key: &str) -> Result<QrObject> {
        let bytes = self
            .objects
            .get(key)
            .await?
            .ok_or_else(|| CertificateError::NotFound {
                entity: EntityKind::Certificate,
                id: format!("qr:{}", key),
            })?;
        Ok(QrObject {
            bytes,
            content_type: content_type_for_key(key),
        })
    }

    pub fn store(&self) -> &Arc<dyn CertificateStore> {
        &self.store
    }
}
