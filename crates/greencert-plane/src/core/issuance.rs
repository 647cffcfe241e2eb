//! Issuance orchestrator
//!
//! Turns a pre-issued certificate into an issued one:
//!
//! 1. Load the certificate; it must exist and be pre-issued
//! 2. Hash the unsigned field set (pre-signature digest)
//! 3. Verify the certifier signature over that digest
//! 4. Stamp issuance time, expiry and a fresh serial code
//! 5. Build and hash the canonical certificate (canonical digest)
//! 6. Render and upload the QR artifact, build the authenticity proof
//! 7. Anchor the canonical digest on the ledger
//! 8. Commit the transition on the aggregate and persist it
//!
//! Any failure aborts the workflow and leaves the stored certificate
//! untouched. Nothing is retried here; a caller that retries starts again
//! from a fresh load.

use chrono::Utc;
use greencert_core::{
    to_canonical_json, validity_end, AuthenticityProof, Certificate, CertificateError,
    CertifierAddress, Digest, IssuedRecord, Result,
};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::artifacts::{ObjectStore, QrPayload, QrRenderer, SerialCodeGenerator};
use crate::core::canonicalizer::Canonicalizer;
use crate::integrity::IntegrityGateway;
use crate::storage::CertificateStore;

/// Where QR artifacts point to
#[derive(Debug, Clone)]
pub struct ArtifactUrls {
    /// Base of the public verification URL embedded in the QR payload
    pub verify_base: String,
    /// Base under which stored QR objects are served
    pub qr_base: String,
}

#[derive(Debug, Clone)]
pub struct IssuanceOrchestrator {
    store: Arc<dyn CertificateStore>,
    canonicalizer: Canonicalizer,
    gateway: Arc<dyn IntegrityGateway>,
    objects: Arc<dyn ObjectStore>,
    qr: Arc<dyn QrRenderer>,
    serials: Arc<dyn SerialCodeGenerator>,
    urls: ArtifactUrls,
}

/// Digest a certifier signs before issuance
pub async fn pre_signature_digest(
    gateway: &dyn IntegrityGateway,
    certificate: &Certificate,
) -> Result<Digest> {
    let text = to_canonical_json(&certificate.pre_signature_payload())?;
    gateway.hash(&text).await
}

impl IssuanceOrchestrator {
    pub fn new(
        store: Arc<dyn CertificateStore>,
        canonicalizer: Canonicalizer,
        gateway: Arc<dyn IntegrityGateway>,
        objects: Arc<dyn ObjectStore>,
        qr: Arc<dyn QrRenderer>,
        serials: Arc<dyn SerialCodeGenerator>,
        urls: ArtifactUrls,
    ) -> Self {
        Self {
            store,
            canonicalizer,
            gateway,
            objects,
            qr,
            serials,
            urls,
        }
    }

    pub async fn issue(
        &self,
        certificate_id: Uuid,
        certifier_signature: &str,
        certifier_address: &CertifierAddress,
    ) -> Result<Certificate> {
        // Step 1: Load and check state
        let mut certificate = self
            .store
            .find_by_id(certificate_id)
            .await?
            .ok_or_else(|| CertificateError::certificate_not_found(certificate_id))?;

        if !certificate.is_pre_issued() {
            warn!(certificate_id = %certificate_id, "Issuance requested for issued certificate");
            return Err(CertificateError::InvalidState(format!(
                "certificate {} is already issued",
                certificate_id
            )));
        }

        // Step 2: Pre-signature digest
        let pre_signature = pre_signature_digest(self.gateway.as_ref(), &certificate).await?;
        debug!(certificate_id = %certificate_id, digest = %pre_signature, "Computed pre-signature digest");

        // Step 3: Certifier signature
        self.gateway
            .verify_signature(&pre_signature, certifier_signature, certifier_address)
            .await?;

        // Step 4: Issuance stamp
        let issued_at = Utc::now();
        let valid_until = validity_end(issued_at)?;
        let serial_code = self.serials.next_serial();

        // Step 5: Canonical digest
        let canonical = self
            .canonicalizer
            .build_canonical(&certificate, issued_at, valid_until, &serial_code)
            .await?;
        let canonical_hash = self.gateway.hash(&canonical.to_canonical_json()?).await?;
        debug!(certificate_id = %certificate_id, canonical_hash = %canonical_hash, "Computed canonical digest");

        // Step 6: QR artifact and proof
        let payload = QrPayload::new(certificate_id, canonical_hash, &self.urls.verify_base);
        let rendered = self.qr.render(&payload)?;
        // Keyed by attempt so a losing concurrent issuance cannot overwrite the winner's artifact
        let object_name = format!(
            "{}-{}.{}",
            certificate_id, canonical_hash, rendered.extension
        );
        let key = self
            .objects
            .upload(&object_name, rendered.bytes, &rendered.content_type)
            .await?;
        let qr_code_url = format!("{}/{}", self.urls.qr_base.trim_end_matches('/'), key);

        let proof = AuthenticityProof::new(
            serial_code,
            Some(qr_code_url),
            certifier_signature,
            certifier_address.clone(),
        )?;

        // Step 7: Ledger anchor
        let ledger_reference = self
            .gateway
            .record_on_ledger(&canonical_hash, certifier_address)
            .await?;
        info!(
            certificate_id = %certificate_id,
            ledger_reference = %ledger_reference,
            "Canonical digest anchored"
        );

        // Step 8: Commit and persist
        certificate.issue(IssuedRecord {
            issued_at,
            valid_until,
            authenticity_proof: proof,
            canonical_hash,
            ledger_reference,
        })?;

        self.store.save(&certificate).await.map_err(|e| {
            warn!(certificate_id = %certificate_id, error = %e, "Persisting issued certificate failed");
            CertificateError::from(e)
        })?;

        info!(
            certificate_id = %certificate_id,
            canonical_hash = %canonical_hash,
            "Certificate issued"
        );
        Ok(certificate)
    }
}
