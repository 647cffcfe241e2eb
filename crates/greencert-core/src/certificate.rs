//! Certificate aggregate and its lifecycle
//!
//! A certificate is created pre-issued and transitions to issued exactly once.
//! The five issuance fields live together in [`IssuedRecord`], so a
//! certificate is either fully pre-issued or fully issued; no mixed state can
//! be built through this API.
//!
//! ```text
//!   register ──► PreIssued ──issue──► Issued ──revoke──► Issued (expired)
//!                    │                  │
//!                  audit              audit / set_pdf_hash
//! ```

use crate::digest::Digest;
use crate::error::{CertificateError, Result};
use crate::proof::AuthenticityProof;
use crate::types::{LedgerReference, Norm, SustainabilityCriteria};
use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Validity term of an issued certificate
pub const VALIDITY_YEARS: u32 = 5;

/// Maximum length of the schema version string
pub const MAX_VERSION_LEN: usize = 50;

/// Compute `valid_until` from `issued_at`
pub fn validity_end(issued_at: DateTime<Utc>) -> Result<DateTime<Utc>> {
    issued_at
        .checked_add_months(Months::new(VALIDITY_YEARS * 12))
        .ok_or_else(|| {
            CertificateError::Validation(format!(
                "issuance time {} has no representable expiry",
                issued_at
            ))
        })
}

/// Fields that become present together at issuance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedRecord {
    pub issued_at: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    pub authenticity_proof: AuthenticityProof,
    pub canonical_hash: Digest,
    pub ledger_reference: LedgerReference,
}

/// Lifecycle tag of a certificate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lifecycle {
    PreIssued,
    Issued(IssuedRecord),
}

/// Input for registering a pre-certificate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCertificate {
    pub version: String,
    pub product_id: Uuid,
    pub producer_id: Uuid,
    pub certifier_id: Uuid,
    #[serde(default)]
    pub norms_complied: Vec<Norm>,
    #[serde(default)]
    pub sustainability_criteria: Vec<SustainabilityCriteria>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// The unsigned field set a certifier signs over
///
/// Excludes every lifecycle field, so the digest is stable until issuance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreSignaturePayload {
    pub id: String,
    pub version: String,
    pub product_id: String,
    pub producer_id: String,
    pub certifier_id: String,
    pub norms_complied: Vec<Norm>,
    pub sustainability_criteria: Vec<SustainabilityCriteria>,
    pub notes: Option<String>,
}

/// Certificate aggregate root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    id: Uuid,
    version: String,
    product_id: Uuid,
    producer_id: Uuid,
    certifier_id: Uuid,
    norms_complied: Vec<Norm>,
    sustainability_criteria: Vec<SustainabilityCriteria>,
    notes: Option<String>,
    last_audited_at: Option<DateTime<Utc>>,
    lifecycle: Lifecycle,
}

fn validate_version(version: &str) -> Result<()> {
    let len = version.chars().count();
    if len == 0 || len > MAX_VERSION_LEN {
        return Err(CertificateError::Validation(format!(
            "version must be 1..={} characters, got {}",
            MAX_VERSION_LEN, len
        )));
    }
    Ok(())
}

impl Certificate {
    /// Create a fresh pre-issued certificate
    pub fn register(input: NewCertificate) -> Result<Self> {
        validate_version(&input.version)?;
        Ok(Self {
            id: Uuid::new_v4(),
            version: input.version,
            product_id: input.product_id,
            producer_id: input.producer_id,
            certifier_id: input.certifier_id,
            norms_complied: input.norms_complied,
            sustainability_criteria: input.sustainability_criteria,
            notes: input.notes,
            last_audited_at: None,
            lifecycle: Lifecycle::PreIssued,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn product_id(&self) -> Uuid {
        self.product_id
    }

    pub fn producer_id(&self) -> Uuid {
        self.producer_id
    }

    pub fn certifier_id(&self) -> Uuid {
        self.certifier_id
    }

    pub fn norms_complied(&self) -> &[Norm] {
        &self.norms_complied
    }

    pub fn sustainability_criteria(&self) -> &[SustainabilityCriteria] {
        &self.sustainability_criteria
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn last_audited_at(&self) -> Option<DateTime<Utc>> {
        self.last_audited_at
    }

    pub fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    pub fn issued(&self) -> Option<&IssuedRecord> {
        match &self.lifecycle {
            Lifecycle::Issued(record) => Some(record),
            Lifecycle::PreIssued => None,
        }
    }

    pub fn is_pre_issued(&self) -> bool {
        matches!(self.lifecycle, Lifecycle::PreIssued)
    }

    pub fn canonical_hash(&self) -> Option<&Digest> {
        self.issued().map(|r| &r.canonical_hash)
    }

    pub fn authenticity_proof(&self) -> Option<&AuthenticityProof> {
        self.issued().map(|r| &r.authenticity_proof)
    }

    /// Transition to issued; the single commit point of issuance
    pub fn issue(&mut self, record: IssuedRecord) -> Result<()> {
        if !self.is_pre_issued() {
            return Err(CertificateError::InvalidState(format!(
                "certificate {} is already issued",
                self.id
            )));
        }
        if record.valid_until < record.issued_at {
            return Err(CertificateError::Validation(
                "valid_until precedes issued_at".into(),
            ));
        }
        self.lifecycle = Lifecycle::Issued(record);
        Ok(())
    }

    /// Attach the PDF hash to the proof, once
    pub fn set_pdf_hash(&mut self, pdf_hash: Digest) -> Result<()> {
        let record = match &mut self.lifecycle {
            Lifecycle::Issued(record) => record,
            Lifecycle::PreIssued => {
                return Err(CertificateError::Precondition(format!(
                    "certificate {} has no authenticity proof yet",
                    self.id
                )))
            }
        };
        record.authenticity_proof = record.authenticity_proof.with_pdf_hash(pdf_hash)?;
        Ok(())
    }

    pub fn has_expired(&self) -> bool {
        self.has_expired_at(Utc::now())
    }

    /// Expiry check against an explicit clock; the boundary instant counts as expired
    pub fn has_expired_at(&self, now: DateTime<Utc>) -> bool {
        match &self.lifecycle {
            Lifecycle::PreIssued => false,
            Lifecycle::Issued(record) => now >= record.valid_until,
        }
    }

    pub fn audit(&mut self) {
        self.audit_at(Utc::now());
    }

    pub fn audit_at(&mut self, now: DateTime<Utc>) {
        self.last_audited_at = Some(now);
    }

    pub fn revoke(&mut self) -> Result<()> {
        self.revoke_at(Utc::now())
    }

    pub fn revoke_at(&mut self, now: DateTime<Utc>) -> Result<()> {
        match &mut self.lifecycle {
            Lifecycle::PreIssued => Err(CertificateError::InvalidState(format!(
                "certificate {} is pre-issued and cannot be revoked",
                self.id
            ))),
            Lifecycle::Issued(record) => {
                // Never extend an already earlier expiry
                if now < record.valid_until {
                    record.valid_until = now;
                }
                Ok(())
            }
        }
    }

    pub fn pre_signature_payload(&self) -> PreSignaturePayload {
        PreSignaturePayload {
            id: self.id.to_string(),
            version: self.version.clone(),
            product_id: self.product_id.to_string(),
            producer_id: self.producer_id.to_string(),
            certifier_id: self.certifier_id.to_string(),
            norms_complied: self.norms_complied.clone(),
            sustainability_criteria: self.sustainability_criteria.clone(),
            notes: self.notes.clone(),
        }
    }

    /// Flat representation used by storage and the public API
    pub fn to_record(&self) -> CertificateRecord {
        let issued = self.issued();
        CertificateRecord {
            id: self.id,
            version: self.version.clone(),
            product_id: self.product_id,
            producer_id: self.producer_id,
            certifier_id: self.certifier_id,
            norms_complied: self.norms_complied.clone(),
            sustainability_criteria: self.sustainability_criteria.clone(),
            notes: self.notes.clone(),
            issued_at: issued.map(|r| r.issued_at),
            valid_until: issued.map(|r| r.valid_until),
            last_audited_at: self.last_audited_at,
            authenticity_proof: issued.map(|r| r.authenticity_proof.clone()),
            canonical_hash: issued.map(|r| r.canonical_hash),
            ledger_reference: issued.map(|r| r.ledger_reference.clone()),
        }
    }
}

/// Flat, serializable form with every lifecycle field optional
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateRecord {
    pub id: Uuid,
    pub version: String,
    pub product_id: Uuid,
    pub producer_id: Uuid,
    pub certifier_id: Uuid,
    pub norms_complied: Vec<Norm>,
    pub sustainability_criteria: Vec<SustainabilityCriteria>,
    pub notes: Option<String>,
    pub issued_at: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    pub last_audited_at: Option<DateTime<Utc>>,
    pub authenticity_proof: Option<AuthenticityProof>,
    pub canonical_hash: Option<Digest>,
    pub ledger_reference: Option<LedgerReference>,
}

impl TryFrom<CertificateRecord> for Certificate {
    type Error = CertificateError;

    /// Rebuild an aggregate; records with only some issuance fields are rejected
    fn try_from(record: CertificateRecord) -> Result<Self> {
        validate_version(&record.version)?;

        let lifecycle = match (
            record.issued_at,
            record.valid_until,
            record.authenticity_proof,
            record.canonical_hash,
            record.ledger_reference,
        ) {
            (None, None, None, None, None) => Lifecycle::PreIssued,
            (
                Some(issued_at),
                Some(valid_until),
                Some(authenticity_proof),
                Some(canonical_hash),
                Some(ledger_reference),
            ) => Lifecycle::Issued(IssuedRecord {
                issued_at,
                valid_until,
                authenticity_proof,
                canonical_hash,
                ledger_reference,
            }),
            _ => {
                return Err(CertificateError::InvalidState(format!(
                    "certificate {} has a partial issuance record",
                    record.id
                )))
            }
        };

        Ok(Self {
            id: record.id,
            version: record.version,
            product_id: record.product_id,
            producer_id: record.producer_id,
            certifier_id: record.certifier_id,
            norms_complied: record.norms_complied,
            sustainability_criteria: record.sustainability_criteria,
            notes: record.notes,
            last_audited_at: record.last_audited_at,
            lifecycle,
        })
    }
}
