//! Storage abstraction for certificates
//!
//! This module provides a trait-based abstraction for certificate
//! persistence, with an in-memory backend (default) and a PostgreSQL backend
//! behind the `postgres` feature.
//!
//! Every backend enforces the same uniqueness rules inside a single atomic
//! check-and-write:
//! - `canonical_hash`, `serial_code` and `pdf_hash` are unique across
//!   certificates when present
//! - an issued record can only be overwritten by a record carrying the same
//!   canonical hash
//! - a write built from a stale copy is refused: the PDF hash, once stored,
//!   never changes, `valid_until` never moves later and `last_audited_at`
//!   never moves earlier

pub mod memory;
#[cfg(feature = "postgres")]
pub mod postgres;

pub use memory::MemoryStore;
#[cfg(feature = "postgres")]
pub use postgres::PostgresStore;

use async_trait::async_trait;
use greencert_core::{Certificate, CertificateError, Digest};
use std::fmt::Debug;
use uuid::Uuid;

/// Error type for storage operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A uniqueness rule rejected the write
    #[error("Duplicate integrity proof: {0}")]
    Duplicate(String),

    /// The write was built from an outdated copy of the record
    #[error("Stale write: {0}")]
    Stale(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Connection error: {0}")]
    Connection(String),
}

impl From<StorageError> for CertificateError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Duplicate(msg) => CertificateError::DuplicateIntegrityProof(msg),
            StorageError::Stale(msg) => CertificateError::InvalidState(msg),
            other => CertificateError::Storage(other.to_string()),
        }
    }
}

/// Persistence contract for the certificate aggregate
///
/// Implementations must be thread-safe and support concurrent access.
#[async_trait]
pub trait CertificateStore: Send + Sync + Debug {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Certificate>, StorageError>;

    async fn find_by_canonical_hash(
        &self,
        hash: &Digest,
    ) -> Result<Option<Certificate>, StorageError>;

    async fn find_by_pdf_hash(&self, hash: &Digest) -> Result<Option<Certificate>, StorageError>;

    /// All certificates that have not been issued yet
    async fn list_pre_issued(&self) -> Result<Vec<Certificate>, StorageError>;

    /// Upsert by id, enforcing the uniqueness and progression rules atomically
    async fn save(&self, certificate: &Certificate) -> Result<(), StorageError>;
}

/// Refuse writes that would move the stored record backwards
///
/// `existing` is the stored version of `candidate` (same id), if any. Issued
/// records only ever gain a PDF hash, an earlier expiry or a later audit, so
/// any candidate that loses one of those was loaded before a concurrent write.
pub(crate) fn check_progression(
    candidate: &Certificate,
    existing: Option<&Certificate>,
) -> Result<(), StorageError> {
    let Some(existing) = existing else {
        return Ok(());
    };
    let id = candidate.id();

    if let Some(stored_hash) = existing.canonical_hash() {
        if candidate.canonical_hash() != Some(stored_hash) {
            return Err(StorageError::Duplicate(format!(
                "certificate {} is already issued with canonical hash {}",
                id, stored_hash
            )));
        }
    }

    if let Some(stored_pdf) = existing.authenticity_proof().and_then(|p| p.pdf_hash()) {
        if candidate.authenticity_proof().and_then(|p| p.pdf_hash()) != Some(stored_pdf) {
            return Err(StorageError::Stale(format!(
                "certificate {} already has PDF hash {}",
                id, stored_pdf
            )));
        }
    }

    if let (Some(stored), Some(incoming)) = (existing.issued(), candidate.issued()) {
        if incoming.valid_until > stored.valid_until {
            return Err(StorageError::Stale(format!(
                "certificate {} was revoked concurrently",
                id
            )));
        }
    }

    if candidate.last_audited_at() < existing.last_audited_at() {
        return Err(StorageError::Stale(format!(
            "certificate {} was audited concurrently",
            id
        )));
    }
    Ok(())
}

/// Uniqueness and progression checks shared by backends that hold records in
/// process
pub(crate) fn check_conflicts<'a>(
    candidate: &Certificate,
    existing: Option<&Certificate>,
    others: impl Iterator<Item = &'a Certificate>,
) -> Result<(), StorageError> {
    check_progression(candidate, existing)?;

    let proof = candidate.authenticity_proof();
    let canonical = candidate.canonical_hash();
    let serial = proof.map(|p| p.serial_code());
    let pdf = proof.and_then(|p| p.pdf_hash());

    for other in others {
        if other.id() == candidate.id() {
            continue;
        }
        if canonical.is_some() && other.canonical_hash() == canonical {
            return Err(StorageError::Duplicate(format!(
                "canonical hash already used by certificate {}",
                other.id()
            )));
        }
        let other_proof = other.authenticity_proof();
        if serial.is_some() && other_proof.map(|p| p.serial_code()) == serial {
            return Err(StorageError::Duplicate(format!(
                "serial code already used by certificate {}",
                other.id()
            )));
        }
        if pdf.is_some() && other_proof.and_then(|p| p.pdf_hash()) == pdf {
            return Err(StorageError::Duplicate(format!(
                "PDF hash already used by certificate {}",
                other.id()
            )));
        }
    }
    Ok(())
}
