//! Error types for the green certificate domain

use std::fmt;

use thiserror::Error;

/// Result type alias using CertificateError
pub type Result<T> = std::result::Result<T, CertificateError>;

/// Kind of entity an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Certificate,
    Product,
    Producer,
    Certifier,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Certificate => "Certificate",
            EntityKind::Product => "Product",
            EntityKind::Producer => "Producer",
            EntityKind::Certifier => "Certifier",
        };
        f.write_str(name)
    }
}

/// Failures while anchoring a digest on the external ledger
///
/// Every variant is terminal for the current issuance attempt.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// The transaction could not be submitted
    #[error("ledger submission failed: {0}")]
    Submission(String),

    /// The transaction was not confirmed within the configured bound
    #[error("ledger confirmation timed out after {0}s")]
    Timeout(u64),

    /// The ledger confirmed the transaction as failed
    #[error("ledger rejected transaction: {0}")]
    Rejected(String),
}

/// Errors that can occur across the certificate lifecycle
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CertificateError {
    /// A requested certificate or entity does not exist
    #[error("{entity} with ID {id} not found")]
    NotFound { entity: EntityKind, id: String },

    /// Illegal lifecycle transition
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// An operation precondition does not hold
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// Certifier signature did not verify against the claimed address
    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    /// A referenced entity vanished between registration and issuance
    #[error("Referenced {entity} with ID {id} not found")]
    ReferenceNotFound { entity: EntityKind, id: String },

    /// Ledger anchoring failed
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Storage-level uniqueness violation on a hash or serial code
    #[error("Duplicate integrity proof: {0}")]
    DuplicateIntegrityProof(String),

    /// An entity record does not carry the fields its snapshot requires
    #[error("Invalid {entity} record: {reason}")]
    InvalidSnapshot { entity: EntityKind, reason: String },

    /// Malformed caller input
    #[error("Validation error: {0}")]
    Validation(String),

    /// The canonical form could not be produced
    #[error("Canonicalization error: {0}")]
    Canonicalization(String),

    /// Hash service failure
    #[error("Integrity service error: {0}")]
    Integrity(String),

    /// Certificate store failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Object storage failure
    #[error("Object storage error: {0}")]
    ObjectStorage(String),
}

impl CertificateError {
    /// Shorthand for a missing certificate
    pub fn certificate_not_found(id: impl fmt::Display) -> Self {
        CertificateError::NotFound {
            entity: EntityKind::Certificate,
            id: id.to_string(),
        }
    }
}

impl From<serde_json::Error> for CertificateError {
    fn from(err: serde_json::Error) -> Self {
        CertificateError::Canonicalization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_names_entity_and_id() {
        let err = CertificateError::ReferenceNotFound {
            entity: EntityKind::Producer,
            id: "r1".into(),
        };
        assert_eq!(err.to_string(), "Referenced Producer with ID r1 not found");
    }

    #[test]
    fn test_ledger_error_is_transparent() {
        let err: CertificateError = LedgerError::Timeout(30).into();
        assert_eq!(err.to_string(), "ledger confirmation timed out after 30s");
    }
}
