//! # Greencert Core
//!
//! Domain types for tamper-evident green certificates: the certificate
//! aggregate and its lifecycle, the authenticity proof, the canonical form used
//! for hashing, and certifier signature helpers.
//!
//! ## Key Concepts
//!
//! - **Pre-issued certificate**: registered, awaiting signature and anchoring
//! - **Issued certificate**: carries issuance time, expiry, authenticity proof,
//!   canonical hash and ledger reference, all set in one transition
//! - **Canonical form**: sorted-key, whitespace-free JSON of the certificate and
//!   its entity snapshots; the only input to the canonical hash
//! - **Pre-signature digest**: hash of the unsigned field set the certifier signs
//!
//! This crate performs no I/O.

pub mod canonical;
pub mod certificate;
pub mod crypto;
pub mod digest;
pub mod error;
pub mod proof;
pub mod types;

pub use canonical::{
    canonical_timestamp, to_canonical_json, CanonicalCertificate, CertifierSnapshot, Fixed6,
    PdfPayload, ProducerSnapshot, ProductSnapshot,
};
pub use certificate::{
    validity_end, Certificate, CertificateRecord, IssuedRecord, Lifecycle, NewCertificate,
    PreSignaturePayload, VALIDITY_YEARS,
};
pub use crypto::{CertifierAddress, CertifierKeyPair};
pub use digest::{keccak256, Digest};
pub use error::{CertificateError, EntityKind, LedgerError, Result};
pub use proof::AuthenticityProof;
pub use types::{LedgerReference, Norm, SustainabilityCriteria};
