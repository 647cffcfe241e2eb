//! Certificate workflows: canonicalization, issuance and the other use cases

pub mod canonicalizer;
pub mod certificates;
pub mod issuance;

pub use canonicalizer::Canonicalizer;
pub use certificates::{CertificateService, CertificateView, QrObject, Verification};
pub use issuance::{pre_signature_digest, ArtifactUrls, IssuanceOrchestrator};
