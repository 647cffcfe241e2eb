//! Green Certificate Plane
//!
//! Issuance and verification service for tamper-evident green certificates:
//! - Registers pre-certificates referencing a product, producer and certifier
//! - Issues them once the certifier has signed the pre-issued hash, anchoring
//!   the canonical hash on a ledger
//! - Lets anyone verify a certificate by canonical hash, PDF or QR artifact
//!
//! ## API Endpoints
//!
//! ### Lifecycle
//! - `POST /v1/certificates` - Register a pre-certificate
//! - `GET /v1/certificates/pre` - List pre-certificates
//! - `GET /v1/certificates/{id}` - Fetch a certificate
//! - `POST /v1/certificates/{id}/issue` - Issue with a certifier signature
//! - `POST /v1/certificates/{id}/pdf` - Bind the certificate PDF
//! - `POST /v1/certificates/{id}/audit` - Record an audit
//! - `POST /v1/certificates/{id}/revoke` - Revoke
//!
//! ### Verification
//! - `GET /v1/verify/{hash}` - Verify by canonical hash
//! - `POST /v1/verify/pdf` - Verify a PDF
//! - `GET /v1/qr/{key}` - Fetch a QR artifact
//!
//! ### Directory
//! - `POST /v1/directory/{products|producers|certifiers}` - Register an entity

pub mod api;
pub mod artifacts;
pub mod config;
pub mod core;
pub mod directory;
pub mod integrity;
pub mod storage;

pub use api::create_router;
pub use api::handlers::AppState;
pub use config::{ConfigError, PlaneConfig};
pub use crate::core::{
    ArtifactUrls, Canonicalizer, CertificateService, CertificateView, IssuanceOrchestrator,
    Verification,
};
pub use directory::{EntityLookup, MemoryDirectory};
pub use integrity::{IntegrityGateway, LedgerClient, LocalIntegrityGateway, MemoryLedger};
pub use storage::{CertificateStore, MemoryStore, StorageError};

use artifacts::{FsObjectStore, MemoryObjectStore, ObjectStore, PayloadQrRenderer, UuidSerialCodes};
use greencert_core::Result;
use std::sync::Arc;

/// Wire the service from configuration
///
/// The certificate store is chosen by the caller (memory or postgres); the
/// object store follows `object_dir`.
pub async fn build_state(
    config: PlaneConfig,
    store: Arc<dyn CertificateStore>,
    ledger: Arc<dyn LedgerClient>,
) -> Result<AppState> {
    let directory = Arc::new(MemoryDirectory::new());
    let canonicalizer = Canonicalizer::new(directory.clone(), directory.clone(), directory.clone());
    let gateway: Arc<dyn IntegrityGateway> =
        Arc::new(LocalIntegrityGateway::new(ledger, config.ledger_timeout));

    let objects: Arc<dyn ObjectStore> = match &config.object_dir {
        Some(dir) => Arc::new(FsObjectStore::new(dir).await?),
        None => Arc::new(MemoryObjectStore::new()),
    };

    let orchestrator = IssuanceOrchestrator::new(
        store.clone(),
        canonicalizer.clone(),
        gateway.clone(),
        objects.clone(),
        Arc::new(PayloadQrRenderer),
        Arc::new(UuidSerialCodes),
        ArtifactUrls {
            verify_base: config.verify_url.clone(),
            qr_base: config.qr_base(),
        },
    );

    let service = CertificateService::new(store, canonicalizer, gateway, objects, orchestrator);

    Ok(AppState {
        service,
        directory,
        config,
    })
}
