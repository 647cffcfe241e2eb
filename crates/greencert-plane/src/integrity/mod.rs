//! Integrity gateway: hashing, signature verification and ledger anchoring
//!
//! The orchestrator only talks to [`IntegrityGateway`]. The local
//! implementation hashes with Keccak-256, recovers secp256k1 certifier
//! signatures and delegates anchoring to a [`LedgerClient`].

pub mod ledger;
pub mod local;

pub use ledger::{LedgerClient, LedgerEntry, MemoryLedger, PendingTransaction};
pub use local::LocalIntegrityGateway;

use async_trait::async_trait;
use greencert_core::{CertifierAddress, Digest, LedgerReference, Result};
use std::fmt::Debug;

#[async_trait]
pub trait IntegrityGateway: Send + Sync + Debug {
    /// Deterministic digest of canonical text
    async fn hash(&self, canonical_data: &str) -> Result<Digest>;

    /// Fails with `InvalidSignature` unless `signature` over `digest` was
    /// produced by the key behind `signer`
    async fn verify_signature(
        &self,
        digest: &Digest,
        signature: &str,
        signer: &CertifierAddress,
    ) -> Result<()>;

    /// Anchor `digest` under `signer` and wait for confirmation
    ///
    /// No retries; failures surface as `CertificateError::Ledger`.
    async fn record_on_ledger(
        &self,
        digest: &Digest,
        signer: &CertifierAddress,
    ) -> Result<LedgerReference>;
}
