//! Local integrity gateway
//!
//! Keccak-256 over canonical text, secp256k1 signer recovery against the
//! certifier address, and ledger anchoring with a bounded confirmation wait.

use async_trait::async_trait;
use greencert_core::{keccak256, CertifierAddress, Digest, LedgerError, LedgerReference, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use super::{IntegrityGateway, LedgerClient};

#[derive(Debug, Clone)]
pub struct LocalIntegrityGateway {
    ledger: Arc<dyn LedgerClient>,
    confirmation_timeout: Duration,
}

impl LocalIntegrityGateway {
    pub fn new(ledger: Arc<dyn LedgerClient>, confirmation_timeout: Duration) -> Self {
        Self {
            ledger,
            confirmation_timeout,
        }
    }
}

#[async_trait]
impl IntegrityGateway for LocalIntegrityGateway {
    async fn hash(&self, canonical_data: &str) -> Result<Digest> {
        Ok(keccak256(canonical_data.as_bytes()))
    }

    async fn verify_signature(
        &self,
        digest: &Digest,
        signature: &str,
        signer: &CertifierAddress,
    ) -> Result<()> {
        signer.verify(digest, signature).inspect_err(|e| {
            warn!(signer = %signer, digest = %digest, error = %e, "Certifier signature rejected");
        })
    }

    async fn record_on_ledger(
        &self,
        digest: &Digest,
        signer: &CertifierAddress,
    ) -> Result<LedgerReference> {
        let tx = self.ledger.submit(digest, signer).await?;
        info!(tx_hash = %tx.tx_hash, digest = %digest, "Awaiting ledger confirmation");

        match tokio::time::timeout(self.confirmation_timeout, self.ledger.await_confirmation(&tx))
            .await
        {
            Ok(confirmed) => Ok(confirmed?),
            Err(_) => {
                warn!(
                    tx_hash = %tx.tx_hash,
                    timeout_secs = self.confirmation_timeout.as_secs(),
                    "Ledger confirmation timed out"
                );
                Err(LedgerError::Timeout(self.confirmation_timeout.as_secs()).into())
            }
        }
    }
}
