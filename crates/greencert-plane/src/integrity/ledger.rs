//! Ledger client contract and an in-process registry
//!
//! The registry keeps one entry per anchored digest: a sequential id starting
//! at 1, the owning address, the data hash and a revoked flag.
//! Submission returns a pending transaction which becomes an entry once it
//! is confirmed.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use greencert_core::{keccak256, CertifierAddress, Digest, LedgerError, LedgerReference};
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Mutex;
use tracing::{debug, info};

/// Handle for a submitted, unconfirmed transaction
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PendingTransaction {
    pub tx_hash: String,
}

/// Client for the external ledger
#[async_trait]
pub trait LedgerClient: Send + Sync + Debug {
    async fn submit(
        &self,
        data_hash: &Digest,
        owner: &CertifierAddress,
    ) -> Result<PendingTransaction, LedgerError>;

    /// Wait for the transaction to be confirmed and return its registry id
    async fn await_confirmation(
        &self,
        tx: &PendingTransaction,
    ) -> Result<LedgerReference, LedgerError>;
}

/// A confirmed registry entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    pub id: u64,
    pub owner: CertifierAddress,
    pub data_hash: Digest,
    pub revoked: bool,
    pub confirmed_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct LedgerState {
    entries: Vec<LedgerEntry>,
    pending: HashMap<String, (Digest, CertifierAddress)>,
    nonce: u64,
}

/// In-process ledger registry
#[derive(Debug, Default)]
pub struct MemoryLedger {
    state: Mutex<LedgerState>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, LedgerState>, LedgerError> {
        self.state
            .lock()
            .map_err(|_| LedgerError::Submission("ledger state lock poisoned".into()))
    }

    /// Confirmed entry by registry id
    pub fn entry(&self, id: u64) -> Option<LedgerEntry> {
        let state = self.lock().ok()?;
        id.checked_sub(1)
            .and_then(|idx| state.entries.get(idx as usize))
            .cloned()
    }

    pub fn entry_count(&self) -> usize {
        self.lock().map(|s| s.entries.len()).unwrap_or(0)
    }
}

#[async_trait]
impl LedgerClient for MemoryLedger {
    async fn submit(
        &self,
        data_hash: &Digest,
        owner: &CertifierAddress,
    ) -> Result<PendingTransaction, LedgerError> {
        let mut state = self.lock()?;
        if state.entries.iter().any(|e| &e.data_hash == data_hash) {
            return Err(LedgerError::Submission(format!(
                "data hash {} already registered",
                data_hash
            )));
        }

        state.nonce += 1;
        let mut preimage = Vec::with_capacity(60);
        preimage.extend_from_slice(data_hash.as_bytes());
        preimage.extend_from_slice(owner.as_bytes());
        preimage.extend_from_slice(&state.nonce.to_be_bytes());
        let tx_hash = format!("0x{}", keccak256(&preimage));

        state
            .pending
            .insert(tx_hash.clone(), (*data_hash, owner.clone()));
        debug!(tx_hash = %tx_hash, data_hash = %data_hash, "Submitted ledger transaction");
        Ok(PendingTransaction { tx_hash })
    }

    async fn await_confirmation(
        &self,
        tx: &PendingTransaction,
    ) -> Result<LedgerReference, LedgerError> {
        let mut state = self.lock()?;
        let (data_hash, owner) = state.pending.remove(&tx.tx_hash).ok_or_else(|| {
            LedgerError::Rejected(format!("unknown transaction {}", tx.tx_hash))
        })?;

        // Two pending submissions of the same hash: only the first confirms
        if state.entries.iter().any(|e| e.data_hash == data_hash) {
            return Err(LedgerError::Rejected(format!(
                "data hash {} already registered",
                data_hash
            )));
        }

        let id = state.entries.len() as u64 + 1;
        state.entries.push(LedgerEntry {
            id,
            owner,
            data_hash,
            revoked: false,
            confirmed_at: Utc::now(),
        });

        info!(ledger_id = id, data_hash = %data_hash, "Ledger transaction confirmed");
        Ok(LedgerReference::new(id.to_string()))
    }
}
