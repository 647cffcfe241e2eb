//! Entity directory: products, producers and certifiers
//!
//! Certificates only reference these entities by id. At issuance the
//! canonicalizer asks the directory for a minimized snapshot of each one.
//! Raw records are validated strictly at this boundary: a record with a
//! missing or mistyped field is rejected with `InvalidSnapshot`, never
//! coerced. Fields the snapshot does not use are ignored.

pub mod memory;
pub mod records;

pub use memory::MemoryDirectory;
pub use records::{CertifierRecord, ProducerRecord, ProductRecord};

use async_trait::async_trait;
use greencert_core::Result;
use std::fmt::Debug;
use uuid::Uuid;

/// Lookup of one entity kind, yielding its canonical snapshot `S`
#[async_trait]
pub trait EntityLookup<S>: Send + Sync + Debug {
    /// Snapshot of the entity, or `None` if it does not exist
    async fn find_canonical_by_id(&self, id: Uuid) -> Result<Option<S>>;

    async fn exists(&self, id: Uuid) -> Result<bool>;
}
