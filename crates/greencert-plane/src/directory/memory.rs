//! In-memory entity directory
//!
//! Holds raw JSON records per entity kind. Records are validated on intake
//! and again whenever a snapshot is derived, so a record that was written
//! around the intake path still cannot leak into a canonical form.

use async_trait::async_trait;
use greencert_core::{
    CertificateError, CertifierSnapshot, EntityKind, ProducerSnapshot, ProductSnapshot, Result,
};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use super::records::{parse_record, CertifierRecord, ProducerRecord, ProductRecord};
use super::EntityLookup;

type RecordMap = RwLock<HashMap<Uuid, Value>>;

/// In-memory directory of products, producers and certifiers
#[derive(Debug, Default)]
pub struct MemoryDirectory {
    products: RecordMap,
    producers: RecordMap,
    certifiers: RecordMap,
}

fn poisoned() -> CertificateError {
    CertificateError::Storage("directory lock poisoned".into())
}

fn not_directory_entity() -> CertificateError {
    CertificateError::Validation("certificates are not directory entities".into())
}

fn validate_record(kind: EntityKind, raw: &Value) -> Result<()> {
    match kind {
        EntityKind::Product => {
            parse_record::<ProductRecord>(kind, raw)?.snapshot()?;
        }
        EntityKind::Producer => {
            parse_record::<ProducerRecord>(kind, raw)?.snapshot()?;
        }
        EntityKind::Certifier => {
            parse_record::<CertifierRecord>(kind, raw)?.snapshot()?;
        }
        EntityKind::Certificate => return Err(not_directory_entity()),
    }
    Ok(())
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    fn map(&self, kind: EntityKind) -> Result<&RecordMap> {
        match kind {
            EntityKind::Product => Ok(&self.products),
            EntityKind::Producer => Ok(&self.producers),
            EntityKind::Certifier => Ok(&self.certifiers),
            EntityKind::Certificate => Err(not_directory_entity()),
        }
    }

    /// Validate and store a new record, assigning it a fresh id
    pub fn register(&self, kind: EntityKind, mut raw: Value) -> Result<Uuid> {
        let id = Uuid::new_v4();
        let object = raw.as_object_mut().ok_or_else(|| CertificateError::InvalidSnapshot {
            entity: kind,
            reason: "record must be a JSON object".into(),
        })?;
        object.insert("id".into(), Value::String(id.to_string()));

        validate_record(kind, &raw)?;

        self.insert_raw(kind, id, raw)?;
        info!(entity = %kind, id = %id, "Registered directory entity");
        Ok(id)
    }

    /// Store a record verbatim under `id` without validation
    pub fn insert_raw(&self, kind: EntityKind, id: Uuid, raw: Value) -> Result<()> {
        let mut records = self.map(kind)?.write().map_err(|_| poisoned())?;
        records.insert(id, raw);
        Ok(())
    }

    pub fn remove(&self, kind: EntityKind, id: Uuid) -> Result<bool> {
        let mut records = self.map(kind)?.write().map_err(|_| poisoned())?;
        Ok(records.remove(&id).is_some())
    }

    fn get_raw(&self, kind: EntityKind, id: Uuid) -> Result<Option<Value>> {
        let records = self.map(kind)?.read().map_err(|_| poisoned())?;
        Ok(records.get(&id).cloned())
    }

    fn contains(&self, kind: EntityKind, id: Uuid) -> Result<bool> {
        let records = self.map(kind)?.read().map_err(|_| poisoned())?;
        Ok(records.contains_key(&id))
    }
}

#[async_trait]
impl EntityLookup<ProductSnapshot> for MemoryDirectory {
    async fn find_canonical_by_id(&self, id: Uuid) -> Result<Option<ProductSnapshot>> {
        match self.get_raw(EntityKind::Product, id)? {
            Some(raw) => parse_record::<ProductRecord>(EntityKind::Product, &raw)?
                .snapshot()
                .map(Some),
            None => Ok(None),
        }
    }

    async fn exists(&self, id: Uuid) -> Result<bool> {
        self.contains(EntityKind::Product, id)
    }
}

#[async_trait]
impl EntityLookup<ProducerSnapshot> for MemoryDirectory {
    async fn find_canonical_by_id(&self, id: Uuid) -> Result<Option<ProducerSnapshot>> {
        match self.get_raw(EntityKind::Producer, id)? {
            Some(raw) => parse_record::<ProducerRecord>(EntityKind::Producer, &raw)?
                .snapshot()
                .map(Some),
            None => Ok(None),
        }
    }

    async fn exists(&self, id: Uuid) -> Result<bool> {
        self.contains(EntityKind::Producer, id)
    }
}

#[async_trait]
impl EntityLookup<CertifierSnapshot> for MemoryDirectory {
    async fn find_canonical_by_id(&self, id: Uuid) -> Result<Option<CertifierSnapshot>> {
        match self.get_raw(EntityKind::Certifier, id)? {
            Some(raw) => parse_record::<CertifierRecord>(EntityKind::Certifier, &raw)?
                .snapshot()
                .map(Some),
            None => Ok(None),
        }
    }

    async fn exists(&self, id: Uuid) -> Result<bool> {
        self.contains(EntityKind::Certifier, id)
    }
}
