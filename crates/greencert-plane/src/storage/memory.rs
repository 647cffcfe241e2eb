//! In-memory storage backend
//!
//! Default storage implementation using an in-memory hashmap.
//! Suitable for development and single-instance deployments.
//! Data is lost on restart.

use async_trait::async_trait;
use greencert_core::{Certificate, Digest};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::info;
use uuid::Uuid;

use super::{check_conflicts, CertificateStore, StorageError};

/// In-memory certificate store implementation
#[derive(Debug, Default)]
pub struct MemoryStore {
    certificates: RwLock<HashMap<Uuid, Certificate>>,
}

impl MemoryStore {
    /// Create a new in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<Uuid, Certificate>>, StorageError> {
        self.certificates
            .read()
            .map_err(|_| StorageError::Database("certificate map lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<Uuid, Certificate>>, StorageError> {
        self.certificates
            .write()
            .map_err(|_| StorageError::Database("certificate map lock poisoned".into()))
    }
}

#[async_trait]
impl CertificateStore for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Certificate>, StorageError> {
        Ok(self.read()?.get(&id).cloned())
    }

    async fn find_by_canonical_hash(
        &self,
        hash: &Digest,
    ) -> Result<Option<Certificate>, StorageError> {
        let certificates = self.read()?;
        Ok(certificates
            .values()
            .find(|c| c.canonical_hash() == Some(hash))
            .cloned())
    }

    async fn find_by_pdf_hash(&self, hash: &Digest) -> Result<Option<Certificate>, StorageError> {
        let certificates = self.read()?;
        Ok(certificates
            .values()
            .find(|c| c.authenticity_proof().and_then(|p| p.pdf_hash()) == Some(hash))
            .cloned())
    }

    async fn list_pre_issued(&self) -> Result<Vec<Certificate>, StorageError> {
        let certificates = self.read()?;
        Ok(certificates
            .values()
            .filter(|c| c.is_pre_issued())
            .cloned()
            .collect())
    }

    async fn save(&self, certificate: &Certificate) -> Result<(), StorageError> {
        let mut certificates = self.write()?;
        check_conflicts(
            certificate,
            certificates.get(&certificate.id()),
            certificates.values(),
        )?;

        info!(
            certificate_id = %certificate.id(),
            pre_issued = certificate.is_pre_issued(),
            "Saving certificate"
        );
        certificates.insert(certificate.id(), certificate.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use greencert_core::{
        keccak256, validity_end, AuthenticityProof, CertifierKeyPair, IssuedRecord,
        LedgerReference, NewCertificate, Norm,
    };

    fn pre_issued() -> Certificate {
        Certificate::register(NewCertificate {
            version: "1.0".into(),
            product_id: Uuid::new_v4(),
            producer_id: Uuid::new_v4(),
            certifier_id: Uuid::new_v4(),
            norms_complied: vec![Norm::Fsc],
            sustainability_criteria: vec![],
            notes: None,
        })
        .unwrap()
    }

    fn issued_record(serial: &str, hash_seed: &str) -> IssuedRecord {
        let now = Utc::now();
        IssuedRecord {
            issued_at: now,
            valid_until: validity_end(now).unwrap(),
            authenticity_proof: AuthenticityProof::new(
                serial,
                None,
                "0xsig",
                CertifierKeyPair::generate().address(),
            )
            .unwrap(),
            canonical_hash: keccak256(hash_seed.as_bytes()),
            ledger_reference: LedgerReference::new("1"),
        }
    }

    #[tokio::test]
    async fn test_save_and_find() {
        let store = MemoryStore::new();
        let cert = pre_issued();
        store.save(&cert).await.unwrap();

        assert_eq!(store.find_by_id(cert.id()).await.unwrap(), Some(cert.clone()));
        assert_eq!(store.list_pre_issued().await.unwrap().len(), 1);
        assert!(store.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_by_canonical_hash() {
        let store = MemoryStore::new();
        let mut cert = pre_issued();
        cert.issue(issued_record("s1", "h1")).unwrap();
        store.save(&cert).await.unwrap();

        let found = store
            .find_by_canonical_hash(&keccak256(b"h1"))
            .await
            .unwrap();
        assert_eq!(found.map(|c| c.id()), Some(cert.id()));
        assert!(store.list_pre_issued().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_canonical_hash_rejected() {
        let store = MemoryStore::new();
        let mut a = pre_issued();
        a.issue(issued_record("s1", "same")).unwrap();
        let mut b = pre_issued();
        b.issue(issued_record("s2", "same")).unwrap();

        store.save(&a).await.unwrap();
        let err = store.save(&b).await.unwrap_err();
        assert!(matches!(err, StorageError::Duplicate(_)));
    }

    #[tokio::test]
    async fn test_duplicate_serial_rejected() {
        let store = MemoryStore::new();
        let mut a = pre_issued();
        a.issue(issued_record("serial", "h1")).unwrap();
        let mut b = pre_issued();
        b.issue(issued_record("serial", "h2")).unwrap();

        store.save(&a).await.unwrap();
        assert!(matches!(
            store.save(&b).await,
            Err(StorageError::Duplicate(_))
        ));
    }

    #[tokio::test]
    async fn test_duplicate_pdf_hash_rejected() {
        let store = MemoryStore::new();
        let mut a = pre_issued();
        a.issue(issued_record("s1", "h1")).unwrap();
        a.set_pdf_hash(keccak256(b"pdf")).unwrap();
        let mut b = pre_issued();
        b.issue(issued_record("s2", "h2")).unwrap();
        b.set_pdf_hash(keccak256(b"pdf")).unwrap();

        store.save(&a).await.unwrap();
        assert!(matches!(
            store.save(&b).await,
            Err(StorageError::Duplicate(_))
        ));
        assert_eq!(
            store
                .find_by_pdf_hash(&keccak256(b"pdf"))
                .await
                .unwrap()
                .map(|c| c.id()),
            Some(a.id())
        );
    }

    #[tokio::test]
    async fn test_issued_record_not_replaced() {
        let store = MemoryStore::new();
        let original = pre_issued();
        store.save(&original).await.unwrap();

        let mut winner = original.clone();
        winner.issue(issued_record("s1", "h1")).unwrap();
        let mut loser = original.clone();
        loser.issue(issued_record("s2", "h2")).unwrap();

        store.save(&winner).await.unwrap();
        assert!(matches!(
            store.save(&loser).await,
            Err(StorageError::Duplicate(_))
        ));
        // A stale pre-issued copy cannot un-issue either
        assert!(store.save(&original).await.is_err());

        // Same canonical hash may be rewritten (audit, PDF hash)
        let mut audited = winner.clone();
        audited.audit();
        store.save(&audited).await.unwrap();
    }

    #[tokio::test]
    async fn test_stale_audit_cannot_undo_revocation() {
        let store = MemoryStore::new();
        let mut cert = pre_issued();
        cert.issue(issued_record("s1", "h1")).unwrap();
        store.save(&cert).await.unwrap();

        let mut revoker = store.find_by_id(cert.id()).await.unwrap().unwrap();
        let mut auditor = store.find_by_id(cert.id()).await.unwrap().unwrap();

        revoker.revoke().unwrap();
        store.save(&revoker).await.unwrap();

        auditor.audit();
        let err = store.save(&auditor).await.unwrap_err();
        assert!(matches!(err, StorageError::Stale(_)));

        let stored = store.find_by_id(cert.id()).await.unwrap().unwrap();
        assert!(stored.has_expired());
    }

    #[tokio::test]
    async fn test_concurrent_pdf_hash_keeps_first() {
        let store = MemoryStore::new();
        let mut cert = pre_issued();
        cert.issue(issued_record("s1", "h1")).unwrap();
        store.save(&cert).await.unwrap();

        let mut first = store.find_by_id(cert.id()).await.unwrap().unwrap();
        let mut second = store.find_by_id(cert.id()).await.unwrap().unwrap();
        first.set_pdf_hash(keccak256(b"pdf-a")).unwrap();
        second.set_pdf_hash(keccak256(b"pdf-b")).unwrap();

        store.save(&first).await.unwrap();
        let err = store.save(&second).await.unwrap_err();
        assert!(matches!(err, StorageError::Stale(_)));

        let stored = store.find_by_id(cert.id()).await.unwrap().unwrap();
        assert_eq!(
            stored.authenticity_proof().unwrap().pdf_hash(),
            Some(&keccak256(b"pdf-a"))
        );
    }

    #[tokio::test]
    async fn test_stale_revoke_cannot_drop_pdf_hash() {
        let store = MemoryStore::new();
        let mut cert = pre_issued();
        cert.issue(issued_record("s1", "h1")).unwrap();
        store.save(&cert).await.unwrap();

        let mut revoker = store.find_by_id(cert.id()).await.unwrap().unwrap();
        let mut attacher = store.find_by_id(cert.id()).await.unwrap().unwrap();
        attacher.set_pdf_hash(keccak256(b"pdf")).unwrap();
        store.save(&attacher).await.unwrap();

        revoker.revoke().unwrap();
        assert!(matches!(
            store.save(&revoker).await,
            Err(StorageError::Stale(_))
        ));
    }

    #[test]
    fn test_stale_maps_to_invalid_state() {
        let err: greencert_core::CertificateError = StorageError::Stale("x".into()).into();
        assert!(matches!(err, greencert_core::CertificateError::InvalidState(_)));
    }
}
