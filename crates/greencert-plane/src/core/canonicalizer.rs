//! Canonicalization service
//!
//! Builds the canonical certificate from the aggregate plus fresh snapshots
//! of its product, producer and certifier. The three lookups run
//! concurrently and all of them must succeed.

use chrono::{DateTime, Utc};
use greencert_core::{
    canonical_timestamp, CanonicalCertificate, Certificate, CertificateError, CertifierSnapshot,
    EntityKind, ProducerSnapshot, ProductSnapshot, Result,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::directory::EntityLookup;

#[derive(Debug, Clone)]
pub struct Canonicalizer {
    products: Arc<dyn EntityLookup<ProductSnapshot>>,
    producers: Arc<dyn EntityLookup<ProducerSnapshot>>,
    certifiers: Arc<dyn EntityLookup<CertifierSnapshot>>,
}

fn required<S>(found: Option<S>, entity: EntityKind, id: Uuid) -> Result<S> {
    found.ok_or_else(|| CertificateError::ReferenceNotFound {
        entity,
        id: id.to_string(),
    })
}

impl Canonicalizer {
    pub fn new(
        products: Arc<dyn EntityLookup<ProductSnapshot>>,
        producers: Arc<dyn EntityLookup<ProducerSnapshot>>,
        certifiers: Arc<dyn EntityLookup<CertifierSnapshot>>,
    ) -> Self {
        Self {
            products,
            producers,
            certifiers,
        }
    }

    pub async fn build_canonical(
        &self,
        certificate: &Certificate,
        issued_at: DateTime<Utc>,
        valid_until: DateTime<Utc>,
        serial_code: &str,
    ) -> Result<CanonicalCertificate> {
        let (product, producer, certifier) = futures::try_join!(
            self.products.find_canonical_by_id(certificate.product_id()),
            self.producers.find_canonical_by_id(certificate.producer_id()),
            self.certifiers.find_canonical_by_id(certificate.certifier_id()),
        )?;

        Ok(CanonicalCertificate {
            id: certificate.id().to_string(),
            version: certificate.version().to_string(),
            product: required(product, EntityKind::Product, certificate.product_id())?,
            producer: required(producer, EntityKind::Producer, certificate.producer_id())?,
            certifier: required(certifier, EntityKind::Certifier, certificate.certifier_id())?,
            norms_complied: certificate.norms_complied().to_vec(),
            sustainability_criteria: certificate.sustainability_criteria().to_vec(),
            issued_at: canonical_timestamp(&issued_at),
            valid_until: canonical_timestamp(&valid_until),
            serial_code: serial_code.to_string(),
        })
    }

    /// Registration-time check that every referenced entity exists
    pub async fn ensure_references_exist(
        &self,
        product_id: Uuid,
        producer_id: Uuid,
        certifier_id: Uuid,
    ) -> Result<()> {
        let (product, producer, certifier) = futures::try_join!(
            self.products.exists(product_id),
            self.producers.exists(producer_id),
            self.certifiers.exists(certifier_id),
        )?;

        let missing = [
            (product, EntityKind::Product, product_id),
            (producer, EntityKind::Producer, producer_id),
            (certifier, EntityKind::Certifier, certifier_id),
        ];
        match missing.into_iter().find(|(found, _, _)| !found) {
            Some((_, entity, id)) => Err(CertificateError::NotFound {
                entity,
                id: id.to_string(),
            }),
            None => Ok(()),
        }
    }
}
