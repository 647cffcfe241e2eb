//! Raw entity records and their canonical snapshots
//!
//! Records keep the nested shape entities are registered with (`quantity`,
//! `origin`, `document`, `address`, `coordinates`, `auditors`). Snapshots
//! flatten them into the fields that participate in the canonical hash.
//! Fields outside the snapshot (descriptions, tags, contacts, metadata) are
//! accepted on intake and dropped from the snapshot.

use greencert_core::{
    CertificateError, CertifierSnapshot, EntityKind, Fixed6, ProducerSnapshot, ProductSnapshot,
    Result,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    fn validate(&self) -> std::result::Result<(), String> {
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(format!("latitude {} out of range", self.latitude));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(format!("longitude {} out of range", self.longitude));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    pub value: f64,
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Origin {
    pub country: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    pub coordinates: Coordinates,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub document_type: String,
    pub number: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub country: String,
    pub state: String,
    pub city: String,
    pub coordinates: Coordinates,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Auditor {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub quantity: Quantity,
    pub origin: Origin,
    #[serde(default)]
    pub lot_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProducerRecord {
    pub id: Uuid,
    pub name: String,
    pub document: Document,
    pub car_code: String,
    pub address: Address,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CertifierRecord {
    pub id: Uuid,
    pub name: String,
    pub document: Document,
    #[serde(default)]
    pub auditors: Vec<Auditor>,
}

fn invalid(entity: EntityKind, reason: impl Into<String>) -> CertificateError {
    CertificateError::InvalidSnapshot {
        entity,
        reason: reason.into(),
    }
}

fn fixed(entity: EntityKind, field: &str, value: f64) -> Result<Fixed6> {
    Fixed6::new(value).map_err(|_| invalid(entity, format!("{} is not a finite number", field)))
}

/// Decode a raw JSON record, rejecting missing or mistyped fields
pub fn parse_record<T: DeserializeOwned>(entity: EntityKind, raw: &Value) -> Result<T> {
    T::deserialize(raw).map_err(|e| invalid(entity, e.to_string()))
}

impl ProductRecord {
    pub fn snapshot(&self) -> Result<ProductSnapshot> {
        let kind = EntityKind::Product;
        self.origin
            .coordinates
            .validate()
            .map_err(|e| invalid(kind, e))?;
        if self.quantity.value < 0.0 {
            return Err(invalid(kind, "quantity must not be negative"));
        }

        Ok(ProductSnapshot {
            id: self.id.to_string(),
            name: self.name.clone(),
            category: self.category.clone(),
            quantity_value: fixed(kind, "quantity.value", self.quantity.value)?,
            quantity_unit: self.quantity.unit.clone(),
            origin_country: self.origin.country.clone(),
            origin_state: self.origin.state.clone(),
            origin_city: self.origin.city.clone(),
            origin_latitude: fixed(kind, "origin.latitude", self.origin.coordinates.latitude)?,
            origin_longitude: fixed(kind, "origin.longitude", self.origin.coordinates.longitude)?,
            lot_number: self.lot_number.clone(),
        })
    }
}

impl ProducerRecord {
    pub fn snapshot(&self) -> Result<ProducerSnapshot> {
        let kind = EntityKind::Producer;
        self.address
            .coordinates
            .validate()
            .map_err(|e| invalid(kind, e))?;

        Ok(ProducerSnapshot {
            id: self.id.to_string(),
            name: self.name.clone(),
            document_type: self.document.document_type.clone(),
            document_number: self.document.number.clone(),
            car_code: self.car_code.clone(),
            address_country: self.address.country.clone(),
            address_state: self.address.state.clone(),
            address_city: self.address.city.clone(),
            address_latitude: fixed(kind, "address.latitude", self.address.coordinates.latitude)?,
            address_longitude: fixed(
                kind,
                "address.longitude",
                self.address.coordinates.longitude,
            )?,
        })
    }
}

impl CertifierRecord {
    pub fn snapshot(&self) -> Result<CertifierSnapshot> {
        Ok(CertifierSnapshot {
            id: self.id.to_string(),
            name: self.name.clone(),
            document_type: self.document.document_type.clone(),
            document_number: self.document.number.clone(),
            auditors_names: self.auditors.iter().map(|a| a.name.clone()).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw_product(id: Uuid) -> Value {
        json!({
            "id": id,
            "name": "Cocoa beans",
            "category": "agriculture",
            "quantity": {"value": 1200, "unit": "kg"},
            "origin": {
                "country": "BR",
                "state": "PA",
                "coordinates": {"latitude": -1.455833, "longitude": -48.503887}
            }
        })
    }

    #[test]
    fn test_product_snapshot_flattens() {
        let id = Uuid::new_v4();
        let record: ProductRecord = parse_record(EntityKind::Product, &raw_product(id)).unwrap();
        let snapshot = record.snapshot().unwrap();
        assert_eq!(snapshot.id, id.to_string());
        assert_eq!(snapshot.quantity_value.value(), 1200.0);
        assert_eq!(snapshot.origin_city, None);
        assert_eq!(snapshot.lot_number, None);
    }

    #[test]
    fn test_missing_field_rejected() {
        let mut raw = raw_product(Uuid::new_v4());
        raw.as_object_mut().unwrap().remove("category");
        let err = parse_record::<ProductRecord>(EntityKind::Product, &raw).unwrap_err();
        assert!(matches!(
            err,
            CertificateError::InvalidSnapshot {
                entity: EntityKind::Product,
                ..
            }
        ));
    }

    #[test]
    fn test_mistyped_field_rejected() {
        let mut raw = raw_product(Uuid::new_v4());
        raw["quantity"]["value"] = json!("1200");
        assert!(parse_record::<ProductRecord>(EntityKind::Product, &raw).is_err());
    }

    #[test]
    fn test_out_of_range_coordinates_rejected() {
        let mut raw = raw_product(Uuid::new_v4());
        raw["origin"]["coordinates"]["latitude"] = json!(123.0);
        let record: ProductRecord = parse_record(EntityKind::Product, &raw).unwrap();
        assert!(record.snapshot().is_err());
    }

    #[test]
    fn test_certifier_keeps_auditor_names_only() {
        let raw = json!({
            "id": Uuid::new_v4(),
            "name": "Green Audit Ltd",
            "document": {"document_type": "CNPJ", "number": "00.000.000/0001-00"},
            "auditors": [
                {
                    "id": Uuid::new_v4(),
                    "name": "Ana",
                    "document": {"document_type": "CPF", "number": "111.222.333-44"}
                },
                {"id": Uuid::new_v4(), "name": "Rui"}
            ]
        });
        let record: CertifierRecord = parse_record(EntityKind::Certifier, &raw).unwrap();
        let snapshot = record.snapshot().unwrap();
        assert_eq!(snapshot.auditors_names, vec!["Ana", "Rui"]);

        let canonical = serde_json::to_value(&snapshot).unwrap();
        let auditors = canonical["auditors_names"].as_array().unwrap();
        assert!(auditors.iter().all(Value::is_string));
    }

    #[test]
    fn test_extra_product_fields_dropped_from_snapshot() {
        let mut raw = raw_product(Uuid::new_v4());
        let extra = raw.as_object_mut().unwrap();
        extra.insert("description".into(), json!("Fermented and sun dried"));
        extra.insert("carbon_emission".into(), json!(3.2));
        extra.insert("metadata".into(), json!({"harvest": "2024"}));
        extra.insert("tags".into(), json!(["organic", "fair-trade"]));

        let record: ProductRecord = parse_record(EntityKind::Product, &raw).unwrap();
        let with_extras = record.snapshot().unwrap();

        let plain: ProductRecord = parse_record(
            EntityKind::Product,
            &json!({
                "id": record.id,
                "name": "Cocoa beans",
                "category": "agriculture",
                "quantity": {"value": 1200, "unit": "kg"},
                "origin": {
                    "country": "BR",
                    "state": "PA",
                    "coordinates": {"latitude": -1.455833, "longitude": -48.503887}
                }
            }),
        )
        .unwrap();
        assert_eq!(with_extras, plain.snapshot().unwrap());
    }

    #[test]
    fn test_extra_producer_fields_accepted() {
        let raw = json!({
            "id": Uuid::new_v4(),
            "name": "Fazenda Boa Vista",
            "document": {"document_type": "CPF", "number": "123.456.789-00"},
            "car_code": "PA-1500800-XXXX",
            "address": {
                "country": "BR",
                "state": "PA",
                "city": "Belem",
                "coordinates": {"latitude": -1.45, "longitude": -48.5}
            },
            "contact": {"email": "farm@example.org", "phone": "+55 91 0000-0000"},
            "metadata": {"cooperative": true}
        });
        let record: ProducerRecord = parse_record(EntityKind::Producer, &raw).unwrap();
        assert_eq!(record.snapshot().unwrap().car_code, "PA-1500800-XXXX");
    }

    #[test]
    fn test_auditor_without_name_rejected() {
        let raw = json!({
            "id": Uuid::new_v4(),
            "name": "Green Audit Ltd",
            "document": {"document_type": "CNPJ", "number": "00.000.000/0001-00"},
            "auditors": [{"id": Uuid::new_v4()}]
        });
        let err = parse_record::<CertifierRecord>(EntityKind::Certifier, &raw).unwrap_err();
        assert!(matches!(
            err,
            CertificateError::InvalidSnapshot {
                entity: EntityKind::Certifier,
                ..
            }
        ));
    }
}
