//! Canonical form of an issued certificate
//!
//! The canonical form is the single serialization fed to the hash service.
//! Objects are emitted with keys in lexicographic order and no whitespace,
//! strings use JSON escaping, and every float is rendered with exactly six
//! fractional digits. Entity snapshots are flattened and minimized so that
//! only fields relevant to authenticity participate in the digest.
//!
//! Nothing here is persisted: a [`CanonicalCertificate`] is built fresh for
//! every hash computation.

use crate::error::{CertificateError, Result};
use crate::types::{Norm, SustainabilityCriteria};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Fractional digits kept for every numeric field
pub const FLOAT_PRECISION: usize = 6;

/// A float coerced to the fixed precision used in the canonical form
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Fixed6(f64);

impl Fixed6 {
    pub fn new(value: f64) -> Result<Self> {
        if !value.is_finite() {
            return Err(CertificateError::Canonicalization(format!(
                "non-finite number {} cannot be canonicalized",
                value
            )));
        }
        let scale = 10f64.powi(FLOAT_PRECISION as i32);
        let rounded = (value * scale).round() / scale;
        // Normalize -0
        Ok(Self(if rounded == 0.0 { 0.0 } else { rounded }))
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Fixed6 {
    type Error = CertificateError;

    fn try_from(value: f64) -> Result<Self> {
        Fixed6::new(value)
    }
}

impl From<Fixed6> for f64 {
    fn from(value: Fixed6) -> Self {
        value.0
    }
}

/// Render a timestamp the way it appears in the canonical form
///
/// RFC 3339, microsecond precision, explicit `+00:00` offset.
pub fn canonical_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, false)
}

/// Flattened product view captured at issuance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub id: String,
    pub name: String,
    pub category: String,
    pub quantity_value: Fixed6,
    pub quantity_unit: String,
    pub origin_country: String,
    pub origin_state: Option<String>,
    pub origin_city: Option<String>,
    pub origin_latitude: Fixed6,
    pub origin_longitude: Fixed6,
    pub lot_number: Option<String>,
}

/// Flattened producer view captured at issuance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProducerSnapshot {
    pub id: String,
    pub name: String,
    pub document_type: String,
    pub document_number: String,
    pub car_code: String,
    pub address_country: String,
    pub address_state: String,
    pub address_city: String,
    pub address_latitude: Fixed6,
    pub address_longitude: Fixed6,
}

/// Certifier view; only auditor names are kept
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CertifierSnapshot {
    pub id: String,
    pub name: String,
    pub document_type: String,
    pub document_number: String,
    pub auditors_names: Vec<String>,
}

/// The hashed representation of an issued certificate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalCertificate {
    pub id: String,
    pub version: String,
    pub product: ProductSnapshot,
    pub producer: ProducerSnapshot,
    pub certifier: CertifierSnapshot,
    pub norms_complied: Vec<Norm>,
    pub sustainability_criteria: Vec<SustainabilityCriteria>,
    pub issued_at: String,
    pub valid_until: String,
    pub serial_code: String,
}

impl CanonicalCertificate {
    /// Byte-stable text of this certificate
    pub fn to_canonical_json(&self) -> Result<String> {
        to_canonical_json(self)
    }
}

/// Hash input for a certificate PDF: `{"pdf_file": <base64 of the bytes>}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PdfPayload {
    pub pdf_file: String,
}

impl PdfPayload {
    pub fn from_bytes(pdf: &[u8]) -> Self {
        use base64::Engine;
        Self {
            pdf_file: base64::engine::general_purpose::STANDARD.encode(pdf),
        }
    }
}

/// Serialize any value into canonical JSON text
pub fn to_canonical_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let value = serde_json::to_value(value)?;
    let mut out = String::new();
    write_value(&value, &mut out)?;
    Ok(out)
}

fn write_value(value: &Value, out: &mut String) -> Result<()> {
    match value {
        Value::Object(map) => {
            let mut pairs: Vec<_> = map.iter().collect();
            pairs.sort_by(|(a, _), (b, _)| a.as_str().cmp(b.as_str()));

            out.push('{');
            for (idx, (k, v)) in pairs.into_iter().enumerate() {
                if idx > 0 {
                    out.push(',');
                }
                write_string(k, out)?;
                out.push(':');
                write_value(v, out)?;
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (idx, v) in items.iter().enumerate() {
                if idx > 0 {
                    out.push(',');
                }
                write_value(v, out)?;
            }
            out.push(']');
        }
        Value::String(s) => write_string(s, out)?,
        Value::Number(n) => write_number(n, out)?,
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Null => out.push_str("null"),
    }
    Ok(())
}

fn write_string(s: &str, out: &mut String) -> Result<()> {
    out.push_str(&serde_json::to_string(s)?);
    Ok(())
}

fn write_number(n: &serde_json::Number, out: &mut String) -> Result<()> {
    if let Some(i) = n.as_i64() {
        out.push_str(&i.to_string());
        return Ok(());
    }
    if let Some(u) = n.as_u64() {
        out.push_str(&u.to_string());
        return Ok(());
    }
    match n.as_f64() {
        Some(f) => {
            let fixed = Fixed6::new(f)?;
            out.push_str(&format!("{:.*}", FLOAT_PRECISION, fixed.value()));
            Ok(())
        }
        None => Err(CertificateError::Canonicalization(
            "unsupported JSON number".into(),
        )),
    }
}
