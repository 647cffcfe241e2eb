//! QR payloads
//!
//! The payload binds a certificate id to its canonical hash and the public
//! verification URL. Pixel rendering is left to an external renderer; the
//! built-in renderer ships the payload itself as canonical JSON.

use greencert_core::{to_canonical_json, Digest, Result};
use serde::Serialize;
use uuid::Uuid;

use super::QrRenderer;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QrPayload {
    pub certificate_id: Uuid,
    pub canonical_hash: Digest,
    pub verify_url: String,
}

impl QrPayload {
    /// `verify_url` is `<base>/<certificate_id>`
    pub fn new(certificate_id: Uuid, canonical_hash: Digest, verify_base: &str) -> Self {
        Self {
            certificate_id,
            canonical_hash,
            verify_url: format!("{}/{}", verify_base.trim_end_matches('/'), certificate_id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedQr {
    pub bytes: Vec<u8>,
    pub content_type: String,
    /// File extension matching `content_type`
    pub extension: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PayloadQrRenderer;

impl QrRenderer for PayloadQrRenderer {
    fn render(&self, payload: &QrPayload) -> Result<RenderedQr> {
        Ok(RenderedQr {
            bytes: to_canonical_json(payload)?.into_bytes(),
            content_type: "application/json".into(),
            extension: "json".into(),
        })
    }
}
