//! Issuance artifacts: object storage, QR rendering and serial codes

pub mod object_store;
pub mod qr;
pub mod serial;

pub use object_store::{content_type_for_key, FsObjectStore, MemoryObjectStore};
pub use qr::{PayloadQrRenderer, QrPayload, RenderedQr};
pub use serial::UuidSerialCodes;

use async_trait::async_trait;
use greencert_core::Result;
use std::fmt::Debug;

/// Blob storage for QR artifacts
#[async_trait]
pub trait ObjectStore: Send + Sync + Debug {
    /// Store `bytes` under `name`; returns the key to retrieve them with
    async fn upload(&self, name: &str, bytes: Vec<u8>, content_type: &str) -> Result<String>;

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;
}

/// Renders the QR payload into an image (or any transportable encoding)
pub trait QrRenderer: Send + Sync + Debug {
    fn render(&self, payload: &QrPayload) -> Result<RenderedQr>;
}

/// Source of globally unique serial codes
pub trait SerialCodeGenerator: Send + Sync + Debug {
    fn next_serial(&self) -> String;
}
