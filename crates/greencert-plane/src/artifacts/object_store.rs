//! Object storage backends

use async_trait::async_trait;
use greencert_core::{CertificateError, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::info;

use super::ObjectStore;

/// MIME type served for a stored key, inferred from its extension
pub fn content_type_for_key(key: &str) -> &'static str {
    let ext = key
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpeg" => "image/jpeg",
        "jpg" => "image/jpg",
        "gif" => "image/gif",
        "svg" => "image/svg",
        "json" => "application/json",
        _ => "application/octet-stream",
    }
}

/// Keys are flat file names; anything that could escape the bucket is refused
fn validate_key(key: &str) -> Result<()> {
    let bad = key.is_empty()
        || key.contains('/')
        || key.contains('\\')
        || key.contains("..")
        || key.starts_with('.');
    if bad {
        return Err(CertificateError::Validation(format!(
            "invalid object key {:?}",
            key
        )));
    }
    Ok(())
}

#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    objects: RwLock<HashMap<String, (Vec<u8>, String)>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Content type recorded at upload
    pub fn content_type(&self, key: &str) -> Option<String> {
        let objects = self.objects.read().ok()?;
        objects.get(key).map(|(_, ct)| ct.clone())
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn upload(&self, name: &str, bytes: Vec<u8>, content_type: &str) -> Result<String> {
        validate_key(name)?;
        let mut objects = self
            .objects
            .write()
            .map_err(|_| CertificateError::ObjectStorage("object map lock poisoned".into()))?;
        objects.insert(name.to_string(), (bytes, content_type.to_string()));
        Ok(name.to_string())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        validate_key(key)?;
        let objects = self
            .objects
            .read()
            .map_err(|_| CertificateError::ObjectStorage("object map lock poisoned".into()))?;
        Ok(objects.get(key).map(|(bytes, _)| bytes.clone()))
    }
}

/// Objects stored as files in one directory
#[derive(Debug, Clone)]
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    /// Use `root`, creating it if needed
    pub async fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&root)
            .await
            .map_err(|e| CertificateError::ObjectStorage(format!("{}: {}", root.display(), e)))?;
        Ok(Self { root })
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn upload(&self, name: &str, bytes: Vec<u8>, content_type: &str) -> Result<String> {
        validate_key(name)?;
        let path = self.root.join(name);
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|e| CertificateError::ObjectStorage(format!("{}: {}", path.display(), e)))?;
        info!(key = %name, content_type = %content_type, size = bytes.len(), "Stored object");
        Ok(name.to_string())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        validate_key(key)?;
        let path = self.root.join(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CertificateError::ObjectStorage(format!(
                "{}: {}",
                path.display(),
                e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_inference() {
        assert_eq!(content_type_for_key("a.png"), "image/png");
        assert_eq!(content_type_for_key("a.JPG"), "image/jpg");
        assert_eq!(content_type_for_key("a.json"), "application/json");
        assert_eq!(content_type_for_key("a.bin"), "application/octet-stream");
        assert_eq!(content_type_for_key("noext"), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_memory_roundtrip() {
        let store = MemoryObjectStore::new();
        let key = store
            .upload("c1.json", b"{}".to_vec(), "application/json")
            .await
            .unwrap();
        assert_eq!(store.get(&key).await.unwrap(), Some(b"{}".to_vec()));
        assert_eq!(store.content_type(&key).as_deref(), Some("application/json"));
        assert_eq!(store.get("missing.json").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_fs_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsObjectStore::new(dir.path().join("qr")).await.unwrap();
        let key = store
            .upload("c1.json", b"payload".to_vec(), "application/json")
            .await
            .unwrap();
        assert_eq!(store.get(&key).await.unwrap(), Some(b"payload".to_vec()));
        assert_eq!(store.get("other.json").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_traversal_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsObjectStore::new(dir.path()).await.unwrap();
        assert!(store.get("../etc/passwd").await.is_err());
        assert!(store.upload("a/b.json", vec![], "x").await.is_err());
    }
}
