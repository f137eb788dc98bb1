//! External integration seams: logo blob storage and the datasource
//! metadata catalog.
//!
//! Both are traits so deployments can plug real backends (object storage,
//! plugin registries) behind the service facade; the in-memory
//! implementations here back tests and single-node setups.

use std::collections::HashMap;
use std::sync::Arc;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Error from the blob backend.
#[derive(Debug, thiserror::Error)]
pub enum BlobError {
    #[error("blob not found: {0}")]
    NotFound(String),

    #[error("blob backend error: {0}")]
    Backend(String),
}

pub type BlobResult<T> = Result<T, BlobError>;

/// Content-addressed-ish storage for organization logos. Returns an opaque
/// reference the registry records on the organization.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store the bytes, returning a reference usable with [`delete`] and
    /// whatever serving layer fronts the store.
    ///
    /// [`delete`]: BlobStore::delete
    async fn store(&self, bytes: Vec<u8>) -> BlobResult<String>;

    /// Delete a previously stored blob. Deleting an unknown reference is an
    /// error so callers can distinguish cleanup bugs from double deletes.
    async fn delete(&self, blob_ref: &str) -> BlobResult<()>;
}

/// In-memory blob store keyed by generated UUID references.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored blobs, for tests.
    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn store(&self, bytes: Vec<u8>) -> BlobResult<String> {
        let blob_ref = Uuid::now_v7().to_string();
        self.blobs.write().await.insert(blob_ref.clone(), bytes);
        Ok(blob_ref)
    }

    async fn delete(&self, blob_ref: &str) -> BlobResult<()> {
        self.blobs
            .write()
            .await
            .remove(blob_ref)
            .map(|_| ())
            .ok_or_else(|| BlobError::NotFound(blob_ref.to_string()))
    }
}

/// One supported datasource type, as the client's connection picker shows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasourceMetaInfo {
    #[serde(rename = "type")]
    pub datasource_type: String,
    pub display_name: String,
}

impl DatasourceMetaInfo {
    pub fn new(datasource_type: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            datasource_type: datasource_type.into(),
            display_name: display_name.into(),
        }
    }
}

/// Source of the supported-datasource list. The set is
/// deployment-determined, not per organization.
pub trait DatasourceMetaCatalog: Send + Sync {
    fn list_supported_datasource_types(&self) -> Vec<DatasourceMetaInfo>;
}

/// Fixed catalog configured at construction.
#[derive(Debug, Clone)]
pub struct StaticDatasourceCatalog {
    entries: Vec<DatasourceMetaInfo>,
}

impl StaticDatasourceCatalog {
    pub fn new(entries: Vec<DatasourceMetaInfo>) -> Self {
        Self { entries }
    }
}

impl Default for StaticDatasourceCatalog {
    fn default() -> Self {
        Self::new(vec![
            DatasourceMetaInfo::new("postgres", "PostgreSQL"),
            DatasourceMetaInfo::new("mysql", "MySQL"),
            DatasourceMetaInfo::new("mongodb", "MongoDB"),
            DatasourceMetaInfo::new("restapi", "REST API"),
        ])
    }
}

impl DatasourceMetaCatalog for StaticDatasourceCatalog {
    fn list_supported_datasource_types(&self) -> Vec<DatasourceMetaInfo> {
        self.entries.clone()
    }
}

/// Shareable catalog handle.
pub type SharedCatalog = Arc<dyn DatasourceMetaCatalog>;

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_blob_store_round_trip() {
        let store = MemoryBlobStore::new();
        let blob_ref = store.store(vec![1, 2, 3]).await.unwrap();
        assert_eq!(store.len().await, 1);

        store.delete(&blob_ref).await.unwrap();
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn test_blob_delete_unknown_ref() {
        let store = MemoryBlobStore::new();
        let err = store.delete("missing").await.unwrap_err();
        assert!(matches!(err, BlobError::NotFound(_)));
    }

    #[test]
    fn test_default_catalog_entries() {
        let catalog = StaticDatasourceCatalog::default();
        let types = catalog.list_supported_datasource_types();
        assert!(types.iter().any(|t| t.datasource_type == "postgres"));
        assert!(types.iter().any(|t| t.datasource_type == "restapi"));
    }
}
