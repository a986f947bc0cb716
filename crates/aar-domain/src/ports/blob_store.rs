//! Blob Store port: content/byte-addressed object storage.
//!
//! Two implementations share this contract: a local-filesystem store and a
//! cloud object-store adapter (see `aar-providers`).

use async_trait::async_trait;
use tokio::io::AsyncRead;

use crate::error::Result;

/// Metadata about a stored object.
#[derive(Debug, Clone)]
pub struct BlobMetadata {
    /// Storage key.
    pub key: String,
    /// Size in bytes.
    pub size: u64,
}

/// Byte-addressed object storage with upload/download/list/delete.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Upload a reader's contents under `key`, returning the stored size.
    async fn put(&self, key: &str, reader: &mut (dyn AsyncRead + Send + Unpin)) -> Result<u64>;

    /// Open a reader over the object stored at `key`.
    async fn get(&self, key: &str) -> Result<Box<dyn AsyncRead + Send + Unpin>>;

    /// List objects whose key starts with `prefix`.
    async fn list(&self, prefix: &str) -> Result<Vec<BlobMetadata>>;

    /// Delete the object at `key`. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Sum of stored sizes for all objects under `prefix` (used for
    /// per-owner quota enforcement during ingestion).
    async fn total_size(&self, prefix: &str) -> Result<u64> {
        Ok(self.list(prefix).await?.iter().map(|m| m.size).sum())
    }
}
