//! Local-filesystem-backed [`BlobStore`].

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};

use aar_domain::error::{Error, Result};
use aar_domain::ports::{BlobMetadata, BlobStore};

/// Stores blobs as plain files under a base directory, keyed by a slash-separated key.
pub struct LocalBlobStore {
    base_dir: PathBuf,
}

impl LocalBlobStore {
    /// Create a store rooted at `base_dir`, creating it if missing.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.base_dir.join(key)
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, key: &str, reader: &mut (dyn AsyncRead + Send + Unpin)) -> Result<u64> {
        let dest = self.path_for(key);
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::io_with_source("creating blob parent directory", e))?;
        }
        let mut file = tokio::fs::File::create(&dest)
            .await
            .map_err(|e| Error::io_with_source("creating blob file", e))?;
        let mut buf = Vec::new();
        reader
            .read_to_end(&mut buf)
            .await
            .map_err(|e| Error::io_with_source("reading blob source", e))?;
        file.write_all(&buf)
            .await
            .map_err(|e| Error::io_with_source("writing blob file", e))?;
        Ok(buf.len() as u64)
    }

    async fn get(&self, key: &str) -> Result<Box<dyn AsyncRead + Send + Unpin>> {
        let file = tokio::fs::File::open(self.path_for(key))
            .await
            .map_err(|e| Error::not_found(format!("blob '{key}' not found: {e}")))?;
        Ok(Box::new(file))
    }

    async fn list(&self, prefix: &str) -> Result<Vec<BlobMetadata>> {
        let root = self.path_for(prefix);
        if !root.exists() {
            return Ok(Vec::new());
        }
        let mut out = Vec::new();
        collect_entries(&self.base_dir, &root, &mut out).await?;
        Ok(out)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::io_with_source("deleting blob file", e)),
        }
    }
}

fn collect_entries<'a>(
    base_dir: &'a Path,
    dir: &'a Path,
    out: &'a mut Vec<BlobMetadata>,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<()>> + Send + 'a>> {
    Box::pin(async move {
        if dir.is_file() {
            let meta = tokio::fs::metadata(dir)
                .await
                .map_err(|e| Error::io_with_source("reading blob metadata", e))?;
            let key = dir
                .strip_prefix(base_dir)
                .unwrap_or(dir)
                .to_string_lossy()
                .replace('\\', "/");
            out.push(BlobMetadata {
                key,
                size: meta.len(),
            });
            return Ok(());
        }
        let mut entries = tokio::fs::read_dir(dir)
            .await
            .map_err(|e| Error::io_with_source("listing blob directory", e))?;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| Error::io_with_source("iterating blob directory", e))?
        {
            let path = entry.path();
            if path.is_dir() {
                collect_entries(base_dir, &path, out).await?;
            } else {
                let meta = entry
                    .metadata()
                    .await
                    .map_err(|e| Error::io_with_source("reading blob metadata", e))?;
                let key = path
                    .strip_prefix(base_dir)
                    .unwrap_or(&path)
                    .to_string_lossy()
                    .replace('\\', "/");
                out.push(BlobMetadata {
                    key,
                    size: meta.len(),
                });
            }
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[tokio::test]
    async fn put_get_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path());
        let mut reader = Cursor::new(b"hello world".to_vec());
        let size = store.put("owner1/archive.zip", &mut reader).await.unwrap();
        assert_eq!(size, 11);

        let mut out = store.get("owner1/archive.zip").await.unwrap();
        let mut buf = Vec::new();
        out.read_to_end(&mut buf).await.unwrap();
        assert_eq!(buf, b"hello world");
    }

    #[tokio::test]
    async fn total_size_sums_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path());
        store
            .put("owner1/a.zip", &mut Cursor::new(vec![0_u8; 10]))
            .await
            .unwrap();
        store
            .put("owner1/b.zip", &mut Cursor::new(vec![0_u8; 5]))
            .await
            .unwrap();
        assert_eq!(store.total_size("owner1").await.unwrap(), 15);
    }

    #[tokio::test]
    async fn deleting_missing_key_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalBlobStore::new(dir.path());
        store.delete("nope").await.unwrap();
    }
}
