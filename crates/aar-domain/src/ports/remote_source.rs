//! Remote Source Fetcher port: the git-shallow-clone leg of Ingest's
//! remote-URL submission shape.

use async_trait::async_trait;

use crate::error::Result;

/// Materializes a remote repository's working tree on local disk.
#[async_trait]
pub trait RemoteSourceFetcher: Send + Sync {
    /// Shallow-clone `url` into `dest_dir`, discarding history, and return
    /// the number of files materialized. `url` has already passed the
    /// host-allowlist check by the time this is called.
    async fn shallow_clone(&self, url: &str, dest_dir: &std::path::Path) -> Result<u64>;
}
