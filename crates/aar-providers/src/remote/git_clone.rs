//! [`RemoteSourceFetcher`] backed by `git2`, shallow-cloning and discarding history.

use async_trait::async_trait;
use walkdir::WalkDir;

use aar_domain::error::{Error, Result};
use aar_domain::ports::RemoteSourceFetcher;

/// Clones via `libgit2` with depth 1, then drops the `.git` directory so
/// only the worktree remains — "history discarded after clone" per `spec.md` §4.2.
pub struct GitShallowCloneFetcher;

impl GitShallowCloneFetcher {
    /// Construct the fetcher.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for GitShallowCloneFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RemoteSourceFetcher for GitShallowCloneFetcher {
    async fn shallow_clone(&self, url: &str, dest_dir: &std::path::Path) -> Result<u64> {
        let url = url.to_string();
        let dest = dest_dir.to_path_buf();
        tokio::task::spawn_blocking(move || clone_blocking(&url, &dest))
            .await
            .map_err(|e| Error::internal(format!("shallow clone task panicked: {e}")))?
    }
}

fn clone_blocking(url: &str, dest: &std::path::Path) -> Result<u64> {
    let mut fetch_options = git2::FetchOptions::new();
    fetch_options.depth(1);
    git2::build::RepoBuilder::new()
        .fetch_options(fetch_options)
        .clone(url, dest)
        .map_err(|e| Error::fatal_with_source("shallow clone failed", e))?;

    let git_dir = dest.join(".git");
    if git_dir.exists() {
        std::fs::remove_dir_all(&git_dir)
            .map_err(|e| Error::io_with_source("removing .git after shallow clone", e))?;
    }

    let count = WalkDir::new(dest)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| e.file_type().is_file())
        .count();
    Ok(count as u64)
}
