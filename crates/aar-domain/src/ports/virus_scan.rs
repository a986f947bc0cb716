//! Virus Scan port: an optional collaborator consulted during archive submission.

use async_trait::async_trait;

use crate::error::Result;

/// Outcome of scanning a stored blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanVerdict {
    /// No threat detected.
    Clean,
    /// A threat was detected; the submission must be rejected.
    Infected,
}

/// Scans a stored blob for known threats. Ingest invokes this only when a
/// scanner is configured — it is optional per `spec.md` §4.2.
#[async_trait]
pub trait VirusScanner: Send + Sync {
    /// Scan the blob at `key`.
    async fn scan(&self, key: &str) -> Result<ScanVerdict>;
}
