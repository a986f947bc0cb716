//! Code Metrics port: per-file complexity collaborator used by the Agent Runtime.

use async_trait::async_trait;

/// Heuristic complexity metrics for a single file's contents.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileMetrics {
    /// Approximate cyclomatic complexity (branch-point count + 1).
    pub cyclomatic_complexity: u32,
    /// Non-blank line count.
    pub lines_of_code: u32,
    /// Approximate function/method count.
    pub method_count: u32,
}

/// Computes [`FileMetrics`] for file contents. Pure and synchronous in
/// spirit, exposed as async to match the trait-object convention used by
/// every other port in this crate.
#[async_trait]
pub trait CodeMetricsService: Send + Sync {
    /// Compute metrics for `contents`, given its file extension (without the dot).
    async fn metrics_for(&self, extension: &str, contents: &str) -> FileMetrics;
}
