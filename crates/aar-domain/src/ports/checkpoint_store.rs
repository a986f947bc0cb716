//! Checkpoint Store port.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::JobCheckpoint;
use crate::error::Result;
use crate::value_objects::ProjectId;

/// Per-project checkpoint persistence. At most one active checkpoint per
/// project; concurrent upserts for the same project must be serialized
/// (optimistic concurrency on `updated_at`).
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Fetch the current checkpoint for a project, if any.
    async fn get(&self, project_id: ProjectId) -> Result<Option<JobCheckpoint>>;

    /// Upsert a checkpoint. Implementations must serialize concurrent
    /// upserts for the same project (e.g. an internal per-project lock).
    async fn upsert(&self, checkpoint: JobCheckpoint) -> Result<()>;

    /// List project IDs whose checkpoint is non-terminal and has fewer than
    /// `max_attempts` attempts recorded — candidates the Worker Loop may retry.
    async fn pending_retry(&self, max_attempts: u32) -> Result<Vec<ProjectId>>;

    /// Prune checkpoints last updated before `cutoff`.
    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64>;
}
