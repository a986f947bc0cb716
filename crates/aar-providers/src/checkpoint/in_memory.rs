//! In-memory [`CheckpointStore`], one entry per project guarded by per-row locking.

use chrono::{DateTime, Utc};
use dashmap::DashMap;

use async_trait::async_trait;

use aar_domain::entities::JobCheckpoint;
use aar_domain::error::Result;
use aar_domain::ports::CheckpointStore;
use aar_domain::value_objects::ProjectId;

/// `DashMap`-backed checkpoint store. Per-key entries serialize concurrent
/// upserts for the same project via the shard lock `DashMap` already holds
/// during `insert`.
#[derive(Default)]
pub struct InMemoryCheckpointStore {
    rows: DashMap<ProjectId, JobCheckpoint>,
}

impl InMemoryCheckpointStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CheckpointStore for InMemoryCheckpointStore {
    async fn get(&self, project_id: ProjectId) -> Result<Option<JobCheckpoint>> {
        Ok(self.rows.get(&project_id).map(|r| r.clone()))
    }

    async fn upsert(&self, checkpoint: JobCheckpoint) -> Result<()> {
        self.rows.insert(checkpoint.project_id, checkpoint);
        Ok(())
    }

    async fn pending_retry(&self, max_attempts: u32) -> Result<Vec<ProjectId>> {
        Ok(self
            .rows
            .iter()
            .filter(|r| !r.phase.is_terminal() && r.attempts < max_attempts)
            .map(|r| *r.key())
            .collect())
    }

    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let stale: Vec<ProjectId> = self
            .rows
            .iter()
            .filter(|r| r.updated_at < cutoff)
            .map(|r| *r.key())
            .collect();
        let count = stale.len() as u64;
        for key in stale {
            self.rows.remove(&key);
        }
        Ok(count)
    }
}
