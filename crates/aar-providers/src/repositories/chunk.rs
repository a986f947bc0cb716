//! In-memory [`ChunkRepository`].

use async_trait::async_trait;
use dashmap::DashMap;

use aar_domain::entities::Chunk;
use aar_domain::error::Result;
use aar_domain::ports::ChunkRepository;
use aar_domain::value_objects::{ChunkId, FileRecordId, ProjectId};

/// `DashMap`-backed chunk store, keyed by content-hash chunk ID.
#[derive(Default)]
pub struct InMemoryChunkRepository {
    rows: DashMap<ChunkId, Chunk>,
}

impl InMemoryChunkRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ChunkRepository for InMemoryChunkRepository {
    async fn upsert_many(&self, chunks: &[Chunk]) -> Result<()> {
        for chunk in chunks {
            self.rows.insert(chunk.id, chunk.clone());
        }
        Ok(())
    }

    async fn list_for_file(&self, file_id: FileRecordId) -> Result<Vec<Chunk>> {
        Ok(self
            .rows
            .iter()
            .filter(|r| r.file_id == file_id)
            .map(|r| r.clone())
            .collect())
    }

    async fn delete_for_project(&self, project_id: ProjectId) -> Result<()> {
        self.rows.retain(|_, v| v.project_id != project_id);
        Ok(())
    }
}
