//! In-memory [`FileRecordRepository`].

use async_trait::async_trait;
use dashmap::DashMap;

use aar_domain::entities::FileRecord;
use aar_domain::error::{Error, Result};
use aar_domain::ports::FileRecordRepository;
use aar_domain::value_objects::{FileRecordId, ProjectId};

/// `DashMap`-backed file record store, keyed by record ID with a secondary
/// per-project index for listing.
#[derive(Default)]
pub struct InMemoryFileRecordRepository {
    rows: DashMap<FileRecordId, FileRecord>,
}

impl InMemoryFileRecordRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FileRecordRepository for InMemoryFileRecordRepository {
    async fn create_many(&self, records: &[FileRecord]) -> Result<()> {
        for record in records {
            self.rows.insert(record.id, record.clone());
        }
        Ok(())
    }

    async fn list_for_project(&self, project_id: ProjectId) -> Result<Vec<FileRecord>> {
        Ok(self
            .rows
            .iter()
            .filter(|r| r.project_id == project_id)
            .map(|r| r.clone())
            .collect())
    }

    async fn get(&self, id: FileRecordId) -> Result<FileRecord> {
        self.rows
            .get(&id)
            .map(|r| r.clone())
            .ok_or_else(|| Error::not_found(format!("file record {id}")))
    }

    async fn delete_for_project(&self, project_id: ProjectId) -> Result<()> {
        self.rows.retain(|_, v| v.project_id != project_id);
        Ok(())
    }
}
