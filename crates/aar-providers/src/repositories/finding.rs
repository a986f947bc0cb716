//! In-memory [`FindingRepository`].

use async_trait::async_trait;
use dashmap::DashMap;

use aar_domain::entities::Finding;
use aar_domain::error::{Error, Result};
use aar_domain::ports::FindingRepository;
use aar_domain::value_objects::{FindingId, ProjectId, ReportId};

/// `DashMap`-backed finding store.
#[derive(Default)]
pub struct InMemoryFindingRepository {
    rows: DashMap<FindingId, Finding>,
}

impl InMemoryFindingRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FindingRepository for InMemoryFindingRepository {
    async fn create_many(&self, findings: &[Finding]) -> Result<()> {
        for finding in findings {
            self.rows.insert(finding.id, finding.clone());
        }
        Ok(())
    }

    async fn list_for_report(&self, report_id: ReportId) -> Result<Vec<Finding>> {
        Ok(self
            .rows
            .iter()
            .filter(|r| r.report_id == Some(report_id))
            .map(|r| r.clone())
            .collect())
    }

    async fn get(&self, id: FindingId) -> Result<Finding> {
        self.rows
            .get(&id)
            .map(|r| r.clone())
            .ok_or_else(|| Error::not_found(format!("finding {id}")))
    }

    async fn delete_for_project(&self, project_id: ProjectId) -> Result<()> {
        self.rows.retain(|_, v| v.project_id != project_id);
        Ok(())
    }
}
