//! In-memory [`ReportRepository`].

use async_trait::async_trait;
use dashmap::DashMap;

use aar_domain::entities::Report;
use aar_domain::error::Result;
use aar_domain::ports::ReportRepository;
use aar_domain::value_objects::ProjectId;

/// `DashMap`-backed report store, one row per project (a new report replaces the prior one).
#[derive(Default)]
pub struct InMemoryReportRepository {
    rows: DashMap<ProjectId, Report>,
}

impl InMemoryReportRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReportRepository for InMemoryReportRepository {
    async fn create(&self, report: &Report) -> Result<()> {
        self.rows.insert(report.project_id, report.clone());
        Ok(())
    }

    async fn get_for_project(&self, project_id: ProjectId) -> Result<Option<Report>> {
        Ok(self.rows.get(&project_id).map(|r| r.clone()))
    }

    async fn delete_for_project(&self, project_id: ProjectId) -> Result<()> {
        self.rows.remove(&project_id);
        Ok(())
    }
}
