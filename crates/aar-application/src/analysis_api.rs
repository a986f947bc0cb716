//! `AnalysisApi`: the Rust-level contract `spec.md` §6 describes as a
//! request API. No HTTP transport, routing, or auth is implemented here — an
//! outer layer would adapt this trait to whatever protocol it needs.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use aar_domain::entities::{FileRecord, JobEnvelope, Phase, Project, ProjectStatus, Report};
use aar_domain::error::{Error, Result};
use aar_domain::ports::{
    CheckpointStore, DurableQueue, FileRecordRepository, ProgressBus, ProjectRepository,
    ReportRepository,
};
use aar_domain::value_objects::{OwnerId, ProjectId};

use crate::ingest::IngestService;
use crate::run_registry::RunRegistry;
use crate::worker::ANALYSIS_TOPIC;

/// One page of a `listProjects` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paged<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// 1-indexed page number this response represents.
    pub page: u32,
    /// Requested page size.
    pub page_size: u32,
}

/// Full detail returned by `getProject`/`resetAnalysis`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectDetail {
    /// The project row.
    pub project: Project,
    /// File count materialized for this project, if extraction has run.
    pub file_count: u32,
    /// The current report, if analysis has completed at least once.
    pub report: Option<Report>,
}

/// Acknowledgement returned by the two ingest operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionAck {
    /// The newly created project.
    pub project_id: ProjectId,
    /// Its status immediately after submission (`FilesReady` on success).
    pub status: ProjectStatus,
}

/// Acknowledgement returned by `startAnalysis`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartAck {
    /// The project that was enqueued.
    pub project_id: ProjectId,
    /// Human-readable confirmation.
    pub message: String,
}

/// The Rust-level request API surface: ingestion, lifecycle control, and
/// subscription to live progress.
#[async_trait]
pub trait AnalysisApi: Send + Sync {
    /// Submit an archive for analysis.
    async fn create_from_archive(
        &self,
        name: &str,
        description: Option<String>,
        owner: OwnerId,
        archive_bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<SubmissionAck>;

    /// Submit a remote VCS URL for analysis.
    async fn create_from_remote(
        &self,
        name: &str,
        description: Option<String>,
        owner: OwnerId,
        url: &str,
    ) -> Result<SubmissionAck>;

    /// Enqueue a `FilesReady` project for analysis.
    async fn start_analysis(&self, project_id: ProjectId) -> Result<StartAck>;

    /// Fetch full project detail, including its current report if any.
    async fn get_project(&self, project_id: ProjectId) -> Result<ProjectDetail>;

    /// List projects, optionally filtered by owner.
    async fn list_projects(
        &self,
        page: u32,
        page_size: u32,
        owner_filter: Option<OwnerId>,
    ) -> Result<Paged<Project>>;

    /// Reset an in-flight or completed analysis back to `FilesReady`.
    async fn reset_analysis(&self, project_id: ProjectId) -> Result<ProjectDetail>;

    /// Delete a project and everything that cascades from it.
    async fn delete_project(&self, project_id: ProjectId) -> Result<()>;

    /// Subscribe to a project's live progress stream.
    fn subscribe(&self, project_id: ProjectId) -> Box<dyn aar_domain::ports::ProgressSubscription>;
}

/// Default `AnalysisApi` implementation wiring ingestion, the queue, and
/// repositories together.
pub struct AnalysisService {
    ingest: Arc<IngestService>,
    projects: Arc<dyn ProjectRepository>,
    file_records: Arc<dyn FileRecordRepository>,
    reports: Arc<dyn ReportRepository>,
    checkpoints: Arc<dyn CheckpointStore>,
    queue: Arc<dyn DurableQueue>,
    progress: Arc<dyn ProgressBus>,
    run_registry: RunRegistry,
}

impl AnalysisService {
    /// Construct the service from its collaborators.
    #[must_use]
    pub fn new(
        ingest: Arc<IngestService>,
        projects: Arc<dyn ProjectRepository>,
        file_records: Arc<dyn FileRecordRepository>,
        reports: Arc<dyn ReportRepository>,
        checkpoints: Arc<dyn CheckpointStore>,
        queue: Arc<dyn DurableQueue>,
        progress: Arc<dyn ProgressBus>,
        run_registry: RunRegistry,
    ) -> Self {
        Self {
            ingest,
            projects,
            file_records,
            reports,
            checkpoints,
            queue,
            progress,
            run_registry,
        }
    }

    async fn detail_for(&self, project: Project) -> Result<ProjectDetail> {
        let file_count = self.file_records.list_for_project(project.id).await?.len() as u32;
        let report = self.reports.get_for_project(project.id).await?;
        Ok(ProjectDetail {
            project,
            file_count,
            report,
        })
    }
}

#[async_trait]
impl AnalysisApi for AnalysisService {
    async fn create_from_archive(
        &self,
        name: &str,
        description: Option<String>,
        owner: OwnerId,
        archive_bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<SubmissionAck> {
        let project = self
            .ingest
            .create_from_archive(name, description, owner, archive_bytes, content_type)
            .await?;
        Ok(SubmissionAck {
            project_id: project.id,
            status: project.status,
        })
    }

    async fn create_from_remote(
        &self,
        name: &str,
        description: Option<String>,
        owner: OwnerId,
        url: &str,
    ) -> Result<SubmissionAck> {
        let project = self.ingest.create_from_remote(name, description, owner, url).await?;
        Ok(SubmissionAck {
            project_id: project.id,
            status: project.status,
        })
    }

    async fn start_analysis(&self, project_id: ProjectId) -> Result<StartAck> {
        let mut project = self.projects.get(project_id).await?;
        project.transition(ProjectStatus::Queued)?;
        self.projects.update(&project).await?;

        let envelope = JobEnvelope {
            project_id,
            requested_at: chrono::Utc::now(),
            phase: Some(Phase::Pending),
        };
        let payload =
            serde_json::to_vec(&envelope).map_err(|e| Error::internal(format!("encoding job envelope: {e}")))?;
        self.queue.enqueue(ANALYSIS_TOPIC, &payload, None).await?;

        Ok(StartAck {
            project_id,
            message: "analysis enqueued".to_string(),
        })
    }

    async fn get_project(&self, project_id: ProjectId) -> Result<ProjectDetail> {
        let project = self.projects.get(project_id).await?;
        self.detail_for(project).await
    }

    async fn list_projects(
        &self,
        page: u32,
        page_size: u32,
        owner_filter: Option<OwnerId>,
    ) -> Result<Paged<Project>> {
        let items = self.projects.list(owner_filter, page, page_size).await?;
        Ok(Paged {
            items,
            page,
            page_size,
        })
    }

    async fn reset_analysis(&self, project_id: ProjectId) -> Result<ProjectDetail> {
        // Fire the in-flight Orchestrator run's cancellation token, if one is
        // registered, before touching persisted state. The run's own
        // cancellation handling (see `Orchestrator::analyze`) converges on
        // the same `FilesReady`/`Pending` state this method sets below, so a
        // race between the two is harmless.
        self.run_registry.cancel(project_id);

        let mut project = self.projects.get(project_id).await?;
        project.transition(ProjectStatus::FilesReady)?;
        self.projects.update(&project).await?;

        if let Some(mut checkpoint) = self.checkpoints.get(project_id).await? {
            checkpoint.advance(Phase::Pending, false);
            self.checkpoints.upsert(checkpoint).await?;
        }

        self.detail_for(project).await
    }

    async fn delete_project(&self, project_id: ProjectId) -> Result<()> {
        self.projects.delete(project_id).await
    }

    fn subscribe(&self, project_id: ProjectId) -> Box<dyn aar_domain::ports::ProgressSubscription> {
        self.progress.subscribe(project_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use aar_providers::blob::LocalBlobStore;
    use aar_providers::checkpoint::InMemoryCheckpointStore;
    use aar_providers::progress::BroadcastProgressBus;
    use aar_providers::queue::InMemoryQueue;
    use aar_providers::remote::GitShallowCloneFetcher;
    use aar_providers::repositories::{
        InMemoryFileRecordRepository, InMemoryProjectRepository, InMemoryReportRepository,
    };

    use crate::ingest::IngestLimits;

    fn build_service(dir: &std::path::Path) -> AnalysisService {
        let projects = Arc::new(InMemoryProjectRepository::default());
        let file_records = Arc::new(InMemoryFileRecordRepository::default());
        let reports = Arc::new(InMemoryReportRepository::default());
        let checkpoints = Arc::new(InMemoryCheckpointStore::default());
        let queue = Arc::new(InMemoryQueue::default());
        let progress = Arc::new(BroadcastProgressBus::default());
        let blobs = Arc::new(LocalBlobStore::new(dir.join("blobs")));
        let remote = Arc::new(GitShallowCloneFetcher);

        let ingest = Arc::new(IngestService::new(
            projects.clone(),
            file_records.clone(),
            blobs,
            remote,
            None,
            dir.join("work"),
            IngestLimits::default(),
        ));

        AnalysisService::new(
            ingest,
            projects,
            file_records,
            reports,
            checkpoints,
            queue,
            progress,
            crate::run_registry::RunRegistry::new(),
        )
    }

    #[tokio::test]
    async fn start_analysis_enqueues_and_transitions_to_queued() {
        let dir = tempfile::tempdir().unwrap();
        let service = build_service(dir.path());

        let owner = OwnerId::new();
        let bytes = build_test_zip();
        let ack = service
            .create_from_archive("demo", None, owner, bytes, "application/zip")
            .await
            .unwrap();
        assert_eq!(ack.status, ProjectStatus::FilesReady);

        let start = service.start_analysis(ack.project_id).await.unwrap();
        assert_eq!(start.project_id, ack.project_id);

        let detail = service.get_project(ack.project_id).await.unwrap();
        assert_eq!(detail.project.status, ProjectStatus::Queued);
        assert_eq!(detail.file_count, 1);
    }

    fn build_test_zip() -> Vec<u8> {
        use std::io::Write as _;
        use zip::write::{SimpleFileOptions, ZipWriter};

        let mut buf = Vec::new();
        {
            let mut writer = ZipWriter::new(std::io::Cursor::new(&mut buf));
            writer
                .start_file("main.rs", SimpleFileOptions::default())
                .unwrap();
            writer.write_all(b"fn main() {}\n").unwrap();
            writer.finish().unwrap();
        }
        buf
    }
}
