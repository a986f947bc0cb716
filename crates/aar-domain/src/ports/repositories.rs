//! Repository ports: one data-access capability set per entity.
//!
//! Per `spec.md` §9's Design Notes, the persistent relational store and its
//! ORM are an external, opaque collaborator. These traits are the entire
//! contract this core has with persistence: `(get by id, get by predicate,
//! upsert, delete)`, expressed per entity rather than through an
//! inheritance-heavy repository hierarchy.

use async_trait::async_trait;

use crate::entities::{ApiKey, Chunk, FileRecord, Finding, Project, Report};
use crate::error::Result;
use crate::value_objects::{
    ApiKeyId, ChunkId, FileRecordId, FindingId, OwnerId, ProjectId, ReportId,
};

/// Persistence for `Project` rows.
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Insert a new project row.
    async fn create(&self, project: &Project) -> Result<()>;
    /// Fetch a project by ID.
    async fn get(&self, id: ProjectId) -> Result<Project>;
    /// List projects for an owner, paginated.
    async fn list(&self, owner: Option<OwnerId>, page: u32, page_size: u32) -> Result<Vec<Project>>;
    /// Persist an updated project (status transitions, timestamps).
    async fn update(&self, project: &Project) -> Result<()>;
    /// Delete a project; cascades to its FileRecords, Chunks, Checkpoint,
    /// Findings, and Reports at the repository layer.
    async fn delete(&self, id: ProjectId) -> Result<()>;
}

/// Persistence for `FileRecord` rows. Immutable after bulk creation.
#[async_trait]
pub trait FileRecordRepository: Send + Sync {
    /// Bulk-insert file records for a project after extraction.
    async fn create_many(&self, records: &[FileRecord]) -> Result<()>;
    /// List all file records for a project.
    async fn list_for_project(&self, project_id: ProjectId) -> Result<Vec<FileRecord>>;
    /// Fetch a single file record by ID.
    async fn get(&self, id: FileRecordId) -> Result<FileRecord>;
    /// Delete all file records for a project.
    async fn delete_for_project(&self, project_id: ProjectId) -> Result<()>;
}

/// Persistence for `Chunk` rows.
#[async_trait]
pub trait ChunkRepository: Send + Sync {
    /// Insert chunks (idempotent on content-hash identity).
    async fn upsert_many(&self, chunks: &[Chunk]) -> Result<()>;
    /// List chunks for a file.
    async fn list_for_file(&self, file_id: FileRecordId) -> Result<Vec<Chunk>>;
    /// Delete all chunks for a project.
    async fn delete_for_project(&self, project_id: ProjectId) -> Result<()>;
}

/// Persistence for `Finding` rows, attached to a `Report` at persistence time.
#[async_trait]
pub trait FindingRepository: Send + Sync {
    /// Persist a batch of findings already attached to `report_id`.
    async fn create_many(&self, findings: &[Finding]) -> Result<()>;
    /// List findings belonging to a report.
    async fn list_for_report(&self, report_id: ReportId) -> Result<Vec<Finding>>;
    /// Fetch a single finding.
    async fn get(&self, id: FindingId) -> Result<Finding>;
    /// Delete all findings for a project (cascade).
    async fn delete_for_project(&self, project_id: ProjectId) -> Result<()>;
}

/// Persistence for `Report` rows. One per successful analysis; a new report
/// supersedes the prior one for the same project.
#[async_trait]
pub trait ReportRepository: Send + Sync {
    /// Persist a new report, superseding any prior report for the project.
    async fn create(&self, report: &Report) -> Result<()>;
    /// Fetch the current report for a project, if one exists.
    async fn get_for_project(&self, project_id: ProjectId) -> Result<Option<Report>>;
    /// Delete the report(s) for a project (cascade).
    async fn delete_for_project(&self, project_id: ProjectId) -> Result<()>;
}

/// Persistence for `ApiKey` rows.
#[async_trait]
pub trait ApiKeyRepository: Send + Sync {
    /// Look up the owner attributed to a given key prefix/hash pair.
    async fn resolve_owner(&self, prefix: &str, salted_hash: &str) -> Result<OwnerId>;
    /// Record that a key was used just now.
    async fn mark_used(&self, id: ApiKeyId) -> Result<()>;
}
