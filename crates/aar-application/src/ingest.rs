//! Ingest: the two submission shapes (archive upload, remote URL) that both
//! end in a `FilesReady` project with persisted `FileRecord`s.

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use aar_domain::entities::{FileRecord, Project, ProjectStatus};
use aar_domain::error::{Error, Result};
use aar_domain::ports::{
    BlobStore, FileRecordRepository, ProjectRepository, RemoteSourceFetcher, ScanVerdict,
    VirusScanner,
};
use aar_domain::value_objects::OwnerId;
use aar_secure_extract::{ExtractionLimits, extract};

const ALLOWED_REMOTE_HOSTS: &[&str] = &["github.com", "gitlab.com", "bitbucket.org", "dev.azure.com"];
const ALLOWED_CONTENT_TYPES: &[&str] = &[
    "application/zip",
    "application/x-zip-compressed",
    "application/octet-stream",
];

/// Bounds enforced at submission time, independent of extraction limits.
#[derive(Debug, Clone, Copy)]
pub struct IngestLimits {
    /// Maximum raw archive upload size, in bytes.
    pub max_upload_size: u64,
    /// Maximum cumulative stored bytes per owner.
    pub per_owner_quota: u64,
    /// Extraction-time limits handed to `aar-secure-extract`.
    pub extraction: ExtractionLimits,
}

impl Default for IngestLimits {
    fn default() -> Self {
        Self {
            max_upload_size: 200 * 1024 * 1024,
            per_owner_quota: 5 * 1024 * 1024 * 1024,
            extraction: ExtractionLimits::default(),
        }
    }
}

/// Takes a submission (archive or remote URL), validates it, and leaves a
/// `FilesReady` project with its `FileRecord`s persisted.
pub struct IngestService {
    projects: Arc<dyn ProjectRepository>,
    file_records: Arc<dyn FileRecordRepository>,
    blobs: Arc<dyn BlobStore>,
    remote_fetcher: Arc<dyn RemoteSourceFetcher>,
    virus_scanner: Option<Arc<dyn VirusScanner>>,
    working_dir_root: PathBuf,
    limits: IngestLimits,
}

impl IngestService {
    /// Construct an `IngestService` from its collaborators.
    #[must_use]
    pub fn new(
        projects: Arc<dyn ProjectRepository>,
        file_records: Arc<dyn FileRecordRepository>,
        blobs: Arc<dyn BlobStore>,
        remote_fetcher: Arc<dyn RemoteSourceFetcher>,
        virus_scanner: Option<Arc<dyn VirusScanner>>,
        working_dir_root: PathBuf,
        limits: IngestLimits,
    ) -> Self {
        Self {
            projects,
            file_records,
            blobs,
            remote_fetcher,
            virus_scanner,
            working_dir_root,
            limits,
        }
    }

    /// Archive submission: validate, store the raw blob, extract, persist
    /// file records, and transition the project to `FilesReady`.
    pub async fn create_from_archive(
        &self,
        name: &str,
        description: Option<String>,
        owner: OwnerId,
        archive_bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<Project> {
        validate_name(name)?;
        if !ALLOWED_CONTENT_TYPES.contains(&content_type) {
            return Err(Error::validation(format!(
                "unsupported content type '{content_type}'"
            )));
        }
        if archive_bytes.len() as u64 > self.limits.max_upload_size {
            return Err(Error::validation("archive exceeds the maximum upload size"));
        }

        let used = self.blobs.total_size(&format!("uploads/{owner}")).await?;
        if used + archive_bytes.len() as u64 > self.limits.per_owner_quota {
            return Err(Error::security_policy(
                "QUOTA_EXCEEDED",
                "owner storage quota exceeded",
            ));
        }

        let blob_key = format!("uploads/{owner}/{}.zip", Uuid::new_v4());
        let mut reader = Cursor::new(archive_bytes.clone());
        self.blobs.put(&blob_key, &mut reader).await?;

        if let Some(scanner) = &self.virus_scanner {
            if scanner.scan(&blob_key).await? == ScanVerdict::Infected {
                self.blobs.delete(&blob_key).await?;
                return Err(Error::security_policy(
                    "VIRUS_DETECTED",
                    "uploaded archive failed virus scan",
                ));
            }
        }

        let mut project = Project::new(name, description, owner);
        self.projects.create(&project).await?;

        let working_dir = self.working_dir_root.join("extractions").join(project.id.to_string());
        let entries = extract(
            Cursor::new(archive_bytes),
            &working_dir,
            self.limits.extraction,
        )?;

        let records: Vec<FileRecord> = entries
            .into_iter()
            .map(|e| FileRecord {
                id: uuid::Uuid::new_v4().into(),
                project_id: project.id,
                language: FileRecord::infer_language(&e.relative_path),
                relative_path: e.relative_path,
                size: e.size,
                content_hash: e.content_hash,
                last_modified: Utc::now(),
            })
            .collect();
        self.file_records.create_many(&records).await?;

        project.transition(ProjectStatus::FilesReady)?;
        self.projects.update(&project).await?;
        Ok(project)
    }

    /// Remote-URL submission: allowlist the host, shallow-clone, hash the
    /// resulting worktree, and persist file records.
    pub async fn create_from_remote(
        &self,
        name: &str,
        description: Option<String>,
        owner: OwnerId,
        url: &str,
    ) -> Result<Project> {
        validate_name(name)?;
        validate_remote_url(url)?;

        let mut project = Project::new(name, description, owner);
        self.projects.create(&project).await?;

        let working_dir = self.working_dir_root.join("extractions").join(project.id.to_string());
        self.remote_fetcher.shallow_clone(url, &working_dir).await?;

        let records = hash_working_directory(project.id, &working_dir).await?;
        self.file_records.create_many(&records).await?;

        project.transition(ProjectStatus::FilesReady)?;
        self.projects.update(&project).await?;
        Ok(project)
    }
}

fn validate_name(name: &str) -> Result<()> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed.len() > 200 {
        return Err(Error::validation("project name must be 1-200 characters"));
    }
    Ok(())
}

fn validate_remote_url(url: &str) -> Result<()> {
    let parsed = url::Url::parse(url).map_err(|e| Error::validation(format!("invalid URL: {e}")))?;
    if parsed.scheme() != "https" {
        return Err(Error::security_policy("REMOTE_SCHEME_REJECTED", "remote URL must use HTTPS"));
    }
    let host = parsed
        .host_str()
        .ok_or_else(|| Error::validation("remote URL has no host"))?;
    if !ALLOWED_REMOTE_HOSTS
        .iter()
        .any(|allowed| host == *allowed || host.ends_with(&format!(".{allowed}")))
    {
        return Err(Error::security_policy(
            "REMOTE_HOST_REJECTED",
            format!("host '{host}' is not in the remote-source allowlist"),
        ));
    }
    Ok(())
}

async fn hash_working_directory(
    project_id: aar_domain::value_objects::ProjectId,
    working_dir: &Path,
) -> Result<Vec<FileRecord>> {
    let mut records = Vec::new();
    for entry in walkdir::WalkDir::new(working_dir)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| e.file_type().is_file())
    {
        let path = entry.path();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| Error::io_with_source("reading cloned file", e))?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let relative_path = path
            .strip_prefix(working_dir)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/");
        records.push(FileRecord {
            id: uuid::Uuid::new_v4().into(),
            project_id,
            language: FileRecord::infer_language(&relative_path),
            relative_path,
            size: bytes.len() as u64,
            content_hash: hex::encode(hasher.finalize()),
            last_modified: Utc::now(),
        });
    }
    Ok(records)
}
