//! Project entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{OwnerId, ProjectId};

/// Lifecycle status of a `Project`.
///
/// Transitions are monotonic except `Analyzing -> FilesReady`, which is the
/// explicit reset path (`resetAnalysis`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectStatus {
    /// Project row created; no files materialized yet.
    Created,
    /// Extraction completed; file metadata persisted.
    FilesReady,
    /// A job message has been enqueued.
    Queued,
    /// The Orchestrator is actively running agents.
    Analyzing,
    /// A Report has been persisted.
    Completed,
    /// The analysis failed unrecoverably.
    Failed,
}

impl ProjectStatus {
    /// Whether `next` is a legal forward transition from `self`.
    ///
    /// `Analyzing -> FilesReady` is allowed as the explicit reset path; all
    /// other transitions must move strictly forward through the lifecycle,
    /// or into `Failed` from any non-terminal state.
    #[must_use]
    pub fn can_transition_to(self, next: ProjectStatus) -> bool {
        use ProjectStatus::{Analyzing, Completed, Created, Failed, FilesReady, Queued};
        match (self, next) {
            (Created, FilesReady)
            | (FilesReady, Queued)
            | (Queued, Analyzing)
            | (Analyzing, Completed)
            | (Analyzing, FilesReady) => true,
            (s, Failed) if s != Completed && s != Failed => true,
            _ => false,
        }
    }

    /// Whether this status is terminal (no further transitions expected).
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// A submitted codebase undergoing (or having undergone) analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// Stable opaque identifier.
    pub id: ProjectId,
    /// Display name.
    pub name: String,
    /// Optional free-text description.
    pub description: Option<String>,
    /// Current lifecycle status.
    pub status: ProjectStatus,
    /// The submitter this project is attributed to.
    pub owner: OwnerId,
    /// When the project row was created.
    pub created_at: DateTime<Utc>,
    /// When the project row was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Create a new project in `Created` status.
    #[must_use]
    pub fn new(name: impl Into<String>, description: Option<String>, owner: OwnerId) -> Self {
        let now = Utc::now();
        Self {
            id: ProjectId::new(),
            name: name.into(),
            description,
            status: ProjectStatus::Created,
            owner,
            created_at: now,
            updated_at: now,
        }
    }

    /// Attempt a status transition, enforcing `ProjectStatus::can_transition_to`.
    ///
    /// # Errors
    /// Returns [`crate::error::Error::Conflict`] if the transition is not legal.
    pub fn transition(&mut self, next: ProjectStatus) -> crate::error::Result<()> {
        if !self.status.can_transition_to(next) {
            return Err(crate::error::Error::conflict(format!(
                "illegal project status transition: {:?} -> {:?}",
                self.status, next
            )));
        }
        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn created_to_files_ready_is_legal() {
        assert!(ProjectStatus::Created.can_transition_to(ProjectStatus::FilesReady));
    }

    #[test]
    fn analyzing_to_files_ready_is_the_reset_path() {
        assert!(ProjectStatus::Analyzing.can_transition_to(ProjectStatus::FilesReady));
    }

    #[test]
    fn completed_to_anything_is_illegal() {
        assert!(!ProjectStatus::Completed.can_transition_to(ProjectStatus::Analyzing));
        assert!(!ProjectStatus::Completed.can_transition_to(ProjectStatus::Failed));
    }

    #[test]
    fn project_transition_rejects_illegal_jump() {
        let mut p = Project::new("demo", None, OwnerId::new());
        let err = p.transition(ProjectStatus::Analyzing).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Internal);
    }
}
