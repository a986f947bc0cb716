//! Job message envelope and checkpoint record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::ProjectId;

/// A point in the pipeline lifecycle. Monotonic per project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Queued, not yet picked up by a Worker.
    Pending,
    /// Secure Extractor is materializing the working directory.
    Extracting,
    /// Chunking/embedding is in progress.
    Indexing,
    /// The Orchestrator is running agents.
    Analyzing,
    /// Findings are being aggregated into a Report.
    Aggregating,
    /// Terminal: Report persisted.
    Completed,
    /// Terminal: the project failed unrecoverably.
    Failed,
}

impl Phase {
    /// Whether this phase is terminal.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// The payload carried by a `JobMessage` on the Durable Queue.
///
/// Serialized as base64 over a UTF-8 JSON envelope per `spec.md` §6.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobEnvelope {
    /// The project this job concerns.
    pub project_id: ProjectId,
    /// When the envelope was constructed.
    pub requested_at: DateTime<Utc>,
    /// Optional hint about which phase to resume at.
    pub phase: Option<Phase>,
}

/// Per-project checkpoint record: phase, attempt count, and last-good position.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobCheckpoint {
    /// Owning project (one active checkpoint per project).
    pub project_id: ProjectId,
    /// Current phase.
    pub phase: Phase,
    /// Number of attempts made at the current (or most recent) phase.
    pub attempts: u32,
    /// Progress percentage within the current phase, 0..=100.
    pub progress_percent: u8,
    /// Last error message, sanitized, if any.
    pub last_error: Option<String>,
    /// When this checkpoint row was last written.
    pub updated_at: DateTime<Utc>,
}

impl JobCheckpoint {
    /// Create a fresh checkpoint in `Pending` phase for a project.
    #[must_use]
    pub fn new(project_id: ProjectId) -> Self {
        Self {
            project_id,
            phase: Phase::Pending,
            attempts: 0,
            progress_percent: 0,
            last_error: None,
            updated_at: Utc::now(),
        }
    }

    /// Advance to `phase`, bumping `updated_at` and optionally incrementing attempts.
    pub fn advance(&mut self, phase: Phase, bump_attempts: bool) {
        self.phase = phase;
        if bump_attempts {
            self.attempts += 1;
        }
        self.updated_at = Utc::now();
    }

    /// Record a failure, storing the sanitized message without changing phase.
    pub fn record_error(&mut self, message: &str) {
        self.last_error = Some(crate::error::Error::sanitize_for_persistence(message));
        self.updated_at = Utc::now();
    }
}
