//! Progress Bus event payloads.

use serde::{Deserialize, Serialize};

use crate::entities::Finding;

/// Aggregate statistics attached to a `Completion` event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionStatistics {
    /// Total findings produced across all agents, before deduplication.
    pub raw_finding_count: u32,
    /// Findings remaining after deduplication and anchor filtering.
    pub persisted_finding_count: u32,
    /// Number of agents that completed without error.
    pub agents_succeeded: u32,
    /// Number of agents that failed (captured as Info findings, not fatal).
    pub agents_failed: u32,
}

/// One event on a project's Progress Bus stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ProgressEvent {
    /// Coarse-grained phase/percentage progress update.
    Progress {
        /// Current pipeline phase.
        phase: crate::entities::Phase,
        /// 0..=100.
        progress_percent: u8,
        /// Files processed so far, if applicable to the current phase.
        files_processed: u32,
        /// Total files known for this project, if applicable.
        total_files: u32,
    },
    /// A single finding as it is produced, ahead of report aggregation.
    Finding {
        /// The finding itself.
        finding: Box<Finding>,
    },
    /// Terminal event: the pipeline has finished (successfully or not).
    Completion {
        /// Whether the analysis completed without a fatal error.
        success: bool,
        /// Wall-clock duration of the run, in seconds.
        duration_seconds: f64,
        /// Aggregate statistics, present on success.
        statistics: Option<CompletionStatistics>,
    },
}
