//! Worker Loop: dequeues job envelopes and drives the Orchestrator, honoring
//! at-least-once delivery and the checkpoint-before-delete ordering.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use aar_domain::entities::JobEnvelope;
use aar_domain::error::{Error, ErrorKind, Result};
use aar_domain::ports::DurableQueue;

use crate::orchestrator::Orchestrator;
use crate::run_registry::RunRegistry;

/// Name of the topic the Worker Loop consumes from.
pub const ANALYSIS_TOPIC: &str = "aar.analysis.jobs";

/// Tunables for the Worker Loop.
#[derive(Debug, Clone, Copy)]
pub struct WorkerConfig {
    /// Dequeue attempts beyond this mark a project `Failed` and drop the message.
    pub max_retries: u32,
    /// Sleep between empty-queue polls.
    pub poll_interval: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            poll_interval: Duration::from_secs(2),
        }
    }
}

/// Drives job messages from `queue` through `orchestrator`, one at a time,
/// until `shutdown` is cancelled.
pub async fn run_worker_loop(
    queue: Arc<dyn DurableQueue>,
    orchestrator: Arc<Orchestrator>,
    working_dir_root: PathBuf,
    config: WorkerConfig,
    shutdown: CancellationToken,
    run_registry: RunRegistry,
) -> Result<()> {
    while !shutdown.is_cancelled() {
        let message = tokio::select! {
            m = queue.dequeue(ANALYSIS_TOPIC) => m?,
            () = shutdown.cancelled() => break,
        };

        let Some(message) = message else {
            tokio::select! {
                () = tokio::time::sleep(config.poll_interval) => {}
                () = shutdown.cancelled() => break,
            }
            continue;
        };

        let envelope: JobEnvelope = match serde_json::from_slice(&message.payload) {
            Ok(e) => e,
            Err(err) => {
                warn!(error = %err, "dropping undecodable job envelope");
                queue
                    .delete(ANALYSIS_TOPIC, message.message_id, &message.pop_receipt)
                    .await?;
                continue;
            }
        };

        if message.dequeue_count > config.max_retries {
            warn!(
                project_id = %envelope.project_id,
                dequeue_count = message.dequeue_count,
                "exceeded max retries; abandoning job"
            );
            queue
                .delete(ANALYSIS_TOPIC, message.message_id, &message.pop_receipt)
                .await?;
            continue;
        }

        let working_dir = working_dir_root
            .join("extractions")
            .join(envelope.project_id.to_string());
        let run_cancel = run_registry.register(envelope.project_id, &shutdown);

        info!(project_id = %envelope.project_id, "starting analysis run");
        let outcome = orchestrator
            .analyze(envelope.project_id, working_dir.clone(), run_cancel)
            .await;
        run_registry.unregister(envelope.project_id);

        match outcome {
            Ok(report) => {
                info!(project_id = %envelope.project_id, health_score = report.health_score, "analysis completed");
                queue
                    .delete(ANALYSIS_TOPIC, message.message_id, &message.pop_receipt)
                    .await?;
                cleanup_working_dir(&working_dir);
            }
            Err(err) if is_retryable(&err) => {
                warn!(project_id = %envelope.project_id, error = %err, "transient failure; leaving message for redelivery");
                cleanup_working_dir(&working_dir);
            }
            Err(err) => {
                warn!(project_id = %envelope.project_id, error = %err, "fatal failure; abandoning job");
                queue
                    .delete(ANALYSIS_TOPIC, message.message_id, &message.pop_receipt)
                    .await?;
                cleanup_working_dir(&working_dir);
            }
        }
    }
    Ok(())
}

/// Remove a job's extracted working directory. Best-effort: a missing or
/// already-removed directory is not an error, and extraction itself may
/// never have created one (e.g. an undecodable envelope never reaches here).
fn cleanup_working_dir(working_dir: &std::path::Path) {
    if let Err(err) = std::fs::remove_dir_all(working_dir) {
        if err.kind() != std::io::ErrorKind::NotFound {
            warn!(path = %working_dir.display(), error = %err, "failed to clean up job working directory");
        }
    }
}

fn is_retryable(err: &Error) -> bool {
    matches!(err.kind(), ErrorKind::TransientExternal | ErrorKind::Cancellation)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_errors_are_transient_or_cancellation() {
        assert!(is_retryable(&Error::transient("timeout")));
        assert!(is_retryable(&Error::cancelled("deadline")));
        assert!(!is_retryable(&Error::fatal("bad archive")));
        assert!(!is_retryable(&Error::validation("bad input")));
    }
}
