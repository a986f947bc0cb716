//! Wires every port to a concrete adapter and assembles the application
//! services a binary needs: `AnalysisApi` for a request surface, plus the
//! collaborators `run_worker_loop` needs to drive jobs in-process.

use std::sync::Arc;

use aar_application::agents::{
    AgentBase, AnalysisAgent, ArchitectureAdvisorAgent, CodeQualityAgent, SecurityAgent, StructureAgent,
};
use aar_application::analysis_api::{AnalysisApi, AnalysisService};
use aar_application::ingest::{IngestLimits, IngestService};
use aar_application::orchestrator::Orchestrator;
use aar_application::run_registry::RunRegistry;
use aar_application::worker::WorkerConfig;
use aar_domain::ports::{CodeMetricsService, DurableQueue, ModelService, ProgressBus};
use aar_providers::checkpoint::InMemoryCheckpointStore;
use aar_providers::blob::LocalBlobStore;
use aar_providers::metrics::HeuristicCodeMetricsService;
use aar_providers::model::OpenAiService;
use aar_providers::progress::BroadcastProgressBus;
use aar_providers::queue::InMemoryQueue;
use aar_providers::remote::GitShallowCloneFetcher;
use aar_providers::repositories::{
    InMemoryFileRecordRepository, InMemoryFindingRepository, InMemoryProjectRepository,
    InMemoryReportRepository,
};

use crate::config::AppConfig;

/// Every collaborator a binary needs: a request-level `AnalysisApi` plus the
/// pieces `run_worker_loop` consumes directly.
pub struct AppContext {
    /// Request-level API surface (ingestion, lifecycle, progress subscription).
    pub analysis_api: Arc<dyn AnalysisApi>,
    /// Drives job envelopes through the fixed agent roster.
    pub orchestrator: Arc<Orchestrator>,
    /// The durable queue the Worker Loop dequeues from.
    pub queue: Arc<dyn DurableQueue>,
    /// Base directory extraction working directories are derived from.
    pub working_dir_root: std::path::PathBuf,
    /// Worker Loop tunables, converted from `AppConfig`.
    pub worker_config: WorkerConfig,
    /// Shared in-flight-run tokens, so `AnalysisApi::reset_analysis` can
    /// cancel a run the Worker Loop is currently driving.
    pub run_registry: RunRegistry,
}

/// Build the full dependency graph from a loaded `AppConfig`.
#[must_use]
pub fn build_context(config: &AppConfig) -> AppContext {
    let projects = Arc::new(InMemoryProjectRepository::default());
    let file_records = Arc::new(InMemoryFileRecordRepository::default());
    let findings = Arc::new(InMemoryFindingRepository::default());
    let reports = Arc::new(InMemoryReportRepository::default());
    let checkpoints = Arc::new(InMemoryCheckpointStore::default());
    let progress: Arc<dyn ProgressBus> = Arc::new(BroadcastProgressBus::default());
    let queue: Arc<dyn DurableQueue> = Arc::new(InMemoryQueue::default());
    let run_registry = RunRegistry::new();

    let blobs = Arc::new(LocalBlobStore::new(config.storage.base_dir.join("blobs")));
    let remote = Arc::new(GitShallowCloneFetcher);

    let model: Arc<dyn ModelService> = if config.model.mock_mode {
        Arc::new(OpenAiService::mock())
    } else {
        Arc::new(OpenAiService::live(
            config.model.base_url.clone(),
            config.model.api_key.clone().unwrap_or_default(),
            config.model.model_name.clone(),
        ))
    };
    let metrics: Arc<dyn CodeMetricsService> = Arc::new(HeuristicCodeMetricsService::new());

    let agent_config: aar_application::agents::AgentConfig = config.agents.clone().into();
    let agents: Vec<Arc<dyn AnalysisAgent>> = vec![
        Arc::new(StructureAgent::new(AgentBase::new(
            model.clone(),
            metrics.clone(),
            agent_config.clone(),
        ))),
        Arc::new(CodeQualityAgent::new(AgentBase::new(
            model.clone(),
            metrics.clone(),
            agent_config.clone(),
        ))),
        Arc::new(SecurityAgent::new(AgentBase::new(
            model.clone(),
            metrics.clone(),
            agent_config.clone(),
        ))),
        Arc::new(ArchitectureAdvisorAgent::new(AgentBase::new(
            model,
            metrics,
            agent_config,
        ))),
    ];

    let orchestrator = Arc::new(Orchestrator::new(
        agents,
        projects.clone(),
        findings,
        reports.clone(),
        checkpoints.clone(),
        progress.clone(),
        config.orchestrator.clone().into_runtime(),
    ));

    let ingest = Arc::new(IngestService::new(
        projects.clone(),
        file_records.clone(),
        blobs,
        remote,
        None,
        config.storage.base_dir.clone(),
        IngestLimits {
            max_upload_size: config.ingest.max_upload_size,
            per_owner_quota: config.ingest.per_owner_quota,
            extraction: config.ingest.extraction.into(),
        },
    ));

    let analysis_api: Arc<dyn AnalysisApi> = Arc::new(AnalysisService::new(
        ingest,
        projects,
        file_records,
        reports,
        checkpoints,
        queue.clone(),
        progress,
        run_registry.clone(),
    ));

    AppContext {
        analysis_api,
        orchestrator,
        queue,
        working_dir_root: config.storage.base_dir.clone(),
        worker_config: config.queue.clone().into_runtime(),
        run_registry,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_a_full_context_from_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.storage.base_dir = dir.path().to_path_buf();
        let ctx = build_context(&config);
        assert_eq!(Arc::strong_count(&ctx.orchestrator), 1);
    }
}
