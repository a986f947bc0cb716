//! Application layer: ingestion, the agent runtime, the orchestrator, and the
//! worker loop that together turn a submission into a persisted report.

pub mod agents;
pub mod analysis_api;
pub mod ingest;
pub mod orchestrator;
pub mod run_registry;
pub mod worker;

#[cfg(test)]
pub(crate) mod test_support {
    //! Minimal test doubles shared by the agent-runtime unit tests. Each
    //! concrete agent test only needs a `ModelService`/`CodeMetricsService`
    //! that never panics; a dedicated mock-model provider lives in
    //! `aar-providers` for integration-level tests.

    use async_trait::async_trait;

    use aar_domain::error::Result;
    use aar_domain::ports::{CodeMetricsService, FileMetrics, ModelRequest, ModelResponse, ModelService};

    pub struct NullModelService;

    #[async_trait]
    impl ModelService for NullModelService {
        async fn complete(&self, _request: ModelRequest) -> Result<ModelResponse> {
            Ok(ModelResponse {
                content: "[]".to_string(),
                tokens_used: Some(0),
            })
        }

        fn mock_mode(&self) -> bool {
            true
        }
    }

    pub struct NullMetricsService;

    #[async_trait]
    impl CodeMetricsService for NullMetricsService {
        async fn metrics_for(&self, _extension: &str, _contents: &str) -> FileMetrics {
            FileMetrics::default()
        }
    }
}
