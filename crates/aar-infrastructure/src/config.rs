//! `AppConfig`: YAML configuration loading, following the `settings:`-key
//! and environment-cascade convention the pipeline's providers crate would
//! otherwise need bespoke wiring for.
//!
//! Resolution order: an explicit path, else `config/{env}.local.yaml`, else
//! `config/{env}.yaml`, searched from the current directory upward and from
//! `CARGO_MANIFEST_DIR` upward (so tests run from any crate directory still
//! find the workspace-root `config/` folder). `env` comes from `AAR_ENV`,
//! defaulting to `development`.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use aar_domain::error::{Error, Result};
use aar_secure_extract::ExtractionLimits;

/// Top-level application configuration, deserialized from the `settings:` key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Where extracted working directories and uploaded blobs live.
    pub storage: StorageConfig,
    /// Submission-time and extraction-time bounds.
    pub ingest: IngestConfig,
    /// Worker Loop tunables.
    pub queue: QueueConfig,
    /// Orchestrator concurrency, timeout, and health-score weighting.
    pub orchestrator: OrchestratorConfig,
    /// Model-service endpoint and mock-mode switch.
    pub model: ModelConfig,
    /// Agent-runtime tunables shared by the fixed roster.
    pub agents: AgentsConfig,
    /// Logging verbosity and format.
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            ingest: IngestConfig::default(),
            queue: QueueConfig::default(),
            orchestrator: OrchestratorConfig::default(),
            model: ModelConfig::default(),
            agents: AgentsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Filesystem roots used by the blob store and extraction working directories.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Base directory for blobs, extraction scratch space, and clones.
    pub base_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("./data"),
        }
    }
}

/// Submission and extraction bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Maximum raw archive upload size, in bytes.
    pub max_upload_size: u64,
    /// Maximum cumulative stored bytes per owner.
    pub per_owner_quota: u64,
    /// Extraction-time zip-bomb limits.
    pub extraction: ExtractionConfig,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_upload_size: 200 * 1024 * 1024,
            per_owner_quota: 5 * 1024 * 1024 * 1024,
            extraction: ExtractionConfig::default(),
        }
    }
}

/// Mirrors `aar_secure_extract::ExtractionLimits`, typed for YAML.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Entries larger than this (uncompressed, declared) are skipped.
    pub max_file_size: u64,
    /// Extraction stops once this many entries have been written.
    pub max_total_files: u32,
    /// Uncompressed/compressed ratio above which an entry is treated as a bomb.
    pub max_compression_ratio: u64,
    /// Cumulative uncompressed bytes across the whole archive.
    pub max_total_uncompressed_size: u64,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        let limits = ExtractionLimits::default();
        Self {
            max_file_size: limits.max_file_size,
            max_total_files: limits.max_total_files,
            max_compression_ratio: limits.max_compression_ratio,
            max_total_uncompressed_size: limits.max_total_uncompressed_size,
        }
    }
}

impl From<ExtractionConfig> for ExtractionLimits {
    fn from(c: ExtractionConfig) -> Self {
        Self {
            max_file_size: c.max_file_size,
            max_total_files: c.max_total_files,
            max_compression_ratio: c.max_compression_ratio,
            max_total_uncompressed_size: c.max_total_uncompressed_size,
        }
    }
}

/// Worker Loop tunables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Dequeue attempts beyond this mark a project `Failed` and drop the message.
    pub max_retries: u32,
    /// Seconds to sleep between empty-queue polls.
    pub poll_interval_secs: u64,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            poll_interval_secs: 2,
        }
    }
}

/// Orchestrator concurrency, timeout, and health-score weighting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Maximum agents run concurrently.
    pub max_concurrency: usize,
    /// Whole-run deadline, in seconds.
    pub timeout_secs: u64,
    /// Health-score weighting.
    pub health_score_weights: HealthScoreWeightsConfig,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 4,
            timeout_secs: 30 * 60,
            health_score_weights: HealthScoreWeightsConfig::default(),
        }
    }
}

/// Mirrors `aar_domain::entities::HealthScoreWeights`, typed for YAML.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthScoreWeightsConfig {
    /// Penalty per Critical finding.
    pub critical: f64,
    /// Penalty per High finding.
    pub high: f64,
    /// Penalty per Medium finding.
    pub medium: f64,
    /// Penalty per Low finding.
    pub low: f64,
}

impl Default for HealthScoreWeightsConfig {
    fn default() -> Self {
        let defaults = aar_domain::entities::HealthScoreWeights::default();
        Self {
            critical: defaults.critical,
            high: defaults.high,
            medium: defaults.medium,
            low: defaults.low,
        }
    }
}

impl From<HealthScoreWeightsConfig> for aar_domain::entities::HealthScoreWeights {
    fn from(c: HealthScoreWeightsConfig) -> Self {
        Self {
            critical: c.critical,
            high: c.high,
            medium: c.medium,
            low: c.low,
        }
    }
}

/// Model-service endpoint and mock-mode switch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// When true, no network call is made; a deterministic synthetic response is returned.
    pub mock_mode: bool,
    /// Base URL of an OpenAI-compatible `/chat/completions` endpoint.
    pub base_url: String,
    /// API key, read from the environment rather than committed to YAML.
    #[serde(skip)]
    pub api_key: Option<String>,
    /// Model name passed to the endpoint.
    pub model_name: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            mock_mode: true,
            base_url: String::new(),
            api_key: None,
            model_name: "gpt-4o-mini".to_string(),
        }
    }
}

/// Agent-runtime tunables shared by the fixed roster.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentsConfig {
    /// Extensions (without the dot) to enumerate for review.
    pub reviewed_extensions: Vec<String>,
    /// Lines read per file before truncating with a marker.
    pub max_lines: usize,
    /// Files larger than this are skipped entirely.
    pub max_file_size: u64,
    /// Response token ceiling passed to the model.
    pub max_tokens: u32,
    /// Sampling temperature passed to the model.
    pub temperature: f32,
    /// Upper bound on rule-based findings per agent.
    pub max_rule_findings: usize,
}

impl Default for AgentsConfig {
    fn default() -> Self {
        let defaults = aar_application::agents::AgentConfig::default();
        Self {
            reviewed_extensions: defaults.reviewed_extensions,
            max_lines: defaults.max_lines,
            max_file_size: defaults.max_file_size,
            max_tokens: defaults.max_tokens,
            temperature: defaults.temperature,
            max_rule_findings: defaults.max_rule_findings,
        }
    }
}

impl From<AgentsConfig> for aar_application::agents::AgentConfig {
    fn from(c: AgentsConfig) -> Self {
        Self {
            reviewed_extensions: c.reviewed_extensions,
            max_lines: c.max_lines,
            max_file_size: c.max_file_size,
            max_tokens: c.max_tokens,
            temperature: c.temperature,
            max_rule_findings: c.max_rule_findings,
        }
    }
}

/// Logging verbosity and format.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing-subscriber` env-filter directive, e.g. `info` or `aar=debug,warn`.
    pub filter: String,
    /// Emit newline-delimited JSON instead of the human-readable format.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: false,
        }
    }
}

impl OrchestratorConfig {
    /// Convert into `aar-application`'s runtime orchestrator config.
    #[must_use]
    pub fn into_runtime(self) -> aar_application::orchestrator::OrchestratorConfig {
        aar_application::orchestrator::OrchestratorConfig {
            max_concurrency: self.max_concurrency,
            timeout: Duration::from_secs(self.timeout_secs),
            health_score_weights: self.health_score_weights.into(),
        }
    }
}

impl QueueConfig {
    /// Convert into `aar-application`'s runtime worker config.
    #[must_use]
    pub fn into_runtime(self) -> aar_application::worker::WorkerConfig {
        aar_application::worker::WorkerConfig {
            max_retries: self.max_retries,
            poll_interval: Duration::from_secs(self.poll_interval_secs),
        }
    }
}

/// Loads `AppConfig` from YAML, following the `config/{env}.yaml` convention.
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    /// Optional explicit config file path, overriding environment resolution.
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a loader that resolves its path from the environment.
    #[must_use]
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Use an explicit configuration file path instead of resolving one.
    #[must_use]
    pub fn with_config_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Load, parse, and validate `AppConfig`.
    ///
    /// # Errors
    ///
    /// Returns an error if no config file is found, parsing fails, or
    /// validation rejects a value.
    pub fn load(&self) -> Result<AppConfig> {
        let yaml_path = self.find_yaml_config_path()?;
        let content = std::fs::read_to_string(&yaml_path)
            .map_err(|e| Error::configuration_with_source(format!("reading {}", yaml_path.display()), e))?;
        let document: serde_yaml::Value = serde_yaml::from_str(&content)
            .map_err(|e| Error::configuration_with_source("parsing YAML config", e))?;

        let settings = document
            .get("settings")
            .ok_or_else(|| Error::ConfigMissing("no 'settings' key in YAML configuration file".to_string()))?;
        let mut config: AppConfig = serde_yaml::from_value(settings.clone())
            .map_err(|e| Error::configuration_with_source("deserializing settings into AppConfig", e))?;

        if let Ok(api_key) = env::var("AAR_MODEL_API_KEY") {
            config.model.api_key = Some(api_key);
        }

        validate_app_config(&config)?;
        Ok(config)
    }

    fn find_yaml_config_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.config_path {
            return if path.exists() {
                Ok(path.clone())
            } else {
                Err(Error::ConfigMissing(format!(
                    "configuration file not found: {}",
                    path.display()
                )))
            };
        }

        let env_name = env::var("AAR_ENV").unwrap_or_else(|_| "development".to_string());
        let filenames = [format!("{env_name}.local.yaml"), format!("{env_name}.yaml")];

        if let Ok(current_dir) = env::current_dir() {
            for dir in current_dir.ancestors() {
                for filename in &filenames {
                    let candidate = dir.join("config").join(filename);
                    if candidate.exists() {
                        return Ok(candidate);
                    }
                }
            }
        }

        let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        for dir in manifest_dir.ancestors() {
            for filename in &filenames {
                let candidate = dir.join("config").join(filename);
                if candidate.exists() {
                    return Ok(candidate);
                }
            }
        }

        Err(Error::ConfigMissing(format!(
            "no YAML configuration file found for environment '{env_name}'; expected config/{env_name}.yaml"
        )))
    }
}

/// Validate an `AppConfig`, independent of how it was constructed. Exposed
/// so the `validate-config` CLI subcommand can re-check a config built by
/// hand (e.g. in tests) without going through `ConfigLoader::load`.
///
/// # Errors
///
/// Returns an error naming the first invalid key.
pub fn validate_app_config(config: &AppConfig) -> Result<()> {
    validate_storage_config(config)?;
    validate_ingest_config(config)?;
    validate_queue_config(config)?;
    validate_orchestrator_config(config)?;
    validate_model_config(config)?;
    Ok(())
}

fn validate_storage_config(config: &AppConfig) -> Result<()> {
    if config.storage.base_dir.as_os_str().is_empty() {
        return Err(Error::config_invalid("storage.base_dir", "must not be empty"));
    }
    Ok(())
}

fn validate_ingest_config(config: &AppConfig) -> Result<()> {
    if config.ingest.max_upload_size == 0 {
        return Err(Error::config_invalid("ingest.max_upload_size", "must be greater than 0"));
    }
    if config.ingest.extraction.max_total_uncompressed_size < config.ingest.extraction.max_file_size {
        return Err(Error::config_invalid(
            "ingest.extraction.max_total_uncompressed_size",
            "must be at least max_file_size",
        ));
    }
    if config.ingest.extraction.max_compression_ratio == 0 {
        return Err(Error::config_invalid(
            "ingest.extraction.max_compression_ratio",
            "must be greater than 0",
        ));
    }
    Ok(())
}

fn validate_queue_config(config: &AppConfig) -> Result<()> {
    if config.queue.poll_interval_secs == 0 {
        return Err(Error::config_invalid("queue.poll_interval_secs", "must be greater than 0"));
    }
    Ok(())
}

fn validate_orchestrator_config(config: &AppConfig) -> Result<()> {
    if config.orchestrator.max_concurrency == 0 {
        return Err(Error::config_invalid("orchestrator.max_concurrency", "must be at least 1"));
    }
    if config.orchestrator.timeout_secs == 0 {
        return Err(Error::config_invalid("orchestrator.timeout_secs", "must be greater than 0"));
    }
    Ok(())
}

fn validate_model_config(config: &AppConfig) -> Result<()> {
    if !config.model.mock_mode {
        if config.model.base_url.is_empty() {
            return Err(Error::config_invalid(
                "model.base_url",
                "must be set when mock_mode is false",
            ));
        }
        if config.model.api_key.is_none() {
            return Err(Error::config_invalid(
                "model.api_key",
                "AAR_MODEL_API_KEY must be set when mock_mode is false",
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        validate_app_config(&AppConfig::default()).unwrap();
    }

    #[test]
    fn live_model_without_base_url_is_rejected() {
        let mut config = AppConfig::default();
        config.model.mock_mode = false;
        let err = validate_app_config(&config).unwrap_err();
        assert_eq!(err.kind(), aar_domain::error::ErrorKind::Internal);
    }

    #[test]
    fn zero_concurrency_is_rejected() {
        let mut config = AppConfig::default();
        config.orchestrator.max_concurrency = 0;
        assert!(validate_app_config(&config).is_err());
    }

    #[test]
    fn missing_config_file_is_reported() {
        let loader = ConfigLoader::new().with_config_path("/nonexistent/path/to/config.yaml");
        let err = loader.load().unwrap_err();
        assert!(matches!(err, Error::ConfigMissing(_)));
    }
}
