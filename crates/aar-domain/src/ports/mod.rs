//! Hexagonal ports: the contracts this core holds with the outside world.
//!
//! Implementations live in `aar-providers` and `aar-infrastructure`; this
//! crate only defines the traits and the types that cross the boundary.

pub mod blob_store;
pub mod checkpoint_store;
pub mod code_metrics;
pub mod model_service;
pub mod progress_bus;
pub mod queue;
pub mod remote_source;
pub mod repositories;
pub mod virus_scan;

pub use blob_store::{BlobMetadata, BlobStore};
pub use checkpoint_store::CheckpointStore;
pub use code_metrics::{CodeMetricsService, FileMetrics};
pub use model_service::{ModelRequest, ModelResponse, ModelService};
pub use progress_bus::{ProgressBus, ProgressSubscription};
pub use queue::{DequeuedMessage, DurableQueue, MessageId, PopReceipt};
pub use remote_source::RemoteSourceFetcher;
pub use repositories::{
    ApiKeyRepository, ChunkRepository, FileRecordRepository, FindingRepository, ProjectRepository,
    ReportRepository,
};
pub use virus_scan::{ScanVerdict, VirusScanner};
