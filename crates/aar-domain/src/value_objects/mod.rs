//! Small, immutable value types shared across entities and ports.

mod ids;
mod severity;

pub use ids::{ApiKeyId, ChunkId, FileRecordId, FindingId, OwnerId, ProjectId, ReportId};
pub use severity::Severity;
