//! Core domain entities.

pub mod api_key;
pub mod chunk;
pub mod file_record;
pub mod finding;
pub mod job;
pub mod project;
pub mod report;

pub use api_key::ApiKey;
pub use chunk::Chunk;
pub use file_record::FileRecord;
pub use finding::{AgentKind, Anchor, Finding, LineRange};
pub use job::{JobCheckpoint, JobEnvelope, Phase};
pub use project::{Project, ProjectStatus};
pub use report::{HealthScoreWeights, Report};
