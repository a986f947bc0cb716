//! Agent Runtime: the fixed roster of analysis agents and their shared base.

mod architecture_advisor;
mod base;
mod code_quality;
mod lenient;
mod security;
mod structure;

pub use architecture_advisor::ArchitectureAdvisorAgent;
pub use base::{AgentBase, AgentConfig, ReviewFile, DEFAULT_REVIEWED_EXTENSIONS};
pub use code_quality::CodeQualityAgent;
pub use security::SecurityAgent;
pub use structure::StructureAgent;

use std::path::Path;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use aar_domain::entities::{AgentKind, Finding, Project};
use aar_domain::error::Result;

/// One member of the fixed analysis-agent roster.
#[async_trait]
pub trait AnalysisAgent: Send + Sync {
    /// Which roster member this is.
    fn kind(&self) -> AgentKind;

    /// Review `working_dir` and return the findings this agent produced.
    ///
    /// Implementations must respect `cancel`: a cancelled token should abort
    /// outstanding model calls and return [`aar_domain::Error::cancelled`]
    /// rather than run to completion.
    async fn analyze(
        &self,
        project: &Project,
        working_dir: &Path,
        cancel: CancellationToken,
    ) -> Result<Vec<Finding>>;
}
