//! Architecture advisor agent: higher-level design and architecture feedback.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use aar_domain::entities::{AgentKind, Finding, Project};
use aar_domain::error::{Error, Result};
use aar_domain::value_objects::Severity;

use super::base::{AgentBase, ReviewFile};
use super::AnalysisAgent;

const SYSTEM_PROMPT: &str = "You are a staff engineer giving architecture feedback: module \
boundaries, coupling, layering violations, missed abstractions. Favor project-level observations \
over line-level nitpicks. Respond with a JSON array of objects: category, severity (Info|Low| \
Medium|High|Critical), description, explanation, filePath, symbol, lineRange {start, end}.";

/// Higher-level architecture and design feedback.
pub struct ArchitectureAdvisorAgent {
    base: AgentBase,
}

impl ArchitectureAdvisorAgent {
    /// Construct the agent from its shared base.
    #[must_use]
    pub fn new(base: AgentBase) -> Self {
        Self { base }
    }

    fn rule_based_findings(&self, project: &Project, files: &[ReviewFile]) -> Vec<Finding> {
        let mut top_level_counts: HashMap<&str, usize> = HashMap::new();
        for file in files {
            let top = file.relative_path.split('/').next().unwrap_or(&file.relative_path);
            *top_level_counts.entry(top).or_insert(0) += 1;
        }

        let mut findings = Vec::new();
        if top_level_counts.len() > 20 {
            findings.push(Finding::project_level(
                project.id,
                AgentKind::ArchitectureAdvisor,
                "FlatLayout",
                Severity::Low,
                format!("{} top-level entries share the project root", top_level_counts.len()),
                "a flat layout with many top-level entries makes it hard to see module boundaries at a glance",
            ));
        }
        findings.truncate(self.base.config.max_rule_findings);
        findings
    }
}

#[async_trait]
impl AnalysisAgent for ArchitectureAdvisorAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::ArchitectureAdvisor
    }

    async fn analyze(
        &self,
        project: &Project,
        working_dir: &Path,
        cancel: CancellationToken,
    ) -> Result<Vec<Finding>> {
        if cancel.is_cancelled() {
            return Err(Error::cancelled("architecture advisor agent cancelled before start"));
        }
        let files = self.base.enumerate_files(working_dir).await?;
        let mut findings = self.rule_based_findings(project, &files);

        if cancel.is_cancelled() {
            return Err(Error::cancelled("architecture advisor agent cancelled before model review"));
        }
        let raw = self
            .base
            .review(SYSTEM_PROMPT.to_string(), &project.name, &files)
            .await?;
        findings.extend(self.base.parse_findings(project.id, AgentKind::ArchitectureAdvisor, &raw));
        Ok(findings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn flags_flat_layout() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..25 {
            std::fs::write(dir.path().join(format!("mod{i}.rs")), "fn f() {}").unwrap();
        }
        let agent = ArchitectureAdvisorAgent::new(AgentBase::new(
            Arc::new(crate::test_support::NullModelService),
            Arc::new(crate::test_support::NullMetricsService),
            super::super::AgentConfig::default(),
        ));
        let project = Project::new("demo", None, aar_domain::value_objects::OwnerId::new());
        let findings = agent
            .analyze(&project, dir.path(), CancellationToken::new())
            .await
            .unwrap();
        assert!(findings.iter().any(|f| f.category == "FlatLayout"));
    }
}
