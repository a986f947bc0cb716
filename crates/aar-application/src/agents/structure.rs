//! Structure agent: project layout and convention checks.

use std::path::Path;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use aar_domain::entities::{AgentKind, Finding, Project};
use aar_domain::error::{Error, Result};
use aar_domain::value_objects::Severity;

use super::base::AgentBase;
use super::AnalysisAgent;

const SYSTEM_PROMPT: &str = "You are a senior engineer reviewing a codebase's structure and \
conventions. Point out layout problems, inconsistent naming, and missing project scaffolding. \
Respond with a JSON array of objects: category, severity (Info|Low|Medium|High|Critical), \
description, explanation, filePath, symbol, lineRange {start, end}.";

const MAX_NESTING_DEPTH: usize = 8;

/// Project layout and convention checks.
pub struct StructureAgent {
    base: AgentBase,
}

impl StructureAgent {
    /// Construct the agent from its shared base.
    #[must_use]
    pub fn new(base: AgentBase) -> Self {
        Self { base }
    }

    fn rule_based_findings(&self, project: &Project, working_dir: &Path, files: &[super::ReviewFile]) -> Vec<Finding> {
        let mut findings = Vec::new();

        if !working_dir.join("README.md").exists() && !working_dir.join("README").exists() {
            findings.push(Finding::project_level(
                project.id,
                AgentKind::Structure,
                "MissingDocumentation",
                Severity::Low,
                "no README found at the project root",
                "a README helps new contributors orient themselves in the codebase",
            ));
        }

        for file in files {
            let depth = file.relative_path.matches('/').count();
            if depth > MAX_NESTING_DEPTH {
                findings.push(Finding::project_level(
                    project.id,
                    AgentKind::Structure,
                    "DeepNesting",
                    Severity::Info,
                    format!("{} is nested {depth} directories deep", file.relative_path),
                    "deeply nested files are harder to navigate and often signal unclear module boundaries",
                ));
            }
            if findings.len() >= self.base.config.max_rule_findings {
                break;
            }
        }

        findings.truncate(self.base.config.max_rule_findings);
        findings
    }
}

#[async_trait]
impl AnalysisAgent for StructureAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::Structure
    }

    async fn analyze(
        &self,
        project: &Project,
        working_dir: &Path,
        cancel: CancellationToken,
    ) -> Result<Vec<Finding>> {
        if cancel.is_cancelled() {
            return Err(Error::cancelled("structure agent cancelled before start"));
        }
        let files = self.base.enumerate_files(working_dir).await?;
        let mut findings = self.rule_based_findings(project, working_dir, &files);

        if cancel.is_cancelled() {
            return Err(Error::cancelled("structure agent cancelled before model review"));
        }
        let raw = self
            .base
            .review(SYSTEM_PROMPT.to_string(), &project.name, &files)
            .await?;
        findings.extend(self.base.parse_findings(project.id, AgentKind::Structure, &raw));
        Ok(findings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn flags_missing_readme() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("main.rs"), "fn main() {}").unwrap();
        let agent = StructureAgent::new(AgentBase::new(
            Arc::new(crate::test_support::NullModelService),
            Arc::new(crate::test_support::NullMetricsService),
            super::super::AgentConfig::default(),
        ));
        let project = Project::new("demo", None, aar_domain::value_objects::OwnerId::new());
        let findings = agent
            .analyze(&project, dir.path(), CancellationToken::new())
            .await
            .unwrap();
        assert!(findings.iter().any(|f| f.category == "MissingDocumentation"));
    }
}
