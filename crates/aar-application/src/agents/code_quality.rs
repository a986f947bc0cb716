//! Code quality agent: general smells and maintainability issues.

use std::path::Path;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use aar_domain::entities::{AgentKind, Anchor, Finding, LineRange, Project};
use aar_domain::error::{Error, Result};
use aar_domain::value_objects::Severity;

use super::base::{AgentBase, ReviewFile};
use super::AnalysisAgent;

const SYSTEM_PROMPT: &str = "You are a senior engineer reviewing code quality. Point out smells: \
duplication, excessive complexity, unclear naming, dead code, magic numbers. Respond with a JSON \
array of objects: category, severity (Info|Low|Medium|High|Critical), description, explanation, \
filePath, symbol, lineRange {start, end}.";

const LONG_FILE_LINES: usize = 800;
const TODO_MARKERS: &[&str] = &["TODO", "FIXME", "XXX"];

/// General code-quality smells.
pub struct CodeQualityAgent {
    base: AgentBase,
}

impl CodeQualityAgent {
    /// Construct the agent from its shared base.
    #[must_use]
    pub fn new(base: AgentBase) -> Self {
        Self { base }
    }

    async fn rule_based_findings(&self, project: &Project, files: &[ReviewFile]) -> Vec<Finding> {
        let mut findings = Vec::new();

        for file in files {
            if findings.len() >= self.base.config.max_rule_findings {
                break;
            }
            let line_count = file.contents.lines().count();
            if line_count > LONG_FILE_LINES {
                findings.push(file_finding(
                    project,
                    "ExcessiveFileLength",
                    Severity::Medium,
                    &file.relative_path,
                    format!("{} is {line_count} lines long", file.relative_path),
                    "large files tend to accumulate unrelated responsibilities and resist review",
                ));
            }

            for (idx, line) in file.contents.lines().enumerate() {
                if findings.len() >= self.base.config.max_rule_findings {
                    break;
                }
                if TODO_MARKERS.iter().any(|marker| line.contains(marker)) {
                    findings.push(line_finding(
                        project,
                        "UnresolvedMarker",
                        Severity::Info,
                        &file.relative_path,
                        idx as u32 + 1,
                        format!("unresolved marker in {}", file.relative_path),
                        line.trim(),
                    ));
                }
            }

            let extension = file.relative_path.rsplit('.').next().unwrap_or_default();
            let metrics = self.base.metrics.metrics_for(extension, &file.contents).await;
            if metrics.cyclomatic_complexity > 20 {
                findings.push(file_finding(
                    project,
                    "HighComplexity",
                    Severity::High,
                    &file.relative_path,
                    format!(
                        "{} has an estimated cyclomatic complexity of {}",
                        file.relative_path, metrics.cyclomatic_complexity
                    ),
                    "highly branchy files are hard to test exhaustively and prone to regressions",
                ));
            }
        }

        findings.truncate(self.base.config.max_rule_findings);
        findings
    }
}

fn file_finding(
    project: &Project,
    category: &str,
    severity: Severity,
    file_path: &str,
    description: impl Into<String>,
    explanation: impl Into<String>,
) -> Finding {
    let anchor = Anchor {
        file_path: Some(file_path.to_string()),
        line_range: None,
        symbol: None,
    };
    Finding::anchored(project.id, AgentKind::CodeQuality, category, severity, anchor, description, explanation)
        .unwrap_or_else(|_| Finding::project_level(project.id, AgentKind::CodeQuality, category, severity, description, explanation))
}

fn line_finding(
    project: &Project,
    category: &str,
    severity: Severity,
    file_path: &str,
    line: u32,
    description: impl Into<String>,
    explanation: impl Into<String>,
) -> Finding {
    let anchor = Anchor {
        file_path: Some(file_path.to_string()),
        line_range: Some(LineRange { start: line, end: line }),
        symbol: None,
    };
    Finding::anchored(project.id, AgentKind::CodeQuality, category, severity, anchor, description, explanation)
        .unwrap_or_else(|_| Finding::project_level(project.id, AgentKind::CodeQuality, category, severity, description, explanation))
}

#[async_trait]
impl AnalysisAgent for CodeQualityAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::CodeQuality
    }

    async fn analyze(
        &self,
        project: &Project,
        working_dir: &Path,
        cancel: CancellationToken,
    ) -> Result<Vec<Finding>> {
        if cancel.is_cancelled() {
            return Err(Error::cancelled("code quality agent cancelled before start"));
        }
        let files = self.base.enumerate_files(working_dir).await?;
        let mut findings = self.rule_based_findings(project, &files).await;

        if cancel.is_cancelled() {
            return Err(Error::cancelled("code quality agent cancelled before model review"));
        }
        let raw = self
            .base
            .review(SYSTEM_PROMPT.to_string(), &project.name, &files)
            .await?;
        findings.extend(self.base.parse_findings(project.id, AgentKind::CodeQuality, &raw));
        Ok(findings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn flags_unresolved_markers() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.rs"), "fn main() {}\n// TODO: fix this\n").unwrap();
        let agent = CodeQualityAgent::new(AgentBase::new(
            Arc::new(crate::test_support::NullModelService),
            Arc::new(crate::test_support::NullMetricsService),
            super::super::AgentConfig::default(),
        ));
        let project = Project::new("demo", None, aar_domain::value_objects::OwnerId::new());
        let findings = agent
            .analyze(&project, dir.path(), CancellationToken::new())
            .await
            .unwrap();
        assert!(findings.iter().any(|f| f.category == "UnresolvedMarker"));
    }
}
