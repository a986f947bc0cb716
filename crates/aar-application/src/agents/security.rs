//! Security agent: security-relevant observations.

use std::path::Path;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use aar_domain::entities::{AgentKind, Anchor, Finding, LineRange, Project};
use aar_domain::error::{Error, Result};
use aar_domain::value_objects::Severity;

use super::base::{AgentBase, ReviewFile};
use super::AnalysisAgent;

const SYSTEM_PROMPT: &str = "You are a security engineer reviewing code for vulnerabilities: \
injection, hardcoded credentials, swallowed errors, unsafe deserialization, missing input \
validation. Respond with a JSON array of objects: category, severity (Info|Low|Medium|High| \
Critical), description, explanation, filePath, symbol, lineRange {start, end}.";

const SECRET_MARKERS: &[&str] = &["password=", "api_key=", "apikey=", "secret=", "private_key="];
const EMPTY_CATCH_MARKERS: &[&str] = &["catch {}", "catch (e) {}", "except: pass", "except Exception: pass"];

/// Security-relevant observations.
pub struct SecurityAgent {
    base: AgentBase,
}

impl SecurityAgent {
    /// Construct the agent from its shared base.
    #[must_use]
    pub fn new(base: AgentBase) -> Self {
        Self { base }
    }

    fn rule_based_findings(&self, project: &Project, files: &[ReviewFile]) -> Vec<Finding> {
        let mut findings = Vec::new();

        for file in files {
            for (idx, line) in file.contents.lines().enumerate() {
                if findings.len() >= self.base.config.max_rule_findings {
                    return findings;
                }
                let lower = line.to_ascii_lowercase();
                if SECRET_MARKERS.iter().any(|marker| lower.contains(marker)) {
                    findings.push(line_finding(
                        project,
                        "HardcodedCredential",
                        Severity::Critical,
                        &file.relative_path,
                        idx as u32 + 1,
                        format!("possible hardcoded credential in {}", file.relative_path),
                        "credentials committed to source are exposed to anyone with repository access",
                    ));
                }
                if EMPTY_CATCH_MARKERS.iter().any(|marker| lower.contains(&marker.to_ascii_lowercase())) {
                    findings.push(line_finding(
                        project,
                        "SwallowedError",
                        Severity::Medium,
                        &file.relative_path,
                        idx as u32 + 1,
                        format!("empty error handler in {}", file.relative_path),
                        "silently discarding errors hides failures that should surface to callers or logs",
                    ));
                }
            }
        }

        findings.truncate(self.base.config.max_rule_findings);
        findings
    }
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
    Finding::anchored(project.id, AgentKind::Security, category, severity, anchor, description, explanation)
        .unwrap_or_else(|_| Finding::project_level(project.id, AgentKind::Security, category, severity, description, explanation))
}

#[async_trait]
impl AnalysisAgent for SecurityAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::Security
    }

    async fn analyze(
        &self,
        project: &Project,
        working_dir: &Path,
        cancel: CancellationToken,
    ) -> Result<Vec<Finding>> {
        if cancel.is_cancelled() {
            return Err(Error::cancelled("security agent cancelled before start"));
        }
        let files = self.base.enumerate_files(working_dir).await?;
        let mut findings = self.rule_based_findings(project, &files);

        if cancel.is_cancelled() {
            return Err(Error::cancelled("security agent cancelled before model review"));
        }
        let raw = self
            .base
            .review(SYSTEM_PROMPT.to_string(), &project.name, &files)
            .await?;
        findings.extend(self.base.parse_findings(project.id, AgentKind::Security, &raw));
        Ok(findings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn flags_hardcoded_credentials() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.rs"), "let api_key=\"sk-abc123\";\n").unwrap();
        let agent = SecurityAgent::new(AgentBase::new(
            Arc::new(crate::test_support::NullModelService),
            Arc::new(crate::test_support::NullMetricsService),
            super::super::AgentConfig::default(),
        ));
        let project = Project::new("demo", None, aar_domain::value_objects::OwnerId::new());
        let findings = agent
            .analyze(&project, dir.path(), CancellationToken::new())
            .await
            .unwrap();
        assert!(findings.iter().any(|f| f.category == "HardcodedCredential"));
    }
}
