//! Shared agent behavior: file enumeration, prompt assembly, and parsing of
//! model output into `Finding`s.

use std::path::Path;
use std::sync::Arc;

use serde_json::Value;

use aar_domain::entities::{AgentKind, Anchor, Finding, LineRange};
use aar_domain::error::Result;
use aar_domain::ports::{CodeMetricsService, ModelRequest, ModelService};
use aar_domain::value_objects::{ProjectId, Severity};
use aar_secure_extract::denylist::contains_dependency_segment;

use super::lenient::{extract_json_span, lenient_string};

/// Source-file extensions the agent runtime reviews by default.
pub const DEFAULT_REVIEWED_EXTENSIONS: &[&str] = &[
    "rs", "py", "js", "ts", "tsx", "jsx", "java", "go", "rb", "php", "c", "h", "cpp", "cc", "hpp",
    "cs", "kt", "swift",
];

/// Tunables shared by every concrete agent.
#[derive(Debug, Clone)]
pub struct AgentConfig {
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

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            reviewed_extensions: DEFAULT_REVIEWED_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            max_lines: 500,
            max_file_size: 1024 * 1024,
            max_tokens: 2000,
            temperature: 0.2,
            max_rule_findings: 50,
        }
    }
}

/// A file enumerated for review: its relative path and (possibly truncated) contents.
pub struct ReviewFile {
    /// Path relative to `working_dir`, forward-slash separated.
    pub relative_path: String,
    /// File contents, truncated to `max_lines` with a trailing marker if cut.
    pub contents: String,
}

/// Collaborators and tunables every concrete agent shares.
pub struct AgentBase {
    /// Model-call facade.
    pub model: Arc<dyn ModelService>,
    /// Per-file complexity collaborator.
    pub metrics: Arc<dyn CodeMetricsService>,
    /// Shared tunables.
    pub config: AgentConfig,
}

impl AgentBase {
    /// Construct a base from its collaborators.
    #[must_use]
    pub fn new(model: Arc<dyn ModelService>, metrics: Arc<dyn CodeMetricsService>, config: AgentConfig) -> Self {
        Self { model, metrics, config }
    }

    /// Walk `working_dir`, collecting reviewable files under the configured
    /// extension set, skipping dependency-folder segments and oversized files.
    pub async fn enumerate_files(&self, working_dir: &Path) -> Result<Vec<ReviewFile>> {
        let mut files = Vec::new();
        for entry in walkdir::WalkDir::new(working_dir)
            .into_iter()
            .filter_map(std::result::Result::ok)
            .filter(|e| e.file_type().is_file())
        {
            let path = entry.path();
            let relative = path.strip_prefix(working_dir).unwrap_or(path);
            if contains_dependency_segment(relative) {
                continue;
            }
            let ext = path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or_default()
                .to_ascii_lowercase();
            if !self.config.reviewed_extensions.iter().any(|e| e == &ext) {
                continue;
            }
            let Ok(meta) = tokio::fs::metadata(path).await else {
                continue;
            };
            if meta.len() > self.config.max_file_size {
                continue;
            }
            let Ok(raw) = tokio::fs::read_to_string(path).await else {
                continue;
            };
            let contents = truncate_lines(&raw, self.config.max_lines);
            files.push(ReviewFile {
                relative_path: relative.to_string_lossy().replace('\\', "/"),
                contents,
            });
        }
        files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
        Ok(files)
    }

    /// Build and submit a review prompt, returning the raw model response text.
    pub async fn review(
        &self,
        system_prompt: String,
        project_name: &str,
        files: &[ReviewFile],
    ) -> Result<String> {
        let mut user_prompt = format!("Project: {project_name}\nFiles:\n");
        for file in files {
            user_prompt.push_str(&format!("\n--- {} ---\n{}\n", file.relative_path, file.contents));
        }
        let response = self
            .model
            .complete(ModelRequest {
                system_prompt,
                user_prompt,
                max_tokens: self.config.max_tokens,
                temperature: self.config.temperature,
            })
            .await?;
        Ok(response.content)
    }

    /// Parse a model response into findings using the lenient decoder.
    /// Malformed or unparseable responses yield an empty list rather than an error.
    #[must_use]
    pub fn parse_findings(
        &self,
        project_id: ProjectId,
        agent_kind: AgentKind,
        raw_response: &str,
    ) -> Vec<Finding> {
        let Some(span) = extract_json_span(raw_response) else {
            return Vec::new();
        };
        let Ok(value) = serde_json::from_str::<Value>(span) else {
            return Vec::new();
        };
        let items: Vec<Value> = match value {
            Value::Array(items) => items,
            other @ Value::Object(_) => vec![other],
            _ => Vec::new(),
        };
        items
            .iter()
            .map(|item| finding_from_value(project_id, agent_kind, item))
            .collect()
    }
}

fn finding_from_value(project_id: ProjectId, agent_kind: AgentKind, item: &Value) -> Finding {
    let get = |key: &str| item.get(key).and_then(lenient_string);
    let category = get("category").unwrap_or_else(|| "Uncategorized".to_string());
    let severity = get("severity").map_or(Severity::Info, |s| Severity::parse_lenient(&s));
    let description = get("description").unwrap_or_default();
    let explanation = get("explanation").unwrap_or_default();
    let file_path = get("filePath");
    let symbol = get("symbol");
    let line_start = item
        .get("lineRange")
        .and_then(|lr| lr.get("start"))
        .and_then(Value::as_u64)
        .map(|n| n as u32);
    let line_end = item
        .get("lineRange")
        .and_then(|lr| lr.get("end"))
        .and_then(Value::as_u64)
        .map(|n| n as u32)
        .or(line_start);

    let anchor = Anchor {
        file_path: file_path.clone(),
        line_range: line_start.map(|start| LineRange {
            start,
            end: line_end.unwrap_or(start),
        }),
        symbol: symbol.clone(),
    };

    let mut finding = if anchor.has_evidence() {
        Finding::anchored(project_id, agent_kind, category, severity, anchor, description, explanation)
            .unwrap_or_else(|_| {
                Finding::project_level(project_id, agent_kind, "Uncategorized", severity, "unparseable finding", "")
            })
    } else {
        Finding::project_level(project_id, agent_kind, category, severity, description, explanation)
    };
    finding.suggested_fix = get("suggestedFix");
    finding.original_snippet = get("originalSnippet");
    finding.fixed_snippet = get("fixedSnippet");
    finding
}

fn truncate_lines(raw: &str, max_lines: usize) -> String {
    let mut lines = raw.lines().take(max_lines + 1).collect::<Vec<_>>();
    if lines.len() > max_lines {
        lines.truncate(max_lines);
        let mut joined = lines.join("\n");
        joined.push_str("\n… (truncated)");
        joined
    } else {
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_array_of_findings_leniently() {
        let base = AgentBase::new(
            Arc::new(crate::test_support::NullModelService),
            Arc::new(crate::test_support::NullMetricsService),
            AgentConfig::default(),
        );
        let raw = r#"[{"category":"Smell","severity":"High","description":123,"explanation":null,"filePath":"src/a.rs"}]"#;
        let findings = base.parse_findings(ProjectId::new(), AgentKind::CodeQuality, raw);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].description, "123");
        assert_eq!(findings[0].severity, Severity::High);
        assert!(findings[0].is_persistable());
    }

    #[test]
    fn finding_with_no_anchor_becomes_project_level() {
        let base = AgentBase::new(
            Arc::new(crate::test_support::NullModelService),
            Arc::new(crate::test_support::NullMetricsService),
            AgentConfig::default(),
        );
        let raw = r#"[{"category":"Process","severity":"Low","description":"no tests dir","explanation":"e"}]"#;
        let findings = base.parse_findings(ProjectId::new(), AgentKind::Structure, raw);
        assert_eq!(findings.len(), 1);
        assert!(!findings[0].is_persistable());
    }

    #[test]
    fn truncates_oversize_files_with_marker() {
        let body = (0..10).map(|i| format!("line{i}")).collect::<Vec<_>>().join("\n");
        let truncated = truncate_lines(&body, 3);
        assert!(truncated.ends_with("(truncated)"));
    }
}
