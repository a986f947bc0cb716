//! Finding and the roster of analysis agent kinds.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::value_objects::{FindingId, ProjectId, ReportId, Severity};

/// The closed roster of analysis agents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentKind {
    /// Project layout and convention checks.
    Structure,
    /// General code-quality smells.
    CodeQuality,
    /// Security-relevant observations.
    Security,
    /// Higher-level architecture and design feedback.
    ArchitectureAdvisor,
}

impl AgentKind {
    /// The fixed roster, in a stable order.
    #[must_use]
    pub fn roster() -> [Self; 4] {
        [
            Self::Structure,
            Self::CodeQuality,
            Self::Security,
            Self::ArchitectureAdvisor,
        ]
    }

    /// Short, stable label used in prompts and logs.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Structure => "structure",
            Self::CodeQuality => "code_quality",
            Self::Security => "security",
            Self::ArchitectureAdvisor => "architecture_advisor",
        }
    }
}

/// An inclusive line range within a file, 1-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRange {
    /// First line of the range.
    pub start: u32,
    /// Last line of the range.
    pub end: u32,
}

/// Where a finding is anchored in the codebase: either a file path, a
/// symbol, or both. A finding with neither is rejected at the agent
/// boundary before it can be persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Anchor {
    /// File path relative to the project root, if known.
    pub file_path: Option<String>,
    /// Line range within the file, if known.
    pub line_range: Option<LineRange>,
    /// Symbol name (function, class, etc.), if known.
    pub symbol: Option<String>,
}

impl Anchor {
    /// An anchor with neither file path nor symbol — only valid for
    /// project-level findings constructed via [`Finding::project_level`].
    #[must_use]
    pub fn none() -> Self {
        Self {
            file_path: None,
            line_range: None,
            symbol: None,
        }
    }

    /// Whether this anchor carries enough evidence to be persisted.
    #[must_use]
    pub fn has_evidence(&self) -> bool {
        self.file_path.is_some() || self.symbol.is_some()
    }
}

/// A single review observation produced by an agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    /// Generated identifier.
    pub id: FindingId,
    /// Owning project.
    pub project_id: ProjectId,
    /// Owning report, once attached (absent while still in-flight).
    pub report_id: Option<ReportId>,
    /// Which agent produced this finding.
    pub agent_kind: AgentKind,
    /// Free-text category label (agent-defined taxonomy, e.g. "Smell").
    pub category: String,
    /// Severity.
    pub severity: Severity,
    /// Where this finding is anchored in the codebase.
    pub anchor: Anchor,
    /// Short description of the observation.
    pub description: String,
    /// Longer explanation of why this matters.
    pub explanation: String,
    /// Suggested fix, if the agent proposed one.
    pub suggested_fix: Option<String>,
    /// Original code snippet, if applicable.
    pub original_snippet: Option<String>,
    /// Proposed fixed snippet, if applicable.
    pub fixed_snippet: Option<String>,
    /// Model-supplied quality estimate in `[0, 1]`; `None` if unknown.
    pub confidence: Option<f32>,
}

impl Finding {
    /// Construct a finding anchored to a file/symbol. Fails if the anchor
    /// carries no evidence, per the "anchor required" persistence invariant.
    ///
    /// # Errors
    /// Returns [`Error::Validation`] if `anchor.has_evidence()` is false.
    #[allow(clippy::too_many_arguments)]
    pub fn anchored(
        project_id: ProjectId,
        agent_kind: AgentKind,
        category: impl Into<String>,
        severity: Severity,
        anchor: Anchor,
        description: impl Into<String>,
        explanation: impl Into<String>,
    ) -> Result<Self> {
        if !anchor.has_evidence() {
            return Err(Error::validation(
                "finding has neither file path nor symbol; use Finding::project_level instead",
            ));
        }
        Ok(Self::new_unchecked(
            project_id,
            agent_kind,
            category,
            severity,
            anchor,
            description,
            explanation,
        ))
    }

    /// Construct a project-level finding with no anchor.
    ///
    /// This is the "alternate constructor" `spec.md` §4.6 describes for
    /// model output that carries no usable anchor. Project-level findings
    /// are valid in memory and over the Progress Bus, but the Orchestrator's
    /// persistence step (`spec.md`'s tightened invariant) drops them before
    /// they reach a `Report` unless they gain an anchor upstream.
    pub fn project_level(
        project_id: ProjectId,
        agent_kind: AgentKind,
        category: impl Into<String>,
        severity: Severity,
        description: impl Into<String>,
        explanation: impl Into<String>,
    ) -> Self {
        Self::new_unchecked(
            project_id,
            agent_kind,
            category,
            severity,
            Anchor::none(),
            description,
            explanation,
        )
    }

    fn new_unchecked(
        project_id: ProjectId,
        agent_kind: AgentKind,
        category: impl Into<String>,
        severity: Severity,
        anchor: Anchor,
        description: impl Into<String>,
        explanation: impl Into<String>,
    ) -> Self {
        Self {
            id: FindingId::new(),
            project_id,
            report_id: None,
            agent_kind,
            category: category.into(),
            severity,
            anchor,
            description: description.into(),
            explanation: explanation.into(),
            suggested_fix: None,
            original_snippet: None,
            fixed_snippet: None,
            confidence: None,
        }
    }

    /// Whether this finding carries enough evidence to be persisted to a Report.
    #[must_use]
    pub fn is_persistable(&self) -> bool {
        self.anchor.has_evidence()
    }

    /// The dedup key per `spec.md` §4.7: `(agentKind, category, severity,
    /// filePath, lineRange.start, symbol)`.
    #[must_use]
    pub fn dedup_key(&self) -> (AgentKind, String, Severity, Option<String>, Option<u32>, Option<String>) {
        (
            self.agent_kind,
            self.category.clone(),
            self.severity,
            self.anchor.file_path.clone(),
            self.anchor.line_range.map(|r| r.start),
            self.anchor.symbol.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchored_requires_evidence() {
        let err = Finding::anchored(
            ProjectId::new(),
            AgentKind::CodeQuality,
            "Smell",
            Severity::Low,
            Anchor::none(),
            "desc",
            "expl",
        )
        .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Validation);
    }

    #[test]
    fn project_level_is_not_persistable() {
        let f = Finding::project_level(
            ProjectId::new(),
            AgentKind::Structure,
            "Missing",
            Severity::Info,
            "no tests dir",
            "explanation",
        );
        assert!(!f.is_persistable());
    }
}
