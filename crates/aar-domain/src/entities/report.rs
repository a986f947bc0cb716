//! Report entity: the aggregated outcome of one analysis run.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::finding::Finding;
use crate::value_objects::{ProjectId, ReportId, Severity};

/// Tunable weights for the health-score formula.
///
/// `spec.md` §9 Open Questions notes these constants are inferred from usage
/// patterns, not documented in the original source, and should be treated as
/// tunable defaults rather than hardcoded literals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HealthScoreWeights {
    /// Penalty per Critical finding.
    pub critical: f64,
    /// Penalty per High finding.
    pub high: f64,
    /// Penalty per Medium finding.
    pub medium: f64,
    /// Penalty per Low finding.
    pub low: f64,
}

impl Default for HealthScoreWeights {
    fn default() -> Self {
        Self {
            critical: 10.0,
            high: 5.0,
            medium: 2.0,
            low: 0.5,
        }
    }
}

impl HealthScoreWeights {
    /// Derive the health score from severity counts, clamped to `[0, 100]`
    /// and rounded to one decimal place.
    #[must_use]
    pub fn score(&self, counts: &BTreeMap<Severity, usize>) -> f64 {
        let penalty = self.critical * *counts.get(&Severity::Critical).unwrap_or(&0) as f64
            + self.high * *counts.get(&Severity::High).unwrap_or(&0) as f64
            + self.medium * *counts.get(&Severity::Medium).unwrap_or(&0) as f64
            + self.low * *counts.get(&Severity::Low).unwrap_or(&0) as f64;
        let raw = (100.0 - penalty).max(0.0);
        (raw * 10.0).round() / 10.0
    }
}

/// The aggregated outcome of one successful analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Generated identifier.
    pub id: ReportId,
    /// Owning project. One Report per successful analysis; a re-analysis
    /// supersedes the prior one.
    pub project_id: ProjectId,
    /// Derived health score in `[0, 100]`.
    pub health_score: f64,
    /// Count of findings per severity.
    pub counts: BTreeMap<Severity, usize>,
    /// Human-readable summary, length proportional to total findings.
    pub summary: String,
    /// When this report was created.
    pub created_at: DateTime<Utc>,
}

impl Report {
    /// Build a report from a final (deduplicated, sorted) finding list.
    ///
    /// `findings` must already satisfy `spec.md` §4.7's invariants: each
    /// finding is persistable (anchored), the list is deduplicated, and
    /// within-file ordering is `(severity desc, lineRange.start asc)`.
    #[must_use]
    pub fn aggregate(
        project_id: ProjectId,
        findings: &[Finding],
        weights: &HealthScoreWeights,
    ) -> Self {
        let mut counts: BTreeMap<Severity, usize> =
            Severity::all_descending().into_iter().map(|s| (s, 0)).collect();
        for f in findings {
            *counts.entry(f.severity).or_insert(0) += 1;
        }
        let health_score = weights.score(&counts);
        let summary = Self::compose_summary(findings.len(), &counts);
        Self {
            id: ReportId::new(),
            project_id,
            health_score,
            counts,
            summary,
            created_at: Utc::now(),
        }
    }

    fn compose_summary(total: usize, counts: &BTreeMap<Severity, usize>) -> String {
        if total == 0 {
            return "No findings were produced; the codebase looks clean for the checks run."
                .to_string();
        }
        let critical = counts.get(&Severity::Critical).copied().unwrap_or(0);
        let high = counts.get(&Severity::High).copied().unwrap_or(0);
        let mut summary = format!(
            "Analysis produced {total} finding(s) across the agent roster: {critical} critical, {high} high."
        );
        if total > 20 {
            summary.push_str(
                " The volume of findings suggests focusing remediation on critical and high \
                 severity items first before addressing lower-priority smells.",
            );
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_clamps_at_zero() {
        let mut counts = BTreeMap::new();
        counts.insert(Severity::Critical, 20);
        let weights = HealthScoreWeights::default();
        assert_eq!(weights.score(&counts), 0.0);
    }

    #[test]
    fn score_with_no_findings_is_perfect() {
        let counts = BTreeMap::new();
        let weights = HealthScoreWeights::default();
        assert_eq!(weights.score(&counts), 100.0);
    }

    #[test]
    fn counts_equal_finding_cardinality_per_severity() {
        let project_id = ProjectId::new();
        let f1 = Finding::project_level(
            project_id,
            crate::entities::finding::AgentKind::Security,
            "cat",
            Severity::High,
            "d",
            "e",
        );
        let report = Report::aggregate(project_id, std::slice::from_ref(&f1), &HealthScoreWeights::default());
        assert_eq!(report.counts[&Severity::High], 1);
        assert_eq!(report.counts[&Severity::Critical], 0);
    }
}
