//! Finding severity.

use serde::{Deserialize, Serialize};

/// Severity of a `Finding`, ordered from most to least urgent.
///
/// `Ord` is derived in declaration order, which matches the orchestrator's
/// "severity descending" sort requirement when iterated in reverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Informational only; no action implied.
    Info,
    /// Minor issue, low priority.
    Low,
    /// Should be addressed.
    Medium,
    /// Should be addressed soon.
    High,
    /// Must be addressed; blocks confidence in the codebase.
    Critical,
}

impl Severity {
    /// Parse a model- or rule-supplied severity string case-insensitively.
    ///
    /// Unknown values default to [`Severity::Info`], per the agent runtime's
    /// lenient-decoding contract — a model's severity drift must never fail
    /// the whole finding.
    #[must_use]
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "critical" => Self::Critical,
            "high" => Self::High,
            "medium" | "moderate" => Self::Medium,
            "low" => Self::Low,
            _ => Self::Info,
        }
    }

    /// All severities, ordered most to least urgent (for report summaries).
    #[must_use]
    pub fn all_descending() -> [Self; 5] {
        [
            Self::Critical,
            Self::High,
            Self::Medium,
            Self::Low,
            Self::Info,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Critical", Severity::Critical)]
    #[case("HIGH", Severity::High)]
    #[case("moderate", Severity::Medium)]
    #[case("low", Severity::Low)]
    #[case("bogus", Severity::Info)]
    #[case("", Severity::Info)]
    fn parses_case_insensitively_and_defaults_to_info(#[case] raw: &str, #[case] expected: Severity) {
        assert_eq!(Severity::parse_lenient(raw), expected);
    }

    #[test]
    fn orders_critical_above_info() {
        assert!(Severity::Critical > Severity::Info);
        assert!(Severity::High > Severity::Medium);
    }
}
