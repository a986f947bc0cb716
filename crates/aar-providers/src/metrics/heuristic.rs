//! Heuristic, language-agnostic [`CodeMetricsService`].
//!
//! No real parser is in scope (the spec treats source-code parsing depth as
//! out of scope beyond line-oriented heuristics); complexity is approximated
//! by counting branch keywords, which is adequate for a relative health signal.

use async_trait::async_trait;

use aar_domain::ports::{CodeMetricsService, FileMetrics};

const BRANCH_KEYWORDS: &[&str] = &[
    "if ", "else if", "for ", "while ", "case ", "catch ", "match ", "elif ", "switch ", "&&", "||", "?",
];

/// Estimates complexity by counting branch-introducing tokens per line.
#[derive(Default)]
pub struct HeuristicCodeMetricsService;

impl HeuristicCodeMetricsService {
    /// Construct the service.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CodeMetricsService for HeuristicCodeMetricsService {
    async fn metrics_for(&self, extension: &str, contents: &str) -> FileMetrics {
        let lines_of_code = contents.lines().filter(|l| !l.trim().is_empty()).count() as u32;
        let mut branches = 0_u32;
        let mut methods = 0_u32;
        let method_keyword = method_keyword_for(extension);
        for line in contents.lines() {
            let trimmed = line.trim_start();
            for keyword in BRANCH_KEYWORDS {
                if line.contains(keyword) {
                    branches += 1;
                }
            }
            if trimmed.starts_with(method_keyword) {
                methods += 1;
            }
        }
        FileMetrics {
            cyclomatic_complexity: branches + 1,
            lines_of_code,
            method_count: methods,
        }
    }
}

fn method_keyword_for(extension: &str) -> &'static str {
    match extension {
        "rs" => "fn ",
        "py" => "def ",
        "go" => "func ",
        "js" | "ts" | "jsx" | "tsx" => "function ",
        _ => "fn ",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn counts_branches_and_methods() {
        let service = HeuristicCodeMetricsService::new();
        let src = "fn main() {\n    if true {\n        println!(\"hi\");\n    }\n}\n";
        let metrics = service.metrics_for("rs", src).await;
        assert_eq!(metrics.method_count, 1);
        assert!(metrics.cyclomatic_complexity >= 2);
        assert_eq!(metrics.lines_of_code, 5);
    }
}
