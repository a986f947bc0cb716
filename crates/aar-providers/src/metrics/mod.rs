//! [`aar_domain::ports::CodeMetricsService`] adapters.

mod heuristic;

pub use heuristic::HeuristicCodeMetricsService;
