//! Configuration, logging, and dependency wiring that turns the application
//! layer's traits into a runnable process: `AppConfig`/`ConfigLoader` for
//! YAML-driven settings, `init_logging` for tracing setup, and `build_context`
//! for assembling the full provider graph.

pub mod config;
pub mod di;
pub mod logging;

pub use config::{AppConfig, ConfigLoader};
pub use di::{build_context, AppContext};
