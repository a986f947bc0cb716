//! Concrete adapters for every port defined in `aar_domain::ports`.
//!
//! Each submodule owns one port's implementations; nothing here knows about
//! application-level orchestration (that lives in `aar-application`).

pub mod blob;
pub mod checkpoint;
pub mod metrics;
pub mod model;
pub mod progress;
pub mod queue;
pub mod remote;
pub mod repositories;
