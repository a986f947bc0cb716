//! Core domain crate: entities, value objects, ports, and the error taxonomy
//! shared by every other crate in the workspace.
//!
//! This crate has no knowledge of HTTP, SQL, object storage, or any
//! particular LLM provider — those live behind the traits in [`ports`] and
//! are implemented in `aar-providers` and `aar-infrastructure`.

pub mod entities;
pub mod error;
pub mod events;
pub mod ports;
pub mod value_objects;

pub use error::{Error, ErrorKind, Result};
