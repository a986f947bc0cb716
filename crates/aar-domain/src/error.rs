//! Error taxonomy for the analysis pipeline.
//!
//! Variants map 1:1 onto the kinds described in the design's error-handling
//! section: validation and security-policy errors are never retried,
//! transient-external errors drive queue-lease retry, fatal-external and
//! internal errors fail the project outright, and cancellation propagates as
//! transient unless the process is shutting down.

use thiserror::Error;

/// Result type alias used throughout the pipeline.
pub type Result<T> = std::result::Result<T, Error>;

/// Error kind, used to decide retry/terminal behavior at the Worker Loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input; never retried.
    Validation,
    /// Path traversal, disallowed entry, quota exceeded, virus hit; never retried, audited.
    SecurityPolicy,
    /// Queue/blob timeout, model rate limit; retried via lease expiry.
    TransientExternal,
    /// Invalid archive, unreadable blob; fails the project.
    FatalExternal,
    /// Logic invariant broken; fails the project.
    Internal,
    /// Cooperative cancellation; transient unless the process is shutting down.
    Cancellation,
}

/// Main error type for the analysis pipeline core.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error.
    #[error("I/O error: {message}")]
    Io {
        /// Human-readable description.
        message: String,
        /// Underlying error, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// JSON parsing or serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A submission failed validation (malformed name, bad content-type, oversize, etc).
    #[error("validation error: {message}")]
    Validation {
        /// Description of what failed validation.
        message: String,
    },

    /// A security policy was violated (path traversal, disallowed type, quota, virus hit).
    #[error("security policy violation [{code}]: {message}")]
    SecurityPolicy {
        /// Machine-readable policy code, e.g. `PATH_TRAVERSAL`.
        code: &'static str,
        /// Human-readable description.
        message: String,
    },

    /// A transient failure in an external collaborator (queue, blob store, model service).
    #[error("transient external error: {message}")]
    TransientExternal {
        /// Human-readable description.
        message: String,
        /// Underlying error, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An unrecoverable failure in an external collaborator (invalid archive, unreadable blob).
    #[error("fatal external error: {message}")]
    FatalExternal {
        /// Human-readable description.
        message: String,
        /// Underlying error, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Resource not found.
    #[error("not found: {resource}")]
    NotFound {
        /// The resource that was not found.
        resource: String,
    },

    /// Illegal status transition (e.g. starting analysis on a project that is already analyzing).
    #[error("conflict: {message}")]
    Conflict {
        /// Description of the conflicting transition.
        message: String,
    },

    /// A broken internal invariant.
    #[error("internal error: {message}")]
    Internal {
        /// Human-readable description.
        message: String,
    },

    /// Cooperative cancellation was observed.
    #[error("operation cancelled: {message}")]
    Cancelled {
        /// Context for where cancellation was observed.
        message: String,
    },

    /// No configuration file could be found, or an explicit path didn't exist.
    #[error("configuration missing: {0}")]
    ConfigMissing(String),

    /// A single configuration key failed validation.
    #[error("invalid config value for {key}: {message}")]
    ConfigInvalid {
        /// Dotted path of the offending key, e.g. `orchestrator.max_concurrency`.
        key: String,
        /// Human-readable description.
        message: String,
    },

    /// Configuration could not be loaded or parsed.
    #[error("configuration error: {message}")]
    Configuration {
        /// Human-readable description.
        message: String,
        /// Underlying error, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl Error {
    /// Classify this error into the retry/terminal taxonomy.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::SecurityPolicy { .. } => ErrorKind::SecurityPolicy,
            Self::TransientExternal { .. } => ErrorKind::TransientExternal,
            Self::FatalExternal { .. } | Self::Io { .. } | Self::Json(_) => {
                ErrorKind::FatalExternal
            }
            Self::NotFound { .. }
            | Self::Conflict { .. }
            | Self::Internal { .. }
            | Self::ConfigMissing(_)
            | Self::ConfigInvalid { .. }
            | Self::Configuration { .. } => ErrorKind::Internal,
            Self::Cancelled { .. } => ErrorKind::Cancellation,
        }
    }

    /// Create an I/O error.
    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io {
            message: message.into(),
            source: None,
        }
    }

    /// Create an I/O error with a source.
    pub fn io_with_source<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
        message: S,
        source: E,
    ) -> Self {
        Self::Io {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a validation error.
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a security-policy error.
    pub fn security_policy<S: Into<String>>(code: &'static str, message: S) -> Self {
        Self::SecurityPolicy {
            code,
            message: message.into(),
        }
    }

    /// Create a transient-external error.
    pub fn transient<S: Into<String>>(message: S) -> Self {
        Self::TransientExternal {
            message: message.into(),
            source: None,
        }
    }

    /// Create a transient-external error with a source.
    pub fn transient_with_source<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
        message: S,
        source: E,
    ) -> Self {
        Self::TransientExternal {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a fatal-external error.
    pub fn fatal<S: Into<String>>(message: S) -> Self {
        Self::FatalExternal {
            message: message.into(),
            source: None,
        }
    }

    /// Create a fatal-external error with a source.
    pub fn fatal_with_source<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
        message: S,
        source: E,
    ) -> Self {
        Self::FatalExternal {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a not-found error.
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Create a conflict error.
    pub fn conflict<S: Into<String>>(message: S) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Create an internal error.
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Create a cancellation error.
    pub fn cancelled<S: Into<String>>(message: S) -> Self {
        Self::Cancelled {
            message: message.into(),
        }
    }

    /// Create a config-key validation error.
    pub fn config_invalid<K: Into<String>, S: Into<String>>(key: K, message: S) -> Self {
        Self::ConfigInvalid {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Create a configuration load/parse error.
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// Create a configuration load/parse error with a source.
    pub fn configuration_with_source<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
        message: S,
        source: E,
    ) -> Self {
        Self::Configuration {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Strip control characters and cap length, for inclusion in persisted error text.
    ///
    /// Applied to paths/filenames before they are attached to a Checkpoint or logged, per
    /// the propagation policy's "sanitized message" requirement.
    #[must_use]
    pub fn sanitize_for_persistence(raw: &str) -> String {
        const MAX_LEN: usize = 500;
        let cleaned: String = raw.chars().filter(|c| !c.is_control()).collect();
        if cleaned.chars().count() > MAX_LEN {
            cleaned.chars().take(MAX_LEN).collect::<String>() + "…"
        } else {
            cleaned
        }
    }
}
