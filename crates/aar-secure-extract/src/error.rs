//! Named error codes for extraction failures.
//!
//! These map onto `aar_domain::Error::SecurityPolicy`/`FatalExternal` via the
//! `code` field so callers can match on a stable string rather than a
//! crate-local enum.

/// Running entry count exceeded a hard ceiling during the validation pass.
pub const TOO_MANY_ENTRIES: &str = "TOO_MANY_ENTRIES";
/// The archive contains only entries of disallowed type.
pub const DISALLOWED_FILE_TYPE: &str = "DISALLOWED_FILE_TYPE";
/// An entry's normalized destination escapes the output directory.
pub const PATH_TRAVERSAL: &str = "PATH_TRAVERSAL";
/// An entry's uncompressed/compressed ratio exceeds the configured ceiling.
pub const SUSPICIOUS_COMPRESSION: &str = "SUSPICIOUS_COMPRESSION";
/// Cumulative uncompressed size across the archive exceeds the configured ceiling.
pub const EXTRACTION_TOO_LARGE: &str = "EXTRACTION_TOO_LARGE";
/// Bytes written for an entry exceeded its declared length by more than 10%.
pub const SIZE_MISMATCH: &str = "SIZE_MISMATCH";
/// The input is not a well-formed ZIP archive.
pub const INVALID_ARCHIVE: &str = "INVALID_ARCHIVE";
