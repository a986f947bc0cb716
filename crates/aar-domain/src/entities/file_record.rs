//! FileRecord entity: one per extracted file, immutable after creation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{FileRecordId, ProjectId};

/// Metadata about one file extracted into a project's working directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    /// Stable opaque identifier.
    pub id: FileRecordId,
    /// Owning project.
    pub project_id: ProjectId,
    /// Path relative to the project's working directory root.
    pub relative_path: String,
    /// Size in bytes.
    pub size: u64,
    /// Hex-encoded SHA-256 content hash.
    pub content_hash: String,
    /// Last-modified timestamp, as recorded at extraction time.
    pub last_modified: DateTime<Utc>,
    /// Best-effort language tag inferred from the file extension.
    pub language: Option<String>,
}

impl FileRecord {
    /// Infer a coarse language tag from a relative path's extension.
    #[must_use]
    pub fn infer_language(relative_path: &str) -> Option<String> {
        let ext = std::path::Path::new(relative_path)
            .extension()?
            .to_str()?
            .to_ascii_lowercase();
        let lang = match ext.as_str() {
            "rs" => "rust",
            "py" => "python",
            "js" | "mjs" | "cjs" => "javascript",
            "ts" | "tsx" => "typescript",
            "java" => "java",
            "go" => "go",
            "rb" => "ruby",
            "php" => "php",
            "c" | "h" => "c",
            "cpp" | "cc" | "hpp" | "cxx" => "cpp",
            "cs" => "csharp",
            "kt" | "kts" => "kotlin",
            "swift" => "swift",
            _ => return None,
        };
        Some(lang.to_string())
    }
}
