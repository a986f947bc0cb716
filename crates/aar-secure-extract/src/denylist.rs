//! Extension and path-segment denylists applied before an entry is extracted.

/// Extensions (lowercase, without the dot) treated as binary/media/archive
/// noise: executables, shared libraries, images, media, office documents,
/// and nested archives. Source-code review has no use for these.
const DENYLISTED_EXTENSIONS: &[&str] = &[
    // executables / libraries
    "exe", "dll", "so", "dylib", "bin", "a", "lib", "o", "obj",
    // images
    "png", "jpg", "jpeg", "gif", "bmp", "ico", "webp", "tiff", "svg",
    // media
    "mp3", "mp4", "wav", "avi", "mov", "mkv", "flac", "ogg",
    // office documents
    "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx",
    // nested archives
    "zip", "tar", "gz", "bz2", "7z", "rar", "xz", "jar", "war",
];

/// Path segments that mark a dependency/vendor/tooling folder to skip entirely.
const DEPENDENCY_FOLDER_SEGMENTS: &[&str] = &[
    "node_modules",
    "vendor",
    ".git",
    "bin",
    "obj",
    "__pycache__",
    ".vs",
    ".idea",
];

/// Whether `extension` (without the leading dot, any case) is denylisted.
#[must_use]
pub fn is_denylisted_extension(extension: &str) -> bool {
    let lower = extension.to_ascii_lowercase();
    DENYLISTED_EXTENSIONS.contains(&lower.as_str())
}

/// Whether any component of `normalized_path` is a dependency-folder segment.
#[must_use]
pub fn contains_dependency_segment(normalized_path: &std::path::Path) -> bool {
    normalized_path.components().any(|c| {
        c.as_os_str()
            .to_str()
            .is_some_and(|s| DEPENDENCY_FOLDER_SEGMENTS.contains(&s))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn flags_known_binary_extensions() {
        assert!(is_denylisted_extension("PNG"));
        assert!(is_denylisted_extension("exe"));
        assert!(!is_denylisted_extension("rs"));
    }

    #[test]
    fn flags_dependency_segments_anywhere_in_path() {
        assert!(contains_dependency_segment(Path::new(
            "project/node_modules/left-pad/index.js"
        )));
        assert!(!contains_dependency_segment(Path::new("project/src/main.rs")));
    }
}
