//! Streaming, bounded ZIP extraction.

use std::collections::HashMap;
use std::fs;
use std::io::{Read, Seek, Write};
use std::path::{Component, Path, PathBuf};

use sha2::{Digest, Sha256};

use aar_domain::{Error, Result};

use crate::denylist::{contains_dependency_segment, is_denylisted_extension};
use crate::error as codes;
use crate::limits::ExtractionLimits;

/// One file materialized on disk by [`extract`].
#[derive(Debug, Clone)]
pub struct ExtractedEntry {
    /// Path relative to `out_dir`, using forward slashes.
    pub relative_path: String,
    /// Absolute path on disk.
    pub absolute_path: PathBuf,
    /// Size actually written, in bytes.
    pub size: u64,
    /// Lowercase hex SHA-256 of the written content.
    pub content_hash: String,
    /// Position in extraction order, starting at zero.
    pub index: u32,
}

/// A non-mutating report produced by [`validate`] before any bytes are written.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    /// Total entries in the archive, including directories.
    pub entry_count: u32,
    /// Sum of declared uncompressed sizes across all entries.
    pub total_uncompressed_size: u64,
    /// Largest single declared uncompressed entry size.
    pub largest_entry_size: u64,
    /// Count of entries per lowercase extension (entries with none under `""`).
    pub extension_histogram: HashMap<String, u32>,
    /// Whether any entry name contains a `..` path component.
    pub contains_dot_dot: bool,
}

/// Pre-flight scan: count entries, tally sizes, flag `..` components. Does
/// not write anything to disk. Fails only with [`codes::INVALID_ARCHIVE`] if
/// the input cannot even be parsed as a ZIP.
pub fn validate<R: Read + Seek>(reader: R) -> Result<ValidationReport> {
    let mut archive = open_archive(reader)?;
    let mut report = ValidationReport {
        entry_count: archive.len() as u32,
        ..Default::default()
    };
    for i in 0..archive.len() {
        let entry = archive
            .by_index(i)
            .map_err(|e| Error::fatal_with_source("failed to read zip entry", e))?;
        let name = entry.name().to_string();
        report.total_uncompressed_size += entry.size();
        report.largest_entry_size = report.largest_entry_size.max(entry.size());
        if Path::new(&name)
            .components()
            .any(|c| matches!(c, Component::ParentDir))
        {
            report.contains_dot_dot = true;
        }
        let ext = Path::new(&name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        *report.extension_histogram.entry(ext).or_insert(0) += 1;
    }
    Ok(report)
}

/// Extract `reader`'s entries into `out_dir`, enforcing `limits` per
/// `spec.md` §4.1's ordered policy list. On any fatal error the partially
/// extracted directory is recursively removed before returning.
pub fn extract<R: Read + Seek>(
    reader: R,
    out_dir: &Path,
    limits: ExtractionLimits,
) -> Result<Vec<ExtractedEntry>> {
    match extract_inner(reader, out_dir, limits) {
        Ok(entries) => Ok(entries),
        Err(err) => {
            let _ = fs::remove_dir_all(out_dir);
            Err(err)
        }
    }
}

fn extract_inner<R: Read + Seek>(
    reader: R,
    out_dir: &Path,
    limits: ExtractionLimits,
) -> Result<Vec<ExtractedEntry>> {
    let mut archive = open_archive(reader)?;
    fs::create_dir_all(out_dir).map_err(|e| Error::io_with_source("creating output directory", e))?;

    let mut extracted = Vec::new();
    let mut cumulative_uncompressed: u64 = 0;
    let mut index: u32 = 0;

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| Error::fatal_with_source("failed to read zip entry", e))?;

        // Policy 1: skip directory entries.
        if entry.is_dir() || entry.name().ends_with('/') {
            continue;
        }

        // Policy 2: terminate (not fail) once the cap is reached.
        if index >= limits.max_total_files {
            break;
        }

        // Policy 3: skip oversized entries.
        if entry.size() > limits.max_file_size {
            continue;
        }

        let name = entry.name().to_string();
        let ext = Path::new(&name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();

        // Policy 4: skip denylisted extensions.
        if !ext.is_empty() && is_denylisted_extension(ext) {
            continue;
        }

        // Policy 5 + 6: reject traversal outright, then normalize the rest.
        if Path::new(&name).components().any(|c| {
            matches!(
                c,
                Component::ParentDir | Component::RootDir | Component::Prefix(_)
            )
        }) {
            return Err(Error::security_policy(
                codes::PATH_TRAVERSAL,
                format!("entry '{name}' contains a parent-dir or absolute path component"),
            ));
        }
        let normalized = normalize_entry_path(&name);
        if contains_dependency_segment(&normalized) {
            continue;
        }
        let dest = out_dir.join(&normalized);
        if !dest.starts_with(out_dir) {
            return Err(Error::security_policy(
                codes::PATH_TRAVERSAL,
                format!("entry '{name}' escapes the output directory"),
            ));
        }

        // Policy 7: compression-ratio ceiling.
        let compressed = entry.compressed_size().max(1);
        if entry.size() / compressed > limits.max_compression_ratio {
            return Err(Error::security_policy(
                codes::SUSPICIOUS_COMPRESSION,
                format!(
                    "entry '{name}' has compression ratio {}:1, exceeding the configured ceiling",
                    entry.size() / compressed
                ),
            ));
        }

        // Policy 8: cumulative ceiling.
        cumulative_uncompressed += entry.size();
        if cumulative_uncompressed > limits.max_total_uncompressed_size {
            return Err(Error::security_policy(
                codes::EXTRACTION_TOO_LARGE,
                "cumulative uncompressed size exceeds the configured ceiling",
            ));
        }

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::io_with_source("creating parent directory", e))?;
        }

        // Policy 9: stream while hashing, detect size mismatch.
        let declared = entry.size();
        let written = stream_entry(&mut entry, &dest, declared)?;

        extracted.push(ExtractedEntry {
            relative_path: normalized.to_string_lossy().replace('\\', "/"),
            absolute_path: dest,
            size: written.0,
            content_hash: written.1,
            index,
        });
        index += 1;
    }

    Ok(extracted)
}

fn stream_entry<R: Read>(entry: &mut R, dest: &Path, declared: u64) -> Result<(u64, String)> {
    let mut file =
        fs::File::create(dest).map_err(|e| Error::io_with_source("creating extracted file", e))?;
    let mut hasher = Sha256::new();
    let mut buf = [0_u8; 64 * 1024];
    let mut written: u64 = 0;
    let allowed = declared + declared / 10 + 1;
    loop {
        let n = entry
            .read(&mut buf)
            .map_err(|e| Error::io_with_source("reading zip entry", e))?;
        if n == 0 {
            break;
        }
        written += n as u64;
        if written > allowed {
            return Err(Error::security_policy(
                codes::SIZE_MISMATCH,
                format!("entry wrote {written} bytes, exceeding declared length {declared} by >10%"),
            ));
        }
        hasher.update(&buf[..n]);
        file.write_all(&buf[..n])
            .map_err(|e| Error::io_with_source("writing extracted file", e))?;
    }
    Ok((written, hex::encode(hasher.finalize())))
}

fn normalize_entry_path(name: &str) -> PathBuf {
    let mut out = PathBuf::new();
    for component in Path::new(name).components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::CurDir | Component::ParentDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }
    out
}

fn open_archive<R: Read + Seek>(reader: R) -> Result<zip::ZipArchive<R>> {
    zip::ZipArchive::new(reader)
        .map_err(|e| Error::security_policy(codes::INVALID_ARCHIVE, format!("not a valid ZIP archive: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use zip::write::{SimpleFileOptions, ZipWriter};

    fn build_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        {
            let mut writer = ZipWriter::new(&mut buf);
            let options =
                SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
            for (name, content) in entries {
                writer.start_file(*name, options).unwrap();
                writer.write_all(content).unwrap();
            }
            writer.finish().unwrap();
        }
        buf.into_inner()
    }

    #[test]
    fn extracts_plain_files() {
        let zip = build_zip(&[("README.md", b"hi"), ("src/a.rs", b"fn main() {}")]);
        let dir = tempfile::tempdir().unwrap();
        let entries = extract(Cursor::new(zip), dir.path(), ExtractionLimits::default()).unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().any(|e| e.relative_path == "README.md"));
    }

    #[test]
    fn rejects_path_traversal() {
        let zip = build_zip(&[("../../etc/passwd", b"pwned")]);
        let dir = tempfile::tempdir().unwrap();
        let err = extract(Cursor::new(zip), dir.path(), ExtractionLimits::default()).unwrap_err();
        assert_eq!(err.kind(), aar_domain::ErrorKind::SecurityPolicy);
        assert!(!dir.path().join("etc/passwd").exists());
    }

    #[test]
    fn rejects_absolute_entry_path() {
        let zip = build_zip(&[("/etc/passwd", b"pwned")]);
        let dir = tempfile::tempdir().unwrap();
        let err = extract(Cursor::new(zip), dir.path(), ExtractionLimits::default()).unwrap_err();
        assert_eq!(err.kind(), aar_domain::ErrorKind::SecurityPolicy);
    }

    #[test]
    fn skips_denylisted_extensions() {
        let zip = build_zip(&[("logo.png", b"binary"), ("main.rs", b"fn main() {}")]);
        let dir = tempfile::tempdir().unwrap();
        let entries = extract(Cursor::new(zip), dir.path(), ExtractionLimits::default()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].relative_path, "main.rs");
    }

    #[test]
    fn skips_dependency_folders() {
        let zip = build_zip(&[("node_modules/left-pad/index.js", b"module.exports = 1;")]);
        let dir = tempfile::tempdir().unwrap();
        let entries = extract(Cursor::new(zip), dir.path(), ExtractionLimits::default()).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn stops_at_max_total_files_without_error() {
        let zip = build_zip(&[("a.rs", b"1"), ("b.rs", b"2"), ("c.rs", b"3")]);
        let dir = tempfile::tempdir().unwrap();
        let mut limits = ExtractionLimits::default();
        limits.max_total_files = 2;
        let entries = extract(Cursor::new(zip), dir.path(), limits).unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn validate_reports_without_writing() {
        let zip = build_zip(&[("a.rs", b"hello")]);
        let dir = tempfile::tempdir().unwrap();
        let report = validate(Cursor::new(zip)).unwrap();
        assert_eq!(report.entry_count, 1);
        assert_eq!(report.total_uncompressed_size, 5);
        assert!(!dir.path().join("a.rs").exists());
    }

    #[test]
    fn invalid_archive_is_rejected() {
        let err = extract(
            Cursor::new(b"not a zip".to_vec()),
            tempfile::tempdir().unwrap().path(),
            ExtractionLimits::default(),
        )
        .unwrap_err();
        assert_eq!(err.kind(), aar_domain::ErrorKind::SecurityPolicy);
    }
}
