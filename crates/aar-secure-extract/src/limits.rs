//! Configurable bounds enforced during extraction.

/// Bounds on an extraction run, supplied by the caller (ultimately
/// `aar-infrastructure`'s config layer).
#[derive(Debug, Clone, Copy)]
pub struct ExtractionLimits {
    /// Entries larger than this (uncompressed, declared) are skipped.
    pub max_file_size: u64,
    /// Extraction stops (without error) once this many entries have been written.
    pub max_total_files: u32,
    /// Uncompressed/compressed ratio above which an entry is treated as a bomb.
    pub max_compression_ratio: u64,
    /// Cumulative uncompressed bytes across the whole archive; exceeding this is fatal.
    pub max_total_uncompressed_size: u64,
}

impl Default for ExtractionLimits {
    fn default() -> Self {
        Self {
            max_file_size: 50 * 1024 * 1024,
            max_total_files: 5_000,
            max_compression_ratio: 100,
            max_total_uncompressed_size: 2 * 1024 * 1024 * 1024,
        }
    }
}
