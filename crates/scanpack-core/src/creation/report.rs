//! Archive build reporting.

use crate::formats::ArchiveFormat;
use std::path::PathBuf;
use std::time::Duration;

/// Report of a finished archive build.
///
/// # Examples
///
/// ```
/// use scanpack_core::creation::BuildReport;
/// use scanpack_core::formats::ArchiveFormat;
///
/// let mut report = BuildReport::new("out.zip", ArchiveFormat::Zip);
/// report.record_entry("src/main.rs", 120);
/// report.skipped_excluded += 2;
///
/// assert_eq!(report.files_added(), 1);
/// assert_eq!(report.files_skipped(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct BuildReport {
    /// Path of the written archive.
    pub target: PathBuf,

    /// Format of the written archive.
    pub format: ArchiveFormat,

    /// Entry names in write order.
    pub entries: Vec<String>,

    /// Files dropped by an exclude pattern.
    pub skipped_excluded: usize,

    /// Files dropped by the suffix include filter.
    pub skipped_filtered: usize,

    /// Symlinks not archived.
    pub skipped_symlinks: usize,

    /// Files whose entry name was already taken.
    pub skipped_duplicates: usize,

    /// Total bytes read from source files.
    pub bytes_read: u64,

    /// Size of the finished archive on disk.
    pub archive_size: u64,

    /// Duration of the build.
    pub duration: Duration,

    /// Warnings generated during the build.
    pub warnings: Vec<String>,
}

impl BuildReport {
    /// Creates an empty report for `target`.
    #[must_use]
    pub fn new(target: impl Into<PathBuf>, format: ArchiveFormat) -> Self {
        Self {
            target: target.into(),
            format,
            entries: Vec::new(),
            skipped_excluded: 0,
            skipped_filtered: 0,
            skipped_symlinks: 0,
            skipped_duplicates: 0,
            bytes_read: 0,
            archive_size: 0,
            duration: Duration::ZERO,
            warnings: Vec::new(),
        }
    }

    /// Records one written entry.
    pub fn record_entry(&mut self, name: impl Into<String>, bytes: u64) {
        self.entries.push(name.into());
        self.bytes_read += bytes;
    }

    /// Adds a warning message to the report.
    pub fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    /// Returns whether any warnings were generated.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Number of files written into the archive.
    #[must_use]
    pub fn files_added(&self) -> usize {
        self.entries.len()
    }

    /// Number of files visited but not written, for any reason.
    #[must_use]
    pub fn files_skipped(&self) -> usize {
        self.skipped_excluded
            + self.skipped_filtered
            + self.skipped_symlinks
            + self.skipped_duplicates
    }
}
