//! JSON output formatter for machine-readable results.

use super::formatter::JsonOutput;
use super::formatter::OutputFormatter;
use crate::error::exit_code;
use anyhow::Result;
use scanpack_core::BuildReport;
use serde::Serialize;
use std::io::Write;
use std::io::{self};
use std::path::Path;

pub struct JsonFormatter;

impl JsonFormatter {
    fn output<T: Serialize>(value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(io::stdout(), "{json}")?;
        Ok(())
    }
}

#[derive(Serialize)]
struct SkippedOutput {
    excluded: usize,
    filtered: usize,
    symlinks: usize,
    duplicates: usize,
}

#[derive(Serialize)]
struct PackOutput<'a> {
    archive: String,
    format: &'static str,
    entries: &'a [String],
    files_added: usize,
    files_skipped: usize,
    skipped: SkippedOutput,
    bytes_read: u64,
    archive_size: u64,
    sha256: &'a str,
    duration_ms: u128,
    warnings: &'a [String],
}

impl<'a> PackOutput<'a> {
    fn new(report: &'a BuildReport, checksum: &'a str) -> Self {
        Self {
            archive: report.target.display().to_string(),
            format: report.format.name(),
            entries: &report.entries,
            files_added: report.files_added(),
            files_skipped: report.files_skipped(),
            skipped: SkippedOutput {
                excluded: report.skipped_excluded,
                filtered: report.skipped_filtered,
                symlinks: report.skipped_symlinks,
                duplicates: report.skipped_duplicates,
            },
            bytes_read: report.bytes_read,
            archive_size: report.archive_size,
            sha256: checksum,
            duration_ms: report.duration.as_millis(),
            warnings: &report.warnings,
        }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_pack_result(&self, report: &BuildReport, checksum: &str) -> Result<()> {
        let output = JsonOutput::success("create", PackOutput::new(report, checksum));
        Self::output(&output)
    }

    fn format_nothing_to_upload(&self) -> Result<()> {
        #[derive(Serialize)]
        struct NothingOutput {
            archive: Option<String>,
            message: &'static str,
        }

        let output = JsonOutput::success(
            "create",
            NothingOutput {
                archive: None,
                message: "nothing to upload",
            },
        );
        Self::output(&output)
    }

    fn format_entries(&self, archive: &Path, entries: &[String]) -> Result<()> {
        #[derive(Serialize)]
        struct ListOutput<'a> {
            archive: String,
            total_entries: usize,
            entries: &'a [String],
        }

        let output = JsonOutput::success(
            "list",
            ListOutput {
                archive: archive.display().to_string(),
                total_entries: entries.len(),
                entries,
            },
        );
        Self::output(&output)
    }

    fn format_checksum(&self, archive: &Path, checksum: &str) -> Result<()> {
        #[derive(Serialize)]
        struct ChecksumOutput<'a> {
            archive: String,
            sha256: &'a str,
        }

        let output = JsonOutput::success(
            "checksum",
            ChecksumOutput {
                archive: archive.display().to_string(),
                sha256: checksum,
            },
        );
        Self::output(&output)
    }

    fn format_error(&self, operation: &str, error: &anyhow::Error) {
        let output = JsonOutput::<()>::error(operation, format!("{error:#}"), exit_code(error));
        let _ = Self::output(&output);
    }
}
