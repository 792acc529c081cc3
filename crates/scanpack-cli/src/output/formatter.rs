//! Output formatter trait for CLI results.

use anyhow::Result;
use scanpack_core::BuildReport;
use serde::Serialize;
use std::path::Path;

/// Common output formatter trait
pub trait OutputFormatter {
    /// Format a finished build together with the archive checksum
    fn format_pack_result(&self, report: &BuildReport, checksum: &str) -> Result<()>;

    /// Format the notice that no source declared anything to pack
    fn format_nothing_to_upload(&self) -> Result<()>;

    /// Format the entry names of an archive
    fn format_entries(&self, archive: &Path, entries: &[String]) -> Result<()>;

    /// Format the checksum of an archive
    fn format_checksum(&self, archive: &Path, checksum: &str) -> Result<()>;

    /// Format error message
    fn format_error(&self, operation: &str, error: &anyhow::Error);
}

/// Generic JSON output structure
#[derive(Debug, Serialize)]
pub struct JsonOutput<T> {
    pub operation: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<u8>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn success(operation: impl Into<String>, data: T) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Success,
            data: Some(data),
            error: None,
            exit_code: None,
        }
    }
}

impl JsonOutput<()> {
    pub fn error(operation: impl Into<String>, error: impl Into<String>, exit_code: u8) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Error,
            data: None,
            error: Some(error.into()),
            exit_code: Some(exit_code),
        }
    }
}
