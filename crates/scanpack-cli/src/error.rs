//! Error conversion utilities for CLI.
//!
//! Converts scanpack-core's typed errors (thiserror) into user-friendly
//! contextual errors (anyhow) with actionable guidance, and maps every error
//! to the process exit code it should produce.

use scanpack_core::PackError;
use std::fmt;
use std::path::Path;

/// Generic failure.
pub const EXIT_FAILURE: u8 = 1;
/// A required setting was neither given on the command line nor in the
/// config file.
pub const EXIT_MISSING_PARAMETER: u8 = 3;
/// The config file does not exist or cannot be read.
pub const EXIT_MISSING_CONFIG: u8 = 4;
/// Reading the sources or writing the archive failed.
pub const EXIT_IO: u8 = 8;
/// The config file or a section in it is malformed.
pub const EXIT_INVALID_CONFIG: u8 = 9;

/// A failure carrying its own exit code.
#[derive(Debug)]
pub struct Failure {
    code: u8,
    message: String,
}

impl Failure {
    pub fn new(code: u8, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub const fn code(&self) -> u8 {
        self.code
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for Failure {}

/// Exit code for an error returned by a command.
pub fn exit_code(err: &anyhow::Error) -> u8 {
    if let Some(failure) = err.downcast_ref::<Failure>() {
        return failure.code();
    }
    if err.chain().any(|cause| cause.is::<std::io::Error>()) {
        return EXIT_IO;
    }
    EXIT_FAILURE
}

/// Exit code for a core error.
const fn pack_exit_code(err: &PackError) -> u8 {
    match err {
        PackError::SourceNotFound { .. } | PackError::Io(_) => EXIT_IO,
        PackError::InvalidSourceName { .. } => EXIT_INVALID_CONFIG,
        _ => EXIT_FAILURE,
    }
}

/// Converts `PackError` to user-friendly anyhow error with context
pub fn convert_pack_error(err: PackError, archive: &Path) -> anyhow::Error {
    let code = pack_exit_code(&err);
    let message = match err {
        PackError::SourceNotFound {
            configured,
            resolved,
        } => format!(
            "Folder not found: '{}' (resolved to '{}')\n\
             HINT: Check the configured folders and files, relative paths are \
             resolved against the current directory.",
            configured.display(),
            resolved.display()
        ),
        PackError::SelfInclusion { target } => format!(
            "Archive '{}' would be packed into itself\n\
             HINT: Write the archive outside of every configured folder.",
            target.display()
        ),
        PackError::EmptyArchive { target } => format!(
            "No content: archive '{}' would be empty\n\
             HINT: Check folder and include configuration; every file was \
             excluded or filtered out.",
            target.display()
        ),
        PackError::UnsupportedFormat { path } => format!(
            "Archive format not supported: {}\n\
             HINT: Use a .zip, .tar, .tar.gz or .tgz extension, or pass --format.",
            path.display()
        ),
        PackError::InvalidSourceName { name, reason } => format!(
            "Invalid source name '{name}': {reason}\n\
             HINT: Names are 1-80 characters of letters, digits, '-' and '_'."
        ),
        PackError::Io(io_err) => format!(
            "I/O error while processing '{}': {io_err}",
            archive.display()
        ),
        PackError::InvalidArchive(reason) => format!(
            "Invalid archive '{}': {reason}\n\
             HINT: The archive may be corrupted or truncated.",
            archive.display()
        ),
        other => {
            let detail = other.context().map_or_else(|| other.to_string(), str::to_string);
            let mut message = format!("Error processing archive '{}': {detail}", archive.display());
            if other.is_configuration_error() {
                message.push_str("\nHINT: Check the output path and the configured sources.");
            }
            message
        }
    };
    anyhow::Error::new(Failure::new(code, message))
}

/// Adds context to a generic error about archive operations
pub fn add_archive_context<T>(
    result: Result<T, PackError>,
    archive: &Path,
) -> anyhow::Result<T> {
    result.map_err(|e| convert_pack_error(e, archive))
}
