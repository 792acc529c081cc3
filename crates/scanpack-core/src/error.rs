//! Error types for archive packaging operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `PackError`.
pub type Result<T> = std::result::Result<T, PackError>;

/// Errors that can occur while building or inspecting an archive.
#[derive(Error, Debug)]
pub enum PackError {
    /// I/O operation failed while walking, reading or writing.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A declared folder or explicit file does not exist.
    #[error("folder not found: {configured} ({resolved})")]
    SourceNotFound {
        /// The path as it was configured.
        configured: PathBuf,
        /// The path after resolving it against the working directory.
        resolved: PathBuf,
    },

    /// The target archive would be packed into itself.
    #[error("target archive would be part of its own content: {target}")]
    SelfInclusion {
        /// Absolute path of the target archive.
        target: PathBuf,
    },

    /// The build finished without writing a single entry.
    #[error("no content: archive {target} would be empty")]
    EmptyArchive {
        /// Path of the target archive.
        target: PathBuf,
    },

    /// Archive format cannot be determined.
    #[error("unsupported archive format: {path}")]
    UnsupportedFormat {
        /// The archive path whose format was not recognized.
        path: PathBuf,
    },

    /// Archive is corrupted or the archive writer rejected an operation.
    #[error("invalid archive: {0}")]
    InvalidArchive(String),

    /// The build request itself is incomplete.
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration {
        /// What is missing or wrong.
        reason: String,
    },

    /// A source section name is reserved, malformed or duplicated.
    #[error("invalid source name '{name}': {reason}")]
    InvalidSourceName {
        /// The offending name.
        name: String,
        /// Why the name was rejected.
        reason: String,
    },
}

impl PackError {
    /// Returns `true` if this error stems from the build configuration rather
    /// than from the filesystem at run time.
    ///
    /// # Examples
    ///
    /// ```
    /// use scanpack_core::PackError;
    /// use std::path::PathBuf;
    ///
    /// let err = PackError::SelfInclusion {
    ///     target: PathBuf::from("/work/out.zip"),
    /// };
    /// assert!(err.is_configuration_error());
    ///
    /// let err = PackError::InvalidArchive("truncated".into());
    /// assert!(!err.is_configuration_error());
    /// ```
    #[must_use]
    pub const fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::SourceNotFound { .. }
                | Self::SelfInclusion { .. }
                | Self::UnsupportedFormat { .. }
                | Self::InvalidConfiguration { .. }
                | Self::InvalidSourceName { .. }
        )
    }

    /// Returns `true` if the build produced no entries.
    ///
    /// Callers use this to print a targeted hint instead of a generic failure.
    #[must_use]
    pub const fn is_empty_archive(&self) -> bool {
        matches!(self, Self::EmptyArchive { .. })
    }

    /// Returns a context string for this error, if available.
    ///
    /// # Examples
    ///
    /// ```
    /// use scanpack_core::PackError;
    ///
    /// let err = PackError::InvalidArchive("bad header".to_string());
    /// assert_eq!(err.context(), Some("bad header"));
    /// ```
    #[must_use]
    pub fn context(&self) -> Option<&str> {
        match self {
            Self::InvalidArchive(msg) => Some(msg),
            Self::InvalidConfiguration { reason } | Self::InvalidSourceName { reason, .. } => {
                Some(reason)
            }
            _ => None,
        }
    }
}

impl From<walkdir::Error> for PackError {
    fn from(err: walkdir::Error) -> Self {
        let message = err.to_string();
        match err.into_io_error() {
            Some(io) => Self::Io(io),
            None => Self::Io(std::io::Error::other(message)),
        }
    }
}

impl From<zip::result::ZipError> for PackError {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(io) => Self::Io(io),
            other => Self::InvalidArchive(other.to_string()),
        }
    }
}
