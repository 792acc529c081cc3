//! High-level public API for packing sources.

use std::path::Path;

use tracing::info;

use crate::Result;
use crate::creation::ArchiveBuilder;
use crate::creation::BuildReport;
use crate::creation::PackConfig;
use crate::creation::SourceDescriptor;

/// Result of [`pack`] when no error occurred.
#[derive(Debug, Clone)]
pub enum PackOutcome {
    /// The archive was written and is ready for upload.
    Built(BuildReport),
    /// No source declares any folder or file; nothing was written.
    NothingToUpload,
}

impl PackOutcome {
    /// Returns the build report, if an archive was written.
    #[must_use]
    pub fn report(&self) -> Option<&BuildReport> {
        match self {
            Self::Built(report) => Some(report),
            Self::NothingToUpload => None,
        }
    }
}

/// Packs `sources` into an archive at `output_path`.
///
/// Sources that declare neither folders nor files are ignored. If none is
/// left, no file is created and [`PackOutcome::NothingToUpload`] is
/// returned.
///
/// # Errors
///
/// Returns an error if:
/// - the archive format cannot be determined
/// - a section name is invalid
/// - the target would be part of its own content
/// - a declared folder or file does not exist
/// - I/O operations fail
/// - no file survived filtering
///
/// # Examples
///
/// ```no_run
/// use scanpack_core::PackConfig;
/// use scanpack_core::PackOutcome;
/// use scanpack_core::SourceDescriptor;
/// use scanpack_core::pack;
///
/// let sources = vec![SourceDescriptor::anonymous().with_folder("src")];
/// match pack("sources.zip", sources, &PackConfig::default())? {
///     PackOutcome::Built(report) => println!("{} files", report.files_added()),
///     PackOutcome::NothingToUpload => println!("nothing to upload"),
/// }
/// # Ok::<(), scanpack_core::PackError>(())
/// ```
pub fn pack<P: AsRef<Path>>(
    output_path: P,
    sources: Vec<SourceDescriptor>,
    config: &PackConfig,
) -> Result<PackOutcome> {
    let sources: Vec<SourceDescriptor> = sources.into_iter().filter(|s| !s.is_empty()).collect();

    if sources.is_empty() {
        info!("no folders or files configured, nothing to upload");
        return Ok(PackOutcome::NothingToUpload);
    }

    ArchiveBuilder::new()
        .output(output_path)
        .config(config.clone())
        .sources(sources)
        .build()
        .map(PackOutcome::Built)
}
