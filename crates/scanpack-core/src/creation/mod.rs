//! Archive creation module.
//!
//! Walks declared folders and files, filters them per source descriptor and
//! writes the survivors into one zip or tar archive.

pub mod builder;
pub mod config;
pub mod filters;
pub mod normalize;
pub mod report;
pub mod source;
pub mod tar;
pub mod walker;
pub mod zip;

// Re-exports for public API
pub use builder::ArchiveBuilder;
pub use config::EntryNaming;
pub use config::PackConfig;
pub use config::SymlinkPolicy;
pub use report::BuildReport;
pub use source::ARCHIVE_DATA_PREFIX;
pub use source::DEFAULT_SOURCE_CODE_EXCLUDES;
pub use source::IncludeFilter;
pub use source::SourceDescriptor;
