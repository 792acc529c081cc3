//! Deterministic source archives for upload to a scanning service.
//!
//! `scanpack-core` selects files from one or more folders according to
//! ANT-style include and exclude rules and packs them into a single zip or
//! tar archive. Several named source sections can share one archive, each
//! under its own `__data__/<name>/` prefix. A build either leaves a
//! complete, non-empty archive behind or fails with a typed error.
//!
//! # Examples
//!
//! ```no_run
//! use scanpack_core::PackConfig;
//! use scanpack_core::PackOutcome;
//! use scanpack_core::SourceDescriptor;
//! use scanpack_core::checksum::sha256_file;
//! use scanpack_core::pack;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let code = SourceDescriptor::anonymous()
//!     .with_folder("src")
//!     .with_suffixes([".rs", ".toml"])
//!     .with_default_excludes();
//!
//! if let PackOutcome::Built(report) = pack("sources.zip", vec![code], &PackConfig::default())? {
//!     println!("{} files, sha256 {}", report.files_added(), sha256_file(&report.target)?);
//! }
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod checksum;
pub mod creation;
pub mod error;
pub mod formats;
pub mod inspection;
pub mod matcher;

// Re-export main API types
pub use api::PackOutcome;
pub use api::pack;
pub use creation::ArchiveBuilder;
pub use creation::BuildReport;
pub use creation::EntryNaming;
pub use creation::IncludeFilter;
pub use creation::PackConfig;
pub use creation::SourceDescriptor;
pub use creation::SymlinkPolicy;
pub use error::PackError;
pub use error::Result;
pub use formats::ArchiveFormat;
pub use inspection::list_entries;
