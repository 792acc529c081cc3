//! Configuration for archive builds.

use crate::formats::ArchiveFormat;
use std::path::PathBuf;

/// Archives smaller than this are read back after the build to confirm they
/// hold at least one entry.
pub const SMALL_ARCHIVE_THRESHOLD: u64 = 1024;

/// How archive entry names are derived from visited paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryNaming {
    /// Names are relative to the given working directory. Files outside it
    /// keep their cleaned, caller-supplied relative path.
    WorkingDirectory(PathBuf),
    /// Names are relative to each walked folder; an explicit file is stored
    /// under its file name.
    SourceRoot,
}

impl EntryNaming {
    /// Working-directory naming based on the process's current directory.
    ///
    /// Falls back to [`EntryNaming::SourceRoot`] if the current directory is
    /// not accessible.
    #[must_use]
    pub fn current_dir() -> Self {
        std::env::current_dir().map_or(Self::SourceRoot, Self::WorkingDirectory)
    }
}

impl Default for EntryNaming {
    fn default() -> Self {
        Self::current_dir()
    }
}

/// What to do with symbolic links found while walking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymlinkPolicy {
    /// Never archive links; record a notice instead.
    Skip,
    /// Read through links to regular files. Links to directories are not
    /// descended into, dangling links fail the build.
    Follow,
}

/// Configuration for one archive build.
///
/// # Examples
///
/// ```
/// use scanpack_core::creation::EntryNaming;
/// use scanpack_core::creation::PackConfig;
/// use scanpack_core::creation::SymlinkPolicy;
/// use scanpack_core::formats::ArchiveFormat;
///
/// let config = PackConfig::default()
///     .with_format(ArchiveFormat::Zip)
///     .with_naming(EntryNaming::SourceRoot)
///     .with_symlinks(SymlinkPolicy::Skip);
///
/// assert_eq!(config.symlink_policy(ArchiveFormat::Zip), SymlinkPolicy::Skip);
/// assert_eq!(config.symlink_policy(ArchiveFormat::Tar), SymlinkPolicy::Skip);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackConfig {
    /// Output format. `None` infers it from the output path extension.
    pub format: Option<ArchiveFormat>,

    /// Entry naming policy.
    ///
    /// Default: [`EntryNaming::WorkingDirectory`] with the process cwd.
    pub naming: EntryNaming,

    /// Symlink handling for zip builds. Tar builds always skip links.
    ///
    /// Default: `None`, meaning [`SymlinkPolicy::Follow`] for zip.
    pub symlinks: Option<SymlinkPolicy>,

    /// Deflate/gzip level (0-9). `None` uses the format default.
    pub compression_level: Option<u8>,

    /// Read small archives back after building.
    ///
    /// Default: `true`.
    pub verify_small_archives: bool,
}

impl Default for PackConfig {
    fn default() -> Self {
        Self {
            format: None,
            naming: EntryNaming::default(),
            symlinks: None,
            compression_level: None,
            verify_small_archives: true,
        }
    }
}

impl PackConfig {
    /// Creates a configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the output format.
    #[must_use]
    pub fn with_format(mut self, format: ArchiveFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Sets the entry naming policy.
    #[must_use]
    pub fn with_naming(mut self, naming: EntryNaming) -> Self {
        self.naming = naming;
        self
    }

    /// Names entries relative to `dir`.
    #[must_use]
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.naming = EntryNaming::WorkingDirectory(dir.into());
        self
    }

    /// Sets the zip symlink policy.
    #[must_use]
    pub fn with_symlinks(mut self, policy: SymlinkPolicy) -> Self {
        self.symlinks = Some(policy);
        self
    }

    /// Sets the compression level, clamped to 0-9.
    #[must_use]
    pub fn with_compression_level(mut self, level: u8) -> Self {
        self.compression_level = Some(level.min(9));
        self
    }

    /// Enables or disables the read-back check of small archives.
    #[must_use]
    pub fn with_verify_small_archives(mut self, verify: bool) -> Self {
        self.verify_small_archives = verify;
        self
    }

    /// Effective symlink policy for `format`.
    #[must_use]
    pub fn symlink_policy(&self, format: ArchiveFormat) -> SymlinkPolicy {
        if format.is_tar() {
            SymlinkPolicy::Skip
        } else {
            self.symlinks.unwrap_or(SymlinkPolicy::Follow)
        }
    }
}
