//! Source descriptors: what goes into an archive and under which name.

use crate::PackError;
use crate::Result;
use std::collections::HashSet;
use std::path::PathBuf;

/// Path token under which named sections are stored inside an archive.
pub const ARCHIVE_DATA_PREFIX: &str = "__data__";

/// Reference identifiers of the two archive roots. Section names must not
/// collide with them.
pub const RESERVED_ROOT_IDENTIFIERS: [&str; 2] =
    ["__sourcecode_archive_root__", "__binaries_archive_root__"];

/// Directories that never contain code worth uploading for a code scan.
pub const DEFAULT_SOURCE_CODE_EXCLUDES: [&str; 3] =
    ["**/test/**", "**/.git/**", "**/node_modules/**"];

/// Maximum length of a section name.
pub const MAX_SOURCE_NAME_LENGTH: usize = 80;

/// File-type filter applied before exclusion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum IncludeFilter {
    /// Every file passes.
    #[default]
    All,
    /// A file passes if its normalized path ends with one of the suffixes.
    Suffixes(Vec<String>),
}

impl IncludeFilter {
    /// Builds a suffix filter; an empty list lets every file pass.
    #[must_use]
    pub fn suffixes<I, S>(suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let suffixes: Vec<String> = suffixes.into_iter().map(Into::into).collect();
        if suffixes.is_empty() {
            Self::All
        } else {
            Self::Suffixes(suffixes)
        }
    }

    /// Returns the suffix that admits `path`, or `None` if it is filtered out.
    /// [`IncludeFilter::All`] admits every path with an empty suffix.
    ///
    /// # Examples
    ///
    /// ```
    /// use scanpack_core::creation::IncludeFilter;
    ///
    /// let filter = IncludeFilter::suffixes([".c", ".go"]);
    /// assert_eq!(filter.admit("sub1/file1.c"), Some(".c"));
    /// assert_eq!(filter.admit("sub1/file2.jpg"), None);
    /// assert_eq!(IncludeFilter::All.admit("anything"), Some(""));
    /// ```
    #[must_use]
    pub fn admit(&self, path: &str) -> Option<&str> {
        match self {
            Self::All => Some(""),
            Self::Suffixes(suffixes) => suffixes
                .iter()
                .map(String::as_str)
                .find(|suffix| path.ends_with(suffix)),
        }
    }
}

/// One named or anonymous selection of files packed into a shared archive.
///
/// Named descriptors land under `__data__/<name>/`; anonymous ones are stored
/// at the archive root.
///
/// # Examples
///
/// ```
/// use scanpack_core::creation::SourceDescriptor;
///
/// let source = SourceDescriptor::named("frontend")
///     .with_folder("web/src")
///     .with_exclude("**/generated/**")
///     .with_suffixes([".ts", ".tsx"]);
///
/// assert_eq!(source.archive_prefix(), "__data__/frontend/");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceDescriptor {
    /// Section name; `None` for the legacy root section.
    pub name: Option<String>,
    /// Files added one by one.
    pub files: Vec<PathBuf>,
    /// Folders walked recursively.
    pub folders: Vec<PathBuf>,
    /// Exclude glob patterns.
    pub excludes: Vec<String>,
    /// File-type filter (only honoured by zip builds).
    pub include: IncludeFilter,
}

impl SourceDescriptor {
    /// Creates an anonymous descriptor stored at the archive root.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Creates a descriptor stored under `__data__/<name>/`.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Adds a folder to walk.
    #[must_use]
    pub fn with_folder(mut self, folder: impl Into<PathBuf>) -> Self {
        self.folders.push(folder.into());
        self
    }

    /// Adds folders to walk.
    #[must_use]
    pub fn with_folders<I, P>(mut self, folders: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.folders.extend(folders.into_iter().map(Into::into));
        self
    }

    /// Adds an explicit file.
    #[must_use]
    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.files.push(file.into());
        self
    }

    /// Adds explicit files.
    #[must_use]
    pub fn with_files<I, P>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.files.extend(files.into_iter().map(Into::into));
        self
    }

    /// Adds an exclude pattern.
    #[must_use]
    pub fn with_exclude(mut self, pattern: impl Into<String>) -> Self {
        self.excludes.push(pattern.into());
        self
    }

    /// Adds exclude patterns.
    #[must_use]
    pub fn with_excludes<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excludes.extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Appends [`DEFAULT_SOURCE_CODE_EXCLUDES`] not already present.
    #[must_use]
    pub fn with_default_excludes(mut self) -> Self {
        for pattern in DEFAULT_SOURCE_CODE_EXCLUDES {
            if !self.excludes.iter().any(|p| p == pattern) {
                self.excludes.push(pattern.to_string());
            }
        }
        self
    }

    /// Restricts the descriptor to files ending with one of `suffixes`.
    #[must_use]
    pub fn with_suffixes<I, S>(mut self, suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include = IncludeFilter::suffixes(suffixes);
        self
    }

    /// Sets the include filter.
    #[must_use]
    pub fn with_include(mut self, include: IncludeFilter) -> Self {
        self.include = include;
        self
    }

    /// Returns `true` if the descriptor declares neither files nor folders.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.folders.is_empty()
    }

    /// Entry-name prefix for this descriptor: `__data__/<name>/` or empty.
    #[must_use]
    pub fn archive_prefix(&self) -> String {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => format!("{ARCHIVE_DATA_PREFIX}/{name}/"),
            _ => String::new(),
        }
    }

    /// Label used in log messages.
    #[must_use]
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or("<root>")
    }
}

/// Checks a section name against the naming rules.
///
/// # Errors
///
/// Returns [`PackError::InvalidSourceName`] if the name is empty, too long,
/// reserved, or contains characters other than ASCII letters, digits, `-`
/// and `_`.
///
/// # Examples
///
/// ```
/// use scanpack_core::creation::source::validate_source_name;
///
/// assert!(validate_source_name("frontend-sources_1").is_ok());
/// assert!(validate_source_name("__data__").is_err());
/// assert!(validate_source_name("with space").is_err());
/// ```
pub fn validate_source_name(name: &str) -> Result<()> {
    let reject = |reason: String| {
        Err(PackError::InvalidSourceName {
            name: name.to_string(),
            reason,
        })
    };

    if name.is_empty() {
        return reject("name must not be empty".to_string());
    }
    if name == ARCHIVE_DATA_PREFIX || RESERVED_ROOT_IDENTIFIERS.contains(&name) {
        return reject("name is reserved".to_string());
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return reject("only 'a-z', 'A-Z', '0-9', '-' and '_' are allowed".to_string());
    }
    if name.len() > MAX_SOURCE_NAME_LENGTH {
        return reject(format!(
            "name is longer than {MAX_SOURCE_NAME_LENGTH} characters"
        ));
    }
    Ok(())
}

/// Validates every named descriptor and rejects duplicate names.
///
/// # Errors
///
/// Returns [`PackError::InvalidSourceName`] for the first offending name.
pub fn validate_sources(sources: &[SourceDescriptor]) -> Result<()> {
    let mut seen = HashSet::new();
    for name in sources.iter().filter_map(|s| s.name.as_deref()) {
        validate_source_name(name)?;
        if !seen.insert(name) {
            return Err(PackError::InvalidSourceName {
                name: name.to_string(),
                reason: "name is used by more than one source".to_string(),
            });
        }
    }
    Ok(())
}
