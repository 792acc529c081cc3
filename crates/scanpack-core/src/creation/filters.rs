//! Per-file include and exclude decisions.
//!
//! Every visited file becomes a [`CandidateEntry`] whose archive-relative name
//! is computed once and then used both for matching and as the entry name.
//! Exclude patterns starting with `/` are evaluated against the absolute
//! path instead, after all relative patterns.

use crate::creation::config::EntryNaming;
use crate::creation::normalize;
use crate::creation::source::SourceDescriptor;
use crate::formats::ArchiveFormat;
use crate::matcher;
use std::path::Path;
use std::path::PathBuf;

/// A visited file, before any filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateEntry {
    /// Path as produced by the walker.
    pub source_path: PathBuf,
    /// Lexically absolute form of `source_path`.
    pub absolute_path: PathBuf,
    /// Canonical archive-relative name, without the section prefix.
    pub archive_path: String,
}

/// Outcome of filtering a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision<'a> {
    /// Write the file.
    Include,
    /// Dropped because no allowed suffix matched.
    Filtered,
    /// Dropped by the given exclude pattern.
    Excluded(&'a str),
}

/// Filter rules of one source descriptor, bound to a build.
#[derive(Debug)]
pub struct EntryFilter<'a> {
    source: &'a SourceDescriptor,
    naming: &'a EntryNaming,
    working_dir: &'a Path,
    apply_include: bool,
}

impl<'a> EntryFilter<'a> {
    /// Creates the filter for `source` in a build of `format`.
    #[must_use]
    pub fn new(
        source: &'a SourceDescriptor,
        format: ArchiveFormat,
        naming: &'a EntryNaming,
        working_dir: &'a Path,
    ) -> Self {
        Self {
            source,
            naming,
            working_dir,
            apply_include: format.applies_include_filter(),
        }
    }

    /// Normalizes a visited path below `root`.
    #[must_use]
    pub fn candidate(&self, path: &Path, root: &Path) -> CandidateEntry {
        CandidateEntry {
            source_path: path.to_path_buf(),
            absolute_path: normalize::absolutize(path, self.working_dir),
            archive_path: self.archive_path(path, root),
        }
    }

    /// Applies the include filter, then the exclude patterns.
    #[must_use]
    pub fn decide(&self, candidate: &CandidateEntry) -> Decision<'a> {
        if self.apply_include && self.source.include.admit(&candidate.archive_path).is_none() {
            return Decision::Filtered;
        }

        match self.matching_exclude(&candidate.archive_path, &candidate.absolute_path) {
            Some(pattern) => Decision::Excluded(pattern),
            None => Decision::Include,
        }
    }

    /// Returns the subtree exclude that covers the directory at `path`, if
    /// any. The walked root itself is never pruned.
    #[must_use]
    pub fn prune(&self, path: &Path, root: &Path, depth: usize) -> Option<&'a str> {
        if depth == 0 {
            return None;
        }

        let name = self.archive_path(path, root);
        let absolute = normalize::absolutize(path, self.working_dir);
        self.matching_exclude(&name, &absolute)
            .filter(|pattern| matcher::covers_subtree(pattern))
    }

    fn archive_path(&self, path: &Path, root: &Path) -> String {
        match self.naming {
            EntryNaming::WorkingDirectory(base)
                if path.is_relative() && base.as_path() != self.working_dir =>
            {
                normalize::normalize(&normalize::absolutize(path, self.working_dir), base)
            }
            EntryNaming::WorkingDirectory(base) => normalize::normalize(path, base),
            EntryNaming::SourceRoot => normalize::relative_to_root(path, root),
        }
    }

    fn matching_exclude(&self, archive_path: &str, absolute: &Path) -> Option<&'a str> {
        let source: &'a SourceDescriptor = self.source;
        let excludes = move || source.excludes.iter().map(String::as_str);

        let relative = excludes().filter(|pattern| !pattern.starts_with('/'));
        if let Some(pattern) = matcher::first_match(archive_path, relative) {
            return Some(pattern);
        }

        let mut rooted = excludes()
            .filter(|pattern| pattern.starts_with('/'))
            .peekable();
        rooted.peek()?;
        let raw = normalize::absolute_match_path(absolute, self.working_dir);
        matcher::first_match(&raw, rooted)
    }
}
