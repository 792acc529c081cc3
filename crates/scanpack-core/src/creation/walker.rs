//! Recursive directory traversal.
//!
//! The walker reports every filesystem object below a root in a stable,
//! name-sorted order. Directories are reported so the visitor can decide to
//! skip their subtree, but only files ever become archive entries.

use crate::PackError;
use crate::Result;
use crate::creation::normalize::absolutize;
use std::fs::FileType;
use std::path::Path;
use std::path::PathBuf;
use walkdir::WalkDir;

/// Kind of a visited filesystem object. Symlinks are never followed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Regular file.
    File,
    /// Directory.
    Directory,
    /// Symbolic link, whatever it points to.
    Symlink,
    /// Socket, FIFO or device node.
    Other,
}

impl EntryKind {
    fn from_file_type(file_type: FileType) -> Self {
        if file_type.is_symlink() {
            Self::Symlink
        } else if file_type.is_dir() {
            Self::Directory
        } else if file_type.is_file() {
            Self::File
        } else {
            Self::Other
        }
    }
}

/// A visited filesystem object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
    /// Path as produced by joining the configured root with the relative path.
    pub path: PathBuf,
    /// Kind of the object.
    pub kind: EntryKind,
    /// Depth below the root (the root itself is 0).
    pub depth: usize,
}

/// Decision returned by a visitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    /// Keep walking.
    Continue,
    /// Do not descend into the directory just visited.
    SkipDirectory,
}

/// Walks one configured folder or file.
///
/// # Examples
///
/// ```no_run
/// use scanpack_core::creation::walker::EntryKind;
/// use scanpack_core::creation::walker::TreeWalker;
/// use scanpack_core::creation::walker::Visit;
/// use std::path::Path;
///
/// let walker = TreeWalker::new(Path::new("src"), Path::new("/work"));
/// walker.walk(|entry| {
///     if entry.kind == EntryKind::File {
///         println!("{}", entry.path.display());
///     }
///     Ok(Visit::Continue)
/// })?;
/// # Ok::<(), scanpack_core::PackError>(())
/// ```
pub struct TreeWalker<'a> {
    root: &'a Path,
    working_dir: &'a Path,
}

impl<'a> TreeWalker<'a> {
    /// Creates a walker for `root`, resolving relative roots against
    /// `working_dir` for error messages.
    #[must_use]
    pub fn new(root: &'a Path, working_dir: &'a Path) -> Self {
        Self { root, working_dir }
    }

    /// Visits every object below the root, the root included.
    ///
    /// Stops at the first error, whether reported by the filesystem or
    /// returned by `visit`.
    ///
    /// # Errors
    ///
    /// - [`PackError::SourceNotFound`] if the root does not exist
    /// - [`PackError::Io`] if a directory cannot be read or an entry vanished
    /// - any error returned by `visit`
    pub fn walk<F>(&self, mut visit: F) -> Result<()>
    where
        F: FnMut(&WalkEntry) -> Result<Visit>,
    {
        self.ensure_exists()?;

        let mut entries = WalkDir::new(self.root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter();

        while let Some(entry) = entries.next() {
            let entry = entry?;

            let walked = WalkEntry {
                path: entry.path().to_path_buf(),
                kind: EntryKind::from_file_type(entry.file_type()),
                depth: entry.depth(),
            };

            if visit(&walked)? == Visit::SkipDirectory && walked.kind == EntryKind::Directory {
                entries.skip_current_dir();
            }
        }

        Ok(())
    }

    fn ensure_exists(&self) -> Result<()> {
        match std::fs::symlink_metadata(self.root) {
            Ok(_) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(PackError::SourceNotFound {
                    configured: self.root.to_path_buf(),
                    resolved: absolutize(self.root, self.working_dir),
                })
            }
            Err(err) => Err(err.into()),
        }
    }
}
