//! Canonical archive paths.
//!
//! Every candidate file is normalized once, and the same string is used both
//! for include/exclude matching and for the entry name written to the archive.
//! Normalized paths always use `/`, never start with `/`, and never contain
//! `.` or `..` segments.

use std::borrow::Cow;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

/// Converts backslash separators to forward slashes.
///
/// # Examples
///
/// ```
/// use scanpack_core::creation::normalize::to_forward_slashes;
///
/// assert_eq!(to_forward_slashes("a\\b\\c.txt"), "a/b/c.txt");
/// assert_eq!(to_forward_slashes("a/b"), "a/b");
/// ```
#[must_use]
pub fn to_forward_slashes(path: &str) -> Cow<'_, str> {
    if path.contains('\\') {
        Cow::Owned(path.replace('\\', "/"))
    } else {
        Cow::Borrowed(path)
    }
}

/// Strips a leading drive designator such as `C:`.
///
/// # Examples
///
/// ```
/// use scanpack_core::creation::normalize::strip_volume;
///
/// assert_eq!(strip_volume("C:/work/a.txt"), "/work/a.txt");
/// assert_eq!(strip_volume("/work/a.txt"), "/work/a.txt");
/// ```
#[must_use]
pub fn strip_volume(path: &str) -> &str {
    let bytes = path.as_bytes();
    if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
        &path[2..]
    } else {
        path
    }
}

/// Resolves `path` against `working_dir` without touching the filesystem.
///
/// `.` components are dropped and `..` components pop their parent, like
/// `filepath.Abs`-style lexical cleaning. Symlinks are not resolved.
///
/// # Examples
///
/// ```
/// use scanpack_core::creation::normalize::absolutize;
/// use std::path::Path;
///
/// let abs = absolutize(Path::new("./../other/a.txt"), Path::new("/work/project"));
/// assert_eq!(abs, Path::new("/work/other/a.txt"));
/// ```
#[must_use]
pub fn absolutize(path: &Path, working_dir: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        working_dir.join(path)
    };

    let mut cleaned = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                cleaned.pop();
            }
            other => cleaned.push(other.as_os_str()),
        }
    }
    cleaned
}

/// Normalizes a visited file path into a canonical archive-relative name.
///
/// When the resolved path lies below `working_dir` the prefix is stripped.
/// Otherwise the path as given by the caller is cleaned instead: separators
/// are converted, the volume is dropped, and leading `/`, `./` and `../`
/// segments are removed.
///
/// # Examples
///
/// ```
/// use scanpack_core::creation::normalize::normalize;
/// use std::path::Path;
///
/// let wd = Path::new("/work/project");
/// assert_eq!(normalize(Path::new("src/main.rs"), wd), "src/main.rs");
/// assert_eq!(normalize(Path::new("/work/project/src/lib.rs"), wd), "src/lib.rs");
/// assert_eq!(normalize(Path::new("./../shared/file1.txt"), wd), "shared/file1.txt");
/// assert_eq!(normalize(Path::new("/tmp/x/file.bin"), wd), "tmp/x/file.bin");
/// ```
#[must_use]
pub fn normalize(path: &Path, working_dir: &Path) -> String {
    let base = absolutize(working_dir, working_dir);
    let absolute = absolutize(path, &base);

    if let Ok(relative) = absolute.strip_prefix(&base) {
        let relative = relative.to_string_lossy();
        if !relative.is_empty() {
            return to_forward_slashes(&relative).into_owned();
        }
    }

    let raw = path.to_string_lossy();
    clean_relative(strip_volume(&to_forward_slashes(&raw)))
}

/// Returns the forward-slash, volume-free form of an absolute path, used to
/// evaluate exclude patterns that start with `/`.
#[must_use]
pub fn absolute_match_path(path: &Path, working_dir: &Path) -> String {
    let absolute = absolutize(path, working_dir);
    let absolute = absolute.to_string_lossy();
    strip_volume(&to_forward_slashes(&absolute)).to_string()
}

/// Computes the name of `path` relative to the walked `root`.
///
/// For a single file passed as its own root, the file name is used.
#[must_use]
pub fn relative_to_root(path: &Path, root: &Path) -> String {
    match path.strip_prefix(root) {
        Ok(relative) if !relative.as_os_str().is_empty() => {
            clean_relative(&to_forward_slashes(&relative.to_string_lossy()))
        }
        _ => path.file_name().map_or_else(
            || clean_relative(&to_forward_slashes(&path.to_string_lossy())),
            |name| name.to_string_lossy().into_owned(),
        ),
    }
}

/// Drops empty, `.` and `..` segments and any leading separator.
fn clean_relative(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();
    let mut leading = true;
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if !leading {
                    segments.pop();
                }
            }
            other => {
                leading = false;
                segments.push(other);
            }
        }
    }
    segments.join("/")
}
