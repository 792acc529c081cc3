//! ANT-style path matching.
//!
//! Patterns are compared against forward-slash paths segment by segment:
//!
//! - `**` as a whole segment spans zero or more path segments
//! - `*` inside a segment matches any run of characters except `/`
//! - every other character must match literally (case-sensitive)
//!
//! A pattern without any `/` that contains `*` (for example `*.txt` or
//! `f*0*.txt`) is a bare filename glob and is tested against the final path
//! segment only, at any depth. Matching is purely lexical and never touches
//! the filesystem.
//!
//! # Examples
//!
//! ```
//! use scanpack_core::matcher::matches;
//!
//! assert!(matches("a.txt", "**/a.txt"));
//! assert!(matches("/x/y/z/V/a.txt", "/x/**/a.txt"));
//! assert!(matches("src/test/unit.rs", "**/test/**"));
//! assert!(matches("deep/dir/file0.txt", "f*0*.txt"));
//! assert!(!matches("a2.txt", "a1.txt"));
//! ```

use crate::creation::normalize::to_forward_slashes;

const MULTI_SEGMENT: &str = "**";

/// Returns whether `path` matches the glob `pattern`.
///
/// Backslashes in either argument are treated as separators.
#[must_use]
pub fn matches(path: &str, pattern: &str) -> bool {
    let path = to_forward_slashes(path);
    let pattern = to_forward_slashes(pattern);

    if is_filename_glob(&pattern) {
        let file_name = path.rsplit('/').next().unwrap_or(&path);
        return segment_matches(file_name, &pattern);
    }

    let path_segments: Vec<&str> = path.split('/').collect();
    let pattern_segments: Vec<&str> = pattern.split('/').collect();
    segments_match(&path_segments, &pattern_segments)
}

/// Returns the first pattern in `patterns` that matches `path`.
///
/// # Examples
///
/// ```
/// use scanpack_core::matcher::first_match;
///
/// let patterns = ["**/file3.txt", "f*0*.txt"];
/// assert_eq!(first_match("sub1/file0.txt", patterns), Some("f*0*.txt"));
/// assert_eq!(first_match("sub1/file1.txt", patterns), None);
/// ```
#[must_use]
pub fn first_match<'a, I>(path: &str, patterns: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    patterns.into_iter().find(|pattern| matches(path, pattern))
}

/// Returns `true` if every path below a directory matching `pattern` matches
/// it as well, which is the case for patterns ending in `/**`.
#[must_use]
pub fn covers_subtree(pattern: &str) -> bool {
    to_forward_slashes(pattern).ends_with("/**")
}

fn is_filename_glob(pattern: &str) -> bool {
    !pattern.contains('/') && pattern.contains('*')
}

/// Matches path segments against pattern segments, with `**` spanning any
/// number of segments. Backtracks only to the most recent `**`, which is
/// sufficient because `**` accepts every segment sequence.
fn segments_match(path: &[&str], pattern: &[&str]) -> bool {
    let mut p = 0;
    let mut s = 0;
    let mut resume: Option<(usize, usize)> = None;

    while s < path.len() {
        if pattern.get(p) == Some(&MULTI_SEGMENT) {
            p += 1;
            resume = Some((p, s));
        } else if pattern
            .get(p)
            .is_some_and(|segment| segment_matches(path[s], segment))
        {
            p += 1;
            s += 1;
        } else if let Some((resume_p, resume_s)) = resume {
            p = resume_p;
            s = resume_s + 1;
            resume = Some((resume_p, s));
        } else {
            return false;
        }
    }

    while pattern.get(p) == Some(&MULTI_SEGMENT) {
        p += 1;
    }
    p == pattern.len()
}

/// Single-segment glob where `*` matches any run of bytes.
fn segment_matches(text: &str, pattern: &str) -> bool {
    let text = text.as_bytes();
    let pattern = pattern.as_bytes();

    let mut t = 0;
    let mut p = 0;
    let mut star: Option<(usize, usize)> = None;

    while t < text.len() {
        if p < pattern.len() && pattern[p] == b'*' {
            p += 1;
            star = Some((p, t));
        } else if p < pattern.len() && pattern[p] == text[t] {
            p += 1;
            t += 1;
        } else if let Some((star_p, star_t)) = star {
            p = star_p;
            t = star_t + 1;
            star = Some((star_p, t));
        } else {
            return false;
        }
    }

    while p < pattern.len() && pattern[p] == b'*' {
        p += 1;
    }
    p == pattern.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_requires_exact_match() {
        assert!(matches("a1.txt", "a1.txt"));
        assert!(!matches("a2.txt", "a1.txt"));
        assert!(!matches("dir/a1.txt", "a1.txt"));
        assert!(!matches("a1.txt.bak", "a1.txt"));
        assert!(!matches("src/main.rs", "src"));
    }

    #[test]
    fn test_filename_wildcards() {
        assert!(matches("a.txt", "*.txt"));
        assert!(matches("a1.txt", "a*1.txt"));
        assert!(matches("a__1.txt", "a*1.txt"));
        assert!(!matches("a.txt", "*.rs"));
        assert!(!matches("b1.txt", "a*1.txt"));
    }

    #[test]
    fn test_bare_filename_glob_matches_at_any_depth() {
        assert!(matches("sub1/file0.txt", "f*0*.txt"));
        assert!(matches("/tmp/x/sub1/file0.txt", "*.txt"));
        assert!(!matches("sub1/file1.txt", "f*0*.txt"));
        assert!(!matches("file0.txt/readme.md", "f*0*.txt"));
    }

    #[test]
    fn test_double_star_zero_segments() {
        assert!(matches("a.txt", "**/a.txt"));
        assert!(matches("x/a.txt", "**/a.txt"));
        assert!(matches("x/y/z/a.txt", "**/a.txt"));
        assert!(!matches("x/ya.txt", "**/a.txt"));
        assert!(!matches("x/a.txt/b", "**/a.txt"));
    }

    #[test]
    fn test_absolute_prefix_with_double_star() {
        assert!(matches("/x/y/z/V/a.txt", "/x/**/a.txt"));
        assert!(matches("/x/a.txt", "/x/**/a.txt"));
        assert!(!matches("/x/y/z/V/b.txt", "/x/**/a.txt"));
        assert!(!matches("/w/x/a.txt", "/x/**/a.txt"));
    }

    #[test]
    fn test_directory_anywhere() {
        assert!(matches("sub2/sub3/file3.txt", "**/sub3/**"));
        assert!(matches("sub3/file3.txt", "**/sub3/**"));
        assert!(matches("a/.git/config", "**/.git/**"));
        assert!(!matches("sub2/sub33/file3.txt", "**/sub3/**"));
        assert!(!matches("sub2/file3.txt", "**/sub3/**"));
    }

    #[test]
    fn test_nested_double_star() {
        assert!(matches("a/b", "**/a/**/b"));
        assert!(matches("x/a/y/z/b", "**/a/**/b"));
        assert!(!matches("x/a/y/z/c", "**/a/**/b"));
        assert!(!matches("b/a", "**/a/**/b"));
    }

    #[test]
    fn test_wildcard_segment_between_literals() {
        assert!(matches("src/main.rs", "src/*.rs"));
        assert!(!matches("src/sub/main.rs", "src/*.rs"));
        assert!(!matches("lib/src/main.rs", "src/*.rs"));
        assert!(matches("lib/src/main.rs", "**/src/*.rs"));
    }

    #[test]
    fn test_relative_folder_prefix() {
        let pattern = "tmptest/sub2/**";
        assert!(matches("tmptest/sub2/file1.txt", pattern));
        assert!(matches("tmptest/sub2/sub3/file1.txt", pattern));
        assert!(!matches("tmptest/sub1/file1.txt", pattern));
    }

    #[test]
    fn test_case_sensitive() {
        assert!(!matches("A.TXT", "*.txt"));
        assert!(!matches("Test/a.rs", "**/test/**"));
    }

    #[test]
    fn test_backslash_separators() {
        assert!(matches("dir\\sub\\a.txt", "**/sub/*.txt"));
        assert!(matches("dir/sub/a.txt", "**\\sub\\*.txt"));
    }

    #[test]
    fn test_star_does_not_cross_separator() {
        assert!(!matches("a/b.txt", "a*b.txt"));
        assert!(!matches("src/a/b.rs", "src/*"));
        assert!(matches("src/a", "src/*"));
    }

    #[test]
    fn test_first_match_and_helpers() {
        let owned = vec!["**/*.tar".to_string(), "*.log".to_string()];
        let patterns = || owned.iter().map(String::as_str);
        assert_eq!(first_match("out/pack.tar", patterns()), Some("**/*.tar"));
        assert_eq!(first_match("debug.log", patterns()), Some("*.log"));
        assert_eq!(first_match("main.rs", patterns()), None);

        assert!(covers_subtree("**/node_modules/**"));
        assert!(!covers_subtree("**/*.js"));
    }
}
