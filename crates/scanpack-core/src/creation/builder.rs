//! Builder for packing source descriptors into one archive.

use std::collections::HashSet;
use std::fs::File;
use std::fs::Metadata;
use std::io::BufWriter;
use std::path::Path;
use std::path::PathBuf;
use std::time::Instant;

use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::PackError;
use crate::Result;
use crate::creation::config::EntryNaming;
use crate::creation::config::PackConfig;
use crate::creation::config::SMALL_ARCHIVE_THRESHOLD;
use crate::creation::config::SymlinkPolicy;
use crate::creation::filters::Decision;
use crate::creation::filters::EntryFilter;
use crate::creation::normalize::absolutize;
use crate::creation::report::BuildReport;
use crate::creation::source::SourceDescriptor;
use crate::creation::source::validate_sources;
use crate::creation::tar::TarSink;
use crate::creation::walker::EntryKind;
use crate::creation::walker::TreeWalker;
use crate::creation::walker::Visit;
use crate::creation::walker::WalkEntry;
use crate::creation::zip::ZipSink;
use crate::formats::ArchiveFormat;
use crate::formats::EntrySink;
use crate::formats::detect_format;
use crate::inspection::list_entries_as;

/// Builder for packing source descriptors into one archive.
///
/// Either a complete, non-empty archive exists at the output path when
/// [`ArchiveBuilder::build`] returns `Ok`, or the partially written file has
/// been removed.
///
/// # Examples
///
/// ```no_run
/// use scanpack_core::creation::ArchiveBuilder;
/// use scanpack_core::creation::SourceDescriptor;
///
/// let report = ArchiveBuilder::new()
///     .output("sources.zip")
///     .source(
///         SourceDescriptor::anonymous()
///             .with_folder("src")
///             .with_suffixes([".rs"]),
///     )
///     .source(SourceDescriptor::named("docs").with_folder("docs"))
///     .build()?;
///
/// println!("Packed {} files", report.files_added());
/// # Ok::<(), scanpack_core::PackError>(())
/// ```
#[derive(Debug, Default)]
pub struct ArchiveBuilder {
    output_path: Option<PathBuf>,
    sources: Vec<SourceDescriptor>,
    config: PackConfig,
}

impl ArchiveBuilder {
    /// Creates a new `ArchiveBuilder` with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the output archive path.
    ///
    /// The format is inferred from the extension unless set via `format()`.
    #[must_use]
    pub fn output<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.output_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Adds a source descriptor.
    #[must_use]
    pub fn source(mut self, source: SourceDescriptor) -> Self {
        self.sources.push(source);
        self
    }

    /// Adds several source descriptors.
    #[must_use]
    pub fn sources<I: IntoIterator<Item = SourceDescriptor>>(mut self, sources: I) -> Self {
        self.sources.extend(sources);
        self
    }

    /// Sets the full configuration.
    #[must_use]
    pub fn config(mut self, config: PackConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets an explicit archive format.
    #[must_use]
    pub fn format(mut self, format: ArchiveFormat) -> Self {
        self.config.format = Some(format);
        self
    }

    /// Sets the entry naming policy.
    #[must_use]
    pub fn naming(mut self, naming: EntryNaming) -> Self {
        self.config.naming = naming;
        self
    }

    /// Builds the archive.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the output path is not set or no source is given
    /// - a section name is invalid or used twice
    /// - the output would be part of its own content
    /// - a declared folder or file does not exist
    /// - any I/O error occurs while walking, reading or writing
    /// - no entry was written
    pub fn build(self) -> Result<BuildReport> {
        let plan = self.plan()?;

        let start = Instant::now();
        let file = File::create(&plan.output)?;
        debug!(archive = %plan.target.display(), format = %plan.format, "archive created");
        let sink = open_sink(file, plan.format, self.config.compression_level);

        let mut report = self.write(&plan, sink)?;
        report.duration = start.elapsed();
        info!(
            archive = %plan.output.display(),
            entries = report.files_added(),
            skipped = report.files_skipped(),
            bytes = report.archive_size,
            "archive written"
        );
        Ok(report)
    }

    /// Validates the request and resolves paths; touches nothing on disk.
    fn plan(&self) -> Result<BuildPlan> {
        let output = self
            .output_path
            .clone()
            .ok_or_else(|| PackError::InvalidConfiguration {
                reason: "output path not set".to_string(),
            })?;

        if self.sources.is_empty() {
            return Err(PackError::InvalidConfiguration {
                reason: "no source provided".to_string(),
            });
        }

        validate_sources(&self.sources)?;

        let format = match self.config.format {
            Some(format) => format,
            None => detect_format(&output)?,
        };

        let working_dir = std::env::current_dir()?;
        let target = absolutize(&output, &working_dir);
        check_self_inclusion(&target, &self.sources, &working_dir)?;

        let naming = match &self.config.naming {
            EntryNaming::WorkingDirectory(base) => {
                EntryNaming::WorkingDirectory(absolutize(base, &working_dir))
            }
            EntryNaming::SourceRoot => EntryNaming::SourceRoot,
        };

        Ok(BuildPlan {
            output,
            target,
            working_dir,
            naming,
            format,
        })
    }

    /// Packs every source through `sink`. The output file is removed if any
    /// step fails.
    fn write(&self, plan: &BuildPlan, sink: Box<dyn EntrySink>) -> Result<BuildReport> {
        let result = TargetIdentity::of(&plan.target).and_then(|identity| {
            BuildRun {
                target: &plan.target,
                identity,
                working_dir: &plan.working_dir,
                naming: &plan.naming,
                format: plan.format,
                symlinks: self.config.symlink_policy(plan.format),
                sink,
                report: BuildReport::new(&plan.output, plan.format),
                seen: HashSet::new(),
            }
            .execute(&self.sources, &self.config)
        });

        if result.is_err() {
            discard(&plan.output);
        }
        result
    }
}

/// Output location, naming and format of one build.
struct BuildPlan {
    output: PathBuf,
    target: PathBuf,
    working_dir: PathBuf,
    naming: EntryNaming,
    format: ArchiveFormat,
}

/// Fails if a declared folder contains the target or an explicit file is
/// the target.
///
/// Paths are compared both as written and with symlinks resolved, so a
/// folder reached through an alias still counts.
fn check_self_inclusion(
    target: &Path,
    sources: &[SourceDescriptor],
    working_dir: &Path,
) -> Result<()> {
    let resolved_target = resolve_existing(target);

    for source in sources {
        let folder_hit = source.folders.iter().any(|folder| {
            let folder = absolutize(folder, working_dir);
            target.starts_with(&folder) || resolved_target.starts_with(resolve_existing(&folder))
        });
        let file_hit = source.files.iter().any(|file| {
            let file = absolutize(file, working_dir);
            file.as_path() == target || resolve_existing(&file) == resolved_target
        });

        if folder_hit || file_hit {
            return Err(PackError::SelfInclusion {
                target: target.to_path_buf(),
            });
        }
    }
    Ok(())
}

/// Resolves symlinks in the longest existing prefix of an absolute path and
/// appends the remaining components unchanged.
fn resolve_existing(path: &Path) -> PathBuf {
    if let Ok(resolved) = std::fs::canonicalize(path) {
        return resolved;
    }
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => resolve_existing(parent).join(name),
        _ => path.to_path_buf(),
    }
}

/// The archive being written, recognised behind any alias of its path.
struct TargetIdentity {
    #[cfg(unix)]
    inode: (u64, u64),
    #[cfg(not(unix))]
    canonical: PathBuf,
}

impl TargetIdentity {
    #[cfg(unix)]
    fn of(target: &Path) -> Result<Self> {
        use std::os::unix::fs::MetadataExt;

        let metadata = std::fs::metadata(target)?;
        Ok(Self {
            inode: (metadata.dev(), metadata.ino()),
        })
    }

    #[cfg(not(unix))]
    fn of(target: &Path) -> Result<Self> {
        Ok(Self {
            canonical: std::fs::canonicalize(target)?,
        })
    }

    /// Returns `true` if the opened file is the archive itself.
    #[cfg(unix)]
    fn is_target(&self, _path: &Path, metadata: &Metadata) -> bool {
        use std::os::unix::fs::MetadataExt;

        (metadata.dev(), metadata.ino()) == self.inode
    }

    #[cfg(not(unix))]
    fn is_target(&self, path: &Path, _metadata: &Metadata) -> bool {
        std::fs::canonicalize(path).is_ok_and(|resolved| resolved == self.canonical)
    }
}

fn open_sink(file: File, format: ArchiveFormat, level: Option<u8>) -> Box<dyn EntrySink> {
    let writer = BufWriter::new(file);
    match format {
        ArchiveFormat::Zip => Box::new(ZipSink::new(writer, level)),
        ArchiveFormat::Tar => Box::new(TarSink::new(writer)),
        ArchiveFormat::TarGz => Box::new(TarSink::gzip(writer, level)),
    }
}

fn discard(output: &Path) {
    if let Err(err) = std::fs::remove_file(output)
        && err.kind() != std::io::ErrorKind::NotFound
    {
        warn!(archive = %output.display(), error = %err, "could not remove incomplete archive");
    }
}

/// State of one build in progress.
struct BuildRun<'a> {
    target: &'a Path,
    identity: TargetIdentity,
    working_dir: &'a Path,
    naming: &'a EntryNaming,
    format: ArchiveFormat,
    symlinks: SymlinkPolicy,
    sink: Box<dyn EntrySink>,
    report: BuildReport,
    seen: HashSet<String>,
}

impl BuildRun<'_> {
    fn execute(mut self, sources: &[SourceDescriptor], config: &PackConfig) -> Result<BuildReport> {
        for source in sources {
            self.pack_source(source)?;
        }

        let Self { sink, mut report, .. } = self;
        sink.finish()?;

        report.archive_size = std::fs::metadata(&report.target)?.len();

        if report.entries.is_empty() {
            return Err(PackError::EmptyArchive {
                target: report.target.clone(),
            });
        }

        if config.verify_small_archives && report.archive_size < SMALL_ARCHIVE_THRESHOLD {
            let entries = list_entries_as(&report.target, report.format)?;
            debug!(entries = entries.len(), "small archive read back");
            if entries.is_empty() {
                return Err(PackError::EmptyArchive {
                    target: report.target.clone(),
                });
            }
        }

        Ok(report)
    }

    fn pack_source(&mut self, source: &SourceDescriptor) -> Result<()> {
        let filter = EntryFilter::new(source, self.format, self.naming, self.working_dir);
        let prefix = source.archive_prefix();
        debug!(source = source.label(), %prefix, "packing source");

        for root in source.folders.iter().chain(&source.files) {
            self.pack_root(root, &filter, &prefix)?;
        }
        Ok(())
    }

    fn pack_root(&mut self, root: &Path, filter: &EntryFilter<'_>, prefix: &str) -> Result<()> {
        let working_dir = self.working_dir;

        TreeWalker::new(root, working_dir).walk(|entry| match entry.kind {
            EntryKind::Directory => match filter.prune(&entry.path, root, entry.depth) {
                Some(pattern) => {
                    debug!(path = %entry.path.display(), pattern, "directory excluded");
                    Ok(Visit::SkipDirectory)
                }
                None => Ok(Visit::Continue),
            },
            EntryKind::File | EntryKind::Symlink => {
                self.pack_file(entry, root, filter, prefix)?;
                Ok(Visit::Continue)
            }
            EntryKind::Other => {
                debug!(path = %entry.path.display(), "not a regular file, skipped");
                Ok(Visit::Continue)
            }
        })
    }

    fn pack_file(
        &mut self,
        entry: &WalkEntry,
        root: &Path,
        filter: &EntryFilter<'_>,
        prefix: &str,
    ) -> Result<()> {
        let candidate = filter.candidate(&entry.path, root);

        if candidate.absolute_path.as_path() == self.target {
            return Err(PackError::SelfInclusion {
                target: self.target.to_path_buf(),
            });
        }

        match filter.decide(&candidate) {
            Decision::Include => {}
            Decision::Filtered => {
                debug!(path = %candidate.archive_path, "no allowed suffix, skipped");
                self.report.skipped_filtered += 1;
                return Ok(());
            }
            Decision::Excluded(pattern) => {
                debug!(path = %candidate.archive_path, pattern, "excluded");
                self.report.skipped_excluded += 1;
                return Ok(());
            }
        }

        if entry.kind == EntryKind::Symlink && !self.accept_symlink(&entry.path)? {
            self.report.skipped_symlinks += 1;
            return Ok(());
        }

        let name = format!("{prefix}{}", candidate.archive_path);
        if !self.seen.insert(name.clone()) {
            warn!(entry = %name, path = %entry.path.display(), "duplicate entry name, skipped");
            self.report.skipped_duplicates += 1;
            self.report.add_warning(format!("duplicate entry skipped: {name}"));
            return Ok(());
        }

        let mut file = File::open(&entry.path)?;
        let metadata = file.metadata()?;
        if self.identity.is_target(&entry.path, &metadata) {
            return Err(PackError::SelfInclusion {
                target: self.target.to_path_buf(),
            });
        }
        let bytes = self.sink.append_file(&name, &mut file, &metadata)?;
        debug!(entry = %name, bytes, "added");
        self.report.record_entry(name, bytes);
        Ok(())
    }

    /// Decides whether a symlink is read through. Links to directories are
    /// never descended into.
    fn accept_symlink(&mut self, path: &Path) -> Result<bool> {
        match self.symlinks {
            SymlinkPolicy::Skip => {
                info!(path = %path.display(), "symlink skipped");
                Ok(false)
            }
            SymlinkPolicy::Follow => {
                let resolved = std::fs::canonicalize(path)?;
                if resolved.is_dir() {
                    warn!(path = %path.display(), "symlink to directory skipped");
                    self.report
                        .add_warning(format!("symlink to directory skipped: {}", path.display()));
                    return Ok(false);
                }
                Ok(true)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn tree(temp: &TempDir) -> PathBuf {
        let root = temp.path().join("project");
        fs::create_dir_all(root.join("sub1")).unwrap();
        fs::create_dir_all(root.join("sub2/sub3")).unwrap();
        fs::write(root.join("sub1/file1.txt"), "one").unwrap();
        fs::write(root.join("sub2/file2.txt"), "two").unwrap();
        fs::write(root.join("sub2/sub3/file3.txt"), "three").unwrap();
        fs::write(root.join("sub2/image.png"), "png").unwrap();
        root
    }

    fn names(report: &BuildReport) -> Vec<&str> {
        let mut names: Vec<&str> = report.entries.iter().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    #[test]
    fn test_builder_requires_output_and_sources() {
        let err = ArchiveBuilder::new()
            .source(SourceDescriptor::anonymous())
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("output path not set"));

        let err = ArchiveBuilder::new().output("x.zip").build().unwrap_err();
        assert!(err.to_string().contains("no source"));
    }

    #[test]
    fn test_builder_source_root_naming_with_suffix() {
        let temp = TempDir::new().unwrap();
        let root = tree(&temp);
        let output = temp.path().join("out.zip");

        let report = ArchiveBuilder::new()
            .output(&output)
            .naming(EntryNaming::SourceRoot)
            .source(
                SourceDescriptor::anonymous()
                    .with_folders([root.join("sub1"), root.join("sub2")])
                    .with_suffixes([".txt"]),
            )
            .build()
            .unwrap();

        assert_eq!(
            names(&report),
            vec!["file1.txt", "file2.txt", "sub3/file3.txt"]
        );
        assert_eq!(report.skipped_filtered, 1);
        assert!(report.archive_size > 0);
        assert_eq!(report.format, ArchiveFormat::Zip);
    }

    #[test]
    fn test_builder_working_dir_naming() {
        let temp = TempDir::new().unwrap();
        let root = tree(&temp);
        let output = temp.path().join("out.tar");

        let report = ArchiveBuilder::new()
            .output(&output)
            .naming(EntryNaming::WorkingDirectory(root.clone()))
            .source(SourceDescriptor::anonymous().with_folder(root.join("sub2")))
            .build()
            .unwrap();

        assert_eq!(
            names(&report),
            vec!["sub2/file2.txt", "sub2/image.png", "sub2/sub3/file3.txt"]
        );
    }

    #[test]
    fn test_builder_named_section_prefix() {
        let temp = TempDir::new().unwrap();
        let root = tree(&temp);
        let output = temp.path().join("out.zip");

        let report = ArchiveBuilder::new()
            .output(&output)
            .naming(EntryNaming::SourceRoot)
            .source(SourceDescriptor::named("bins").with_file(root.join("sub2/image.png")))
            .build()
            .unwrap();

        assert_eq!(report.entries, vec!["__data__/bins/image.png"]);
    }

    #[test]
    fn test_builder_empty_removes_output() {
        let temp = TempDir::new().unwrap();
        let empty = temp.path().join("empty");
        fs::create_dir_all(empty.join("nested")).unwrap();
        let output = temp.path().join("out.zip");

        let err = ArchiveBuilder::new()
            .output(&output)
            .source(SourceDescriptor::anonymous().with_folder(&empty))
            .build()
            .unwrap_err();

        assert!(err.is_empty_archive());
        assert!(!output.exists());
    }

    #[test]
    fn test_builder_self_inclusion_before_create() {
        let temp = TempDir::new().unwrap();
        let root = tree(&temp);
        let output = root.join("sub1/out.zip");

        let err = ArchiveBuilder::new()
            .output(&output)
            .source(SourceDescriptor::anonymous().with_folder(&root))
            .build()
            .unwrap_err();

        assert!(matches!(err, PackError::SelfInclusion { .. }));
        assert!(!output.exists());
    }

    #[test]
    fn test_builder_missing_folder_removes_output() {
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("out.tar");

        let err = ArchiveBuilder::new()
            .output(&output)
            .source(SourceDescriptor::anonymous().with_folder(temp.path().join("missing")))
            .build()
            .unwrap_err();

        assert!(matches!(err, PackError::SourceNotFound { .. }));
        assert!(!output.exists());
    }

    #[test]
    fn test_builder_duplicate_names_first_wins() {
        let temp = TempDir::new().unwrap();
        let root = tree(&temp);
        let output = temp.path().join("out.zip");

        let report = ArchiveBuilder::new()
            .output(&output)
            .naming(EntryNaming::SourceRoot)
            .source(
                SourceDescriptor::anonymous()
                    .with_folder(root.join("sub2/sub3"))
                    .with_file(root.join("sub2/sub3/file3.txt")),
            )
            .build()
            .unwrap();

        assert_eq!(report.entries, vec!["file3.txt"]);
        assert_eq!(report.skipped_duplicates, 1);
        assert!(report.has_warnings());
    }

    #[test]
    fn test_builder_prunes_excluded_directory() {
        let temp = TempDir::new().unwrap();
        let root = tree(&temp);
        let output = temp.path().join("out.tar.gz");

        let report = ArchiveBuilder::new()
            .output(&output)
            .naming(EntryNaming::SourceRoot)
            .source(
                SourceDescriptor::anonymous()
                    .with_folder(root.join("sub2"))
                    .with_exclude("**/sub3/**"),
            )
            .build()
            .unwrap();

        assert_eq!(names(&report), vec!["file2.txt", "image.png"]);
        assert_eq!(report.format, ArchiveFormat::TarGz);
    }

    #[test]
    fn test_builder_rejects_invalid_section_name() {
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("out.zip");

        let err = ArchiveBuilder::new()
            .output(&output)
            .source(SourceDescriptor::named("__data__").with_folder(temp.path()))
            .build()
            .unwrap_err();

        assert!(matches!(err, PackError::InvalidSourceName { .. }));
        assert!(!output.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_builder_zip_follows_file_symlinks() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("src");
        fs::create_dir_all(root.join("dir")).unwrap();
        fs::write(root.join("real.txt"), "real").unwrap();
        std::os::unix::fs::symlink(root.join("real.txt"), root.join("link.txt")).unwrap();
        std::os::unix::fs::symlink(root.join("dir"), root.join("dirlink")).unwrap();
        let output = temp.path().join("out.zip");

        let report = ArchiveBuilder::new()
            .output(&output)
            .naming(EntryNaming::SourceRoot)
            .source(SourceDescriptor::anonymous().with_folder(&root))
            .build()
            .unwrap();

        assert_eq!(names(&report), vec!["link.txt", "real.txt"]);
        assert_eq!(report.skipped_symlinks, 1);
    }

    /// Creates `real/a.txt` and an `alias` symlink pointing at `real`.
    #[cfg(unix)]
    fn aliased_folder(temp: &TempDir) -> (PathBuf, PathBuf) {
        let real = temp.path().join("real");
        fs::create_dir_all(&real).unwrap();
        fs::write(real.join("a.txt"), "a").unwrap();
        let alias = temp.path().join("alias");
        std::os::unix::fs::symlink(&real, &alias).unwrap();
        (real, alias)
    }

    #[cfg(unix)]
    #[test]
    fn test_builder_self_inclusion_through_symlinked_folder() {
        let temp = TempDir::new().unwrap();
        let (real, alias) = aliased_folder(&temp);
        let output = real.join("zzz_out.tar");

        let err = ArchiveBuilder::new()
            .output(&output)
            .naming(EntryNaming::SourceRoot)
            .source(SourceDescriptor::anonymous().with_folder(&alias))
            .build()
            .unwrap_err();
        assert!(matches!(err, PackError::SelfInclusion { .. }));
        assert!(!output.exists());

        let err = ArchiveBuilder::new()
            .output(alias.join("zzz_out.tar"))
            .naming(EntryNaming::SourceRoot)
            .source(SourceDescriptor::anonymous().with_folder(&real))
            .build()
            .unwrap_err();
        assert!(matches!(err, PackError::SelfInclusion { .. }));
        assert!(!output.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_builder_detects_target_while_walking() {
        let temp = TempDir::new().unwrap();
        let (real, alias) = aliased_folder(&temp);
        let output = real.join("zzz_out.tar");

        let builder =
            ArchiveBuilder::new().source(SourceDescriptor::anonymous().with_folder(&alias));
        let plan = BuildPlan {
            output: output.clone(),
            target: output.clone(),
            working_dir: temp.path().to_path_buf(),
            naming: EntryNaming::SourceRoot,
            format: ArchiveFormat::Tar,
        };
        let sink = open_sink(File::create(&output).unwrap(), ArchiveFormat::Tar, None);

        let err = builder.write(&plan, sink).unwrap_err();

        assert!(matches!(err, PackError::SelfInclusion { .. }));
        assert!(!output.exists());
    }

    /// Accepts the first entry, then fails like a full disk.
    #[derive(Default)]
    struct FailingSink {
        appended: usize,
    }

    impl EntrySink for FailingSink {
        fn append_file(
            &mut self,
            _name: &str,
            _file: &mut File,
            metadata: &Metadata,
        ) -> Result<u64> {
            self.appended += 1;
            if self.appended == 2 {
                return Err(std::io::Error::other("no space left on device").into());
            }
            Ok(metadata.len())
        }

        fn finish(self: Box<Self>) -> Result<()> {
            Ok(())
        }

        fn format(&self) -> ArchiveFormat {
            ArchiveFormat::Zip
        }
    }

    #[test]
    fn test_builder_write_failure_removes_partial_archive() {
        let temp = TempDir::new().unwrap();
        let root = tree(&temp);
        let output = temp.path().join("out.zip");

        let builder = ArchiveBuilder::new()
            .output(&output)
            .naming(EntryNaming::SourceRoot)
            .source(SourceDescriptor::anonymous().with_folder(&root));
        let plan = builder.plan().unwrap();
        fs::write(&plan.output, "partial").unwrap();

        let err = builder.write(&plan, Box::new(FailingSink::default())).unwrap_err();

        assert!(matches!(err, PackError::Io(_)));
        assert!(err.to_string().contains("no space left"));
        assert!(!output.exists());
    }
}
