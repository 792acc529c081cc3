//! Pack configuration file and per-command settings resolution.
//!
//! Settings come from three layers: the optional JSON config file, the
//! environment (through clap's `env` attributes) and the command line.
//! Command-line values win over the file.

use crate::cli::CreateArgs;
use crate::cli::FormatArg;
use crate::error::EXIT_INVALID_CONFIG;
use crate::error::EXIT_MISSING_CONFIG;
use crate::error::EXIT_MISSING_PARAMETER;
use crate::error::Failure;
use anyhow::Result;
use scanpack_core::ArchiveFormat;
use scanpack_core::IncludeFilter;
use scanpack_core::SourceDescriptor;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

/// Top level of a `scanpack.json` file.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PackFile {
    #[serde(default)]
    pub output: Option<PathBuf>,
    #[serde(default)]
    pub format: Option<FormatArg>,
    #[serde(default)]
    pub code_scan: Option<CodeScanSection>,
    #[serde(default)]
    pub data: DataSections,
}

/// Source code stored at the archive root.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CodeScanSection {
    #[serde(default)]
    pub file_system: FileSystem,
    #[serde(default)]
    pub excludes: Vec<String>,
    #[serde(default)]
    pub source_code_patterns: Vec<String>,
    #[serde(default)]
    pub whitelist_all: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DataSections {
    #[serde(default)]
    pub sources: Vec<DataSection>,
    #[serde(default)]
    pub binaries: Vec<DataSection>,
}

/// A named section stored under `__data__/<name>/`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DataSection {
    pub name: String,
    #[serde(default)]
    pub file_system: FileSystem,
    #[serde(default)]
    pub excludes: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileSystem {
    #[serde(default)]
    pub folders: Vec<PathBuf>,
    #[serde(default)]
    pub files: Vec<PathBuf>,
}

impl PackFile {
    /// Reads and parses a config file.
    ///
    /// A missing or unreadable file and a malformed one fail with distinct
    /// exit codes.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            Failure::new(
                EXIT_MISSING_CONFIG,
                format!(
                    "Cannot read config file '{}': {e}\n\
                     HINT: Check the path passed to --config.",
                    path.display()
                ),
            )
        })?;
        Self::parse(&text).map_err(|e| {
            Failure::new(
                EXIT_INVALID_CONFIG,
                format!("Invalid config file '{}': {e}", path.display()),
            )
            .into()
        })
    }

    fn parse(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Turns every section into a descriptor; the code section comes first.
    pub fn into_descriptors(
        self,
        whitelist_all: bool,
        default_excludes: bool,
    ) -> Vec<SourceDescriptor> {
        let mut descriptors = Vec::new();

        if let Some(code) = self.code_scan {
            let include = if whitelist_all || code.whitelist_all {
                IncludeFilter::All
            } else {
                IncludeFilter::suffixes(code.source_code_patterns)
            };
            let mut descriptor = SourceDescriptor::anonymous()
                .with_folders(code.file_system.folders)
                .with_files(code.file_system.files)
                .with_excludes(code.excludes)
                .with_include(include);
            if default_excludes {
                descriptor = descriptor.with_default_excludes();
            }
            descriptors.push(descriptor);
        }

        descriptors.extend(
            self.data
                .sources
                .into_iter()
                .chain(self.data.binaries)
                .map(|section| {
                    SourceDescriptor::named(section.name)
                        .with_folders(section.file_system.folders)
                        .with_files(section.file_system.files)
                        .with_excludes(section.excludes)
                }),
        );

        descriptors
    }
}

/// A setting a command cannot run without.
pub struct Requirement<S> {
    pub field: &'static str,
    pub hint: &'static str,
    pub is_set: fn(&S) -> bool,
}

/// Settings checked before `create` runs, in reporting order.
pub const CREATE_REQUIREMENTS: &[Requirement<CreateSettings>] = &[Requirement {
    field: "output",
    hint: "Pass OUTPUT or set \"output\" in the config file.",
    is_set: |settings| settings.output.is_some(),
}];

/// Fails with the first requirement that is not met.
pub fn check_required<S>(
    command: &str,
    settings: &S,
    requirements: &[Requirement<S>],
) -> Result<()> {
    match requirements.iter().find(|r| !(r.is_set)(settings)) {
        Some(missing) => Err(Failure::new(
            EXIT_MISSING_PARAMETER,
            format!(
                "Missing required parameter '{}' for {command}\nHINT: {}",
                missing.field, missing.hint
            ),
        )
        .into()),
        None => Ok(()),
    }
}

/// Fully resolved inputs of the `create` command.
#[derive(Debug)]
pub struct CreateSettings {
    pub output: Option<PathBuf>,
    pub format: Option<ArchiveFormat>,
    pub sources: Vec<SourceDescriptor>,
}

impl CreateSettings {
    /// Merges the config file (if any) with the command line.
    pub fn resolve(args: &CreateArgs) -> Result<Self> {
        let default_excludes = !args.ignore_default_excludes;

        let settings = match &args.config {
            Some(path) => {
                let mut file = PackFile::load(path)?;
                let file_output = file.output.take();
                Self {
                    output: args.output.clone().or(file_output),
                    format: args.format.or(file.format).map(Into::into),
                    sources: file.into_descriptors(args.whitelist_all, default_excludes),
                }
            }
            None => Self {
                output: args.output.clone(),
                format: args.format.map(Into::into),
                sources: vec![descriptor_from_args(args, default_excludes)],
            },
        };

        check_required("create", &settings, CREATE_REQUIREMENTS)?;
        Ok(settings)
    }
}

/// One descriptor from `--folder`, `--file`, `--exclude`, `--suffix` and
/// `--name`. Default excludes only apply to the anonymous code section.
fn descriptor_from_args(args: &CreateArgs, default_excludes: bool) -> SourceDescriptor {
    let include = if args.whitelist_all {
        IncludeFilter::All
    } else {
        IncludeFilter::suffixes(args.suffixes.iter().cloned())
    };

    let descriptor = args
        .name
        .as_ref()
        .map_or_else(SourceDescriptor::anonymous, SourceDescriptor::named)
        .with_folders(args.folders.iter().cloned())
        .with_files(args.files.iter().cloned())
        .with_excludes(args.excludes.iter().cloned())
        .with_include(include);

    if default_excludes && descriptor.name.is_none() {
        descriptor.with_default_excludes()
    } else {
        descriptor
    }
}
