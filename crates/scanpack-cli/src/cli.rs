//! CLI argument parsing using clap.

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use clap_complete::Shell;
use scanpack_core::ArchiveFormat;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "scanpack")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true, env = "SCANPACK_DEBUG")]
    pub debug: bool,

    /// Suppress non-error output
    #[arg(
        short,
        long,
        global = true,
        env = "SCANPACK_QUIET",
        conflicts_with = "debug"
    )]
    pub quiet: bool,

    /// Output results in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Pack folders and files into an archive
    Create(CreateArgs),
    /// List the file entries of an archive
    List(ListArgs),
    /// Print the SHA-256 checksum of an archive
    Checksum(ChecksumArgs),
    /// Generate shell completions
    Completion(CompletionArgs),
}

impl Commands {
    /// Operation name used in JSON output.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Create(_) => "create",
            Self::List(_) => "list",
            Self::Checksum(_) => "checksum",
            Self::Completion(_) => "completion",
        }
    }
}

/// Archive format selectable on the command line or in a config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FormatArg {
    Zip,
    Tar,
    TarGz,
}

impl From<FormatArg> for ArchiveFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Zip => Self::Zip,
            FormatArg::Tar => Self::Tar,
            FormatArg::TarGz => Self::TarGz,
        }
    }
}

#[derive(clap::Args)]
pub struct CreateArgs {
    /// Output archive path (may also come from the config file)
    #[arg(value_name = "OUTPUT")]
    pub output: Option<PathBuf>,

    /// JSON pack configuration describing code and data sections
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Folder to pack recursively (can be repeated)
    #[arg(long = "folder", value_name = "DIR", conflicts_with = "config")]
    pub folders: Vec<PathBuf>,

    /// Single file to pack (can be repeated)
    #[arg(long = "file", value_name = "PATH", conflicts_with = "config")]
    pub files: Vec<PathBuf>,

    /// Exclude pattern (ANT glob, can be repeated)
    #[arg(
        long = "exclude",
        short = 'x',
        value_name = "GLOB",
        conflicts_with = "config"
    )]
    pub excludes: Vec<String>,

    /// Only pack files ending with this suffix (zip only, can be repeated)
    #[arg(long = "suffix", value_name = "SUFFIX", conflicts_with = "config")]
    pub suffixes: Vec<String>,

    /// Pack every file regardless of its suffix
    #[arg(long, env = "SCANPACK_WHITELIST_ALL")]
    pub whitelist_all: bool,

    /// Store the files under `__data__/<NAME>/` instead of the archive root
    #[arg(long, value_name = "NAME", conflicts_with = "config")]
    pub name: Option<String>,

    /// Archive format (default: inferred from the output extension)
    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,

    /// Do not skip test, .git and `node_modules` directories
    #[arg(long, env = "SCANPACK_IGNORE_DEFAULT_EXCLUDES")]
    pub ignore_default_excludes: bool,

    /// Overwrite output file if exists
    #[arg(short = 'f', long)]
    pub force: bool,
}

#[derive(clap::Args)]
pub struct ListArgs {
    /// Path to the archive file
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,
}

#[derive(clap::Args)]
pub struct ChecksumArgs {
    /// Path to the archive file
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,
}

#[derive(clap::Args)]
pub struct CompletionArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_create_flags() {
        let cli = Cli::try_parse_from([
            "scanpack",
            "create",
            "out.zip",
            "--folder",
            "src",
            "--folder",
            "lib",
            "--suffix",
            ".rs",
            "-x",
            "**/gen/**",
            "--format",
            "tar-gz",
        ])
        .unwrap();

        let Commands::Create(args) = cli.command else {
            panic!("expected create command");
        };
        assert_eq!(args.output, Some(PathBuf::from("out.zip")));
        assert_eq!(args.folders.len(), 2);
        assert_eq!(args.suffixes, vec![".rs"]);
        assert_eq!(args.excludes, vec!["**/gen/**"]);
        assert_eq!(args.format, Some(FormatArg::TarGz));
    }

    #[test]
    fn test_config_conflicts_with_folder() {
        let result = Cli::try_parse_from([
            "scanpack",
            "create",
            "out.zip",
            "--config",
            "scanpack.json",
            "--folder",
            "src",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_debug_conflicts_with_quiet() {
        let result = Cli::try_parse_from(["scanpack", "--debug", "--quiet", "list", "a.zip"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_format_arg_conversion() {
        assert_eq!(ArchiveFormat::from(FormatArg::Zip), ArchiveFormat::Zip);
        assert_eq!(ArchiveFormat::from(FormatArg::Tar), ArchiveFormat::Tar);
        assert_eq!(ArchiveFormat::from(FormatArg::TarGz), ArchiveFormat::TarGz);
    }
}
