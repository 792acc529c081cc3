//! Checksum command implementation

use crate::cli::ChecksumArgs;
use crate::error::add_archive_context;
use crate::output::OutputFormatter;
use anyhow::Result;
use scanpack_core::checksum::sha256_file;

pub fn execute(args: &ChecksumArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let checksum = add_archive_context(sha256_file(&args.archive), &args.archive)?;
    formatter.format_checksum(&args.archive, &checksum)
}
