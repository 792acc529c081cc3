//! Create command implementation

use crate::cli::CreateArgs;
use crate::config::CreateSettings;
use crate::error::EXIT_FAILURE;
use crate::error::EXIT_MISSING_PARAMETER;
use crate::error::Failure;
use crate::error::add_archive_context;
use crate::output::OutputFormatter;
use anyhow::Result;
use scanpack_core::PackConfig;
use scanpack_core::PackOutcome;
use scanpack_core::checksum::sha256_file;
use scanpack_core::pack;
use tracing::info;

pub fn execute(args: &CreateArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let settings = CreateSettings::resolve(args)?;
    let Some(output) = settings.output else {
        return Err(
            Failure::new(EXIT_MISSING_PARAMETER, "Missing required parameter 'output'").into(),
        );
    };

    if output.exists() && !args.force {
        return Err(Failure::new(
            EXIT_FAILURE,
            format!(
                "Output file already exists: {}\n\
                 HINT: Use --force to overwrite.",
                output.display()
            ),
        )
        .into());
    }

    let mut config = PackConfig::default();
    if let Some(format) = settings.format {
        config = config.with_format(format);
    }

    match add_archive_context(pack(&output, settings.sources, &config), &output)? {
        PackOutcome::Built(report) => {
            let checksum = add_archive_context(sha256_file(&report.target), &report.target)?;
            info!(
                archive = %report.target.display(),
                sha256 = %checksum,
                "archive ready for upload"
            );
            formatter.format_pack_result(&report, &checksum)
        }
        PackOutcome::NothingToUpload => formatter.format_nothing_to_upload(),
    }
}
