//! Scanpack CLI - Command-line utility for packing source trees into
//! archives ready for upload to a scanning service.

mod cli;
mod commands;
mod config;
mod error;
mod logging;
mod output;

use clap::Parser;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();

    logging::init(cli.debug, cli.quiet);
    let formatter = output::create_formatter(cli.json, cli.debug, cli.quiet);

    let result = match &cli.command {
        cli::Commands::Create(args) => commands::create::execute(args, &*formatter),
        cli::Commands::List(args) => commands::list::execute(args, &*formatter),
        cli::Commands::Checksum(args) => commands::checksum::execute(args, &*formatter),
        cli::Commands::Completion(args) => {
            commands::completion::execute(args.shell);
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            formatter.format_error(cli.command.name(), &err);
            ExitCode::from(error::exit_code(&err))
        }
    }
}
