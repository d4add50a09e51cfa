//! Folio CLI entry point.
//!
//! Parses arguments, installs logging and dispatches to a command.

use clap::Parser;
use folio_cli::{cli, commands, error, logger, ui};
use miette::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    logger::init_logger(args.verbose, args.quiet, args.no_color);
    ui::init_colors(args.no_color);

    let result = match args.command {
        cli::Command::Config(config_args) => commands::config_execute(config_args).await,
        cli::Command::Pages(pages_args) => commands::pages_execute(pages_args).await,
        cli::Command::Commons(commons_args) => commands::commons_execute(commons_args),
    };

    result.map_err(error::cli_error_to_miette)
}
