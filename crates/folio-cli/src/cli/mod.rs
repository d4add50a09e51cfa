//! Command-line interface definition for folio.
//!
//! - `folio config` - print the assembled bundler configuration
//! - `folio pages` - list discovered pages
//! - `folio commons` - evaluate commons promotion for a usage report

mod commands;
#[cfg(test)]
mod tests;

use clap::Parser;

pub use commands::{Command, CommonsArgs, ConfigArgs, PagesArgs, ProjectArgs};

/// Folio - build configuration for page-based applications
#[derive(Parser, Debug)]
#[command(
    name = "folio",
    version,
    about = "Inspect folio build configurations",
    long_about = "Folio assembles the configuration a bundling engine needs to build a\n\
                  page-based application: one bundle per page, mode-dependent pipeline\n\
                  stages and a shared bundle for commonly used modules."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}
