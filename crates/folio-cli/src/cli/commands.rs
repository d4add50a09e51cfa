use clap::{Args, Subcommand};
use std::path::PathBuf;

/// Available folio subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the assembled bundler configuration as JSON
    ///
    /// Discovers pages, composes entries and applies the mode policy for the
    /// selected compilation, then runs the `overrides` table from the project
    /// config.
    Config(ConfigArgs),

    /// List discovered pages and their source files
    Pages(PagesArgs),

    /// Decide which modules move into the shared bundle
    ///
    /// Reads a JSON array of usage records as reported by the engine:
    ///   [{ "module": "/app/lib/x.js", "bundles": ["bundles/pages/a", ...] }, ...]
    ///
    /// Records may give a `count` instead of listing `bundles`.
    Commons(CommonsArgs),
}

/// Where the project and its framework live.
#[derive(Args, Debug, Clone)]
pub struct ProjectArgs {
    /// Project directory
    #[arg(default_value = ".", value_name = "DIR")]
    pub dir: PathBuf,

    /// Config file to load instead of searching the project directory
    ///
    /// Either a folio.toml or a package.json with a `folio` field.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Installed framework package directory
    ///
    /// Defaults to DIR/node_modules/folio.
    #[arg(long, value_name = "DIR")]
    pub framework: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Assemble the development configuration
    #[arg(long)]
    pub dev: bool,

    /// Assemble the server compilation instead of the client one
    #[arg(long)]
    pub server: bool,

    /// Build id passed to config hooks
    #[arg(long, value_name = "ID")]
    pub build_id: Option<String>,

    /// Print JSON on a single line
    #[arg(long)]
    pub compact: bool,
}

#[derive(Args, Debug)]
pub struct PagesArgs {
    #[command(flatten)]
    pub project: ProjectArgs,
}

#[derive(Args, Debug)]
pub struct CommonsArgs {
    /// JSON file with the usage records
    #[arg(short, long, value_name = "FILE")]
    pub usage: PathBuf,

    /// Total number of pages in the build
    #[arg(short, long, value_name = "N")]
    pub pages: usize,

    /// Print JSON on a single line
    #[arg(long)]
    pub compact: bool,
}
