//! Folio CLI.
//!
//! Command-line front end for `folio-build`: prints the configuration the
//! bundling engine would receive, lists discovered pages, and evaluates the
//! commons heuristic against a usage report.
//!
//! - [`cli`] - argument definitions
//! - [`commands`] - one module per subcommand
//! - [`error`] - CLI errors and their miette rendering
//! - [`logger`] - tracing subscriber setup
//! - [`ui`] - status messages on stderr

pub mod cli;
pub mod commands;
pub mod error;
pub mod logger;
pub mod ui;

pub use error::{CliError, Result, ResultExt};
