//! Miette rendering for CLI errors.

use crate::error::CliError;
use miette::Report;

/// Convert a [`CliError`] into a report.
///
/// Build errors keep their diagnostic code and help text.
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Build(e) => Report::new(e),
        CliError::Config(e) => Report::new(folio_build::Error::Config(e)),
        CliError::FileNotFound(path) => miette::miette!(
            code = "FILE_NOT_FOUND",
            help = "Check the path and try again.",
            "File not found: {}",
            path.display()
        ),
        other => miette::miette!("{}", other),
    }
}
