//! Error handling for the folio CLI.
//!
//! Library errors convert into [`CliError`] automatically; `main` renders the
//! result through miette.

mod miette;

use std::path::PathBuf;
use thiserror::Error;

pub use self::miette::cli_error_to_miette;

#[derive(Debug, Error)]
pub enum CliError {
    /// Loading or validating the project config failed
    #[error("Configuration error: {0}")]
    Config(#[from] folio_config::ConfigError),

    /// Assembling the build configuration failed
    #[error(transparent)]
    Build(#[from] folio_build::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Custom(String),
}

pub type Result<T> = std::result::Result<T, CliError>;

/// Attach context to fallible results.
pub trait ResultExt<T> {
    /// Report a missing file as [`CliError::FileNotFound`] for `path`.
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T>;

    fn context(self, msg: impl std::fmt::Display) -> Result<T>;
}

impl<T, E: Into<CliError>> ResultExt<T> for std::result::Result<T, E> {
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T> {
        self.map_err(|e| match e.into() {
            CliError::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound => {
                CliError::FileNotFound(path.as_ref().to_path_buf())
            }
            other => other,
        })
    }

    fn context(self, msg: impl std::fmt::Display) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            CliError::Custom(format!("{msg}: {err}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_becomes_file_not_found() {
        let result: std::result::Result<(), std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        let err = result.with_path("usage.json").unwrap_err();
        assert!(matches!(err, CliError::FileNotFound(ref p) if p == &PathBuf::from("usage.json")));
    }

    #[test]
    fn other_io_errors_pass_through() {
        let result: std::result::Result<(), std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope"));
        assert!(matches!(result.with_path("x").unwrap_err(), CliError::Io(_)));
    }

    #[test]
    fn context_prefixes_message() {
        let result: std::result::Result<(), CliError> = Err(CliError::Custom("bad".into()));
        let err = result.context("Failed to read usage report").unwrap_err();
        assert_eq!(err.to_string(), "Failed to read usage report: bad");
    }

    #[test]
    fn build_errors_are_transparent() {
        let err = CliError::from(folio_build::Error::from(
            folio_build::DiscoveryError::RootNotFound(PathBuf::from("/app/pages")),
        ));
        assert_eq!(err.to_string(), "pages directory not found: /app/pages");
    }
}
