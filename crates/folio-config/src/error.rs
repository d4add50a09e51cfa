//! Error types for configuration loading and validation.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    // Config parsing/loading errors
    #[error("config not found (expected folio.toml or a `folio` field in package.json)")]
    NotFound,

    #[error("invalid config value for `{field}`{}", format_hint(.hint))]
    InvalidValue {
        field: String,
        hint: Option<String>,
    },

    #[error("failed to extract configuration: {0}")]
    Extract(#[from] figment::Error),

    // Schema validation errors (no filesystem checks)
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("schema validation failed: {message}{}", format_hint(.hint))]
    SchemaValidation {
        message: String,
        hint: Option<String>,
    },

    // Filesystem validation errors (for CLI use)
    #[error("application entry module not found: {}", .0.display())]
    MainNotFound(PathBuf),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn format_hint(hint: &Option<String>) -> String {
    match hint {
        Some(hint) => format!(" ({hint})"),
        None => String::new(),
    }
}
