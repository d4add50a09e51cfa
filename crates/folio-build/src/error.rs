//! Error taxonomy for configuration assembly.
//!
//! Discovery and resolution errors abort the build; nothing is retried since
//! every operation here is deterministic.

use std::path::PathBuf;

use thiserror::Error;

/// Page discovery failed before any entry could be composed.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("pages directory not found: {}", .0.display())]
    RootNotFound(PathBuf),

    #[error("pages root is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("failed to read pages directory {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("page discovery task failed: {0}")]
    Task(String),
}

/// The user override hook failed or produced something unusable.
#[derive(Debug, Error)]
pub enum ConfigAssemblyError {
    #[error("config override hook failed: {0}")]
    HookFailed(String),

    #[error("config override hook returned {found} instead of an object")]
    NonObjectResult { found: &'static str },

    #[error("config override hook produced an invalid configuration: {0}")]
    InvalidShape(String),

    #[error("failed to serialize assembled configuration: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A module the build cannot do without could not be located.
#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("cannot resolve '{request}' from {}", .base_dir.display())]
    ModuleNotFound { request: String, base_dir: PathBuf },

    #[error("invalid externalization pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

impl ConfigAssemblyError {
    pub(crate) fn non_object(value: &serde_json::Value) -> Self {
        use serde_json::Value;

        let found = match value {
            Value::Null => "null",
            Value::Bool(_) => "a boolean",
            Value::Number(_) => "a number",
            Value::String(_) => "a string",
            Value::Array(_) => "an array",
            Value::Object(_) => "an object",
        };
        Self::NonObjectResult { found }
    }
}
