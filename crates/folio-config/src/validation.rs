//! Pluggable config validation strategies
//!
//! Separates filesystem validation (for CLI use) from schema validation (for library use).

use std::path::{Path, PathBuf};

use crate::config::FolioConfig;
use crate::error::{ConfigError, Result};

/// Trait for pluggable config validation strategies
pub trait ConfigValidator {
    fn validate(&self, config: &FolioConfig) -> Result<()>;
}

/// Schema-only validation (no filesystem checks)
///
/// # Example
///
/// ```
/// use folio_config::{ConfigValidator, FolioConfig, SchemaValidator};
///
/// let config = FolioConfig {
///     main: Some("app.js".into()),
///     ..FolioConfig::default()
/// };
///
/// SchemaValidator.validate(&config).unwrap();
/// ```
pub struct SchemaValidator;

impl ConfigValidator for SchemaValidator {
    fn validate(&self, config: &FolioConfig) -> Result<()> {
        match &config.main {
            None => return Err(ConfigError::MissingField("main")),
            Some(main) if main.as_os_str().is_empty() => {
                return Err(ConfigError::SchemaValidation {
                    message: "main cannot be empty".to_string(),
                    hint: Some("Point 'main' at your application entry module".to_string()),
                });
            }
            Some(_) => {}
        }

        if config.page_extensions.is_empty() {
            return Err(ConfigError::SchemaValidation {
                message: "page_extensions cannot be empty".to_string(),
                hint: Some("Use at least one extension, e.g. [\"js\"]".to_string()),
            });
        }

        for ext in &config.page_extensions {
            let ext = ext.trim_start_matches('.');
            if ext.is_empty() || ext.contains(['/', '\\', '|', '*']) {
                return Err(ConfigError::SchemaValidation {
                    message: format!("invalid page extension '{}'", ext),
                    hint: Some("Extensions are plain names such as \"js\" or \"jsx\"".to_string()),
                });
            }
        }

        if config.dist_dir.as_os_str().is_empty() {
            return Err(ConfigError::SchemaValidation {
                message: "dist_dir cannot be empty".to_string(),
                hint: None,
            });
        }

        for name in &config.exclude {
            if name.trim().is_empty() {
                return Err(ConfigError::SchemaValidation {
                    message: "exclude entries cannot be empty".to_string(),
                    hint: Some("Remove empty strings from the 'exclude' array".to_string()),
                });
            }
        }

        Ok(())
    }
}

/// Schema validation plus filesystem checks relative to a project root
pub struct FsValidator {
    root: PathBuf,
}

impl FsValidator {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ConfigValidator for FsValidator {
    fn validate(&self, config: &FolioConfig) -> Result<()> {
        SchemaValidator.validate(config)?;

        let main = config.main_path(&self.root)?;
        if !main.is_file() {
            return Err(ConfigError::MainNotFound(main));
        }

        Ok(())
    }
}

/// Validate without touching the filesystem.
pub fn validate_schema(config: &FolioConfig) -> Result<()> {
    SchemaValidator.validate(config)
}

/// Validate including filesystem checks relative to `root`.
pub fn validate_fs(config: &FolioConfig, root: &Path) -> Result<()> {
    FsValidator::new(root).validate(config)
}
