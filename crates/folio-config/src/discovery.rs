//! File-based config discovery for CLI use
//!
//! Handles finding and loading Folio configuration files from the filesystem
//! and layering them with defaults and environment variables.

use std::fs;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Serialized};
use serde_json::Value;
use tracing::debug;

use crate::config::FolioConfig;
use crate::error::{ConfigError, Result};

/// Prefix of environment variables that override file values.
pub const ENV_PREFIX: &str = "FOLIO_";

/// File-based configuration discovery
///
/// Searches for a Folio configuration in conventional locations and loads it.
/// Library users can build a `FolioConfig` directly instead.
///
/// # Example
///
/// ```no_run
/// use folio_config::ConfigDiscovery;
///
/// let discovery = ConfigDiscovery::new(".");
/// let config = discovery.load().unwrap();
/// ```
pub struct ConfigDiscovery {
    root: PathBuf,
}

impl ConfigDiscovery {
    /// Create a new config discovery with a root directory
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Find a config file in the root directory
    ///
    /// Searches in this order:
    /// 1. TOML config: folio.toml
    /// 2. package.json (folio field)
    pub fn find(&self) -> Option<PathBuf> {
        let toml_path = self.root.join("folio.toml");
        if toml_path.exists() {
            return Some(toml_path);
        }

        let pkg_path = self.root.join("package.json");
        if pkg_path.exists() {
            if let Ok(content) = fs::read_to_string(&pkg_path) {
                if let Ok(parsed) = serde_json::from_str::<Value>(&content) {
                    if parsed.get("folio").is_some_and(|v| !v.is_null()) {
                        return Some(pkg_path);
                    }
                }
            }
        }

        None
    }

    /// Load config from the discovered file, layered over defaults and
    /// under `FOLIO_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if no config file is found.
    pub fn load(&self) -> Result<FolioConfig> {
        let path = self.find().ok_or(ConfigError::NotFound)?;
        self.load_from(&path)
    }

    /// Like [`load`](Self::load), but falls back to defaults plus environment
    /// when no config file exists.
    pub fn load_or_default(&self) -> Result<FolioConfig> {
        match self.find() {
            Some(path) => self.load_from(&path),
            None => {
                debug!(root = %self.root.display(), "no config file found, using defaults");
                extract(base_figment())
            }
        }
    }

    /// Load config from a specific file path
    pub fn load_from(&self, path: &Path) -> Result<FolioConfig> {
        debug!(path = %path.display(), "loading config");

        let value = if path.file_name() == Some(std::ffi::OsStr::new("package.json")) {
            self.read_package_json(path)?
        } else {
            self.read_toml(path)?
        };

        extract(
            base_figment()
                .merge(Serialized::defaults(normalize_keys(value)))
                .merge(env()),
        )
    }

    fn read_toml(&self, path: &Path) -> Result<Value> {
        let content = fs::read_to_string(path)?;

        let toml_val: toml::Value =
            toml::from_str(&content).map_err(|e| ConfigError::InvalidValue {
                field: "toml".to_string(),
                hint: Some(format!("Invalid TOML syntax: {}", e)),
            })?;

        serde_json::to_value(toml_val).map_err(|e| ConfigError::InvalidValue {
            field: "toml".to_string(),
            hint: Some(format!("TOML to JSON conversion failed: {}", e)),
        })
    }

    fn read_package_json(&self, path: &Path) -> Result<Value> {
        let content = fs::read_to_string(path)?;

        let parsed: Value =
            serde_json::from_str(&content).map_err(|e| ConfigError::InvalidValue {
                field: "package.json".to_string(),
                hint: Some(format!("Invalid JSON: {}", e)),
            })?;

        let folio_value = parsed.get("folio").ok_or_else(|| ConfigError::InvalidValue {
            field: "folio".to_string(),
            hint: Some("Add a 'folio' field to your package.json".to_string()),
        })?;

        if folio_value.is_null() {
            return Err(ConfigError::InvalidValue {
                field: "folio".to_string(),
                hint: Some("The 'folio' field cannot be null".to_string()),
            });
        }

        Ok(folio_value.clone())
    }
}

/// Rewrite camelCase top-level keys to their snake_case field names so a
/// file value never collides with the serialized defaults.
fn normalize_keys(value: Value) -> Value {
    let Value::Object(map) = value else {
        return value;
    };

    map.into_iter()
        .map(|(key, value)| {
            let key = match key.as_str() {
                "pageExtensions" => "page_extensions".to_string(),
                "distDir" => "dist_dir".to_string(),
                "pagesDir" => "pages_dir".to_string(),
                _ => key,
            };
            (key, value)
        })
        .collect::<serde_json::Map<_, _>>()
        .into()
}

fn base_figment() -> Figment {
    Figment::new().merge(Serialized::defaults(FolioConfig::default()))
}

fn env() -> Env {
    Env::prefixed(ENV_PREFIX)
}

fn extract(figment: Figment) -> Result<FolioConfig> {
    Ok(figment.extract()?)
}

/// Discover and load config from the current directory (convenience function)
pub fn discover() -> Result<FolioConfig> {
    let root = std::env::current_dir()?;
    ConfigDiscovery::new(&root).load()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn find_returns_none_when_no_config() {
        let dir = TempDir::new().unwrap();
        let discovery = ConfigDiscovery::new(dir.path());
        assert!(discovery.find().is_none());
    }

    #[test]
    fn find_prefers_toml_over_package_json() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("folio.toml"), "main = \"app.js\"\n").unwrap();
        fs::write(
            dir.path().join("package.json"),
            r#"{ "folio": { "main": "other.js" } }"#,
        )
        .unwrap();

        let discovery = ConfigDiscovery::new(dir.path());
        assert_eq!(discovery.find().unwrap(), dir.path().join("folio.toml"));
    }

    #[test]
    fn find_ignores_package_json_without_field() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("package.json"), r#"{ "name": "app" }"#).unwrap();

        let discovery = ConfigDiscovery::new(dir.path());
        assert!(discovery.find().is_none());
    }

    #[test]
    fn normalize_keys_maps_camel_case() {
        let value = normalize_keys(serde_json::json!({
            "main": "app.js",
            "pageExtensions": ["jsx"],
            "distDir": "out"
        }));
        assert_eq!(value["page_extensions"], serde_json::json!(["jsx"]));
        assert_eq!(value["dist_dir"], serde_json::json!("out"));
        assert!(value.get("distDir").is_none());
    }

    #[test]
    fn load_returns_not_found_when_no_config() {
        let dir = TempDir::new().unwrap();
        let discovery = ConfigDiscovery::new(dir.path());
        assert!(matches!(discovery.load(), Err(ConfigError::NotFound)));
    }
}
