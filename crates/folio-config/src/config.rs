//! High-level configuration structure for Folio projects.
//!
//! This module provides the `FolioConfig` struct and the JSON deep-merge used
//! for declarative overrides. For file discovery, see the `discovery` module.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::defaults::{default_dist_dir, default_page_extensions, default_pages_dir};
use crate::error::{ConfigError, Result as ConfigResult};
use crate::settings::GlobalSettings;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolioConfig {
    /// Application entry module, relative to the project directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main: Option<PathBuf>,

    /// Extensions a page module may have, in priority order.
    #[serde(default = "default_page_extensions", alias = "pageExtensions")]
    pub page_extensions: Vec<String>,

    /// Output directory name, relative to the project directory.
    #[serde(default = "default_dist_dir", alias = "distDir")]
    pub dist_dir: PathBuf,

    /// Pages root, relative to the project directory.
    #[serde(default = "default_pages_dir", alias = "pagesDir")]
    pub pages_dir: PathBuf,

    /// Extra directory names skipped during page discovery.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Deep-merged into the assembled bundler configuration.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub overrides: Value,

    #[serde(default)]
    pub settings: GlobalSettings,
}

impl Default for FolioConfig {
    fn default() -> Self {
        Self {
            main: None,
            page_extensions: default_page_extensions(),
            dist_dir: default_dist_dir(),
            pages_dir: default_pages_dir(),
            exclude: Vec::new(),
            overrides: Value::Null,
            settings: GlobalSettings::default(),
        }
    }
}

impl FolioConfig {
    /// Create from serde_json::Value (for programmatic config)
    ///
    /// # Example
    ///
    /// ```
    /// use folio_config::FolioConfig;
    /// use serde_json::json;
    /// use std::path::PathBuf;
    ///
    /// let config = FolioConfig::from_value(json!({
    ///     "main": "app.js",
    ///     "pageExtensions": ["js", "jsx"]
    /// }))
    /// .unwrap();
    ///
    /// assert_eq!(config.main, Some(PathBuf::from("app.js")));
    /// assert_eq!(config.page_extensions, vec!["js", "jsx"]);
    /// ```
    pub fn from_value(value: Value) -> ConfigResult<Self> {
        serde_json::from_value(value).map_err(|e| ConfigError::InvalidValue {
            field: "config".to_string(),
            hint: Some(e.to_string()),
        })
    }

    /// Convert to serde_json::Value
    pub fn to_value(&self) -> ConfigResult<Value> {
        serde_json::to_value(self).map_err(|e| ConfigError::InvalidValue {
            field: "config".to_string(),
            hint: Some(e.to_string()),
        })
    }

    /// Absolute path of the application entry module.
    pub fn main_path(&self, root: &Path) -> ConfigResult<PathBuf> {
        let main = self.main.as_ref().ok_or(ConfigError::MissingField("main"))?;
        Ok(root.join(main))
    }

    /// Absolute path of the pages root.
    pub fn pages_root(&self, root: &Path) -> PathBuf {
        root.join(&self.pages_dir)
    }

    /// Page extensions without leading dots, in configured order.
    pub fn normalized_extensions(&self) -> Vec<String> {
        self.page_extensions
            .iter()
            .map(|ext| ext.trim_start_matches('.').to_string())
            .collect()
    }
}

/// Deep-merge `update` into `target`.
///
/// Objects merge key by key; every other value (arrays included) replaces
/// the target slot wholesale.
pub fn merge_values(target: &mut Value, update: &Value) {
    match (target, update) {
        (Value::Object(target_map), Value::Object(update_map)) => {
            for (key, value) in update_map {
                merge_values(target_map.entry(key.clone()).or_insert(Value::Null), value);
            }
        }
        (target_slot, _) => {
            *target_slot = update.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_value_accepts_snake_and_camel_case() {
        let snake = FolioConfig::from_value(json!({
            "main": "app.js",
            "dist_dir": "build"
        }))
        .unwrap();
        let camel = FolioConfig::from_value(json!({
            "main": "app.js",
            "distDir": "build"
        }))
        .unwrap();

        assert_eq!(snake.dist_dir, PathBuf::from("build"));
        assert_eq!(snake, camel);
    }

    #[test]
    fn to_value_skips_empty_overrides() {
        let config = FolioConfig {
            main: Some(PathBuf::from("app.js")),
            ..FolioConfig::default()
        };

        let value = config.to_value().unwrap();
        assert_eq!(value["main"], json!("app.js"));
        assert!(value.get("overrides").is_none());
    }

    #[test]
    fn main_path_requires_main() {
        let config = FolioConfig::default();
        let err = config.main_path(Path::new("/project")).unwrap_err();
        assert!(matches!(err, ConfigError::MissingField("main")));
    }

    #[test]
    fn normalized_extensions_strip_dots() {
        let config = FolioConfig {
            page_extensions: vec![".jsx".to_string(), "js".to_string()],
            ..FolioConfig::default()
        };
        assert_eq!(config.normalized_extensions(), vec!["jsx", "js"]);
    }

    #[test]
    fn merge_values_replaces_arrays_and_merges_objects() {
        let mut base = json!({
            "resolve": { "extensions": [".js"], "alias": { "a": "b" } },
            "cache": true
        });
        merge_values(
            &mut base,
            &json!({
                "resolve": { "extensions": [".ts"], "alias": { "c": "d" } },
                "cache": false
            }),
        );

        assert_eq!(base["resolve"]["extensions"], json!([".ts"]));
        assert_eq!(base["resolve"]["alias"], json!({ "a": "b", "c": "d" }));
        assert_eq!(base["cache"], json!(false));
    }
}
