//! Module rules and transpiler options.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::framework::FrameworkLayout;

/// Transform that makes components hot-reloadable in the dev client.
pub const HOT_LOADER_PLUGIN: &str = "react-hot-loader/babel";

pub const TRANSPILE_LOADER: &str = "babel-loader";
pub const HOT_SELF_ACCEPT_LOADER: &str = "hot-self-accept-loader";

/// Options handed to the transpile loader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranspileOptions {
    pub cache_directory: bool,
    #[serde(default)]
    pub presets: Vec<String>,
    #[serde(default)]
    pub plugins: Vec<String>,
    pub babelrc: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TranspileOptions {
    pub fn resolve(
        framework: &FrameworkLayout,
        external: Option<&ExternalTranspilerConfig>,
        dev: bool,
        is_server: bool,
    ) -> Self {
        let mut plugins = Vec::new();
        if dev && !is_server {
            plugins.push(HOT_LOADER_PLUGIN.to_string());
        }

        let babelrc = external.is_some_and(|config| config.babelrc_enabled);

        let mut presets = Vec::new();
        if !babelrc {
            presets.push(framework.transpile_preset().to_string_lossy().into_owned());
        }

        Self {
            cache_directory: true,
            presets,
            plugins,
            babelrc,
            extra: Map::new(),
        }
    }
}

/// A transpiler config file found in the project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalTranspilerConfig {
    pub location: PathBuf,
    /// False when the config itself sets `"babelrc": false`.
    pub babelrc_enabled: bool,
}

/// Look for `.babelrc`, then a `babel` field in `package.json`, in `dir` and
/// each of its ancestors.
pub fn find_transpiler_config(dir: &Path) -> Option<ExternalTranspilerConfig> {
    dir.ancestors().find_map(|candidate| {
        let babelrc = candidate.join(".babelrc");
        if babelrc.is_file() {
            let options = fs::read_to_string(&babelrc)
                .ok()
                .and_then(|content| serde_json::from_str::<Value>(&content).ok());
            if options.is_none() {
                debug!(location = %babelrc.display(), "unparseable transpiler config, assuming defaults");
            }
            return Some(ExternalTranspilerConfig {
                babelrc_enabled: babelrc_enabled(options.as_ref()),
                location: babelrc,
            });
        }

        let manifest = candidate.join("package.json");
        let options = fs::read_to_string(&manifest)
            .ok()
            .and_then(|content| serde_json::from_str::<Value>(&content).ok())
            .and_then(|mut package| package.get_mut("babel").map(Value::take))?;

        Some(ExternalTranspilerConfig {
            babelrc_enabled: babelrc_enabled(Some(&options)),
            location: manifest,
        })
    })
}

fn babelrc_enabled(options: Option<&Value>) -> bool {
    options
        .and_then(|o| o.get("babelrc"))
        .and_then(Value::as_bool)
        != Some(false)
}

/// How a rule hands modules to a loader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoaderUse {
    pub loader: String,
    pub options: TranspileOptions,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleRule {
    pub test: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loader: Option<String>,
    #[serde(rename = "use", default, skip_serializing_if = "Option::is_none")]
    pub use_loader: Option<LoaderUse>,
    #[serde(default)]
    pub include: Vec<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Rules for one compilation, in application order.
pub fn module_rules(
    dir: &Path,
    pages_dir: &Path,
    framework: &FrameworkLayout,
    transpile: &TranspileOptions,
    hot_self_accept: bool,
) -> Vec<ModuleRule> {
    let mut rules = Vec::with_capacity(2);

    if hot_self_accept {
        rules.push(ModuleRule {
            test: r"\.(js|jsx)(\?[^?]*)?$".to_string(),
            loader: Some(HOT_SELF_ACCEPT_LOADER.to_string()),
            use_loader: None,
            include: vec![pages_dir.to_path_buf(), framework.pages_dir()],
            exclude: None,
            extra: Map::new(),
        });
    }

    rules.push(ModuleRule {
        test: r"\.+(js|jsx)$".to_string(),
        loader: None,
        use_loader: Some(LoaderUse {
            loader: TRANSPILE_LOADER.to_string(),
            options: transpile.clone(),
            extra: Map::new(),
        }),
        include: vec![dir.to_path_buf()],
        exclude: Some("node_modules".to_string()),
        extra: Map::new(),
    });

    rules
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn framework() -> FrameworkLayout {
        FrameworkLayout::new("/fw")
    }

    #[test]
    fn default_preset_without_external_config() {
        let opts = TranspileOptions::resolve(&framework(), None, false, false);
        assert!(!opts.babelrc);
        assert!(opts.cache_directory);
        assert_eq!(opts.presets, vec!["/fw/dist/build/babel/preset".to_string()]);
        assert!(opts.plugins.is_empty());
    }

    #[test]
    fn hot_loader_plugin_only_for_dev_client() {
        let dev_client = TranspileOptions::resolve(&framework(), None, true, false);
        assert_eq!(dev_client.plugins, vec![HOT_LOADER_PLUGIN.to_string()]);

        let dev_server = TranspileOptions::resolve(&framework(), None, true, true);
        assert!(dev_server.plugins.is_empty());
    }

    #[test]
    fn external_config_disables_default_preset() {
        let external = ExternalTranspilerConfig {
            location: PathBuf::from("/app/.babelrc"),
            babelrc_enabled: true,
        };
        let opts = TranspileOptions::resolve(&framework(), Some(&external), false, false);
        assert!(opts.babelrc);
        assert!(opts.presets.is_empty());
    }

    #[test]
    fn babelrc_can_opt_out_of_itself() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".babelrc"), r#"{ "babelrc": false }"#).unwrap();

        let found = find_transpiler_config(dir.path()).unwrap();
        assert_eq!(found.location, dir.path().join(".babelrc"));
        assert!(!found.babelrc_enabled);

        let opts = TranspileOptions::resolve(&framework(), Some(&found), false, false);
        assert!(!opts.babelrc);
        assert_eq!(opts.presets.len(), 1);
    }

    #[test]
    fn package_json_babel_field_is_detected() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("package.json"),
            r#"{ "name": "app", "babel": { "presets": ["env"] } }"#,
        )
        .unwrap();

        let found = find_transpiler_config(dir.path()).unwrap();
        assert_eq!(found.location, dir.path().join("package.json"));
        assert!(found.babelrc_enabled);
    }

    #[test]
    fn package_json_without_babel_field_is_ignored() {
        let dir = TempDir::new().unwrap();
        let project = dir.path().join("app");
        fs::create_dir_all(&project).unwrap();
        fs::write(project.join("package.json"), r#"{ "name": "app" }"#).unwrap();

        assert_eq!(find_transpiler_config(&project), None);
    }

    #[test]
    fn rules_for_dev_client_and_production() {
        let opts = TranspileOptions::resolve(&framework(), None, true, false);
        let dev = module_rules(
            Path::new("/app"),
            Path::new("/app/pages"),
            &framework(),
            &opts,
            true,
        );
        assert_eq!(dev.len(), 2);
        assert_eq!(dev[0].loader.as_deref(), Some(HOT_SELF_ACCEPT_LOADER));
        assert_eq!(
            dev[0].include,
            vec![PathBuf::from("/app/pages"), PathBuf::from("/fw/pages")]
        );

        let prod = module_rules(
            Path::new("/app"),
            Path::new("/app/pages"),
            &framework(),
            &opts,
            false,
        );
        assert_eq!(prod.len(), 1);
        assert_eq!(prod[0].exclude.as_deref(), Some("node_modules"));
        assert_eq!(prod[0].use_loader.as_ref().unwrap().loader, TRANSPILE_LOADER);
    }
}
