//! The configuration value handed to the bundling engine.
//!
//! Everything here is plain serializable data. Keys follow the engine's
//! camelCase convention. Keys a hook adds that this model does not know
//! about are kept in the `extra` map of the enclosing struct.

use std::path::PathBuf;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::commons::CommonsPolicy;
use crate::entry::EntryMap;
use crate::externals::Externals;
use crate::loaders::ModuleRule;
use crate::pipeline::Stage;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundlerConfig {
    /// `client` or `server`.
    pub name: String,
    /// `web` or `node`.
    pub target: String,
    /// Source map style; `None` disables source maps.
    pub devtool: Option<String>,
    pub cache: bool,
    pub context: PathBuf,
    pub entry: EntryMap,
    pub output: OutputOptions,
    pub performance: PerformanceOptions,
    pub resolve: ResolveOptions,
    pub resolve_loader: ResolveLoaderOptions,
    pub module: ModuleOptions,
    pub externals: Externals,
    pub pipeline: Vec<Stage>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl BundlerConfig {
    /// The shared-bundle stage, if this compilation has one.
    pub fn commons(&self) -> Option<&CommonsPolicy> {
        self.pipeline.iter().find_map(|stage| match stage {
            Stage::Commons(policy) => Some(policy),
            _ => None,
        })
    }

    pub fn is_server(&self) -> bool {
        self.name == "server"
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputOptions {
    pub path: PathBuf,
    pub filename: String,
    pub chunk_filename: String,
    pub library_target: String,
    pub strict_module_exception_handling: bool,
    pub devtool_module_filename_template: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl OutputOptions {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            filename: "[name].js".to_string(),
            chunk_filename: "[name]-[chunkhash].js".to_string(),
            library_target: "commonjs2".to_string(),
            strict_module_exception_handling: true,
            devtool_module_filename_template: "[absolute-resource-path]".to_string(),
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceOptions {
    pub hints: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveOptions {
    pub extensions: Vec<String>,
    /// Module roots searched in order.
    pub modules: Vec<String>,
    /// A trailing `$` on a key means exact match only.
    pub alias: IndexMap<String, String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveLoaderOptions {
    pub modules: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleOptions {
    pub rules: Vec<ModuleRule>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
