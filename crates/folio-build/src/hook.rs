//! User override hook.
//!
//! A hook receives the assembled configuration as JSON plus a read-only
//! context, and returns the configuration to use. Returning anything other
//! than an object is an error.

use std::path::PathBuf;

use serde::Serialize;
use serde_json::Value;

use crate::loaders::LoaderUse;

/// What a hook may inspect besides the configuration itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HookContext {
    pub dir: PathBuf,
    pub dev: bool,
    pub is_server: bool,
    pub build_id: Option<String>,
    pub total_pages: usize,
    /// Loaders the assembler uses, so a hook can reuse them in its own rules.
    pub default_loaders: DefaultLoaders,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DefaultLoaders {
    pub transpile: LoaderUse,
}

/// Error type hooks return; its message ends up in
/// [`ConfigAssemblyError::HookFailed`](crate::ConfigAssemblyError::HookFailed).
pub type HookError = Box<dyn std::error::Error + Send + Sync>;

pub trait ConfigHook: Send + Sync {
    fn transform(&self, config: Value, ctx: &HookContext) -> Result<Value, HookError>;
}

impl<F> ConfigHook for F
where
    F: Fn(Value, &HookContext) -> Result<Value, HookError> + Send + Sync,
{
    fn transform(&self, config: Value, ctx: &HookContext) -> Result<Value, HookError> {
        self(config, ctx)
    }
}

/// Deep-merges a fixed table into the configuration.
///
/// Backs the `overrides` table of the project config file.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOverridesHook {
    overrides: Value,
}

impl MergeOverridesHook {
    pub fn new(overrides: Value) -> Self {
        Self { overrides }
    }

    /// `None` when there is nothing to merge.
    pub fn from_overrides(overrides: &Value) -> Option<Self> {
        match overrides {
            Value::Null => None,
            Value::Object(map) if map.is_empty() => None,
            other => Some(Self::new(other.clone())),
        }
    }
}

impl ConfigHook for MergeOverridesHook {
    fn transform(&self, mut config: Value, _ctx: &HookContext) -> Result<Value, HookError> {
        if !self.overrides.is_object() {
            return Err("overrides must be a table".into());
        }
        folio_config::merge_values(&mut config, &self.overrides);
        Ok(config)
    }
}
