//! Configuration assembly.
//!
//! [`ConfigAssembler`] ties the pieces together. Phase one ([`ConfigAssembler::plan`])
//! discovers pages and composes entries; phase two ([`ConfigAssembler::assemble`])
//! turns the finished plan into a [`BundlerConfig`] and runs the override hooks.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use folio_config::FolioConfig;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::commons::{CommonsDecision, CommonsPolicy, UsageRecord};
use crate::config::{
    BundlerConfig, ModuleOptions, OutputOptions, PerformanceOptions, ResolveLoaderOptions,
    ResolveOptions,
};
use crate::entry::{ComposeFlags, EntryNaming, EntryPlan, PlanRequest, plan_entries};
use crate::error::ConfigAssemblyError;
use crate::externals::{ExternalizationPolicy, Externals};
use crate::framework::{ClientRuntime, FrameworkLayout};
use crate::hook::{ConfigHook, DefaultLoaders, HookContext, MergeOverridesHook};
use crate::loaders::{LoaderUse, TRANSPILE_LOADER, TranspileOptions, find_transpiler_config, module_rules};
use crate::mode::ModePolicy;
use crate::pages::DiscoveryOptions;
use crate::pipeline::{StageContext, build_pipeline};
use crate::resolve::{ModuleResolver, NodeModulesResolver, SEARCH_ROOTS_ENV, search_roots_from_env};
use crate::Result;

/// Extensions the engine tries when a request has none.
pub const RESOLVE_EXTENSIONS: [&str; 3] = [".js", ".jsx", ".json"];

/// Which compilation to assemble.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssembleOptions {
    pub dev: bool,
    pub is_server: bool,
    pub build_id: Option<String>,
}

impl AssembleOptions {
    pub fn client(dev: bool) -> Self {
        Self {
            dev,
            is_server: false,
            build_id: None,
        }
    }

    pub fn server(dev: bool) -> Self {
        Self {
            dev,
            is_server: true,
            build_id: None,
        }
    }

    pub fn with_build_id(mut self, build_id: impl Into<String>) -> Self {
        self.build_id = Some(build_id.into());
        self
    }
}

/// Assembles the configuration for one compilation of one project.
pub struct ConfigAssembler {
    dir: PathBuf,
    options: AssembleOptions,
    config: FolioConfig,
    framework: FrameworkLayout,
    resolver: Arc<dyn ModuleResolver>,
    search_roots: Vec<PathBuf>,
    naming: EntryNaming,
    hooks: Vec<Box<dyn ConfigHook>>,
}

impl std::fmt::Debug for ConfigAssembler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigAssembler")
            .field("dir", &self.dir)
            .field("options", &self.options)
            .field("framework", &self.framework)
            .field("search_roots", &self.search_roots)
            .field("hooks", &self.hooks.len())
            .finish_non_exhaustive()
    }
}

impl ConfigAssembler {
    /// An assembler using the framework installed in `dir` and search roots
    /// from the environment.
    ///
    /// The config's `overrides` table, if any, is registered as the first hook.
    pub fn new(dir: impl Into<PathBuf>, options: AssembleOptions, config: FolioConfig) -> Self {
        let dir = dir.into();
        let search_roots = search_roots_from_env(SEARCH_ROOTS_ENV);
        let hooks: Vec<Box<dyn ConfigHook>> = MergeOverridesHook::from_overrides(&config.overrides)
            .map(|hook| Box::new(hook) as Box<dyn ConfigHook>)
            .into_iter()
            .collect();

        Self {
            framework: FrameworkLayout::installed_in(&dir),
            resolver: Arc::new(NodeModulesResolver::with_search_roots(search_roots.clone())),
            search_roots,
            naming: EntryNaming::default(),
            hooks,
            dir,
            options,
            config,
        }
    }

    pub fn with_framework(mut self, framework: FrameworkLayout) -> Self {
        self.framework = framework;
        self
    }

    pub fn with_resolver(mut self, resolver: Arc<dyn ModuleResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Replace the extra module roots. The default resolver is rebuilt with
    /// them unless a custom one is set afterwards.
    pub fn with_search_roots(mut self, search_roots: Vec<PathBuf>) -> Self {
        self.resolver = Arc::new(NodeModulesResolver::with_search_roots(search_roots.clone()));
        self.search_roots = search_roots;
        self
    }

    pub fn with_naming(mut self, naming: EntryNaming) -> Self {
        self.naming = naming;
        self
    }

    /// Append a hook; hooks run in registration order.
    pub fn with_hook(mut self, hook: impl ConfigHook + 'static) -> Self {
        self.hooks.push(Box::new(hook));
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn options(&self) -> &AssembleOptions {
        &self.options
    }

    pub fn policy(&self) -> ModePolicy {
        ModePolicy::resolve(self.options.dev, self.options.is_server)
    }

    fn discovery_options(&self) -> DiscoveryOptions {
        DiscoveryOptions {
            extensions: self.config.normalized_extensions(),
            exclude: self.config.exclude.clone(),
            framework: Some(self.framework.clone()),
        }
    }

    /// Phase one: discover pages and compose the entry map.
    pub async fn plan(&self) -> Result<EntryPlan> {
        let app_entry = self.config.main_path(&self.dir)?;
        let runtime = ClientRuntime::locate(&self.framework, self.resolver.as_ref(), self.options.dev)?;

        let request = PlanRequest {
            pages_root: self.config.pages_root(&self.dir),
            discovery: self.discovery_options(),
            app_entry,
            runtime,
            flags: ComposeFlags {
                dev: self.options.dev,
                is_server: self.options.is_server,
            },
            naming: self.naming.clone(),
        };

        Ok(plan_entries(request).await?)
    }

    /// Phase two: build the configuration for a finished plan and apply hooks.
    pub fn assemble(&self, plan: &EntryPlan) -> Result<BundlerConfig> {
        let policy = self.policy();
        let AssembleOptions { dev, is_server, .. } = self.options;
        let app_entry = self.config.main_path(&self.dir)?;

        let external_transpiler = find_transpiler_config(&self.dir);
        if let Some(found) = external_transpiler.as_ref().filter(|_| !is_server) {
            info!(location = %found.location.display(), "using external transpiler configuration");
        }
        let transpile = TranspileOptions::resolve(&self.framework, external_transpiler.as_ref(), dev, is_server);

        let stage_ctx = StageContext {
            dir: self.dir.clone(),
            app_entry,
            policy,
            interpolated_names: self.framework.interpolated_default_pages(),
            commons: CommonsPolicy::for_plan(plan, policy.commons),
        };

        let externals = if is_server {
            Externals::with_policy(
                &self.dir,
                ExternalizationPolicy::server_default(self.framework.package_name())?,
            )
        } else {
            Externals::none(&self.dir)
        };

        let mut output_path = self.dir.join(&self.config.dist_dir);
        if is_server {
            output_path.push("dist");
        }

        let config = BundlerConfig {
            name: if is_server { "server" } else { "client" }.to_string(),
            target: if is_server { "node" } else { "web" }.to_string(),
            devtool: policy.emit_source_maps.then(|| "source-map".to_string()),
            cache: true,
            context: self.dir.clone(),
            entry: plan.entries().clone(),
            output: OutputOptions::new(output_path),
            performance: PerformanceOptions {
                hints: false,
                extra: Map::new(),
            },
            resolve: self.resolve_options(&policy),
            resolve_loader: self.resolve_loader_options(),
            module: ModuleOptions {
                rules: module_rules(
                    &self.dir,
                    &self.config.pages_root(&self.dir),
                    &self.framework,
                    &transpile,
                    policy.hot_self_accept,
                ),
                extra: Map::new(),
            },
            externals,
            pipeline: build_pipeline(&stage_ctx),
            extra: Default::default(),
        };
        debug!(
            name = %config.name,
            bundles = config.entry.len(),
            stages = config.pipeline.len(),
            "assembled configuration"
        );

        let ctx = HookContext {
            dir: self.dir.clone(),
            dev,
            is_server,
            build_id: self.options.build_id.clone(),
            total_pages: plan.total_page_count(),
            default_loaders: DefaultLoaders {
                transpile: LoaderUse {
                    loader: TRANSPILE_LOADER.to_string(),
                    options: transpile,
                    extra: Map::new(),
                },
            },
        };

        Ok(self.apply_hooks(config, &ctx)?)
    }

    fn apply_hooks(
        &self,
        config: BundlerConfig,
        ctx: &HookContext,
    ) -> std::result::Result<BundlerConfig, ConfigAssemblyError> {
        if self.hooks.is_empty() {
            return Ok(config);
        }

        let mut value = serde_json::to_value(&config)?;
        for hook in &self.hooks {
            value = hook
                .transform(value, ctx)
                .map_err(|e| ConfigAssemblyError::HookFailed(e.to_string()))?;
            if !value.is_object() {
                return Err(ConfigAssemblyError::non_object(&value));
            }
        }

        let config: BundlerConfig = serde_json::from_value(value.clone())
            .map_err(|e| ConfigAssemblyError::InvalidShape(e.to_string()))?;

        // keys under a typed stage or policy have no place to live
        let kept = serde_json::to_value(&config)?;
        if let Some(path) = first_dropped(&value, &kept, String::new()) {
            return Err(ConfigAssemblyError::InvalidShape(format!(
                "`{path}` cannot be represented in the configuration"
            )));
        }

        Ok(config)
    }

    fn module_roots(&self) -> Vec<String> {
        let mut roots = vec![
            self.framework.node_modules_dir().to_string_lossy().into_owned(),
            "node_modules".to_string(),
        ];
        roots.extend(self.search_roots.iter().map(|p| p.to_string_lossy().into_owned()));
        roots
    }

    fn resolve_options(&self, policy: &ModePolicy) -> ResolveOptions {
        let mut alias = IndexMap::new();
        alias.insert(
            self.framework.package_name().to_string(),
            self.framework.root().to_string_lossy().into_owned(),
        );

        // exact-match aliases to the prebuilt runtime so devtools does not
        // flag it as unminified
        if policy.ignore_react_devtools_patches {
            let (react, react_dom) = if policy.dev {
                ("react/cjs/react.development.js", "react-dom/cjs/react-dom.development.js")
            } else {
                ("react/cjs/react.production.min.js", "react-dom/cjs/react-dom.production.min.js")
            };
            alias.insert("react$".to_string(), react.to_string());
            alias.insert("react-dom$".to_string(), react_dom.to_string());
        }

        ResolveOptions {
            extensions: RESOLVE_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            modules: self.module_roots(),
            alias,
            extra: Map::new(),
        }
    }

    fn resolve_loader_options(&self) -> ResolveLoaderOptions {
        let mut modules = vec![
            self.framework.node_modules_dir().to_string_lossy().into_owned(),
            "node_modules".to_string(),
            self.framework.loaders_dir().to_string_lossy().into_owned(),
        ];
        modules.extend(self.search_roots.iter().map(|p| p.to_string_lossy().into_owned()));
        ResolveLoaderOptions {
            modules,
            extra: Map::new(),
        }
    }
}

/// Path of the first value in `expected` that did not survive into `kept`.
///
/// A `null` counts as present when the key is missing.
fn first_dropped(expected: &Value, kept: &Value, path: String) -> Option<String> {
    match (expected, kept) {
        (Value::Object(expected), Value::Object(kept)) => expected.iter().find_map(|(key, value)| {
            let path = if path.is_empty() {
                key.clone()
            } else {
                format!("{path}.{key}")
            };
            match kept.get(key) {
                Some(kept) => first_dropped(value, kept, path),
                None if value.is_null() => None,
                None => Some(path),
            }
        }),
        (Value::Array(expected), Value::Array(kept)) if expected.len() == kept.len() => expected
            .iter()
            .zip(kept)
            .enumerate()
            .find_map(|(i, (value, kept))| first_dropped(value, kept, format!("{path}[{i}]"))),
        (expected, kept) if expected == kept => None,
        _ => Some(path),
    }
}

/// Run both phases for `dir` with the default framework and resolver.
pub async fn build_config(
    dir: impl Into<PathBuf>,
    options: AssembleOptions,
    config: FolioConfig,
) -> Result<BundlerConfig> {
    let assembler = ConfigAssembler::new(dir, options, config);
    let plan = assembler.plan().await?;
    assembler.assemble(&plan)
}

/// Decide commons promotion for usage reported by the engine.
///
/// Compilations without a commons stage promote nothing.
pub fn decide_commons(config: &BundlerConfig, usage: &[UsageRecord]) -> Vec<CommonsDecision> {
    config
        .commons()
        .map(|policy| policy.decide(usage))
        .unwrap_or_default()
}
