//! Ordered pipeline stages.
//!
//! The stage list is a static table of `(predicate, factory)` pairs evaluated
//! once per compilation. Order in the table is the order the engine applies
//! the stages in.

use std::path::PathBuf;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::commons::CommonsPolicy;
use crate::mode::{CommonsMode, ModePolicy};

/// Compressor settings for production client bundles.
///
/// Only dead-code elimination runs; every other compress pass is off to keep
/// build times down.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MinifyOptions {
    /// Modules matching this pattern are not minified.
    pub exclude: String,
    pub parallel: bool,
    pub source_map: bool,
    pub dead_code: bool,
    pub keep_infinity: bool,
    /// Compress passes explicitly disabled.
    pub disabled_passes: Vec<String>,
}

const DISABLED_COMPRESS_PASSES: &[&str] = &[
    "arrows",
    "booleans",
    "collapse_vars",
    "comparisons",
    "computed_props",
    "hoist_funs",
    "hoist_props",
    "hoist_vars",
    "if_return",
    "inline",
    "join_vars",
    "loops",
    "negate_iife",
    "properties",
    "reduce_funcs",
    "reduce_vars",
    "sequences",
    "side_effects",
    "switches",
    "top_retain",
    "toplevel",
    "typeofs",
    "unused",
    "conditionals",
    "evaluate",
];

impl Default for MinifyOptions {
    fn default() -> Self {
        Self {
            exclude: r"react\.js".to_string(),
            parallel: true,
            source_map: false,
            dead_code: true,
            keep_infinity: true,
            disabled_passes: DISABLED_COMPRESS_PASSES
                .iter()
                .map(|pass| pass.to_string())
                .collect(),
        }
    }
}

/// One pipeline stage as handed to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum Stage {
    /// Skip modules matching `resource` when requested from `context`.
    IgnoreModules { resource: String, context: Option<String> },
    NoEmitOnErrors,
    ErrorOverlay,
    NamedModules,
    HotModuleReplacement,
    UnlinkRemovedFiles,
    CaseSensitivePaths,
    /// Rewrite output names for framework default pages.
    InterpolateNames {
        context: PathBuf,
        names: IndexMap<PathBuf, String>,
    },
    WriteToDisk {
        exit_on_errors: bool,
        log: bool,
        use_hash_index: bool,
    },
    Minify(MinifyOptions),
    DefineEnv { definitions: IndexMap<String, String> },
    AppMainEntry { app_entry: PathBuf },
    ConcatenateModules,
    PagesManifest,
    DynamicChunks,
    SsrImportShim,
    Commons(CommonsPolicy),
}

impl Stage {
    /// Kebab-case name used in logs and the `stage` tag.
    pub fn name(&self) -> &'static str {
        match self {
            Stage::IgnoreModules { .. } => "ignore-modules",
            Stage::NoEmitOnErrors => "no-emit-on-errors",
            Stage::ErrorOverlay => "error-overlay",
            Stage::NamedModules => "named-modules",
            Stage::HotModuleReplacement => "hot-module-replacement",
            Stage::UnlinkRemovedFiles => "unlink-removed-files",
            Stage::CaseSensitivePaths => "case-sensitive-paths",
            Stage::InterpolateNames { .. } => "interpolate-names",
            Stage::WriteToDisk { .. } => "write-to-disk",
            Stage::Minify(_) => "minify",
            Stage::DefineEnv { .. } => "define-env",
            Stage::AppMainEntry { .. } => "app-main-entry",
            Stage::ConcatenateModules => "concatenate-modules",
            Stage::PagesManifest => "pages-manifest",
            Stage::DynamicChunks => "dynamic-chunks",
            Stage::SsrImportShim => "ssr-import-shim",
            Stage::Commons(_) => "commons",
        }
    }
}

/// Inputs the stage factories draw from.
#[derive(Debug, Clone)]
pub struct StageContext {
    pub dir: PathBuf,
    pub app_entry: PathBuf,
    pub policy: ModePolicy,
    pub interpolated_names: IndexMap<PathBuf, String>,
    /// Present once entries have been planned.
    pub commons: CommonsPolicy,
}

type Predicate = fn(&ModePolicy) -> bool;
type Factory = fn(&StageContext) -> Stage;

const PIPELINE: &[(Predicate, Factory)] = &[
    (
        |_| true,
        |_| Stage::IgnoreModules {
            resource: "(precomputed)".to_string(),
            context: Some("node_modules.+(elliptic)".to_string()),
        },
    ),
    (|p| p.no_emit_on_errors, |_| Stage::NoEmitOnErrors),
    (|p| p.error_overlay, |_| Stage::ErrorOverlay),
    (|p| p.named_modules, |_| Stage::NamedModules),
    (|p| p.enable_hot_replacement, |_| Stage::HotModuleReplacement),
    (|p| p.unlink_removed_files, |_| Stage::UnlinkRemovedFiles),
    (|p| p.case_sensitive_paths, |_| Stage::CaseSensitivePaths),
    (
        |p| p.rewrite_static_interpolated_names,
        |ctx| Stage::InterpolateNames {
            context: ctx.dir.clone(),
            names: ctx.interpolated_names.clone(),
        },
    ),
    (
        |p| p.write_to_disk,
        |_| Stage::WriteToDisk {
            exit_on_errors: false,
            log: false,
            use_hash_index: false,
        },
    ),
    (
        |p| p.strip_hot_loader,
        |_| Stage::IgnoreModules {
            resource: "react-hot-loader".to_string(),
            context: None,
        },
    ),
    (|p| p.minify, |_| Stage::Minify(MinifyOptions::default())),
    (
        |_| true,
        |ctx| Stage::DefineEnv {
            definitions: IndexMap::from([(
                "process.env.NODE_ENV".to_string(),
                format!("\"{}\"", ctx.policy.node_env()),
            )]),
        },
    ),
    (
        |p| p.client_runtime_stages,
        |ctx| Stage::AppMainEntry {
            app_entry: ctx.app_entry.clone(),
        },
    ),
    (|p| p.concatenate_modules, |_| Stage::ConcatenateModules),
    (|p| p.client_runtime_stages, |_| Stage::PagesManifest),
    (|p| p.client_runtime_stages, |_| Stage::DynamicChunks),
    (|p| p.apply_ssr_import_shim, |_| Stage::SsrImportShim),
    (
        |p| p.commons == CommonsMode::Heuristic,
        |ctx| Stage::Commons(ctx.commons.clone()),
    ),
    (
        |p| p.commons == CommonsMode::Manifest,
        |ctx| Stage::Commons(ctx.commons.clone()),
    ),
];

/// Active stages for the context's mode, in application order.
pub fn build_pipeline(ctx: &StageContext) -> Vec<Stage> {
    PIPELINE
        .iter()
        .filter(|(active, _)| active(&ctx.policy))
        .map(|(_, make)| make(ctx))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{EntryMap, EntryPlan};

    fn context(dev: bool, is_server: bool) -> StageContext {
        let policy = ModePolicy::resolve(dev, is_server);
        let plan = EntryPlan::new(EntryMap::new(), Vec::new());
        StageContext {
            dir: PathBuf::from("/app"),
            app_entry: PathBuf::from("/app/app.js"),
            policy,
            interpolated_names: IndexMap::new(),
            commons: CommonsPolicy::for_plan(&plan, policy.commons),
        }
    }

    fn names(dev: bool, is_server: bool) -> Vec<&'static str> {
        build_pipeline(&context(dev, is_server))
            .iter()
            .map(Stage::name)
            .collect()
    }

    #[test]
    fn dev_client_stages() {
        assert_eq!(
            names(true, false),
            vec![
                "ignore-modules",
                "no-emit-on-errors",
                "error-overlay",
                "named-modules",
                "hot-module-replacement",
                "unlink-removed-files",
                "case-sensitive-paths",
                "interpolate-names",
                "write-to-disk",
                "define-env",
                "app-main-entry",
                "pages-manifest",
                "dynamic-chunks",
                "commons",
            ]
        );
    }

    #[test]
    fn production_client_stages() {
        assert_eq!(
            names(false, false),
            vec![
                "ignore-modules",
                "ignore-modules",
                "minify",
                "define-env",
                "app-main-entry",
                "concatenate-modules",
                "pages-manifest",
                "dynamic-chunks",
                "commons",
            ]
        );
    }

    #[test]
    fn server_stages() {
        assert_eq!(
            names(false, true),
            vec![
                "ignore-modules",
                "ignore-modules",
                "define-env",
                "concatenate-modules",
                "ssr-import-shim",
            ]
        );

        let dev_server = names(true, true);
        assert!(!dev_server.contains(&"hot-module-replacement"));
        assert!(!dev_server.contains(&"commons"));
        assert!(dev_server.contains(&"ssr-import-shim"));
    }

    #[test]
    fn commons_stage_matches_mode() {
        let prod = build_pipeline(&context(false, false));
        let Some(Stage::Commons(policy)) = prod.last() else {
            panic!("expected commons stage");
        };
        assert_eq!(policy.name, "main");
        assert_eq!(policy.filename, "main.js");

        let dev = build_pipeline(&context(true, false));
        let Some(Stage::Commons(policy)) = dev.last() else {
            panic!("expected manifest stage");
        };
        assert_eq!(policy.name, "manifest");
        assert_eq!(policy.mode, CommonsMode::Manifest);
    }

    #[test]
    fn define_env_quotes_node_env() {
        let stages = build_pipeline(&context(false, true));
        let define = stages
            .iter()
            .find_map(|s| match s {
                Stage::DefineEnv { definitions } => Some(definitions),
                _ => None,
            })
            .unwrap();
        assert_eq!(define["process.env.NODE_ENV"], "\"production\"");
    }

    #[test]
    fn stage_serializes_with_tag() {
        let json = serde_json::to_value(Stage::NoEmitOnErrors).unwrap();
        assert_eq!(json, serde_json::json!({ "stage": "no-emit-on-errors" }));

        let json = serde_json::to_value(Stage::Minify(MinifyOptions::default())).unwrap();
        assert_eq!(json["stage"], "minify");
        assert_eq!(json["keepInfinity"], true);
    }
}
