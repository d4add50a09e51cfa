//! Build mode policy.
//!
//! Every optional pipeline stage is gated by a flag derived from exactly two
//! inputs: whether this is a development build and whether it targets the
//! server. There is no other state.

use serde::{Deserialize, Serialize};

/// How the shared bundle is produced for a mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommonsMode {
    /// Production client: promote modules by cross-page usage.
    Heuristic,
    /// Development client: bootstrap manifest only, nothing promoted.
    Manifest,
    /// Server builds never extract a shared bundle.
    Disabled,
}

/// Resolved flag set for one `(dev, is_server)` combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModePolicy {
    pub dev: bool,
    pub is_server: bool,
    pub emit_source_maps: bool,
    pub enable_hot_replacement: bool,
    pub minify: bool,
    pub rewrite_static_interpolated_names: bool,
    pub ignore_react_devtools_patches: bool,
    pub concatenate_modules: bool,
    pub apply_ssr_import_shim: bool,
    pub error_overlay: bool,
    pub no_emit_on_errors: bool,
    pub named_modules: bool,
    pub unlink_removed_files: bool,
    pub case_sensitive_paths: bool,
    pub write_to_disk: bool,
    pub strip_hot_loader: bool,
    pub hot_self_accept: bool,
    /// App-entry registration, pages manifest and dynamic chunk naming.
    pub client_runtime_stages: bool,
    pub commons: CommonsMode,
}

impl ModePolicy {
    pub fn resolve(dev: bool, is_server: bool) -> Self {
        let dev_client = dev && !is_server;

        let commons = match (dev, is_server) {
            (_, true) => CommonsMode::Disabled,
            (true, false) => CommonsMode::Manifest,
            (false, false) => CommonsMode::Heuristic,
        };

        Self {
            dev,
            is_server,
            emit_source_maps: dev,
            enable_hot_replacement: dev_client,
            minify: !dev && !is_server,
            rewrite_static_interpolated_names: dev,
            ignore_react_devtools_patches: true,
            concatenate_modules: !dev,
            apply_ssr_import_shim: is_server,
            error_overlay: dev_client,
            no_emit_on_errors: dev,
            named_modules: dev,
            unlink_removed_files: dev,
            case_sensitive_paths: dev,
            write_to_disk: dev,
            strip_hot_loader: !dev,
            hot_self_accept: dev_client,
            client_runtime_stages: !is_server,
            commons,
        }
    }

    /// Value of `process.env.NODE_ENV` baked into the bundles.
    pub fn node_env(&self) -> &'static str {
        if self.dev { "development" } else { "production" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dev_client() {
        let p = ModePolicy::resolve(true, false);
        assert!(p.enable_hot_replacement);
        assert!(!p.minify);
        assert!(p.emit_source_maps);
        assert!(p.error_overlay);
        assert!(!p.concatenate_modules);
        assert!(!p.apply_ssr_import_shim);
        assert_eq!(p.commons, CommonsMode::Manifest);
        assert_eq!(p.node_env(), "development");
    }

    #[test]
    fn production_client() {
        let p = ModePolicy::resolve(false, false);
        assert!(p.minify);
        assert!(!p.enable_hot_replacement);
        assert!(!p.emit_source_maps);
        assert!(p.concatenate_modules);
        assert!(p.strip_hot_loader);
        assert_eq!(p.commons, CommonsMode::Heuristic);
        assert_eq!(p.node_env(), "production");
    }

    #[test]
    fn dev_server() {
        let p = ModePolicy::resolve(true, true);
        assert!(!p.enable_hot_replacement);
        assert!(!p.minify);
        assert!(p.emit_source_maps);
        assert!(p.apply_ssr_import_shim);
        assert!(!p.client_runtime_stages);
        assert_eq!(p.commons, CommonsMode::Disabled);
    }

    #[test]
    fn production_server() {
        let p = ModePolicy::resolve(false, true);
        assert!(!p.minify);
        assert!(p.concatenate_modules);
        assert!(p.apply_ssr_import_shim);
        assert_eq!(p.commons, CommonsMode::Disabled);
    }

    #[test]
    fn devtools_patches_always_ignored() {
        for (dev, server) in [(true, true), (true, false), (false, true), (false, false)] {
            assert!(ModePolicy::resolve(dev, server).ignore_react_devtools_patches);
        }
    }
}
