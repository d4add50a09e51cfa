//! Module resolution collaborator.
//!
//! The assembler never touches the module graph itself; it only needs to
//! answer "where does this request resolve to?" for a handful of framework
//! modules and for server-side externalization. [`ModuleResolver`] is that
//! seam, and [`NodeModulesResolver`] is the filesystem implementation.

use std::fs;
use std::path::{Path, PathBuf};

use path_clean::PathClean;
use serde_json::Value;
use tracing::trace;

/// Environment variable listing additional module search roots.
pub const SEARCH_ROOTS_ENV: &str = "NODE_PATH";

/// Resolve a module request relative to a base directory.
///
/// Returns `None` when the request cannot be located; callers decide whether
/// that is fatal.
pub trait ModuleResolver: Send + Sync + std::fmt::Debug {
    fn resolve(&self, request: &str, base_dir: &Path) -> Option<PathBuf>;
}

/// Filesystem resolver following the `node_modules` lookup convention.
///
/// Relative and absolute requests are resolved against `base_dir`. Bare
/// requests are looked up in every `node_modules` directory from `base_dir`
/// upwards, then in the extra search roots. Symlinks are preserved.
#[derive(Debug, Clone, Default)]
pub struct NodeModulesResolver {
    search_roots: Vec<PathBuf>,
}

impl NodeModulesResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search_roots(search_roots: Vec<PathBuf>) -> Self {
        Self { search_roots }
    }

    pub fn search_roots(&self) -> &[PathBuf] {
        &self.search_roots
    }

    fn resolve_candidate(&self, candidate: &Path) -> Option<PathBuf> {
        if let Some(file) = resolve_file(candidate) {
            return Some(file);
        }

        if candidate.is_dir() {
            if let Some(main) = package_main(candidate) {
                let target = candidate.join(main).clean();
                if let Some(file) = resolve_file(&target).or_else(|| resolve_index(&target)) {
                    return Some(file);
                }
            }
            return resolve_index(candidate);
        }

        None
    }
}

impl ModuleResolver for NodeModulesResolver {
    fn resolve(&self, request: &str, base_dir: &Path) -> Option<PathBuf> {
        if is_path_request(request) {
            let candidate = base_dir.join(request).clean();
            return self.resolve_candidate(&candidate);
        }

        for ancestor in base_dir.ancestors() {
            let candidate = ancestor.join("node_modules").join(request);
            if let Some(found) = self.resolve_candidate(&candidate) {
                trace!(request, found = %found.display(), "resolved via node_modules");
                return Some(found);
            }
        }

        self.search_roots
            .iter()
            .find_map(|root| self.resolve_candidate(&root.join(request)))
    }
}

fn is_path_request(request: &str) -> bool {
    request == "."
        || request == ".."
        || request.starts_with("./")
        || request.starts_with("../")
        || Path::new(request).is_absolute()
}

fn resolve_file(candidate: &Path) -> Option<PathBuf> {
    if candidate.is_file() {
        return Some(candidate.to_path_buf());
    }

    ["js", "json"].iter().find_map(|ext| {
        let mut with_ext = candidate.as_os_str().to_owned();
        with_ext.push(".");
        with_ext.push(ext);
        let path = PathBuf::from(with_ext);
        path.is_file().then_some(path)
    })
}

fn resolve_index(dir: &Path) -> Option<PathBuf> {
    ["index.js", "index.json"]
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

fn package_main(dir: &Path) -> Option<String> {
    let content = fs::read_to_string(dir.join("package.json")).ok()?;
    let parsed: Value = serde_json::from_str(&content).ok()?;
    parsed
        .get("main")
        .and_then(Value::as_str)
        .filter(|main| !main.is_empty())
        .map(str::to_string)
}

/// Split a search-path list. Windows uses `;`, every other platform `:`.
/// Empty segments are dropped.
pub fn split_search_roots(value: &str, windows: bool) -> Vec<PathBuf> {
    let separator = if windows { ';' } else { ':' };
    value
        .split(separator)
        .filter(|segment| !segment.is_empty())
        .map(PathBuf::from)
        .collect()
}

/// Read additional module search roots from `var` for the current platform.
pub fn search_roots_from_env(var: &str) -> Vec<PathBuf> {
    match std::env::var(var) {
        Ok(value) => split_search_roots(&value, cfg!(windows)),
        Err(_) => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn split_uses_platform_separator() {
        assert_eq!(
            split_search_roots("/a:/b::/c", false),
            vec![PathBuf::from("/a"), PathBuf::from("/b"), PathBuf::from("/c")]
        );
        assert_eq!(
            split_search_roots(r"C:\a;;C:\b", true),
            vec![PathBuf::from(r"C:\a"), PathBuf::from(r"C:\b")]
        );
        assert!(split_search_roots("", false).is_empty());
    }

    #[test]
    fn resolves_relative_with_implicit_extension() {
        let dir = TempDir::new().unwrap();
        write(&dir.path().join("lib/util.js"), "");

        let resolver = NodeModulesResolver::new();
        assert_eq!(
            resolver.resolve("./lib/util", dir.path()),
            Some(dir.path().join("lib/util.js"))
        );
        assert_eq!(resolver.resolve("./lib/missing", dir.path()), None);
    }

    #[test]
    fn resolves_package_main_from_ancestor_node_modules() {
        let dir = TempDir::new().unwrap();
        write(
            &dir.path().join("node_modules/left-pad/package.json"),
            r#"{ "main": "lib/pad" }"#,
        );
        write(&dir.path().join("node_modules/left-pad/lib/pad.js"), "");
        fs::create_dir_all(dir.path().join("src/deep")).unwrap();

        let resolver = NodeModulesResolver::new();
        assert_eq!(
            resolver.resolve("left-pad", &dir.path().join("src/deep")),
            Some(dir.path().join("node_modules/left-pad/lib/pad.js"))
        );
    }

    #[test]
    fn falls_back_to_index_and_search_roots() {
        let dir = TempDir::new().unwrap();
        let extra = dir.path().join("shared");
        write(&extra.join("widgets/index.js"), "");
        fs::create_dir_all(dir.path().join("app")).unwrap();

        let resolver = NodeModulesResolver::with_search_roots(vec![extra.clone()]);
        assert_eq!(
            resolver.resolve("widgets", &dir.path().join("app")),
            Some(extra.join("widgets/index.js"))
        );
        assert_eq!(NodeModulesResolver::new().resolve("widgets", &dir.path().join("app")), None);
    }
}
