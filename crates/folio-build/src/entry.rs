//! Entry composition.
//!
//! Maps discovered pages plus the framework runtime onto named bundles. This
//! is the first of two build phases: [`plan_entries`] waits for discovery to
//! finish and returns an [`EntryPlan`], and only that value can feed the
//! commons policy.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::DiscoveryError;
use crate::framework::ClientRuntime;
use crate::pages::{DiscoveryOptions, PageEntry, discover_pages_async};

/// Bundle the client runtime and application entry are emitted into.
pub const MAIN_BUNDLE: &str = "main";

/// Server-side bundle holding only the application entry.
pub const APP_MAIN_BUNDLE: &str = "app-main";

/// Default prefix for per-page bundles.
pub const PAGE_BUNDLE_PREFIX: &str = "bundles/pages/";

/// Bundle name to ordered entry modules.
///
/// Insertion order is kept. Inserting an existing name replaces its modules
/// in place, so later sources win without moving the key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryMap(IndexMap<String, Vec<PathBuf>>);

impl EntryMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a bundle, returning the previous modules.
    pub fn insert(&mut self, name: impl Into<String>, modules: Vec<PathBuf>) -> Option<Vec<PathBuf>> {
        self.0.insert(name.into(), modules)
    }

    /// Merge `other` into `self`; keys in `other` win.
    pub fn extend(&mut self, other: EntryMap) {
        for (name, modules) in other.0 {
            self.0.insert(name, modules);
        }
    }

    pub fn get(&self, name: &str) -> Option<&[PathBuf]> {
        self.0.get(name).map(Vec::as_slice)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[PathBuf])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Vec<PathBuf>)> for EntryMap {
    fn from_iter<T: IntoIterator<Item = (String, Vec<PathBuf>)>>(iter: T) -> Self {
        let mut map = EntryMap::new();
        for (name, modules) in iter {
            map.insert(name, modules);
        }
        map
    }
}

/// How page ids become bundle names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryNaming {
    prefix: String,
}

impl Default for EntryNaming {
    fn default() -> Self {
        Self {
            prefix: PAGE_BUNDLE_PREFIX.to_string(),
        }
    }
}

impl EntryNaming {
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Bundle name is the bare page id.
    ///
    /// A page called `main` then replaces the runtime bundle.
    pub fn flat() -> Self {
        Self::with_prefix("")
    }

    pub fn page_bundle(&self, id: &str) -> String {
        format!("{}{id}", self.prefix)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ComposeFlags {
    pub dev: bool,
    pub is_server: bool,
}

/// Build the entry map for one compilation.
///
/// The runtime bundle comes first, page bundles are merged after it.
pub fn compose(
    pages: &[PageEntry],
    app_entry: &Path,
    runtime: &ClientRuntime,
    flags: ComposeFlags,
    naming: &EntryNaming,
) -> EntryMap {
    let mut entries = EntryMap::new();

    if flags.is_server {
        entries.insert(APP_MAIN_BUNDLE, vec![app_entry.to_path_buf()]);
    } else {
        let mut modules = Vec::with_capacity(4);
        if flags.dev {
            modules.push(runtime.hot_reload_client.clone());
            modules.push(runtime.on_demand_client.clone());
        }
        modules.push(runtime.bootstrap.clone());
        modules.push(app_entry.to_path_buf());
        entries.insert(MAIN_BUNDLE, modules);
    }

    let page_entries: EntryMap = pages
        .iter()
        .map(|page| (naming.page_bundle(&page.id), vec![page.path.clone()]))
        .collect();
    entries.extend(page_entries);

    debug!(bundles = entries.len(), server = flags.is_server, "composed entries");
    entries
}

/// Result of the first build phase.
///
/// Constructed once discovery has completed; the page count cannot change
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryPlan {
    entries: EntryMap,
    pages: Vec<PageEntry>,
    total_page_count: usize,
}

impl EntryPlan {
    pub fn new(entries: EntryMap, pages: Vec<PageEntry>) -> Self {
        let total_page_count = pages.len();
        Self {
            entries,
            pages,
            total_page_count,
        }
    }

    pub fn entries(&self) -> &EntryMap {
        &self.entries
    }

    pub fn pages(&self) -> &[PageEntry] {
        &self.pages
    }

    pub fn total_page_count(&self) -> usize {
        self.total_page_count
    }
}

/// Inputs to [`plan_entries`].
#[derive(Debug, Clone)]
pub struct PlanRequest {
    pub pages_root: PathBuf,
    pub discovery: DiscoveryOptions,
    pub app_entry: PathBuf,
    pub runtime: ClientRuntime,
    pub flags: ComposeFlags,
    pub naming: EntryNaming,
}

/// Discover pages and compose entries.
pub async fn plan_entries(request: PlanRequest) -> Result<EntryPlan, DiscoveryError> {
    let PlanRequest {
        pages_root,
        discovery,
        app_entry,
        runtime,
        flags,
        naming,
    } = request;

    let pages = discover_pages_async(pages_root, discovery).await?;
    let entries = compose(&pages, &app_entry, &runtime, flags, &naming);
    Ok(EntryPlan::new(entries, pages))
}
