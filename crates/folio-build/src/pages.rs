//! Page discovery.
//!
//! Walks the pages root and maps every eligible module to a logical page id.
//! The result is sorted by id, so the same tree always yields the same
//! bundles in the same order.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::io;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::DiscoveryError;
use crate::framework::{DEFAULT_PAGES, FrameworkLayout};

/// A discovered page: logical id plus absolute source path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageEntry {
    pub id: String,
    pub path: PathBuf,
}

impl PageEntry {
    pub fn new(id: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            id: id.into(),
            path: path.into(),
        }
    }
}

/// Lists every file below a root, as absolute paths.
pub trait DirectoryScanner: Send + Sync {
    fn scan(&self, root: &Path) -> io::Result<Vec<PathBuf>>;
}

/// [`DirectoryScanner`] backed by `walkdir`.
///
/// Hidden entries, `node_modules` and any directory named in `exclude` are
/// pruned without being descended into.
#[derive(Debug, Clone, Default)]
pub struct WalkDirScanner {
    exclude: Vec<String>,
}

impl WalkDirScanner {
    pub fn new(exclude: Vec<String>) -> Self {
        Self { exclude }
    }

    fn is_pruned(&self, name: &str, is_dir: bool) -> bool {
        if name.starts_with('.') {
            return true;
        }
        is_dir && (name == "node_modules" || self.exclude.iter().any(|e| e == name))
    }
}

impl DirectoryScanner for WalkDirScanner {
    fn scan(&self, root: &Path) -> io::Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        for entry in WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                e.depth() == 0
                    || !self.is_pruned(&e.file_name().to_string_lossy(), e.file_type().is_dir())
            })
        {
            let entry = entry?;
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }

        Ok(files)
    }
}

/// What counts as a page and where defaults come from.
#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    /// Allowed extensions in priority order, with or without a leading dot.
    pub extensions: Vec<String>,
    /// Extra directory names to skip.
    pub exclude: Vec<String>,
    /// Source of the reserved default pages, if any.
    pub framework: Option<FrameworkLayout>,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            extensions: vec!["js".to_string()],
            exclude: Vec::new(),
            framework: None,
        }
    }
}

impl DiscoveryOptions {
    fn normalized_extensions(&self) -> Vec<&str> {
        self.extensions
            .iter()
            .map(|ext| ext.trim_start_matches('.'))
            .collect()
    }
}

/// Discover pages below `root` using the default `walkdir` scanner.
pub fn discover_pages(
    root: &Path,
    options: &DiscoveryOptions,
) -> Result<Vec<PageEntry>, DiscoveryError> {
    discover_pages_with(&WalkDirScanner::new(options.exclude.clone()), root, options)
}

/// Discover pages on a blocking task.
pub async fn discover_pages_async(
    root: PathBuf,
    options: DiscoveryOptions,
) -> Result<Vec<PageEntry>, DiscoveryError> {
    tokio::task::spawn_blocking(move || discover_pages(&root, &options))
        .await
        .map_err(|e| DiscoveryError::Task(e.to_string()))?
}

/// Discover pages with a custom scanner.
pub fn discover_pages_with(
    scanner: &dyn DirectoryScanner,
    root: &Path,
    options: &DiscoveryOptions,
) -> Result<Vec<PageEntry>, DiscoveryError> {
    let root = std::path::absolute(root).map_err(|source| DiscoveryError::Unreadable {
        path: root.to_path_buf(),
        source,
    })?;

    match root.metadata() {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => return Err(DiscoveryError::NotADirectory(root)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(DiscoveryError::RootNotFound(root));
        }
        Err(source) => return Err(DiscoveryError::Unreadable { path: root, source }),
    }

    let files = scanner
        .scan(&root)
        .map_err(|source| DiscoveryError::Unreadable {
            path: root.clone(),
            source,
        })?;

    let pages = collect_pages(&root, files, options);
    debug!(root = %root.display(), count = pages.len(), "discovered pages");
    Ok(pages)
}

struct Candidate {
    path: PathBuf,
    extension_rank: usize,
    is_index: bool,
}

impl Candidate {
    fn outranks(&self, other: &Candidate) -> bool {
        (self.extension_rank, self.is_index) < (other.extension_rank, other.is_index)
    }
}

/// Turn a flat file list into page entries.
///
/// When two files map to the same id, the earlier configured extension wins,
/// then a plain file wins over `dir/index.<ext>`. Reserved pages the user did
/// not provide are filled in from the framework.
pub fn collect_pages(
    root: &Path,
    files: impl IntoIterator<Item = PathBuf>,
    options: &DiscoveryOptions,
) -> Vec<PageEntry> {
    let extensions = options.normalized_extensions();
    let mut chosen: BTreeMap<String, Candidate> = BTreeMap::new();

    for path in files {
        let Some(extension_rank) = extension_rank(&path, &extensions) else {
            continue;
        };
        let Some(id) = page_id(root, &path) else {
            continue;
        };

        let candidate = Candidate {
            is_index: path.file_stem().is_some_and(|stem| stem == "index"),
            extension_rank,
            path,
        };

        match chosen.entry(id) {
            Entry::Vacant(slot) => {
                slot.insert(candidate);
            }
            Entry::Occupied(mut slot) => {
                let (kept, dropped) = if candidate.outranks(slot.get()) {
                    let previous = slot.insert(candidate);
                    (slot.get().path.clone(), previous.path)
                } else {
                    (slot.get().path.clone(), candidate.path)
                };
                warn!(
                    id = %slot.key(),
                    kept = %kept.display(),
                    dropped = %dropped.display(),
                    "duplicate page id"
                );
            }
        }
    }

    if let Some(framework) = &options.framework {
        for id in DEFAULT_PAGES {
            chosen.entry(id.to_string()).or_insert_with(|| Candidate {
                path: framework.default_page(id),
                extension_rank: usize::MAX,
                is_index: false,
            });
        }
    }

    chosen
        .into_iter()
        .map(|(id, candidate)| PageEntry::new(id, candidate.path))
        .collect()
}

fn extension_rank(path: &Path, extensions: &[&str]) -> Option<usize> {
    let ext = path.extension()?.to_str()?;
    extensions.iter().position(|allowed| *allowed == ext)
}

/// Logical id of `file` relative to `root`.
///
/// The extension is stripped and components are joined with `/`;
/// `dir/index.<ext>` maps to `dir`, and the root index maps to `index`.
pub fn page_id(root: &Path, file: &Path) -> Option<String> {
    let relative = file.strip_prefix(root).ok()?;

    let mut segments = Vec::new();
    if let Some(parent) = relative.parent() {
        for component in parent.components() {
            match component {
                Component::Normal(name) => segments.push(name.to_str()?.to_string()),
                _ => return None,
            }
        }
    }

    let stem = relative.file_stem()?.to_str()?;
    if stem != "index" || segments.is_empty() {
        segments.push(stem.to_string());
    }

    Some(segments.join("/"))
}
