use std::fs;
use std::path::{Path, PathBuf};

use folio_build::pages::{DiscoveryOptions, discover_pages, discover_pages_async};
use folio_build::{DiscoveryError, FrameworkLayout, PageEntry};
use proptest::prelude::*;
use tempfile::TempDir;

fn touch(root: &Path, relative: &str) -> PathBuf {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, "export default () => null\n").unwrap();
    path
}

fn ids(pages: &[PageEntry]) -> Vec<&str> {
    pages.iter().map(|p| p.id.as_str()).collect()
}

#[test]
fn discovers_nested_pages_sorted_by_id() {
    let dir = TempDir::new().unwrap();
    touch(dir.path(), "index.js");
    touch(dir.path(), "zebra.js");
    touch(dir.path(), "blog/index.js");
    touch(dir.path(), "blog/first-post.js");
    touch(dir.path(), "README.md");

    let pages = discover_pages(dir.path(), &DiscoveryOptions::default()).unwrap();
    assert_eq!(ids(&pages), vec!["blog", "blog/first-post", "index", "zebra"]);
    assert!(pages.iter().all(|p| p.path.is_absolute()));
}

#[test]
fn skips_hidden_node_modules_and_excluded_dirs() {
    let dir = TempDir::new().unwrap();
    touch(dir.path(), "about.js");
    touch(dir.path(), ".cache/stale.js");
    touch(dir.path(), "node_modules/dep/index.js");
    touch(dir.path(), "__tests__/about.test.js");

    let opts = DiscoveryOptions {
        exclude: vec!["__tests__".to_string()],
        ..DiscoveryOptions::default()
    };
    let pages = discover_pages(dir.path(), &opts).unwrap();
    assert_eq!(ids(&pages), vec!["about"]);
}

#[test]
fn multiple_extensions_resolve_collisions_by_order() {
    let dir = TempDir::new().unwrap();
    touch(dir.path(), "about.js");
    let jsx = touch(dir.path(), "about.jsx");
    touch(dir.path(), "contact.js");

    let opts = DiscoveryOptions {
        extensions: vec!["jsx".to_string(), "js".to_string()],
        ..DiscoveryOptions::default()
    };
    let pages = discover_pages(dir.path(), &opts).unwrap();
    assert_eq!(ids(&pages), vec!["about", "contact"]);
    assert_eq!(pages[0].path, jsx);
}

#[test]
fn reserved_pages_come_from_framework_unless_provided() {
    let dir = TempDir::new().unwrap();
    let pages_dir = dir.path().join("pages");
    let user_document = touch(&pages_dir, "_document.js");
    touch(&pages_dir, "index.js");

    let opts = DiscoveryOptions {
        framework: Some(FrameworkLayout::new("/opt/folio")),
        ..DiscoveryOptions::default()
    };
    let pages = discover_pages(&pages_dir, &opts).unwrap();

    assert_eq!(ids(&pages), vec!["_document", "_error", "index"]);
    assert_eq!(pages[0].path, user_document);
    assert_eq!(pages[1].path, PathBuf::from("/opt/folio/pages/_error.js"));
}

#[test]
fn missing_root_is_an_error() {
    let dir = TempDir::new().unwrap();
    let err = discover_pages(&dir.path().join("nope"), &DiscoveryOptions::default()).unwrap_err();
    assert!(matches!(err, DiscoveryError::RootNotFound(_)));
}

#[test]
fn file_root_is_an_error() {
    let dir = TempDir::new().unwrap();
    let file = touch(dir.path(), "page.js");
    let err = discover_pages(&file, &DiscoveryOptions::default()).unwrap_err();
    assert!(matches!(err, DiscoveryError::NotADirectory(_)));
}

#[test]
fn empty_root_yields_no_pages() {
    let dir = TempDir::new().unwrap();
    let pages = discover_pages(dir.path(), &DiscoveryOptions::default()).unwrap();
    assert!(pages.is_empty());
}

#[tokio::test]
async fn async_discovery_matches_sync() {
    let dir = TempDir::new().unwrap();
    touch(dir.path(), "a.js");
    touch(dir.path(), "b/c.js");

    let sync = discover_pages(dir.path(), &DiscoveryOptions::default()).unwrap();
    let async_pages = discover_pages_async(dir.path().to_path_buf(), DiscoveryOptions::default())
        .await
        .unwrap();
    assert_eq!(sync, async_pages);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn discovery_is_idempotent(names in prop::collection::btree_set("[a-z]{1,8}(/[a-z]{1,8})?", 0..12)) {
        let dir = TempDir::new().unwrap();
        for name in &names {
            let path = dir.path().join(format!("{name}.js"));
            // a directory and a file may not share a path
            if fs::create_dir_all(path.parent().unwrap()).is_ok() {
                let _ = fs::write(&path, "");
            }
        }

        let first = discover_pages(dir.path(), &DiscoveryOptions::default()).unwrap();
        let second = discover_pages(dir.path(), &DiscoveryOptions::default()).unwrap();
        prop_assert_eq!(&first, &second);

        let mut sorted = ids(&first);
        sorted.sort_unstable();
        prop_assert_eq!(ids(&first), sorted);
    }
}
