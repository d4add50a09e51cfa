use std::path::PathBuf;

pub(crate) fn default_page_extensions() -> Vec<String> {
    vec!["js".to_string()]
}

pub(crate) fn default_dist_dir() -> PathBuf {
    PathBuf::from(".folio")
}

pub(crate) fn default_pages_dir() -> PathBuf {
    PathBuf::from("pages")
}
