//! Global settings that do not affect the assembled build configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalSettings {
    /// Log level for the folio crates when neither a CLI flag nor `RUST_LOG`
    /// picks one.
    #[serde(default)]
    pub log_level: Option<String>,
}
