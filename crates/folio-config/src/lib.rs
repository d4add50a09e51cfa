//! Project configuration for Folio applications.
//!
//! A project is described by a `folio.toml` file (or a `folio` field in
//! `package.json`). Values are layered: built-in defaults, then the file,
//! then `FOLIO_*` environment variables.

pub mod config;
mod defaults;
pub mod discovery;
pub mod error;
pub mod settings;
pub mod validation;

pub use config::*;
pub use error::*;
pub use settings::*;

pub use discovery::{ConfigDiscovery, discover};
pub use validation::{ConfigValidator, FsValidator, SchemaValidator, validate_fs, validate_schema};
