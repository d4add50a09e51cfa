//! Command implementations.
//!
//! Each command writes its result to stdout and status messages to stderr.

pub mod commons;
pub mod config;
pub mod pages;
pub(crate) mod utils;

pub use commons::execute as commons_execute;
pub use config::execute as config_execute;
pub use pages::execute as pages_execute;
