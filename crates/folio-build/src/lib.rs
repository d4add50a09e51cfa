#![cfg_attr(docsrs, feature(doc_cfg))]

//! # folio-build
//!
//! Assembles the declarative configuration a bundling engine needs to build a
//! folio application: which bundles exist, which pipeline stages run in the
//! current mode, and which modules move into the shared bundle.
//!
//! Assembly happens in two phases. Page discovery and entry composition
//! produce an [`EntryPlan`]; only then can the configuration, and with it the
//! [`CommonsPolicy`], be built.
//!
//! ```no_run
//! use folio_build::{AssembleOptions, ConfigAssembler};
//! use folio_config::ConfigDiscovery;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConfigDiscovery::new("./my-app").load()?;
//! let assembler = ConfigAssembler::new("./my-app", AssembleOptions::client(false), config);
//!
//! let plan = assembler.plan().await?;
//! let bundler_config = assembler.assemble(&plan)?;
//! println!("{}", serde_json::to_string_pretty(&bundler_config)?);
//! # Ok(()) }
//! ```

pub mod assembler;
pub mod commons;
pub mod config;
pub mod entry;
pub mod error;
pub mod externals;
pub mod framework;
pub mod hook;
pub mod loaders;
pub mod mode;
pub mod pages;
pub mod pipeline;
pub mod resolve;

#[cfg(feature = "logging")]
#[cfg_attr(docsrs, doc(cfg(feature = "logging")))]
pub mod logging;

#[cfg(feature = "logging")]
#[cfg_attr(docsrs, doc(cfg(feature = "logging")))]
pub use logging::{LogLevel, init_logging, init_logging_from_env};

pub use assembler::{AssembleOptions, ConfigAssembler, build_config, decide_commons};
pub use commons::{CommonsDecision, CommonsPolicy, UsageRecord, decide, should_promote};
pub use config::BundlerConfig;
pub use entry::{ComposeFlags, EntryMap, EntryNaming, EntryPlan, compose, plan_entries};
pub use error::{ConfigAssemblyError, DiscoveryError, ResolutionError};
pub use externals::{Classification, ExternalizationPolicy, Externals};
pub use framework::{ClientRuntime, FrameworkLayout};
pub use hook::{ConfigHook, HookContext, HookError, MergeOverridesHook};
pub use mode::{CommonsMode, ModePolicy};
pub use pages::{DirectoryScanner, DiscoveryOptions, PageEntry, WalkDirScanner, discover_pages};
pub use pipeline::{Stage, build_pipeline};
pub use resolve::{ModuleResolver, NodeModulesResolver};

/// Error types for folio-build operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error(transparent)]
    Assembly(#[from] ConfigAssemblyError),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(transparent)]
    Config(#[from] folio_config::ConfigError),
}

/// Result type alias for folio-build operations.
pub type Result<T> = std::result::Result<T, Error>;

impl miette::Diagnostic for Error {
    fn code(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        Some(Box::new(match self {
            Error::Discovery(_) => "DISCOVERY_ERROR",
            Error::Assembly(_) => "CONFIG_ASSEMBLY_ERROR",
            Error::Resolution(_) => "RESOLUTION_ERROR",
            Error::Config(_) => "CONFIG_ERROR",
        }))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(miette::Severity::Error)
    }

    fn help(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        let help: String = match self {
            Error::Discovery(DiscoveryError::RootNotFound(path)) => format!(
                "Create a pages directory at '{}' or set `pages_dir` in folio.toml.",
                path.display()
            ),
            Error::Discovery(DiscoveryError::NotADirectory(path)) => {
                format!("'{}' must be a directory of page modules.", path.display())
            }
            Error::Discovery(_) => return None,
            Error::Assembly(ConfigAssemblyError::NonObjectResult { .. }) => {
                "Config hooks must return the (modified) configuration object.".to_string()
            }
            Error::Assembly(ConfigAssemblyError::InvalidShape(_)) => {
                "A config hook removed or retyped a required key such as `entry` or `output`."
                    .to_string()
            }
            Error::Assembly(_) => return None,
            Error::Resolution(ResolutionError::ModuleNotFound { .. }) => {
                "Is the folio package installed? Run your package manager's install command."
                    .to_string()
            }
            Error::Resolution(ResolutionError::InvalidPattern { .. }) => return None,
            Error::Config(folio_config::ConfigError::NotFound) => {
                "Add a folio.toml with at least `main = \"app.js\"`.".to_string()
            }
            Error::Config(folio_config::ConfigError::MissingField(field)) => {
                format!("Set `{field}` in folio.toml or the `folio` field of package.json.")
            }
            Error::Config(_) => return None,
        };
        Some(Box::new(help))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use miette::Diagnostic;
    use std::path::PathBuf;

    #[test]
    fn codes_are_stable() {
        let err = Error::from(DiscoveryError::RootNotFound(PathBuf::from("/app/pages")));
        assert_eq!(err.code().unwrap().to_string(), "DISCOVERY_ERROR");
        assert!(err.help().unwrap().to_string().contains("/app/pages"));

        let err = Error::from(ConfigAssemblyError::HookFailed("boom".into()));
        assert_eq!(err.code().unwrap().to_string(), "CONFIG_ASSEMBLY_ERROR");
        assert!(err.help().is_none());

        let err = Error::from(folio_config::ConfigError::MissingField("main"));
        assert_eq!(err.code().unwrap().to_string(), "CONFIG_ERROR");
        assert_eq!(err.to_string(), "missing required field `main`");
    }

    #[test]
    fn resolution_errors_point_at_install() {
        let err = Error::from(ResolutionError::ModuleNotFound {
            request: "./dist/client/folio".into(),
            base_dir: PathBuf::from("/fw"),
        });
        assert_eq!(err.code().unwrap().to_string(), "RESOLUTION_ERROR");
        assert!(err.help().unwrap().to_string().contains("installed"));
    }
}
