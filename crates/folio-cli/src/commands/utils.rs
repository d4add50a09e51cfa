//! Shared helpers for commands that operate on a project directory.

use std::path::PathBuf;

use folio_build::FrameworkLayout;
use folio_config::{ConfigDiscovery, FolioConfig};
use tracing::debug;

use crate::cli::ProjectArgs;
use crate::error::{CliError, Result, ResultExt};

/// A loaded project: absolute directory, config and framework location.
pub(crate) struct Project {
    pub dir: PathBuf,
    pub config: FolioConfig,
    pub framework: FrameworkLayout,
}

pub(crate) fn load_project(args: &ProjectArgs) -> Result<Project> {
    let dir = std::path::absolute(&args.dir).with_path(&args.dir)?;
    if !dir.is_dir() {
        return Err(CliError::InvalidArgument(format!(
            "project directory does not exist: {}",
            dir.display()
        )));
    }

    let discovery = ConfigDiscovery::new(&dir);
    let config = match &args.config {
        Some(path) => {
            let path = if path.is_absolute() {
                path.clone()
            } else {
                dir.join(path)
            };
            if !path.is_file() {
                return Err(CliError::FileNotFound(path));
            }
            discovery.load_from(&path)?
        }
        None => discovery.load()?,
    };
    crate::logger::apply_settings(&config.settings);

    let framework = match &args.framework {
        Some(root) => FrameworkLayout::new(std::path::absolute(root).with_path(root)?),
        None => FrameworkLayout::installed_in(&dir),
    };
    debug!(dir = %dir.display(), framework = %framework.root().display(), "loaded project");

    Ok(Project {
        dir,
        config,
        framework,
    })
}

/// Serialize `value` for stdout.
pub(crate) fn to_json<T: serde::Serialize>(value: &T, compact: bool) -> Result<String> {
    let json = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    Ok(json)
}
