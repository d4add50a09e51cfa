//! Where the framework's own modules live.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tracing::debug;

use crate::error::ResolutionError;
use crate::resolve::ModuleResolver;

/// Package name the framework is installed under.
pub const FRAMEWORK_PACKAGE: &str = "folio";

/// Pages the framework always provides; a user page with the same id wins.
pub const DEFAULT_PAGES: [&str; 2] = ["_error", "_document"];

/// Layout of an installed framework package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameworkLayout {
    root: PathBuf,
    package_name: String,
}

impl FrameworkLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            package_name: FRAMEWORK_PACKAGE.to_string(),
        }
    }

    /// The framework installed in the project's own `node_modules`.
    pub fn installed_in(project_dir: &Path) -> Self {
        Self::new(project_dir.join("node_modules").join(FRAMEWORK_PACKAGE))
    }

    pub fn with_package_name(mut self, name: impl Into<String>) -> Self {
        self.package_name = name.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn package_name(&self) -> &str {
        &self.package_name
    }

    pub fn pages_dir(&self) -> PathBuf {
        self.root.join("pages")
    }

    pub fn default_page(&self, id: &str) -> PathBuf {
        self.pages_dir().join(format!("{id}.js"))
    }

    pub fn node_modules_dir(&self) -> PathBuf {
        self.root.join("node_modules")
    }

    pub fn client_dir(&self) -> PathBuf {
        self.root.join("dist").join("client")
    }

    pub fn loaders_dir(&self) -> PathBuf {
        self.root.join("dist").join("build").join("loaders")
    }

    pub fn transpile_preset(&self) -> PathBuf {
        self.root
            .join("dist")
            .join("build")
            .join("babel")
            .join("preset")
    }

    /// Output names for the default pages, used when static paths are
    /// rewritten in development.
    pub fn interpolated_default_pages(&self) -> IndexMap<PathBuf, String> {
        DEFAULT_PAGES
            .iter()
            .map(|id| (self.default_page(id), format!("dist/bundles/pages/{id}.js")))
            .collect()
    }
}

/// Client-side runtime modules prepended to the `main` bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientRuntime {
    pub hot_reload_client: PathBuf,
    pub on_demand_client: PathBuf,
    pub bootstrap: PathBuf,
}

impl ClientRuntime {
    /// Locate the runtime for `dev` or production builds.
    ///
    /// The bootstrap module is required; failing to resolve it is fatal.
    pub fn locate(
        layout: &FrameworkLayout,
        resolver: &dyn ModuleResolver,
        dev: bool,
    ) -> Result<Self, ResolutionError> {
        let request = if dev {
            "./dist/client/folio-dev"
        } else {
            "./dist/client/folio"
        };

        let bootstrap = resolver.resolve(request, layout.root()).ok_or_else(|| {
            ResolutionError::ModuleNotFound {
                request: request.to_string(),
                base_dir: layout.root().to_path_buf(),
            }
        })?;
        debug!(bootstrap = %bootstrap.display(), dev, "located client runtime");

        let client_dir = layout.client_dir();
        Ok(Self {
            hot_reload_client: client_dir.join("hot-middleware-client"),
            on_demand_client: client_dir.join("on-demand-entries-client"),
            bootstrap,
        })
    }
}
