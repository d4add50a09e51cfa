//! Server-side externalization.
//!
//! Server builds leave installed packages to the runtime's own module loader
//! instead of bundling them. Which resolved paths stay external is an ordered
//! rule list; the first matching rule decides.

use std::fmt;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::ResolutionError;
use crate::resolve::ModuleResolver;

/// Outcome of classifying a resolved module path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Classification {
    /// Compiled into the bundle.
    Inline,
    /// Loaded at runtime with `require`.
    External,
}

/// Serialized form of a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRule {
    pub pattern: String,
    pub classification: Classification,
}

#[derive(Debug, Clone)]
struct Rule {
    pattern: Regex,
    classification: Classification,
}

/// Ordered regex rules over resolved paths. Unmatched paths are inlined.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<RawRule>", into = "Vec<RawRule>")]
pub struct ExternalizationPolicy {
    rules: Vec<Rule>,
}

impl ExternalizationPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule after every existing one.
    pub fn rule(
        mut self,
        pattern: &str,
        classification: Classification,
    ) -> Result<Self, ResolutionError> {
        let pattern = Regex::new(pattern).map_err(|source| ResolutionError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        self.rules.push(Rule {
            pattern,
            classification,
        });
        Ok(self)
    }

    /// Rules used for server builds.
    ///
    /// The framework's prebuilt pages and the engine's own runtime must be
    /// compiled; every other installed `.js` module is external.
    pub fn server_default(framework_package: &str) -> Result<Self, ResolutionError> {
        let package = regex::escape(framework_package);
        Self::new()
            .rule(
                &format!(r"node_modules[/\\]{package}[/\\]dist[/\\]pages"),
                Classification::Inline,
            )?
            .rule(r"node_modules[/\\]webpack", Classification::Inline)?
            .rule(r"node_modules[/\\].*\.js", Classification::External)
    }

    pub fn classify(&self, resolved: &Path) -> Classification {
        let path = resolved.to_string_lossy();
        self.rules
            .iter()
            .find(|rule| rule.pattern.is_match(&path))
            .map_or(Classification::Inline, |rule| rule.classification)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl fmt::Debug for ExternalizationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(
                self.rules
                    .iter()
                    .map(|r| (r.pattern.as_str(), r.classification)),
            )
            .finish()
    }
}

impl PartialEq for ExternalizationPolicy {
    fn eq(&self, other: &Self) -> bool {
        self.rules.len() == other.rules.len()
            && self
                .rules
                .iter()
                .zip(&other.rules)
                .all(|(a, b)| {
                    a.pattern.as_str() == b.pattern.as_str() && a.classification == b.classification
                })
    }
}

impl TryFrom<Vec<RawRule>> for ExternalizationPolicy {
    type Error = ResolutionError;

    fn try_from(raw: Vec<RawRule>) -> Result<Self, Self::Error> {
        raw.into_iter()
            .try_fold(Self::new(), |policy, rule| {
                policy.rule(&rule.pattern, rule.classification)
            })
    }
}

impl From<ExternalizationPolicy> for Vec<RawRule> {
    fn from(policy: ExternalizationPolicy) -> Self {
        policy
            .rules
            .into_iter()
            .map(|rule| RawRule {
                pattern: rule.pattern.as_str().to_string(),
                classification: rule.classification,
            })
            .collect()
    }
}

/// Externals section of a compilation.
///
/// Client builds carry no policy and bundle everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Externals {
    pub base_dir: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy: Option<ExternalizationPolicy>,
}

impl Externals {
    pub fn none(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            policy: None,
        }
    }

    pub fn with_policy(base_dir: impl Into<PathBuf>, policy: ExternalizationPolicy) -> Self {
        Self {
            base_dir: base_dir.into(),
            policy: Some(policy),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.policy.is_some()
    }

    /// How the engine should load `request`, or `None` to bundle it.
    ///
    /// A request the resolver cannot locate is bundled.
    pub fn external_for(&self, request: &str, resolver: &dyn ModuleResolver) -> Option<String> {
        let policy = self.policy.as_ref()?;
        let resolved = resolver.resolve(request, &self.base_dir)?;

        match policy.classify(&resolved) {
            Classification::External => {
                trace!(request, resolved = %resolved.display(), "externalized");
                Some(format!("commonjs {request}"))
            }
            Classification::Inline => None,
        }
    }
}
