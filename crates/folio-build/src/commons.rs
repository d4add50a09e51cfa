//! Shared ("commons") bundle extraction.
//!
//! After the engine has resolved the full module graph it reports, for every
//! module, which bundles include it. [`CommonsPolicy::decide`] turns that
//! report into promote / keep decisions.
//!
//! The policy carries the total page count, and it can only be built from an
//! [`EntryPlan`], which exists only once page discovery has finished.

use std::collections::BTreeSet;
use std::path::{Component, Path};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::entry::EntryPlan;
use crate::mode::CommonsMode;

/// Path components identifying the UI runtime library and its DOM renderer.
pub const RUNTIME_LIBRARY_DIRS: [&str; 2] = ["react", "react-dom"];

/// Which bundles include a module, as reported by the engine.
///
/// Reports may list `bundles`, give only a `count`, or both. When bundles are
/// listed they decide the count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "UsageReport")]
pub struct UsageRecord {
    pub module: String,
    pub bundles: BTreeSet<String>,
    /// Number of distinct bundles including the module.
    pub count: usize,
}

/// A usage record as it appears on the wire.
#[derive(Deserialize)]
struct UsageReport {
    module: String,
    #[serde(default)]
    bundles: BTreeSet<String>,
    #[serde(default)]
    count: Option<usize>,
}

impl From<UsageReport> for UsageRecord {
    fn from(report: UsageReport) -> Self {
        let count = if report.bundles.is_empty() {
            report.count.unwrap_or(0)
        } else {
            if let Some(reported) = report.count.filter(|c| *c != report.bundles.len()) {
                warn!(
                    module = %report.module,
                    reported,
                    bundles = report.bundles.len(),
                    "usage count disagrees with listed bundles, using bundles"
                );
            }
            report.bundles.len()
        };

        Self {
            module: report.module,
            bundles: report.bundles,
            count,
        }
    }
}

impl UsageRecord {
    pub fn new(module: impl Into<String>, bundles: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let bundles: BTreeSet<String> = bundles.into_iter().map(Into::into).collect();
        Self {
            module: module.into(),
            count: bundles.len(),
            bundles,
        }
    }

    /// A record for engines that only report counts.
    pub fn with_count(module: impl Into<String>, count: usize) -> Self {
        Self {
            module: module.into(),
            bundles: BTreeSet::new(),
            count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommonsDecision {
    pub module: String,
    pub promote: bool,
}

/// Whether a module path belongs to the UI runtime library.
pub fn is_runtime_library(module: &str) -> bool {
    Path::new(module).components().any(|c| match c {
        Component::Normal(name) => RUNTIME_LIBRARY_DIRS.iter().any(|dir| name == *dir),
        _ => false,
    })
}

/// Promotion rule for one module.
///
/// Runtime library modules are always promoted. With one or two pages a
/// module must be used by all of them; otherwise by at least half, where an
/// exact half counts.
pub fn should_promote(module: &str, count: usize, total_page_count: usize) -> bool {
    if is_runtime_library(module) {
        return true;
    }

    if total_page_count <= 2 {
        count >= total_page_count
    } else {
        // count >= total * 0.5 without rounding
        count.saturating_mul(2) >= total_page_count
    }
}

/// Apply the heuristic to every record.
pub fn decide(usage: &[UsageRecord], total_page_count: usize) -> Vec<CommonsDecision> {
    usage
        .iter()
        .map(|record| CommonsDecision {
            module: record.module.clone(),
            promote: should_promote(&record.module, record.count, total_page_count),
        })
        .collect()
}

/// The shared-bundle stage as carried in the assembled configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommonsPolicy {
    pub name: String,
    pub filename: String,
    pub mode: CommonsMode,
    total_page_count: usize,
}

impl CommonsPolicy {
    /// Policy for a completed entry plan.
    pub fn for_plan(plan: &EntryPlan, mode: CommonsMode) -> Self {
        let (name, filename) = match mode {
            CommonsMode::Manifest => ("manifest", "manifest.js"),
            CommonsMode::Heuristic | CommonsMode::Disabled => ("main", "main.js"),
        };

        Self {
            name: name.to_string(),
            filename: filename.to_string(),
            mode,
            total_page_count: plan.total_page_count(),
        }
    }

    pub fn total_page_count(&self) -> usize {
        self.total_page_count
    }

    pub fn should_promote(&self, record: &UsageRecord) -> bool {
        match self.mode {
            CommonsMode::Heuristic => {
                should_promote(&record.module, record.count, self.total_page_count)
            }
            CommonsMode::Manifest | CommonsMode::Disabled => false,
        }
    }

    /// Decide every module once the engine has reported usage.
    pub fn decide(&self, usage: &[UsageRecord]) -> Vec<CommonsDecision> {
        usage
            .iter()
            .map(|record| CommonsDecision {
                module: record.module.clone(),
                promote: self.should_promote(record),
            })
            .collect()
    }
}
