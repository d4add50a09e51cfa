//! Logging setup for the folio CLI.
//!
//! Level selection, in order: `--verbose` (debug), `--quiet` (errors only),
//! `RUST_LOG`, the project's `settings.log_level`, then info for the folio
//! crates.

use std::sync::OnceLock;

use folio_config::GlobalSettings;
use tracing::warn;
use tracing_subscriber::{
    EnvFilter, Registry, fmt, layer::SubscriberExt, reload, util::SubscriberInitExt,
};

const VERBOSE_FILTER: &str = "folio_build=debug,folio_config=debug,folio_cli=debug";
const QUIET_FILTER: &str = "error";
const DEFAULT_FILTER: &str = "folio_build=info,folio_config=info,folio_cli=info";

/// Set only when no flag or `RUST_LOG` chose the level.
static SETTINGS_RELOAD: OnceLock<reload::Handle<EnvFilter, Registry>> = OnceLock::new();

/// Filter for the given global flags.
pub fn filter_for(verbose: bool, quiet: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else if quiet {
        EnvFilter::new(QUIET_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}

/// Filter for a configured `log_level`, scoped to the folio crates.
pub fn settings_filter(settings: &GlobalSettings) -> Option<EnvFilter> {
    let level = settings.log_level.as_deref()?.trim().to_lowercase();
    let level = match level.as_str() {
        "silent" => "off",
        "warning" => "warn",
        other => other,
    };
    if !matches!(level, "off" | "error" | "warn" | "info" | "debug" | "trace") {
        return None;
    }
    EnvFilter::try_new(format!(
        "folio_build={level},folio_config={level},folio_cli={level}"
    ))
    .ok()
}

/// Install the global subscriber. Logs go to stderr so stdout stays JSON.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color && crate::ui::should_use_color())
        .compact();

    let (filter, handle) = reload::Layer::new(filter_for(verbose, quiet));
    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .is_ok();

    let pinned = verbose || quiet || std::env::var_os(EnvFilter::DEFAULT_ENV).is_some();
    if installed && !pinned {
        let _ = SETTINGS_RELOAD.set(handle);
    }
}

/// Apply the project's `log_level` unless the level was already chosen on
/// the command line or through `RUST_LOG`.
pub fn apply_settings(settings: &GlobalSettings) {
    let Some(handle) = SETTINGS_RELOAD.get() else {
        return;
    };
    match settings_filter(settings) {
        Some(filter) => {
            if let Err(err) = handle.reload(filter) {
                warn!(%err, "could not apply configured log level");
            }
        }
        None => {
            if let Some(level) = &settings.log_level {
                warn!(level = %level, "ignoring unknown log level in settings");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::level_filters::LevelFilter;

    #[test]
    fn verbose_enables_debug() {
        assert_eq!(filter_for(true, false).max_level_hint(), Some(LevelFilter::DEBUG));
    }

    #[test]
    fn quiet_only_errors() {
        assert_eq!(filter_for(false, true).max_level_hint(), Some(LevelFilter::ERROR));
    }

    #[test]
    fn settings_level_becomes_filter() {
        let settings = GlobalSettings {
            log_level: Some("Warning".to_string()),
        };
        let filter = settings_filter(&settings).unwrap();
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::WARN));
    }

    #[test]
    fn unknown_or_missing_settings_level_is_ignored() {
        assert!(settings_filter(&GlobalSettings::default()).is_none());
        let settings = GlobalSettings {
            log_level: Some("chatty".to_string()),
        };
        assert!(settings_filter(&settings).is_none());
    }
}
