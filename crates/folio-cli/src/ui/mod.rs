//! Terminal output helpers.
//!
//! Machine-readable results go to stdout; everything in here writes to
//! stderr.

mod messages;

use std::sync::atomic::{AtomicBool, Ordering};

pub use messages::{info, success, warning};

static COLORS_DISABLED: AtomicBool = AtomicBool::new(false);

/// Whether colored output should be used.
///
/// `--no-color` and `NO_COLOR` disable colors, `FORCE_COLOR` enables them
/// even without a terminal, otherwise stderr must be attended.
pub fn should_use_color() -> bool {
    if COLORS_DISABLED.load(Ordering::Relaxed) || std::env::var_os("NO_COLOR").is_some() {
        return false;
    }

    if std::env::var_os("FORCE_COLOR").is_some() {
        return true;
    }

    console::user_attended_stderr()
}

/// Apply the `--no-color` flag. Call once, early in `main`.
pub fn init_colors(no_color: bool) {
    COLORS_DISABLED.store(no_color, Ordering::Relaxed);
    let enabled = should_use_color();
    console::set_colors_enabled_stderr(enabled);
    owo_colors::set_override(enabled);
}
