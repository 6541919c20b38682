//! Optional structured diagnostics (cargo feature `telemetry`).
//!
//! Emits `tracing` events to stderr through `tracing-subscriber`'s fmt layer.
//! Filtering follows `SHELLSTRAP_LOG` (EnvFilter syntax); the default is `warn`,
//! so regular progress output stays the colored one-liners.

use once_cell::sync::OnceCell;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

static INIT: OnceCell<()> = OnceCell::new();

fn telemetry_disabled_env() -> bool {
    matches!(
        std::env::var("SHELLSTRAP_LOG").ok().as_deref().map(str::trim),
        Some("off") | Some("0")
    )
}

/// Install the global subscriber once. Later calls are no-ops.
pub fn telemetry_init(verbose: bool) {
    if telemetry_disabled_env() {
        return;
    }
    INIT.get_or_init(|| {
        let default = if verbose { "shellstrap=debug" } else { "warn" };
        let filter = EnvFilter::try_from_env("SHELLSTRAP_LOG")
            .unwrap_or_else(|_| EnvFilter::new(default));
        let fmt = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false);
        let _ = tracing_subscriber::registry().with(filter).with(fmt).try_init();
    });
}
