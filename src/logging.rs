//! Logging setup for the `tracing` ecosystem.
//!
//! The core itself only emits through the `tracing` macros; the embedding
//! application decides where output goes. [`init_tracing`] is a convenience
//! for binaries that just want stderr logging honoring `RUST_LOG`.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize a global subscriber writing to stderr.
///
/// Respects the `RUST_LOG` environment variable, falling back to
/// `default_filter` (e.g. `"info"` or `"fm_core=debug"`).
///
/// Should be called once at application startup.
pub fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .init();
}
