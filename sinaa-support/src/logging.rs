//! Tracing subscriber setup.
//!
//! Sinaa only emits `tracing` events; applications normally install their
//! own subscriber. [`init_tracing`] is a convenience for binaries and tests.

use std::env;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// Variable read first for the filter directives.
pub const LOG_ENV: &str = "SINAA_LOG";

/// Directives used when neither `SINAA_LOG` nor `RUST_LOG` is set.
pub const DEFAULT_DIRECTIVES: &str = "warn";

/// Builds the filter from `SINAA_LOG`, then `RUST_LOG`, then
/// [`DEFAULT_DIRECTIVES`]. Unparsable directives fall back to the default.
pub fn env_filter() -> EnvFilter {
    let directives = env::var(LOG_ENV)
        .or_else(|_| env::var(EnvFilter::DEFAULT_ENV))
        .unwrap_or_else(|_| DEFAULT_DIRECTIVES.to_owned());

    EnvFilter::try_new(&directives).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES))
}

/// Installs a stderr `fmt` subscriber as the global default.
///
/// Returns `false` if a global subscriber was already installed, so it is
/// safe to call from every test.
pub fn init_tracing() -> bool {
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true);

    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt_layer)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_is_harmless() {
        init_tracing();
        assert!(!init_tracing());
        tracing::debug!("subscriber installed");
    }
}
