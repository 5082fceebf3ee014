use std::sync::Once;

use tracing_subscriber::{fmt, EnvFilter};

use crate::config::DEFAULT_LOG_FILTER;

static TRACING_INIT: Once = Once::new();

/// Install the global tracing subscriber. Safe to call more than once.
///
/// Logs go to stderr: stdout carries command output and the bridge protocol.
/// `RUST_LOG` takes precedence; otherwise `verbose` selects debug over info.
pub fn init_tracing(verbose: bool) {
    TRACING_INIT.call_once(|| {
        let default = if verbose {
            "budget_ledger=debug"
        } else {
            DEFAULT_LOG_FILTER
        };
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

        fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    });
}
