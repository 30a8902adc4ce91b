//! Tracing subscriber setup for the binary

use tracing_subscriber::EnvFilter;

/// Install the global subscriber. Logs go to stderr; `RUST_LOG` overrides the default filter.
pub fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "sheet_import=debug"
    } else {
        "sheet_import=warn"
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
