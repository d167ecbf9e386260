//! Logging setup
//!
//! Diagnostics go to stderr through `tracing`, leaving stdout for diffs,
//! timelines, and exports. `RUST_LOG` overrides the default filter.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the global subscriber for the CLI
///
/// Safe to call more than once; later calls are ignored.
pub fn init(verbose: bool) {
    let default_filter = if verbose {
        "crm_audit=debug,warn"
    } else {
        "crm_audit=warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .try_init();
}
