//! Logging and tracing configuration
//!
//! All log output goes to stderr so scenario progress on stdout stays readable.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing for the CLI
///
/// Logs are controlled by the `RUST_LOG` environment variable.
/// Default level is INFO for this crate (DEBUG with `verbose`), WARN for dependencies.
/// Target process output is logged at DEBUG, so `--verbose` shows it.
pub fn init_cli(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("ui_harness=debug,info")
        } else {
            EnvFilter::new("ui_harness=info,warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(verbose)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}
