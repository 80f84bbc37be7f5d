//! Structured logging setup.
//!
//! Hook scripts hand stdout to whatever the actions print, so every log line
//! goes to stderr.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is not set.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "composter=debug"
    } else {
        "composter=info"
    }
}

/// Initialize structured logging with `RUST_LOG` environment variable support.
///
/// Defaults to `composter=info`, or `composter=debug` with `verbose`. Call
/// once at program startup; later calls are ignored.
pub fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    // try_init so double-init in tests doesn't panic
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init();
}
