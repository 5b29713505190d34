//! Diagnostic logging setup.
//!
//! Diagnostics go to stderr through `tracing`; prompts, listings and the
//! combined document stay on stdout. `RUST_LOG` overrides the default
//! filter.

use tracing_subscriber::EnvFilter;

pub fn init(verbose: bool) {
    let default = if verbose { "store_tidy=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    // A second init (e.g. from tests) is harmless.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
