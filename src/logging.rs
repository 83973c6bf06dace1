//! Diagnostic output for the binary.

use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "MODELDECK_LOG";

fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "info,modeldeck=debug"
    } else {
        "warn,modeldeck=info"
    }
}

/// Install the stderr subscriber. Safe to call more than once.
pub fn init_tracing(verbose: bool) {
    let filter = std::env::var(LOG_ENV)
        .ok()
        .and_then(|value| EnvFilter::try_new(value).ok())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(default_filter(verbose)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .compact()
        .try_init();
}
