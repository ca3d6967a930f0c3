//! Log setup for the gridq binary.

use std::env;
use tracing_subscriber::EnvFilter;

fn build_filter(verbose: bool) -> EnvFilter {
    match env::var("GRIDQ_LOG") {
        Ok(value) => EnvFilter::new(value),
        Err(_) => {
            if verbose {
                EnvFilter::new("debug")
            } else {
                EnvFilter::new("warn")
            }
        }
    }
}

/// Log to stderr so stdout stays clean for `--json`.
pub fn init(verbose: bool) {
    tracing_subscriber::fmt()
        .with_env_filter(build_filter(verbose))
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}
