//! Logging initialization for the command-line tool
//!
//! Logs go to stderr so stdout only carries the command output.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// Filter used when RUST_LOG is not set
pub fn default_filter() -> &'static str {
    if cfg!(debug_assertions) {
        "debug,hyper_util=info,reqwest::connect=info"
    } else {
        "warn,course_track=info,course_track_lib=info"
    }
}

/// Install the global tracing subscriber. RUST_LOG takes precedence over the default filter.
pub fn setup_logging() {
    let from_env = std::env::var("RUST_LOG").is_ok();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter()));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_filter(filter);

    if tracing_subscriber::registry().with(fmt_layer).try_init().is_err() {
        // Someone else installed a subscriber first (tests); keep theirs
        return;
    }

    if !from_env {
        tracing::debug!("RUST_LOG not set, using default: {}", default_filter());
    }
}
