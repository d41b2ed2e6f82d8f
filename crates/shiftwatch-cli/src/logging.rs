//! Logging initialization.
//!
//! Uses tracing with an environment-driven filter: `RUST_LOG=debug` or
//! `RUST_LOG=shiftwatch_core=trace` for more detail, default `info`.

use tracing_subscriber::{fmt, EnvFilter};

pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
