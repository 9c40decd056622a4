//! # Structured Logging
//!
//! One-shot tracing initialization. The filter comes from `TASKREC_LOG`
//! (default `info`); setting `TASKREC_LOG_FORMAT=json` switches the console
//! layer to JSON output for log shippers.

use std::env;
use std::sync::OnceLock;

use tracing_subscriber::{fmt, EnvFilter};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

pub fn init_structured_logging() {
    LOGGER_INITIALIZED.get_or_init(|| {
        let filter = EnvFilter::try_from_env("TASKREC_LOG")
            .unwrap_or_else(|_| EnvFilter::new("info"));

        let json_output = env::var("TASKREC_LOG_FORMAT")
            .map(|format| format.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        // try_init keeps embedding hosts (and tests) that already installed
        // a subscriber working.
        let result = if json_output {
            fmt()
                .with_env_filter(filter)
                .with_target(true)
                .json()
                .try_init()
        } else {
            fmt().with_env_filter(filter).with_target(true).try_init()
        };

        if result.is_err() {
            tracing::debug!("global tracing subscriber already initialized");
        }
    });
}
