//! Structured logging configuration.
//!
//! Two output modes: pretty-printed human-readable logs for development
//! (default) and JSON for log aggregation in production. Set
//! `NEXUS_LOG_FORMAT=json` for JSON output; `RUST_LOG` overrides the level
//! passed on the command line.

use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Log format mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Pretty-printed human-readable logs (default).
    Pretty,
    /// JSON-formatted logs for production.
    Json,
}

impl LogFormat {
    /// Detect log format from the environment.
    pub fn from_env() -> Self {
        match std::env::var("NEXUS_LOG_FORMAT")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "json" => Self::Json,
            _ => Self::Pretty,
        }
    }
}

/// Initialize the logging subsystem with the given fallback level.
///
/// `RUST_LOG`, when set, takes precedence over `level`.
pub fn init(level: &str) {
    init_with_format(level, LogFormat::from_env());
}

pub fn init_with_format(level: &str, format: LogFormat) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match format {
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().with_target(true))
                .init();
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    fmt::layer()
                        .json()
                        .with_current_span(true)
                        .with_target(true)
                        .with_file(true)
                        .with_line_number(true),
                )
                .init();
        }
    }
}
