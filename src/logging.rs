// ABOUTME: Structured logging setup for the gateway, configured from the environment
// ABOUTME: Trimmed to what a library-plus-thin-binary needs: level, format, nothing else

//! `SPEC_FULL.md` §10: ambient logging.
//!
//! The gateway logs at exactly the points `spec.md` calls for: session open
//! (`info`), bus decode failure (`error`, `tracing` has no separate
//! "critical" level, so this is the closest fit to the reference's
//! `log.critical`), stale-reply discards (`debug`, since churn is expected
//! and not noteworthy), and registration conflicts (`error`, before the
//! typed error propagates to the caller). This module only sets up the
//! subscriber; the call sites themselves live in [`crate::gateway`],
//! [`crate::bus`], and [`crate::shutdown`].

use std::env;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable, for local development.
    Pretty,
    /// One JSON object per line, for log aggregation.
    Json,
    /// Single line, no target/location, for space-constrained output.
    Compact,
}

/// Logging configuration for the gateway binary.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Default level when `RUST_LOG` is unset.
    pub level: String,
    /// Output format.
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::Pretty,
        }
    }
}

impl LoggingConfig {
    /// Build a configuration from `RUST_LOG` and `LOG_FORMAT` environment
    /// variables, falling back to [`LoggingConfig::default`] values.
    #[must_use]
    pub fn from_env() -> Self {
        let level = env::var("RUST_LOG").unwrap_or_else(|_| "info".into());
        let format = match env::var("LOG_FORMAT").as_deref() {
            Ok("json") => LogFormat::Json,
            Ok("compact") => LogFormat::Compact,
            _ => LogFormat::Pretty,
        };
        Self { level, format }
    }

    /// Initialize the global `tracing` subscriber from this configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a global subscriber has already been installed.
    pub fn init(&self) -> Result<(), tracing_subscriber::util::TryInitError> {
        let env_filter = EnvFilter::try_new(&self.level).unwrap_or_else(|_| EnvFilter::new("info"));
        let registry = tracing_subscriber::registry().with(env_filter);

        match self.format {
            LogFormat::Json => registry.with(fmt::layer().json()).try_init(),
            LogFormat::Pretty => registry.with(fmt::layer()).try_init(),
            LogFormat::Compact => registry.with(fmt::layer().compact()).try_init(),
        }
    }
}
