//! Structured telemetry for the host process.
//!
//! Diagnostics go to stderr through `tracing`; stdout is reserved for
//! command output such as `--list-plugins`.

use std::io::{self, IsTerminal};

use once_cell::sync::OnceCell;
use tracing::{Subscriber, subscriber::SetGlobalDefaultError};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

use orimath_config::{Config, LogFormat};

static INSTALLED: OnceCell<LogFormat> = OnceCell::new();

/// Proof that a global subscriber is in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TelemetryHandle {
    format: LogFormat,
}

impl TelemetryHandle {
    /// Format chosen by the call that installed the subscriber.
    #[must_use]
    pub const fn format(self) -> LogFormat {
        self.format
    }
}

/// Errors encountered while configuring telemetry.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// Failed to parse the configured log filter expression.
    #[error("invalid log filter: {0}")]
    Filter(String),
    /// Failed to install the tracing subscriber.
    #[error("failed to install telemetry subscriber: {0}")]
    Subscriber(SetGlobalDefaultError),
}

/// Installs the global tracing subscriber on first use.
///
/// Later calls keep the first subscriber and report its format, so tests
/// and embedders can call this freely.
///
/// # Examples
///
/// ```rust
/// use orimath::telemetry;
/// use orimath_config::Config;
///
/// # fn main() -> Result<(), orimath::TelemetryError> {
/// let config = Config::default();
/// let first = telemetry::initialise(&config)?;
/// let second = telemetry::initialise(&config)?;
/// assert_eq!(first, second);
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Returns [`TelemetryError`] when the filter is malformed or another
/// subscriber was installed outside this function.
pub fn initialise(config: &Config) -> Result<TelemetryHandle, TelemetryError> {
    INSTALLED
        .get_or_try_init(|| install(config).map(|()| config.log_format()))
        .map(|format| TelemetryHandle { format: *format })
}

fn install(config: &Config) -> Result<(), TelemetryError> {
    let filter = EnvFilter::try_new(config.log_filter())
        .map_err(|error| TelemetryError::Filter(error.to_string()))?;
    tracing::subscriber::set_global_default(subscriber(filter, config.log_format()))
        .map_err(TelemetryError::Subscriber)
}

fn subscriber(filter: EnvFilter, format: LogFormat) -> Box<dyn Subscriber + Send + Sync> {
    let builder = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .with_thread_names(true)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_timer(fmt::time::UtcTime::rfc_3339());

    if format.is_structured() {
        Box::new(builder.json().flatten_event(true).finish())
    } else {
        Box::new(builder.compact().finish())
    }
}
