//! Shared configuration for the Orimath host.
//!
//! Two concerns live here. [`PluginSetting`] is the persisted ordering
//! document (`pluginOrder` / `viewPluginOrder`) consumed once per discovery
//! pass by the plugin order resolver. [`Config`] is the host's runtime
//! configuration, assembled from command-line flags with environment variable
//! fallbacks and the defaults in this crate.

mod defaults;
mod logging;
mod setting;

use std::ffi::OsString;
use std::sync::Arc;

use camino::Utf8PathBuf;
use clap::Parser;
use thiserror::Error;

pub use defaults::{
    DEFAULT_LOG_FILTER, PLUGIN_SETTING_FILE_NAME, default_log_filter, default_log_format,
    default_plugin_setting_path,
};
pub use logging::LogFormat;
pub use setting::{PluginSetting, SettingError};

/// Errors raised while assembling the host configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Command-line or environment input was rejected.
    ///
    /// This also carries `--help` and `--version` requests, which callers
    /// should render rather than treat as failures.
    #[error("invalid arguments: {0}")]
    Arguments(#[source] Arc<clap::Error>),
}

impl ConfigError {
    /// Returns the underlying argument parser error.
    #[must_use]
    pub fn parser_error(&self) -> &clap::Error {
        match self {
            Self::Arguments(error) => error,
        }
    }
}

/// Runtime configuration of the Orimath host.
#[derive(Debug, Clone, PartialEq, Eq, Parser)]
#[command(
    name = "orimath",
    version,
    about = "Paper-folding simulator host with ordered plugin composition"
)]
pub struct Config {
    /// Tracing filter directive, e.g. `info` or `orimath_plugins=debug`.
    #[arg(long, env = "ORIMATH_LOG_FILTER", default_value = DEFAULT_LOG_FILTER)]
    log_filter: String,

    /// Log output format: `json` or `compact`.
    #[arg(long, env = "ORIMATH_LOG_FORMAT", default_value_t = LogFormat::default())]
    log_format: LogFormat,

    /// Location of the plugin ordering settings file.
    #[arg(long, env = "ORIMATH_PLUGIN_SETTINGS")]
    plugin_settings: Option<Utf8PathBuf>,

    /// Write one tab-separated line per discovered plugin to stdout, in
    /// resolved order, and exit without loading.
    #[arg(long)]
    list_plugins: bool,

    /// Persist the resolved plugin order back to the settings file.
    #[arg(long)]
    write_order: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: DEFAULT_LOG_FILTER.to_owned(),
            log_format: LogFormat::default(),
            plugin_settings: None,
            list_plugins: false,
            write_order: false,
        }
    }
}

impl Config {
    /// Loads configuration from the process arguments and environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Arguments`] when the arguments are invalid or
    /// help/version output was requested.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_iter(std::env::args_os())
    }

    /// Loads configuration from an explicit argument list. The first item is
    /// the program name.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Arguments`] when the arguments are invalid or
    /// help/version output was requested.
    pub fn load_from_iter<I, T>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Self::try_parse_from(args).map_err(|error| ConfigError::Arguments(Arc::new(error)))
    }

    /// Tracing filter directive.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Selected log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Resolved location of the plugin ordering settings.
    #[must_use]
    pub fn plugin_setting_path(&self) -> Utf8PathBuf {
        self.plugin_settings
            .clone()
            .unwrap_or_else(default_plugin_setting_path)
    }

    /// Whether the host should only enumerate plugins.
    #[must_use]
    pub const fn list_plugins(&self) -> bool {
        self.list_plugins
    }

    /// Whether the resolved order should be written back to the settings.
    #[must_use]
    pub const fn write_order(&self) -> bool {
        self.write_order
    }

    /// Overrides the plugin settings location.
    #[must_use]
    pub fn with_plugin_settings(mut self, path: impl Into<Utf8PathBuf>) -> Self {
        self.plugin_settings = Some(path.into());
        self
    }
}
