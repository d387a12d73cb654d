//! Host bootstrap orchestration.

use std::sync::Arc;

use orimath_config::{Config, ConfigError, PluginSetting, SettingError};
use thiserror::Error;

use crate::health::HealthReporter;
use crate::telemetry::{self, TelemetryError, TelemetryHandle};

/// Trait abstracting configuration loading for testability.
pub trait ConfigLoader: Send + Sync {
    /// Loads the host configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the arguments or environment are invalid.
    fn load(&self) -> Result<Config, ConfigError>;
}

/// Loader that reads the process arguments and environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemConfigLoader;

impl ConfigLoader for SystemConfigLoader {
    fn load(&self) -> Result<Config, ConfigError> {
        Config::load()
    }
}

/// Loader that hands out a fixed configuration.
#[derive(Debug, Clone)]
pub struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    /// Wraps `config`.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self) -> Result<Config, ConfigError> {
        Ok(self.config.clone())
    }
}

/// Errors surfaced during bootstrap.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Configuration failed to load.
    #[error("failed to load configuration: {source}")]
    Configuration {
        /// Underlying loader error.
        #[source]
        source: ConfigError,
    },
    /// Telemetry initialisation failed.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        /// Underlying telemetry error.
        #[source]
        source: TelemetryError,
    },
    /// The plugin ordering settings could not be read.
    #[error("failed to load plugin settings: {source}")]
    Setting {
        /// Underlying settings error.
        #[source]
        source: SettingError,
    },
}

/// A bootstrapped host, ready to run a session.
pub struct Host {
    config: Config,
    setting: PluginSetting,
    telemetry: TelemetryHandle,
    reporter: Arc<dyn HealthReporter>,
}

impl Host {
    /// Resolved configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Plugin ordering settings read at bootstrap.
    #[must_use]
    pub const fn setting(&self) -> &PluginSetting {
        &self.setting
    }

    /// Telemetry handle, primarily useful for testing.
    #[must_use]
    pub const fn telemetry(&self) -> TelemetryHandle {
        self.telemetry
    }

    /// Lifecycle reporter.
    #[must_use]
    pub fn reporter(&self) -> &dyn HealthReporter {
        self.reporter.as_ref()
    }
}

impl std::fmt::Debug for Host {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Host")
            .field("config", &self.config)
            .field("setting", &self.setting)
            .field("telemetry", &self.telemetry)
            .finish_non_exhaustive()
    }
}

/// Bootstraps the host using the supplied collaborators.
///
/// Loads the configuration, installs telemetry and reads the plugin
/// ordering settings. A missing settings file yields empty preferences.
///
/// # Errors
///
/// Returns [`BootstrapError`] for the first stage that fails; the failure
/// is also reported through `reporter`.
pub fn bootstrap_with(
    loader: &dyn ConfigLoader,
    reporter: Arc<dyn HealthReporter>,
) -> Result<Host, BootstrapError> {
    reporter.bootstrap_starting();
    let fail = |error: BootstrapError| {
        reporter.bootstrap_failed(&error);
        error
    };

    let config = loader
        .load()
        .map_err(|source| fail(BootstrapError::Configuration { source }))?;
    let telemetry = telemetry::initialise(&config)
        .map_err(|source| fail(BootstrapError::Telemetry { source }))?;
    let setting = PluginSetting::load(&config.plugin_setting_path())
        .map_err(|source| fail(BootstrapError::Setting { source }))?;

    reporter.bootstrap_succeeded(&config, &setting);
    Ok(Host {
        config,
        setting,
        telemetry,
        reporter,
    })
}
