//! Structured health reporting for host lifecycle events.

use std::sync::Arc;

use camino::Utf8Path;
use orimath_config::{Config, PluginSetting};

use crate::bootstrap::BootstrapError;
use crate::session::SessionError;

/// Observer trait used to surface host lifecycle events to telemetry sinks.
pub trait HealthReporter: Send + Sync {
    /// Invoked before configuration loading begins.
    fn bootstrap_starting(&self);

    /// Invoked after configuration, telemetry and settings are in place.
    fn bootstrap_succeeded(&self, config: &Config, setting: &PluginSetting);

    /// Invoked when bootstrap fails.
    fn bootstrap_failed(&self, error: &BootstrapError);

    /// Invoked once the plugin set is loaded and the presentation loop idle.
    fn session_ready(&self, executed: usize, failed: usize);

    /// Invoked when a session cannot complete.
    fn session_failed(&self, error: &SessionError);

    /// Invoked after the resolved order was written to `path`.
    fn order_persisted(&self, path: &Utf8Path);
}

impl<T> HealthReporter for Arc<T>
where
    T: HealthReporter,
{
    fn bootstrap_starting(&self) {
        (**self).bootstrap_starting();
    }

    fn bootstrap_succeeded(&self, config: &Config, setting: &PluginSetting) {
        (**self).bootstrap_succeeded(config, setting);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        (**self).bootstrap_failed(error);
    }

    fn session_ready(&self, executed: usize, failed: usize) {
        (**self).session_ready(executed, failed);
    }

    fn session_failed(&self, error: &SessionError) {
        (**self).session_failed(error);
    }

    fn order_persisted(&self, path: &Utf8Path) {
        (**self).order_persisted(path);
    }
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredHealthReporter;

impl StructuredHealthReporter {
    /// Builds a new reporter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl HealthReporter for StructuredHealthReporter {
    fn bootstrap_starting(&self) {
        tracing::info!(
            target: "orimath::health",
            event = "bootstrap_starting",
            "starting host bootstrap"
        );
    }

    fn bootstrap_succeeded(&self, config: &Config, setting: &PluginSetting) {
        tracing::info!(
            target: "orimath::health",
            event = "bootstrap_succeeded",
            log_filter = %config.log_filter(),
            log_format = %config.log_format(),
            plugin_settings = %config.plugin_setting_path(),
            preferred_general = setting.plugin_order().len(),
            preferred_view = setting.view_plugin_order().len(),
            "host bootstrap completed"
        );
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        tracing::error!(
            target: "orimath::health",
            event = "bootstrap_failed",
            error = %error,
            "host bootstrap failed"
        );
    }

    fn session_ready(&self, executed: usize, failed: usize) {
        tracing::info!(
            target: "orimath::health",
            event = "session_ready",
            executed,
            failed,
            "plugin set loaded"
        );
    }

    fn session_failed(&self, error: &SessionError) {
        tracing::error!(
            target: "orimath::health",
            event = "session_failed",
            error = %error,
            "host session failed"
        );
    }

    fn order_persisted(&self, path: &Utf8Path) {
        tracing::info!(
            target: "orimath::health",
            event = "order_persisted",
            path = %path,
            "resolved plugin order written"
        );
    }
}
