//! Shared doubles for the host test suites.

use std::sync::{Arc, Mutex, PoisonError};

use camino::{Utf8Path, Utf8PathBuf};
use orimath_config::{Config, ConfigError, PluginSetting};
use orimath_plugins::{PluginError, PluginRegistry, PluginSource};
use tempfile::TempDir;

use crate::bootstrap::{BootstrapError, ConfigLoader};
use crate::health::HealthReporter;
use crate::session::SessionError;

/// Lifecycle events captured by [`RecordingHealthReporter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthEvent {
    BootstrapStarting,
    BootstrapSucceeded { preferred_view: usize },
    BootstrapFailed(String),
    SessionReady { executed: usize, failed: usize },
    SessionFailed(String),
    OrderPersisted(Utf8PathBuf),
}

/// Reporter that keeps every event in memory.
#[derive(Debug, Default)]
pub struct RecordingHealthReporter {
    events: Mutex<Vec<HealthEvent>>,
}

impl RecordingHealthReporter {
    pub fn events(&self) -> Vec<HealthEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn push(&self, event: HealthEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

impl HealthReporter for RecordingHealthReporter {
    fn bootstrap_starting(&self) {
        self.push(HealthEvent::BootstrapStarting);
    }

    fn bootstrap_succeeded(&self, _config: &Config, setting: &PluginSetting) {
        self.push(HealthEvent::BootstrapSucceeded {
            preferred_view: setting.view_plugin_order().len(),
        });
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        self.push(HealthEvent::BootstrapFailed(error.to_string()));
    }

    fn session_ready(&self, executed: usize, failed: usize) {
        self.push(HealthEvent::SessionReady { executed, failed });
    }

    fn session_failed(&self, error: &SessionError) {
        self.push(HealthEvent::SessionFailed(error.to_string()));
    }

    fn order_persisted(&self, path: &Utf8Path) {
        self.push(HealthEvent::OrderPersisted(path.to_owned()));
    }
}

/// Loader whose arguments are always rejected.
pub struct FailingConfigLoader;

impl ConfigLoader for FailingConfigLoader {
    fn load(&self) -> Result<Config, ConfigError> {
        Config::load_from_iter(["orimath", "--no-such-flag"])
    }
}

/// Loader that parses a fixed argument list.
pub struct ArgsConfigLoader {
    args: Vec<String>,
}

impl ArgsConfigLoader {
    pub fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            args: std::iter::once(String::from("orimath"))
                .chain(args.into_iter().map(Into::into))
                .collect(),
        }
    }
}

impl ConfigLoader for ArgsConfigLoader {
    fn load(&self) -> Result<Config, ConfigError> {
        Config::load_from_iter(&self.args)
    }
}

/// Plugin source that always fails.
pub struct BrokenSource;

impl PluginSource for BrokenSource {
    fn discover(&self, _registry: &mut PluginRegistry) -> Result<(), PluginError> {
        Err(PluginError::Discovery {
            source_name: String::from("broken"),
            message: String::from("manifest unreadable"),
        })
    }
}

/// Temporary directory holding a plugin settings file.
pub struct SettingsDir {
    _dir: TempDir,
    path: Utf8PathBuf,
}

impl SettingsDir {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("temporary directory");
        let path = Utf8PathBuf::from_path_buf(dir.path().join("plugins.json"))
            .expect("temporary path is UTF-8");
        Self { _dir: dir, path }
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    pub fn write(&self, contents: &str) {
        std::fs::write(&self.path, contents).expect("write settings");
    }

    pub fn read(&self) -> PluginSetting {
        PluginSetting::load(&self.path).expect("settings readable")
    }
}

pub fn recording_reporter() -> Arc<RecordingHealthReporter> {
    Arc::new(RecordingHealthReporter::default())
}
