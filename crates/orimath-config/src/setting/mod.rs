//! Persisted plugin ordering preferences.
//!
//! A [`PluginSetting`] lists the preferred relative order of some (not
//! necessarily all) plugin identifiers for each of the two discovery pools.
//! The file is read once per discovery pass and treated as read-only input
//! by the order resolver; identifiers that match no discovered plugin are
//! inert.

use std::fs;
use std::io;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while reading or writing plugin ordering settings.
#[derive(Debug, Error)]
pub enum SettingError {
    /// The settings file exists but could not be read or written.
    #[error("failed to access plugin settings at {path}: {source}")]
    Io {
        /// Location of the settings file.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: Arc<io::Error>,
    },

    /// The settings file does not contain a valid ordering document.
    #[error("failed to parse plugin settings at {path}: {source}")]
    Parse {
        /// Location of the settings file.
        path: Utf8PathBuf,
        /// Underlying JSON error.
        #[source]
        source: Arc<serde_json::Error>,
    },

    /// The in-memory settings could not be encoded.
    #[error("failed to encode plugin settings: {0}")]
    Encode(#[source] Arc<serde_json::Error>),
}

/// Preferred execution order for general and view plugins.
///
/// Both lists default to empty when absent from the persisted document, in
/// which case plugins run in discovery order. Other keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginSetting {
    #[serde(default)]
    plugin_order: Vec<String>,
    #[serde(default)]
    view_plugin_order: Vec<String>,
}

impl PluginSetting {
    /// Creates a setting from explicit preference lists.
    #[must_use]
    pub const fn new(plugin_order: Vec<String>, view_plugin_order: Vec<String>) -> Self {
        Self {
            plugin_order,
            view_plugin_order,
        }
    }

    /// Captures a resolved execution order so it can be persisted and edited.
    #[must_use]
    pub fn from_resolved<G, V>(general: G, view: V) -> Self
    where
        G: IntoIterator,
        G::Item: Into<String>,
        V: IntoIterator,
        V::Item: Into<String>,
    {
        Self::new(
            general.into_iter().map(Into::into).collect(),
            view.into_iter().map(Into::into).collect(),
        )
    }

    /// Preferred order of general plugins.
    #[must_use]
    pub fn plugin_order(&self) -> &[String] {
        &self.plugin_order
    }

    /// Preferred order of view plugins.
    #[must_use]
    pub fn view_plugin_order(&self) -> &[String] {
        &self.view_plugin_order
    }

    /// Reads the settings stored at `path`.
    ///
    /// A missing file is not an error: the default (empty) setting is
    /// returned so that a first launch runs every plugin in discovery order.
    ///
    /// # Errors
    ///
    /// Returns [`SettingError::Io`] when the file exists but cannot be read
    /// and [`SettingError::Parse`] when its contents are not a valid ordering
    /// document.
    pub fn load(path: &Utf8Path) -> Result<Self, SettingError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(error) => {
                return Err(SettingError::Io {
                    path: path.to_owned(),
                    source: Arc::new(error),
                });
            }
        };
        Self::parse(path, &text)
    }

    /// Parses an ordering document read from `origin`.
    ///
    /// # Errors
    ///
    /// Returns [`SettingError::Parse`] when `text` is not a valid document.
    pub fn parse(origin: &Utf8Path, text: &str) -> Result<Self, SettingError> {
        serde_json::from_str(text).map_err(|source| SettingError::Parse {
            path: origin.to_owned(),
            source: Arc::new(source),
        })
    }

    /// Writes the settings to `path` as pretty-printed JSON, creating parent
    /// directories as needed.
    ///
    /// # Errors
    ///
    /// Returns [`SettingError::Encode`] if serialisation fails and
    /// [`SettingError::Io`] if the directory or file cannot be written.
    pub fn save(&self, path: &Utf8Path) -> Result<(), SettingError> {
        let text = serde_json::to_string_pretty(self)
            .map_err(|source| SettingError::Encode(Arc::new(source)))?;
        let io_error = |source: io::Error| SettingError::Io {
            path: path.to_owned(),
            source: Arc::new(source),
        };
        if let Some(parent) = path.parent().filter(|parent| !parent.as_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        fs::write(path, text).map_err(io_error)
    }
}
