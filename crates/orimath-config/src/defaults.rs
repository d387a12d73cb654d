use camino::Utf8PathBuf;

use dirs::config_dir;

/// Default log filter expression used by the host.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// File name of the persisted plugin ordering settings.
pub const PLUGIN_SETTING_FILE_NAME: &str = "plugin_setting.json";

/// Default log filter expression used by the host.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Default logging format for the host.
#[must_use]
pub fn default_log_format() -> crate::logging::LogFormat {
    crate::logging::LogFormat::default()
}

/// Computes the default location of the plugin ordering settings.
///
/// Resolves to `<config dir>/orimath/plugin_setting.json`, falling back to a
/// path relative to the working directory when the platform exposes no
/// configuration directory or it is not valid UTF-8.
#[must_use]
pub fn default_plugin_setting_path() -> Utf8PathBuf {
    match config_base_directory() {
        Some(mut base) => {
            base.push("orimath");
            base.push(PLUGIN_SETTING_FILE_NAME);
            base
        }
        None => Utf8PathBuf::from(PLUGIN_SETTING_FILE_NAME),
    }
}

fn config_base_directory() -> Option<Utf8PathBuf> {
    config_dir().and_then(|path| Utf8PathBuf::from_path_buf(path).ok())
}
