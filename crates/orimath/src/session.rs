//! One host session: discover, order, load, then optionally list or persist.

use std::fmt;
use std::io::{self, Write};
use std::rc::Rc;

use camino::{Utf8Path, Utf8PathBuf};
use orimath_config::{PluginSetting, SettingError};
use orimath_plugins::convert::{PointConverter, ViewPointConverter};
use orimath_plugins::messenger::QueuedMessenger;
use orimath_plugins::{
    LoadedPlugins, PluginError, PluginHost, PluginRegistry, PluginServices, PluginSource,
    Presentation, PresentationLoop, StructuredRunReporter, Workspace,
};
use thiserror::Error;

use crate::bootstrap::Host;

/// Errors raised while running a session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A plugin source failed to register its plugins.
    #[error("plugin discovery failed: {source}")]
    Discovery {
        /// Underlying registry error.
        #[source]
        source: PluginError,
    },
    /// Command output could not be written.
    #[error("failed to write output: {source}")]
    Output {
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The resolved order could not be saved.
    #[error("failed to persist plugin order: {source}")]
    Persist {
        /// Underlying settings error.
        #[source]
        source: SettingError,
    },
}

/// Presentation-side state of a session.
///
/// Owns the presentation loop, so it must stay on the thread that built it.
pub struct Session {
    workspace: Rc<Workspace>,
    messenger: Rc<QueuedMessenger>,
    presentation_loop: PresentationLoop,
    services: PluginServices,
}

impl Session {
    /// Builds an empty workspace and messenger bound to the current thread.
    #[must_use]
    pub fn new(point_converter: Rc<dyn PointConverter>) -> Self {
        let workspace = Rc::new(Workspace::new());
        let messenger = Rc::new(QueuedMessenger::new());
        let presentation_loop = PresentationLoop::new(Presentation::new(
            Rc::clone(&workspace),
            Rc::clone(&messenger) as _,
        ));
        let services = PluginServices::from_presentation(
            presentation_loop.presentation(),
            presentation_loop.dispatcher(),
            point_converter,
        );
        Self {
            workspace,
            messenger,
            presentation_loop,
            services,
        }
    }

    /// Shared workspace.
    #[must_use]
    pub const fn workspace(&self) -> &Rc<Workspace> {
        &self.workspace
    }

    /// Messenger collecting view models and dialogs for the shell.
    #[must_use]
    pub fn messenger(&self) -> &QueuedMessenger {
        &self.messenger
    }

    /// Loop that runs dispatched work.
    #[must_use]
    pub const fn presentation_loop(&self) -> &PresentationLoop {
        &self.presentation_loop
    }

    /// Services handed to plugins.
    #[must_use]
    pub const fn services(&self) -> &PluginServices {
        &self.services
    }

    /// Runs queued work, including work queued by that work, until the
    /// queue is empty. Returns the number of items run.
    #[must_use = "the count shows whether any dispatched work ran"]
    pub fn run_until_idle(&self) -> usize {
        let mut total = 0;
        loop {
            let ran = self.presentation_loop.run_pending();
            if ran == 0 {
                return total;
            }
            total += ran;
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Rc::new(ViewPointConverter::default()))
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("workspace", &self.workspace)
            .field("presentation_loop", &self.presentation_loop)
            .finish_non_exhaustive()
    }
}

/// Counts describing a loaded session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSummary {
    /// Plugins that ran successfully.
    pub executed: usize,
    /// Plugins whose entry point failed.
    pub failed: usize,
    /// View models registered with the messenger.
    pub view_models: usize,
    /// Dialogs currently open.
    pub dialogs: usize,
}

/// A session whose plugin set is loaded.
#[derive(Debug)]
pub struct RunningSession {
    // Declared first so subscriptions are cancelled before the loop drops.
    loaded: LoadedPlugins,
    session: Session,
    persisted: Option<Utf8PathBuf>,
}

impl RunningSession {
    /// Presentation-side state.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Loaded plugin set.
    #[must_use]
    pub const fn loaded(&self) -> &LoadedPlugins {
        &self.loaded
    }

    /// Where the resolved order was written, when `--write-order` was set.
    #[must_use]
    pub fn persisted(&self) -> Option<&Utf8Path> {
        self.persisted.as_deref()
    }

    /// Current counts.
    #[must_use]
    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            executed: self.loaded.executed().len(),
            failed: self.loaded.failures().count(),
            view_models: self.session.messenger.view_model_names().len(),
            dialogs: self.session.messenger.dialog_count(),
        }
    }

    /// Tears the plugin set down, then releases the session.
    pub fn shutdown(self) {
        let Self {
            loaded, session, ..
        } = self;
        loaded.teardown();
        drop(session);
    }
}

/// Result of [`Host::run`].
#[derive(Debug)]
pub enum Outcome {
    /// Descriptors were listed instead of loading plugins.
    Listed {
        /// Number of descriptors written.
        plugins: usize,
    },
    /// The plugin set is loaded.
    Running(Box<RunningSession>),
}

impl Host {
    /// Runs one session over the plugins from `plugin_source`.
    ///
    /// With `--list-plugins`, writes one tab-separated line per descriptor
    /// to `out` (kind, id, display name, description) in resolved order and
    /// loads nothing. Otherwise loads both pools, runs dispatched work until
    /// idle and, with `--write-order`, saves the resolved order.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] when discovery, output or persistence fails.
    /// Plugin failures are not errors; they appear in the summary.
    pub fn run(
        &self,
        plugin_source: &dyn PluginSource,
        out: &mut dyn Write,
    ) -> Result<Outcome, SessionError> {
        let fail = |error: SessionError| {
            self.reporter().session_failed(&error);
            error
        };

        let mut registry = PluginRegistry::new();
        registry
            .discover_from(plugin_source)
            .map_err(|source| fail(SessionError::Discovery { source }))?;
        let plugin_host = PluginHost::new(registry, StructuredRunReporter::new());

        if self.config().list_plugins() {
            let plugins = list(&plugin_host, self.setting(), out)
                .map_err(|source| fail(SessionError::Output { source }))?;
            return Ok(Outcome::Listed { plugins });
        }

        let session = Session::default();
        let loaded = plugin_host.load(self.setting(), session.services());
        let drained = session.run_until_idle();
        tracing::debug!(
            target: "orimath::session",
            event = "presentation_idle",
            drained,
            "dispatched work drained"
        );
        let failed = loaded.failures().count();
        self.reporter().session_ready(loaded.executed().len(), failed);

        let persisted = if self.config().write_order() {
            let path = self.config().plugin_setting_path();
            plugin_host
                .capture_setting(self.setting())
                .save(&path)
                .map_err(|source| fail(SessionError::Persist { source }))?;
            self.reporter().order_persisted(&path);
            Some(path)
        } else {
            None
        };

        Ok(Outcome::Running(Box::new(RunningSession {
            loaded,
            session,
            persisted,
        })))
    }
}

fn list(
    plugin_host: &PluginHost<StructuredRunReporter>,
    setting: &PluginSetting,
    out: &mut dyn Write,
) -> io::Result<usize> {
    let descriptors = plugin_host.descriptors(setting);
    for descriptor in &descriptors {
        writeln!(
            out,
            "{}\t{}\t{}\t{}",
            descriptor.kind(),
            descriptor.id(),
            descriptor.display_name(),
            descriptor.description()
        )?;
    }
    out.flush()?;
    Ok(descriptors.len())
}
