//! Full plugin lifecycle over both pools.
//!
//! [`PluginHost`] owns the descriptor set of one discovery pass. Loading
//! resolves each pool against its preference list from [`PluginSetting`]
//! and runs the general pool before the view pool, so view plugins can see
//! the effects and capabilities general plugins registered. The resulting
//! [`LoadedPlugins`] keeps held subscriptions alive; dropping it tears the
//! plugin set down.

use orimath_config::PluginSetting;

use crate::context::PluginServices;
use crate::descriptor::{PluginDescriptor, PluginKind};
use crate::error::ExecutionError;
use crate::order::ResolvedOrder;
use crate::registry::{PluginRegistry, RegisteredPlugin};
use crate::runner::{PluginRunner, RunReport, RunReporter};

/// Preference list for `kind` stored in `setting`.
///
/// # Example
///
/// ```
/// use orimath_config::PluginSetting;
/// use orimath_plugins::{PluginKind, host::preferred_order};
///
/// let setting = PluginSetting::new(vec!["a".into()], vec!["v".into()]);
/// assert_eq!(preferred_order(&setting, PluginKind::View), ["v"]);
/// ```
#[must_use]
pub fn preferred_order(setting: &PluginSetting, kind: PluginKind) -> &[String] {
    match kind {
        PluginKind::General => setting.plugin_order(),
        PluginKind::View => setting.view_plugin_order(),
    }
}

/// Owns the descriptor set and runs it against host services.
#[derive(Debug)]
pub struct PluginHost<R> {
    registry: PluginRegistry,
    runner: PluginRunner<R>,
}

impl<R: RunReporter> PluginHost<R> {
    /// Creates a host over a populated registry.
    #[must_use]
    pub const fn new(registry: PluginRegistry, reporter: R) -> Self {
        Self {
            registry,
            runner: PluginRunner::new(reporter),
        }
    }

    /// Returns the descriptor set.
    #[must_use]
    pub const fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    /// Resolved execution order of the `kind` pool.
    #[must_use]
    pub fn resolved_order(
        &self,
        kind: PluginKind,
        setting: &PluginSetting,
    ) -> ResolvedOrder<&RegisteredPlugin> {
        self.registry.resolve(kind, preferred_order(setting, kind))
    }

    /// Descriptors of every plugin, general pool first, each in resolved
    /// order.
    #[must_use]
    pub fn descriptors(&self, setting: &PluginSetting) -> Vec<&PluginDescriptor> {
        PluginKind::ALL
            .into_iter()
            .flat_map(|kind| self.resolved_order(kind, setting).into_vec())
            .map(RegisteredPlugin::descriptor)
            .collect()
    }

    /// Captures the current resolved order of both pools as a setting.
    ///
    /// Saving the result pins every discovered plugin to its present
    /// position.
    #[must_use]
    pub fn capture_setting(&self, setting: &PluginSetting) -> PluginSetting {
        PluginSetting::from_resolved(
            self.resolved_order(PluginKind::General, setting).ids(),
            self.resolved_order(PluginKind::View, setting).ids(),
        )
    }

    /// Runs the general pool, then the view pool.
    pub fn load(&self, setting: &PluginSetting, services: &PluginServices) -> LoadedPlugins {
        let general = self.run_pool(PluginKind::General, setting, services);
        let view = self.run_pool(PluginKind::View, setting, services);
        LoadedPlugins { general, view }
    }

    fn run_pool(
        &self,
        kind: PluginKind,
        setting: &PluginSetting,
        services: &PluginServices,
    ) -> RunReport {
        let order = self.resolved_order(kind, setting);
        self.runner.run(kind, order, services)
    }
}

/// A running plugin set.
#[derive(Debug)]
#[must_use = "dropping the loaded plugins cancels their subscriptions"]
pub struct LoadedPlugins {
    general: RunReport,
    view: RunReport,
}

impl LoadedPlugins {
    /// Report for the `kind` pool.
    #[must_use]
    pub const fn report(&self, kind: PluginKind) -> &RunReport {
        match kind {
            PluginKind::General => &self.general,
            PluginKind::View => &self.view,
        }
    }

    /// Ids of the plugins that ran successfully, general pool first.
    #[must_use]
    pub fn executed(&self) -> Vec<&str> {
        self.general
            .executed()
            .iter()
            .chain(self.view.executed())
            .map(String::as_str)
            .collect()
    }

    /// Every contained failure, general pool first.
    pub fn failures(&self) -> impl Iterator<Item = &ExecutionError> {
        self.general.failures().iter().chain(self.view.failures())
    }

    /// Returns `true` when no plugin failed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.general.is_clean() && self.view.is_clean()
    }

    /// Tears the plugin set down, view pool first.
    pub fn teardown(self) {
        let Self { general, view } = self;
        view.teardown();
        general.teardown();
    }
}
