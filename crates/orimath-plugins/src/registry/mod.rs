//! Descriptor set assembled by one discovery pass.
//!
//! The [`PluginRegistry`] keeps two pools, one per [`PluginKind`], each in
//! discovery (registration) order. Identifiers are unique across both pools;
//! a second registration with the same id is rejected. Ordering is not the
//! registry's concern beyond handing a pool to [`resolve`].

use std::fmt;

use crate::descriptor::{PluginDescriptor, PluginKind};
use crate::error::PluginError;
use crate::order::{Identified, ResolvedOrder, resolve};
use crate::plugin::Plugin;

/// A discovered plugin paired with its descriptor.
pub struct RegisteredPlugin {
    descriptor: PluginDescriptor,
    plugin: Box<dyn Plugin>,
}

impl RegisteredPlugin {
    /// Returns the plugin's descriptor.
    #[must_use]
    pub const fn descriptor(&self) -> &PluginDescriptor {
        &self.descriptor
    }

    /// Returns the plugin implementation.
    #[must_use]
    pub fn plugin(&self) -> &dyn Plugin {
        self.plugin.as_ref()
    }
}

impl Identified for RegisteredPlugin {
    fn id(&self) -> &str {
        self.descriptor.id()
    }
}

impl fmt::Debug for RegisteredPlugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredPlugin")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

/// Discovery collaborator that contributes plugins to a registry.
///
/// The host decides where plugins come from; a statically linked
/// distribution implements this trait over its built-in plugin set.
pub trait PluginSource {
    /// Name used in diagnostics.
    fn name(&self) -> &str {
        "plugin source"
    }

    /// Registers every plugin this source provides.
    ///
    /// # Errors
    ///
    /// Returns a [`PluginError`] when a plugin cannot be registered or the
    /// source cannot enumerate its plugins.
    fn discover(&self, registry: &mut PluginRegistry) -> Result<(), PluginError>;
}

/// The two pools of discovered plugins.
///
/// # Example
///
/// ```
/// use orimath_plugins::{
///     Plugin, PluginContext, PluginFailure, PluginKind, PluginMetadata, PluginRegistry,
/// };
///
/// struct Toolbar;
///
/// impl Plugin for Toolbar {
///     fn metadata(&self) -> PluginMetadata {
///         PluginMetadata::new("Toolbar", "Lists effects.").with_id("toolbar")
///     }
///
///     fn execute(&self, _context: &PluginContext<'_>) -> Result<(), PluginFailure> {
///         Ok(())
///     }
/// }
///
/// let mut registry = PluginRegistry::new();
/// registry.register(PluginKind::View, Toolbar).expect("registration succeeds");
/// assert!(registry.get("toolbar").is_some());
/// assert!(registry.register(PluginKind::General, Toolbar).is_err());
/// ```
#[derive(Debug, Default)]
pub struct PluginRegistry {
    general: Vec<RegisteredPlugin>,
    view: Vec<RegisteredPlugin>,
}

impl PluginRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `plugin` in the `kind` pool.
    ///
    /// The id is the metadata's explicit id, or the plugin's type path.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::InvalidDescriptor`] for a blank id and
    /// [`PluginError::DuplicateId`] when the id is already registered.
    pub fn register<P: Plugin>(&mut self, kind: PluginKind, plugin: P) -> Result<(), PluginError> {
        let descriptor = PluginDescriptor::for_plugin::<P>(plugin.metadata(), kind);
        self.register_boxed(descriptor, Box::new(plugin))
    }

    /// Registers a boxed plugin under an explicit descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::InvalidDescriptor`] for a blank id and
    /// [`PluginError::DuplicateId`] when the id is already registered.
    pub fn register_boxed(
        &mut self,
        descriptor: PluginDescriptor,
        plugin: Box<dyn Plugin>,
    ) -> Result<(), PluginError> {
        descriptor.validate()?;
        if self.get(descriptor.id()).is_some() {
            return Err(PluginError::DuplicateId {
                id: descriptor.id().to_owned(),
            });
        }
        tracing::debug!(
            target: "orimath_plugins::registry",
            event = "plugin_registered",
            plugin = descriptor.id(),
            kind = %descriptor.kind(),
            "plugin registered"
        );
        let pool = match descriptor.kind() {
            PluginKind::General => &mut self.general,
            PluginKind::View => &mut self.view,
        };
        pool.push(RegisteredPlugin { descriptor, plugin });
        Ok(())
    }

    /// Lets `source` register its plugins.
    ///
    /// # Errors
    ///
    /// Propagates the first error the source reports.
    pub fn discover_from(&mut self, source: &dyn PluginSource) -> Result<(), PluginError> {
        let before = self.len();
        source.discover(self).inspect_err(|error| {
            tracing::warn!(
                target: "orimath_plugins::registry",
                event = "discovery_failed",
                source_name = source.name(),
                error = %error,
                "plugin discovery failed"
            );
        })?;
        tracing::debug!(
            target: "orimath_plugins::registry",
            event = "discovery_finished",
            source_name = source.name(),
            discovered = self.len().saturating_sub(before),
            "plugin discovery finished"
        );
        Ok(())
    }

    /// Returns the `kind` pool in discovery order.
    #[must_use]
    pub fn pool(&self, kind: PluginKind) -> &[RegisteredPlugin] {
        match kind {
            PluginKind::General => &self.general,
            PluginKind::View => &self.view,
        }
    }

    /// Looks up a plugin by id in either pool.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&RegisteredPlugin> {
        self.general
            .iter()
            .chain(&self.view)
            .find(|registered| registered.descriptor.id() == id)
    }

    /// Looks up a plugin by id, failing when it is absent.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::NotFound`] when no plugin has that id.
    pub fn require(&self, id: &str) -> Result<&RegisteredPlugin, PluginError> {
        self.get(id).ok_or_else(|| PluginError::NotFound { id: id.to_owned() })
    }

    /// Descriptors of the `kind` pool in discovery order.
    pub fn descriptors(&self, kind: PluginKind) -> impl Iterator<Item = &PluginDescriptor> {
        self.pool(kind).iter().map(RegisteredPlugin::descriptor)
    }

    /// Orders the `kind` pool against `preferred`.
    #[must_use]
    pub fn resolve<S: AsRef<str>>(
        &self,
        kind: PluginKind,
        preferred: &[S],
    ) -> ResolvedOrder<&RegisteredPlugin> {
        resolve(self.pool(kind), preferred)
    }

    /// Total number of registered plugins.
    #[must_use]
    pub fn len(&self) -> usize {
        self.general.len() + self.view.len()
    }

    /// Returns `true` when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.general.is_empty() && self.view.is_empty()
    }
}
