//! The contract every plugin implements.

use crate::context::PluginContext;
use crate::descriptor::PluginMetadata;
use crate::error::PluginFailure;

/// An independently authored extension discovered by the host.
///
/// The runner calls [`Plugin::execute`] exactly once per run, on the
/// presentation thread, in resolved order. Returning an error or panicking
/// is contained: the failure is reported and the next plugin runs.
///
/// # Example
///
/// ```
/// use orimath_plugins::{Plugin, PluginContext, PluginFailure, PluginMetadata};
///
/// struct Greeter;
///
/// impl Plugin for Greeter {
///     fn metadata(&self) -> PluginMetadata {
///         PluginMetadata::new("Greeter", "Logs a greeting.").with_id("demo.greeter")
///     }
///
///     fn execute(&self, context: &PluginContext<'_>) -> Result<(), PluginFailure> {
///         let _tools = context.workspace().tools();
///         Ok(())
///     }
/// }
/// ```
pub trait Plugin: 'static {
    /// Declares the plugin's identity and presentation metadata.
    fn metadata(&self) -> PluginMetadata;

    /// Entry point: wires the plugin into the workspace and messenger.
    ///
    /// # Errors
    ///
    /// Returns [`PluginFailure`] when the plugin cannot wire itself in.
    fn execute(&self, context: &PluginContext<'_>) -> Result<(), PluginFailure>;
}
