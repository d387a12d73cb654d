//! Plugins shipped with the host.
//!
//! The host links its plugin set statically; [`BuiltinPlugins`] is the
//! [`PluginSource`] that registers it. Ids are derived from the plugin type
//! paths, so a settings file written by one build stays valid as long as
//! the types keep their names.

mod effects;
mod view_models;
mod views;


use orimath_plugins::{PluginError, PluginKind, PluginRegistry, PluginSource};

pub use self::effects::{BasicEffectsPlugin, NamedTool, Paper, PaperResetExecutor};
pub use self::view_models::{
    EffectEntry, EffectListViewModel, FoldingInstructionViewModel, MeasureViewModel,
    NewPaperDialogViewModel, ToolListViewModel, WorkspaceViewModel,
};
pub use self::views::{
    BasicViewPlugin, EffectViewPlugin, FoldingInstructionPlugin, MeasureViewPlugin,
    ToolViewPlugin,
};

/// Registers the built-in plugin set.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinPlugins;

impl PluginSource for BuiltinPlugins {
    fn name(&self) -> &str {
        "built-in plugins"
    }

    fn discover(&self, registry: &mut PluginRegistry) -> Result<(), PluginError> {
        registry.register(PluginKind::General, BasicEffectsPlugin)?;
        registry.register(PluginKind::View, BasicViewPlugin)?;
        registry.register(PluginKind::View, EffectViewPlugin)?;
        registry.register(PluginKind::View, ToolViewPlugin)?;
        registry.register(PluginKind::View, MeasureViewPlugin)?;
        registry.register(PluginKind::View, FoldingInstructionPlugin)?;
        Ok(())
    }
}
