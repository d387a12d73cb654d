//! Built-in view plugins.

use std::sync::Arc;

use orimath_plugins::convert::Point;
use orimath_plugins::effect::NewPaperEffect;
use orimath_plugins::messenger::Dialog;
use orimath_plugins::{Plugin, PluginContext, PluginFailure, PluginMetadata};

use super::effects::Paper;
use super::view_models::{
    EffectListViewModel, FoldingInstructionViewModel, MeasureViewModel, NewPaperDialogViewModel,
    ToolListViewModel, WorkspaceViewModel,
};

/// Main drawing area.
///
/// Also owns the new-paper dialog: when the workspace carries a
/// [`NewPaperEffect`], executing it opens the dialog on the presentation
/// thread, whichever thread raised the effect.
#[derive(Debug, Default, Clone, Copy)]
pub struct BasicViewPlugin;

impl Plugin for BasicViewPlugin {
    fn metadata(&self) -> PluginMetadata {
        PluginMetadata::new(
            "Main view",
            "Main drawing area. Removing this plugin hides the paper itself.",
        )
    }

    fn execute(&self, context: &PluginContext<'_>) -> Result<(), PluginFailure> {
        context.messenger().add_view_model(Box::new(WorkspaceViewModel::capture(
            context.workspace(),
            context.point_converter().as_ref(),
        )));

        let Some(new_paper) = context.workspace().effect::<NewPaperEffect>() else {
            return Ok(());
        };
        let executor = Arc::clone(new_paper.executor());
        let dispatcher = context.dispatcher().clone();
        context.hold(new_paper.on_execute().subscribe(move |_| {
            let dialog = NewPaperDialogViewModel::new(Arc::clone(&executor), dispatcher.clone());
            let _pending = dispatcher.invoke_async(move |presentation| {
                presentation
                    .messenger()
                    .open_dialog(Dialog::modal(Box::new(dialog)));
            });
        }));
        Ok(())
    }
}

/// Toolbar along the top of the window.
#[derive(Debug, Default, Clone, Copy)]
pub struct EffectViewPlugin;

impl Plugin for EffectViewPlugin {
    fn metadata(&self) -> PluginMetadata {
        PluginMetadata::new("Toolbar", "Toolbar listing the workspace effects.")
    }

    fn execute(&self, context: &PluginContext<'_>) -> Result<(), PluginFailure> {
        context
            .messenger()
            .add_view_model(Box::new(EffectListViewModel::capture(context.workspace())));
        Ok(())
    }
}

/// Tool switcher on the left of the window.
#[derive(Debug, Default, Clone, Copy)]
pub struct ToolViewPlugin;

impl Plugin for ToolViewPlugin {
    fn metadata(&self) -> PluginMetadata {
        PluginMetadata::new("Toolbox", "Tool switcher on the left of the window.")
    }

    fn execute(&self, context: &PluginContext<'_>) -> Result<(), PluginFailure> {
        context
            .messenger()
            .add_view_model(Box::new(ToolListViewModel::capture(context.workspace())));
        Ok(())
    }
}

/// Readout of the selected point or line. Needs the [`Paper`] capability.
#[derive(Debug, Default, Clone, Copy)]
pub struct MeasureViewPlugin;

impl Plugin for MeasureViewPlugin {
    fn metadata(&self) -> PluginMetadata {
        PluginMetadata::new(
            "Measure view",
            "Shows information about the selected point or line.",
        )
    }

    fn execute(&self, context: &PluginContext<'_>) -> Result<(), PluginFailure> {
        let paper = context
            .workspace()
            .capability::<Paper>()
            .ok_or_else(|| PluginFailure::new("paper model unavailable"))?;
        let extent = context
            .point_converter()
            .model_to_view(Point::new(Paper::SIDE, Paper::SIDE));
        context.messenger().add_view_model(Box::new(MeasureViewModel {
            paper_generation: paper.generation(),
            extent,
        }));
        Ok(())
    }
}

/// Folding-diagram overlay drawn above the main view.
#[derive(Debug, Default, Clone, Copy)]
pub struct FoldingInstructionPlugin;

impl Plugin for FoldingInstructionPlugin {
    fn metadata(&self) -> PluginMetadata {
        PluginMetadata::new(
            "Folding instruction view",
            "Draws folding diagrams above the main view while a supported tool is in use.",
        )
    }

    fn execute(&self, context: &PluginContext<'_>) -> Result<(), PluginFailure> {
        let workspace = context.workspace();
        context
            .messenger()
            .add_view_model(Box::new(FoldingInstructionViewModel {
                tool: workspace.current_tool().map(|tool| tool.name().to_owned()),
                origin: context.point_converter().model_to_view(Point::default()),
            }));
        Ok(())
    }
}
