//! General plugin contributing the paper model, the new-paper effect and the
//! basic folding tools.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use orimath_plugins::effect::{NewPaperEffect, NewPaperExecutor, Tool};
use orimath_plugins::{Plugin, PluginContext, PluginFailure, PluginMetadata};

/// Paper model stored in the workspace as a capability.
///
/// The geometry lives elsewhere; plugins only need to know when the paper
/// was replaced, which the generation counter tracks.
#[derive(Debug, Default)]
pub struct Paper {
    generation: AtomicU64,
}

impl Paper {
    /// Side length of a fresh sheet in model units.
    pub const SIDE: f64 = 1.0;

    /// Creates the initial sheet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of times the sheet has been replaced.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Replaces the sheet with a fresh one and returns the new generation.
    #[must_use = "the generation identifies the new sheet"]
    pub fn reset(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::AcqRel) + 1
    }
}

/// Executor that resets the shared [`Paper`].
#[derive(Debug)]
pub struct PaperResetExecutor {
    paper: Arc<Paper>,
}

impl PaperResetExecutor {
    /// Wraps the paper to reset.
    #[must_use]
    pub const fn new(paper: Arc<Paper>) -> Self {
        Self { paper }
    }
}

impl NewPaperExecutor for PaperResetExecutor {
    fn create_paper(&self) {
        let generation = self.paper.reset();
        tracing::info!(
            target: "orimath::builtin",
            event = "paper_created",
            generation,
            "new paper created"
        );
    }
}

/// Tool identified only by its toolbox label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedTool {
    name: &'static str,
    shortcut: Option<&'static str>,
}

impl NamedTool {
    /// Folds the paper along a line through two points.
    pub const FOLD: Self = Self {
        name: "Fold",
        shortcut: Some("F"),
    };

    /// Divides a segment into equal parts.
    pub const DIVIDE: Self = Self {
        name: "Divide into equal parts",
        shortcut: Some("D"),
    };
}

impl Tool for NamedTool {
    fn name(&self) -> &str {
        self.name
    }

    fn shortcut(&self) -> Option<&str> {
        self.shortcut
    }
}

/// Installs the paper, the new-paper effect and the basic tools.
#[derive(Debug, Default, Clone, Copy)]
pub struct BasicEffectsPlugin;

impl Plugin for BasicEffectsPlugin {
    fn metadata(&self) -> PluginMetadata {
        PluginMetadata::new("Basic effects", "Provides the basic effects and tools.")
    }

    fn execute(&self, context: &PluginContext<'_>) -> Result<(), PluginFailure> {
        let workspace = context.workspace();
        let paper = Arc::new(Paper::new());
        workspace.insert_capability(Arc::clone(&paper));
        workspace.add_effect(Arc::new(NewPaperEffect::new(Arc::new(
            PaperResetExecutor::new(paper),
        ))));
        workspace.add_tool(Arc::new(NamedTool::FOLD));
        workspace.add_tool(Arc::new(NamedTool::DIVIDE));
        Ok(())
    }
}
