//! View models contributed by the built-in view plugins.
//!
//! Each is a snapshot the shell renders; none of them keeps a reference to
//! the workspace.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use orimath_plugins::convert::{Point, PointConverter};
use orimath_plugins::effect::NewPaperExecutor;
use orimath_plugins::{Dispatcher, PendingWork, ViewModel, Workspace};

macro_rules! view_model {
    ($ty:ty, $name:literal) => {
        impl ViewModel for $ty {
            fn name(&self) -> &str {
                $name
            }

            fn as_any(&self) -> &dyn Any {
                self
            }
        }
    };
}

/// Main drawing area.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkspaceViewModel {
    /// Active tool when the view was built.
    pub current_tool: Option<String>,
    /// View-space position of the paper origin.
    pub origin: Point,
}

impl WorkspaceViewModel {
    /// Snapshots the workspace.
    #[must_use]
    pub fn capture(workspace: &Workspace, converter: &dyn PointConverter) -> Self {
        Self {
            current_tool: workspace.current_tool().map(|tool| tool.name().to_owned()),
            origin: converter.model_to_view(Point::default()),
        }
    }
}

view_model!(WorkspaceViewModel, "workspace");

/// One toolbar button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectEntry {
    /// Effect name.
    pub name: String,
    /// Keyboard shortcut, if any.
    pub shortcut: Option<String>,
    /// Whether the effect could run when the toolbar was built.
    pub enabled: bool,
}

/// Toolbar listing the workspace effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectListViewModel {
    /// Buttons in registration order.
    pub effects: Vec<EffectEntry>,
}

impl EffectListViewModel {
    /// Snapshots the registered effects.
    #[must_use]
    pub fn capture(workspace: &Workspace) -> Self {
        let effects = workspace
            .effects()
            .iter()
            .map(|effect| EffectEntry {
                name: effect.name().to_owned(),
                shortcut: effect.shortcut().map(str::to_owned),
                enabled: effect.can_execute(),
            })
            .collect();
        Self { effects }
    }
}

view_model!(EffectListViewModel, "effect-list");

/// Toolbox listing the workspace tools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolListViewModel {
    /// Tool names in registration order.
    pub tools: Vec<String>,
    /// Name of the active tool.
    pub current: Option<String>,
}

impl ToolListViewModel {
    /// Snapshots the registered tools.
    #[must_use]
    pub fn capture(workspace: &Workspace) -> Self {
        Self {
            tools: workspace
                .tools()
                .iter()
                .map(|tool| tool.name().to_owned())
                .collect(),
            current: workspace.current_tool().map(|tool| tool.name().to_owned()),
        }
    }
}

view_model!(ToolListViewModel, "tool-list");

/// Readout of the selected point or line.
#[derive(Debug, Clone, PartialEq)]
pub struct MeasureViewModel {
    /// Paper generation being measured.
    pub paper_generation: u64,
    /// View-space position of the paper's far corner.
    pub extent: Point,
}

view_model!(MeasureViewModel, "measure");

/// Folding-diagram overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct FoldingInstructionViewModel {
    /// Tool whose operation the diagram illustrates.
    pub tool: Option<String>,
    /// View-space position of the paper origin.
    pub origin: Point,
}

view_model!(FoldingInstructionViewModel, "folding-instruction");

/// Dialog asking the user to confirm a new paper.
pub struct NewPaperDialogViewModel {
    executor: Arc<dyn NewPaperExecutor>,
    dispatcher: Dispatcher,
}

impl NewPaperDialogViewModel {
    /// Creates the dialog around the executor that builds the paper.
    #[must_use]
    pub const fn new(executor: Arc<dyn NewPaperExecutor>, dispatcher: Dispatcher) -> Self {
        Self {
            executor,
            dispatcher,
        }
    }

    /// Creates the paper, then closes the dialog on the next pump.
    pub fn confirm(&self) -> PendingWork {
        self.executor.create_paper();
        self.close()
    }

    /// Closes the dialog on the next pump without creating a paper.
    pub fn cancel(&self) -> PendingWork {
        self.close()
    }

    fn close(&self) -> PendingWork {
        self.dispatcher.invoke_async(|presentation| {
            if presentation.messenger().close_dialog().is_none() {
                tracing::warn!(
                    target: "orimath::builtin",
                    event = "dialog_missing",
                    "new paper dialog was already closed"
                );
            }
        })
    }
}

impl fmt::Debug for NewPaperDialogViewModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewPaperDialogViewModel")
            .field("dispatcher", &self.dispatcher)
            .finish_non_exhaustive()
    }
}

view_model!(NewPaperDialogViewModel, "new-paper-dialog");
