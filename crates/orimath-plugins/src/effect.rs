//! Workspace effects and tools contributed by plugins.
//!
//! Effects are one-shot commands (new paper, undo, turn over) surfaced in the
//! toolbar; tools are modal pointer interactions surfaced in the toolbox.
//! Both may be triggered off the presentation thread, so they are
//! `Send + Sync`.

use std::fmt;
use std::sync::Arc;

use crate::event::EventSource;

/// A one-shot workspace command.
pub trait Effect: Send + Sync + 'static {
    /// Name shown in the toolbar.
    fn name(&self) -> &str;

    /// Keyboard shortcut, if any.
    fn shortcut(&self) -> Option<&str> {
        None
    }

    /// Whether the effect can currently run.
    fn can_execute(&self) -> bool {
        true
    }

    /// Runs the effect.
    fn execute(&self);
}

/// A modal pointer interaction.
pub trait Tool: Send + Sync + 'static {
    /// Name shown in the toolbox.
    fn name(&self) -> &str;

    /// Keyboard shortcut, if any.
    fn shortcut(&self) -> Option<&str> {
        None
    }
}

/// Replaces the current paper with a freshly configured one.
pub trait NewPaperExecutor: Send + Sync {
    /// Creates the new paper.
    fn create_paper(&self);
}

/// Raised when the user asks for a new paper.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NewPaperRequested;

/// Effect that asks the presentation layer for a new-paper dialog.
///
/// Executing the effect only raises [`NewPaperRequested`]; a view plugin
/// subscribed through [`NewPaperEffect::on_execute`] opens the dialog, which
/// in turn calls the [`NewPaperExecutor`].
pub struct NewPaperEffect {
    executor: Arc<dyn NewPaperExecutor>,
    on_execute: EventSource<NewPaperRequested>,
}

impl NewPaperEffect {
    /// Creates the effect around the executor that builds the paper.
    #[must_use]
    pub fn new(executor: Arc<dyn NewPaperExecutor>) -> Self {
        Self {
            executor,
            on_execute: EventSource::new(),
        }
    }

    /// Executor that creates the paper once the dialog is confirmed.
    #[must_use]
    pub const fn executor(&self) -> &Arc<dyn NewPaperExecutor> {
        &self.executor
    }

    /// Event raised each time the effect runs.
    #[must_use]
    pub const fn on_execute(&self) -> &EventSource<NewPaperRequested> {
        &self.on_execute
    }
}

impl Effect for NewPaperEffect {
    fn name(&self) -> &str {
        "New paper"
    }

    fn shortcut(&self) -> Option<&str> {
        Some("Ctrl+N")
    }

    fn execute(&self) {
        let notified = self.on_execute.emit(&NewPaperRequested);
        tracing::debug!(
            target: "orimath_plugins::effect",
            event = "new_paper_requested",
            subscribers = notified,
            "new paper requested"
        );
    }
}

impl fmt::Debug for NewPaperEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewPaperEffect")
            .field("on_execute", &self.on_execute)
            .finish_non_exhaustive()
    }
}
