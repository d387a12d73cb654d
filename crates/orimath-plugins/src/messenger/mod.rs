//! Mediator between plugins and the host shell.
//!
//! Plugins never create or manipulate host UI elements. They submit view
//! models and declarative dialog requests to a [`Messenger`], and the host
//! shell decides how to render them. The messenger holds no plugin-specific
//! state; it only routes.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Presentation unit contributed by a plugin.
///
/// Opaque to this crate; the host shell downcasts through
/// [`ViewModel::as_any`] to the concrete types it knows how to render.
pub trait ViewModel: fmt::Debug + 'static {
    /// Stable name used by the shell to pick a view template.
    fn name(&self) -> &str;

    /// Upcast for downcasting in the shell.
    fn as_any(&self) -> &dyn Any;
}

/// Whether a dialog blocks interaction with the rest of the shell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Modality {
    /// Blocks the main window until closed.
    #[default]
    Modal,
    /// Floats above the main window without blocking it.
    Modeless,
}

/// Declarative request for an overlay.
///
/// Cloning shares the underlying view model.
#[derive(Debug, Clone)]
pub struct Dialog {
    view_model: Rc<dyn ViewModel>,
    modality: Modality,
}

impl Dialog {
    /// Requests a modal dialog rendering `view_model`.
    #[must_use]
    pub fn modal(view_model: Box<dyn ViewModel>) -> Self {
        Self {
            view_model: Rc::from(view_model),
            modality: Modality::Modal,
        }
    }

    /// Requests a modeless dialog rendering `view_model`.
    #[must_use]
    pub fn modeless(view_model: Box<dyn ViewModel>) -> Self {
        Self {
            view_model: Rc::from(view_model),
            modality: Modality::Modeless,
        }
    }

    /// View model rendered inside the dialog.
    #[must_use]
    pub fn view_model(&self) -> &dyn ViewModel {
        self.view_model.as_ref()
    }

    /// Requested modality.
    #[must_use]
    pub const fn modality(&self) -> Modality {
        self.modality
    }
}

/// Routing surface shared by every plugin in a run.
///
/// Only ever invoked on the presentation context, either directly from a
/// plugin entry point or from work marshalled through the dispatcher.
pub trait Messenger {
    /// Registers a view model to be rendered by the shell.
    fn add_view_model(&self, view_model: Box<dyn ViewModel>);

    /// Requests that a dialog be shown.
    fn open_dialog(&self, dialog: Dialog);

    /// Closes the top-most dialog, returning it if one was open.
    fn close_dialog(&self) -> Option<Dialog>;
}

/// Messenger that records requests for the shell to consume.
///
/// View models accumulate in registration order; dialogs form a stack.
/// Visitors run after the internal borrow is released, so they may call back
/// into the messenger.
#[derive(Debug, Default)]
pub struct QueuedMessenger {
    view_models: RefCell<Vec<Rc<dyn ViewModel>>>,
    dialogs: RefCell<Vec<Dialog>>,
}

impl QueuedMessenger {
    /// Creates an empty messenger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of the registered view models, in registration order.
    #[must_use]
    pub fn view_model_names(&self) -> Vec<String> {
        self.view_models
            .borrow()
            .iter()
            .map(|view_model| view_model.name().to_owned())
            .collect()
    }

    /// Names of the open dialogs, bottom first.
    #[must_use]
    pub fn dialog_names(&self) -> Vec<String> {
        self.dialogs
            .borrow()
            .iter()
            .map(|dialog| dialog.view_model().name().to_owned())
            .collect()
    }

    /// Number of open dialogs.
    #[must_use]
    pub fn dialog_count(&self) -> usize {
        self.dialogs.borrow().len()
    }

    /// Runs `visit` against the first registered view model of type `T`.
    pub fn with_view_model<T, R>(&self, visit: impl FnOnce(&T) -> R) -> Option<R>
    where
        T: ViewModel,
    {
        let found = self
            .view_models
            .borrow()
            .iter()
            .find(|view_model| view_model.as_any().is::<T>())
            .cloned()?;
        found.as_any().downcast_ref::<T>().map(visit)
    }

    /// Runs `visit` against the top-most dialog.
    pub fn with_top_dialog<R>(&self, visit: impl FnOnce(&Dialog) -> R) -> Option<R> {
        let top = self.dialogs.borrow().last().cloned()?;
        Some(visit(&top))
    }
}

impl Messenger for QueuedMessenger {
    fn add_view_model(&self, view_model: Box<dyn ViewModel>) {
        tracing::debug!(
            target: "orimath_plugins::messenger",
            event = "view_model_added",
            view_model = view_model.name(),
            "view model registered"
        );
        self.view_models.borrow_mut().push(Rc::from(view_model));
    }

    fn open_dialog(&self, dialog: Dialog) {
        tracing::debug!(
            target: "orimath_plugins::messenger",
            event = "dialog_opened",
            view_model = dialog.view_model().name(),
            modality = ?dialog.modality(),
            "dialog requested"
        );
        self.dialogs.borrow_mut().push(dialog);
    }

    fn close_dialog(&self) -> Option<Dialog> {
        self.dialogs.borrow_mut().pop()
    }
}
