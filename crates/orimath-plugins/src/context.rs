//! Per-invocation argument bundle handed to plugin entry points.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::convert::PointConverter;
use crate::descriptor::PluginDescriptor;
use crate::dispatcher::{Dispatcher, Presentation};
use crate::event::Subscription;
use crate::messenger::Messenger;
use crate::workspace::Workspace;

/// Host services shared by every plugin in a run.
///
/// Everything except the [`Dispatcher`] is an `Rc` handle, so the bundle
/// is confined to the presentation thread.
#[derive(Clone)]
pub struct PluginServices {
    workspace: Rc<Workspace>,
    messenger: Rc<dyn Messenger>,
    dispatcher: Dispatcher,
    point_converter: Rc<dyn PointConverter>,
}

impl PluginServices {
    /// Bundles the host services.
    #[must_use]
    pub fn new(
        workspace: Rc<Workspace>,
        messenger: Rc<dyn Messenger>,
        dispatcher: Dispatcher,
        point_converter: Rc<dyn PointConverter>,
    ) -> Self {
        Self {
            workspace,
            messenger,
            dispatcher,
            point_converter,
        }
    }

    /// Bundles the services reachable from `presentation`.
    #[must_use]
    pub fn from_presentation(
        presentation: &Presentation,
        dispatcher: Dispatcher,
        point_converter: Rc<dyn PointConverter>,
    ) -> Self {
        Self::new(
            Rc::clone(presentation.workspace()),
            Rc::clone(presentation.messenger_handle()),
            dispatcher,
            point_converter,
        )
    }
}

impl fmt::Debug for PluginServices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginServices")
            .field("workspace", &self.workspace)
            .field("dispatcher", &self.dispatcher)
            .finish_non_exhaustive()
    }
}

/// Arguments available to one plugin while its entry point runs.
///
/// The context borrows from the runner and cannot outlive the call. A
/// plugin that wants an event handler to stay registered afterwards passes
/// the [`Subscription`] to [`PluginContext::hold`].
pub struct PluginContext<'a> {
    descriptor: &'a PluginDescriptor,
    services: &'a PluginServices,
    held: &'a RefCell<Vec<Subscription>>,
}

impl<'a> PluginContext<'a> {
    pub(crate) const fn new(
        descriptor: &'a PluginDescriptor,
        services: &'a PluginServices,
        held: &'a RefCell<Vec<Subscription>>,
    ) -> Self {
        Self {
            descriptor,
            services,
            held,
        }
    }

    /// Descriptor of the plugin currently executing.
    #[must_use]
    pub const fn descriptor(&self) -> &PluginDescriptor {
        self.descriptor
    }

    /// Shared workspace.
    #[must_use]
    pub const fn workspace(&self) -> &Rc<Workspace> {
        &self.services.workspace
    }

    /// Shared messenger.
    #[must_use]
    pub fn messenger(&self) -> &dyn Messenger {
        self.services.messenger.as_ref()
    }

    /// Dispatcher for reaching the presentation context from other threads.
    #[must_use]
    pub const fn dispatcher(&self) -> &Dispatcher {
        &self.services.dispatcher
    }

    /// Model/view coordinate converter.
    #[must_use]
    pub const fn point_converter(&self) -> &Rc<dyn PointConverter> {
        &self.services.point_converter
    }

    /// Keeps `subscription` alive until the plugin set is torn down.
    pub fn hold(&self, subscription: Subscription) {
        self.held.borrow_mut().push(subscription);
    }
}

impl fmt::Debug for PluginContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginContext")
            .field("plugin", &self.descriptor.id())
            .field("held", &self.held.borrow().len())
            .finish_non_exhaustive()
    }
}
