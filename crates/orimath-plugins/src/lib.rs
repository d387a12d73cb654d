//! Plugin composition core for Orimath.
//!
//! The `orimath-plugins` crate discovers independently authored plugins,
//! puts them in a deterministic execution order derived from partial
//! preference lists, and wires each one into a shared [`Workspace`] and a
//! [`Messenger`] that routes presentation requests to the host shell.
//!
//! Plugins come in two pools, **general** (domain logic: effects, tools)
//! and **view** (presentation units). Each pool is ordered independently by
//! [`order::resolve`] and executed once, in order, by the [`PluginRunner`].
//! A failing plugin is reported and skipped; it never aborts the run.
//!
//! # Threading
//!
//! Presentation state is confined to one thread. The [`Workspace`],
//! [`Messenger`] and [`PluginContext`] handles are `Rc`-based and cannot be
//! sent elsewhere. Domain events may fire on any thread, so their handlers
//! must be `Send + Sync` and reach presentation state only through the
//! [`Dispatcher`].
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//!
//! use orimath_config::PluginSetting;
//! use orimath_plugins::convert::ViewPointConverter;
//! use orimath_plugins::dispatcher::{Presentation, PresentationLoop};
//! use orimath_plugins::messenger::QueuedMessenger;
//! use orimath_plugins::workspace::Workspace;
//! use orimath_plugins::{
//!     Plugin, PluginContext, PluginFailure, PluginHost, PluginKind, PluginMetadata,
//!     PluginRegistry, PluginServices, StructuredRunReporter,
//! };
//!
//! struct Toolbox;
//!
//! impl Plugin for Toolbox {
//!     fn metadata(&self) -> PluginMetadata {
//!         PluginMetadata::new("Toolbox", "Lists the workspace tools.").with_id("toolbox")
//!     }
//!
//!     fn execute(&self, _context: &PluginContext<'_>) -> Result<(), PluginFailure> {
//!         Ok(())
//!     }
//! }
//!
//! let mut registry = PluginRegistry::new();
//! registry.register(PluginKind::View, Toolbox).expect("registration succeeds");
//!
//! let presentation = Presentation::new(
//!     Rc::new(Workspace::new()),
//!     Rc::new(QueuedMessenger::new()),
//! );
//! let presentation_loop = PresentationLoop::new(presentation);
//! let services = PluginServices::from_presentation(
//!     presentation_loop.presentation(),
//!     presentation_loop.dispatcher(),
//!     Rc::new(ViewPointConverter::default()),
//! );
//!
//! let host = PluginHost::new(registry, StructuredRunReporter::new());
//! let loaded = host.load(&PluginSetting::default(), &services);
//! assert_eq!(loaded.executed(), ["toolbox"]);
//! ```

pub mod context;
pub mod convert;
pub mod descriptor;
pub mod dispatcher;
pub mod effect;
pub mod error;
pub mod event;
pub mod host;
pub mod messenger;
pub mod order;
pub mod plugin;
pub mod registry;
pub mod runner;
pub mod workspace;

#[cfg(test)]
mod tests;

pub use self::context::{PluginContext, PluginServices};
pub use self::descriptor::{PluginDescriptor, PluginKind, PluginMetadata};
pub use self::dispatcher::{Dispatcher, PendingWork, Presentation, PresentationLoop, WorkStatus};
pub use self::error::{DispatchError, ExecutionError, PluginError, PluginFailure};
pub use self::event::{EventSource, Subscription};
pub use self::host::{LoadedPlugins, PluginHost};
pub use self::messenger::{Dialog, Messenger, Modality, ViewModel};
pub use self::order::{Identified, ResolvedOrder};
pub use self::plugin::Plugin;
pub use self::registry::{PluginRegistry, PluginSource, RegisteredPlugin};
pub use self::runner::{PluginRunner, RunReport, RunReporter, StructuredRunReporter};
pub use self::workspace::Workspace;
