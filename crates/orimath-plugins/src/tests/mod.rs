//! Crate-level integration and BDD tests, plus shared test doubles.

use std::any::Any;
use std::rc::Rc;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use crate::context::{PluginContext, PluginServices};
use crate::convert::ViewPointConverter;
use crate::descriptor::{PluginKind, PluginMetadata};
use crate::dispatcher::{Presentation, PresentationLoop};
use crate::effect::{Effect, NewPaperEffect, NewPaperExecutor};
use crate::error::PluginFailure;
use crate::event::EventSource;
use crate::host::PluginHost;
use crate::messenger::{Dialog, QueuedMessenger, ViewModel};
use crate::plugin::Plugin;
use crate::registry::PluginRegistry;
use crate::runner::StructuredRunReporter;
use crate::workspace::Workspace;

use orimath_config::PluginSetting;


/// Shared record of entry-point invocations.
#[derive(Debug, Clone, Default)]
pub(crate) struct ExecutionLog(Arc<Mutex<Vec<String>>>);

impl ExecutionLog {
    pub(crate) fn record(&self, id: &str) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(id.to_owned());
    }

    pub(crate) fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

/// What a [`ScriptedPlugin`] does when executed.
#[derive(Clone)]
pub(crate) enum Behaviour {
    Succeed,
    Fail,
    Panic,
    Subscribe(Arc<EventSource<u32>>),
    SubscribeThenFail(Arc<EventSource<u32>>),
}

/// Plugin double that records its execution and follows a script.
pub(crate) struct ScriptedPlugin {
    id: String,
    behaviour: Behaviour,
    log: ExecutionLog,
}

impl ScriptedPlugin {
    pub(crate) fn new(id: &str, behaviour: Behaviour, log: &ExecutionLog) -> Self {
        Self {
            id: id.to_owned(),
            behaviour,
            log: log.clone(),
        }
    }
}

impl Plugin for ScriptedPlugin {
    fn metadata(&self) -> PluginMetadata {
        PluginMetadata::new(format!("{} plugin", self.id), "Scripted test plugin.")
            .with_id(self.id.clone())
    }

    fn execute(&self, context: &PluginContext<'_>) -> Result<(), PluginFailure> {
        self.log.record(context.descriptor().id());
        match &self.behaviour {
            Behaviour::Succeed => Ok(()),
            Behaviour::Fail => Err(PluginFailure::new("scripted failure")),
            Behaviour::Panic => panic!("scripted panic"),
            Behaviour::Subscribe(source) => {
                context.hold(source.subscribe(|_| {}));
                Ok(())
            }
            Behaviour::SubscribeThenFail(source) => {
                context.hold(source.subscribe(|_| {}));
                Err(PluginFailure::new("failed after subscribing"))
            }
        }
    }
}

/// Presentation loop and services wired the way a host would wire them.
pub(crate) struct TestHost {
    pub(crate) workspace: Rc<Workspace>,
    pub(crate) messenger: Rc<QueuedMessenger>,
    pub(crate) presentation_loop: PresentationLoop,
    pub(crate) services: PluginServices,
}

impl TestHost {
    pub(crate) fn new() -> Self {
        let workspace = Rc::new(Workspace::new());
        let messenger = Rc::new(QueuedMessenger::new());
        let presentation = Presentation::new(workspace.clone(), messenger.clone());
        let presentation_loop = PresentationLoop::new(presentation);
        let services = PluginServices::from_presentation(
            presentation_loop.presentation(),
            presentation_loop.dispatcher(),
            Rc::new(ViewPointConverter::default()),
        );
        Self {
            workspace,
            messenger,
            presentation_loop,
            services,
        }
    }
}

// ---------------------------------------------------------------------------
// End-to-end event reaction
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct NewPaperDialog;

impl ViewModel for NewPaperDialog {
    fn name(&self) -> &str {
        "new-paper-dialog"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

struct NoopExecutor;

impl NewPaperExecutor for NoopExecutor {
    fn create_paper(&self) {}
}

struct EffectsPlugin;

impl Plugin for EffectsPlugin {
    fn metadata(&self) -> PluginMetadata {
        PluginMetadata::new("Effects", "Adds the new-paper effect.").with_id("effects")
    }

    fn execute(&self, context: &PluginContext<'_>) -> Result<(), PluginFailure> {
        context
            .workspace()
            .add_effect(Arc::new(NewPaperEffect::new(Arc::new(NoopExecutor))));
        Ok(())
    }
}

struct DialogPlugin;

impl Plugin for DialogPlugin {
    fn metadata(&self) -> PluginMetadata {
        PluginMetadata::new("Dialog", "Opens a dialog on new paper.").with_id("dialog")
    }

    fn execute(&self, context: &PluginContext<'_>) -> Result<(), PluginFailure> {
        let Some(new_paper) = context.workspace().effect::<NewPaperEffect>() else {
            return Ok(());
        };
        let dispatcher = context.dispatcher().clone();
        context.hold(new_paper.on_execute().subscribe(move |_| {
            let _pending = dispatcher.invoke_async(|presentation| {
                presentation
                    .messenger()
                    .open_dialog(Dialog::modal(Box::new(NewPaperDialog)));
            });
        }));
        Ok(())
    }
}

#[test]
fn background_effect_opens_dialog_through_dispatcher() {
    let host = TestHost::new();
    let mut registry = PluginRegistry::new();
    registry
        .register(PluginKind::General, EffectsPlugin)
        .expect("register effects");
    registry
        .register(PluginKind::View, DialogPlugin)
        .expect("register dialog");
    let plugin_host = PluginHost::new(registry, StructuredRunReporter::new());

    let loaded = plugin_host.load(&PluginSetting::default(), &host.services);
    assert!(loaded.is_clean());

    let effect = host
        .workspace
        .effect::<NewPaperEffect>()
        .expect("new paper effect");
    thread::spawn(move || effect.execute())
        .join()
        .expect("background thread");

    assert_eq!(host.messenger.dialog_count(), 0);
    assert_eq!(host.presentation_loop.pump(Duration::from_secs(1)), 1);
    assert_eq!(host.messenger.dialog_names(), ["new-paper-dialog"]);

    loaded.teardown();
    let after_teardown = host
        .workspace
        .effect::<NewPaperEffect>()
        .expect("new paper effect");
    assert_eq!(after_teardown.on_execute().subscriber_count(), 0);
}
