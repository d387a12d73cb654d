//! Sequential, fault-isolated execution of one resolved pool.
//!
//! The [`PluginRunner`] walks a resolved order and calls each plugin's entry
//! point once, synchronously, on the presentation thread. A plugin that
//! returns an error or panics is reported through the [`RunReporter`] and
//! skipped; the plugins after it still run. Subscriptions a plugin hands to
//! [`PluginContext::hold`] are collected in the [`RunReport`] and stay live
//! until the report is dropped.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::context::{PluginContext, PluginServices};
use crate::descriptor::{PluginDescriptor, PluginKind};
use crate::error::ExecutionError;
use crate::event::Subscription;
use crate::registry::RegisteredPlugin;

/// Observer for run lifecycle events; the host's diagnostic channel.
pub trait RunReporter: Send + Sync {
    /// Invoked before the first plugin of a pool runs.
    fn run_starting(&self, kind: PluginKind, plugins: usize);

    /// Invoked before a plugin's entry point is called.
    fn plugin_starting(&self, descriptor: &PluginDescriptor);

    /// Invoked after a plugin's entry point returned successfully.
    fn plugin_succeeded(&self, descriptor: &PluginDescriptor);

    /// Invoked when a plugin failed or panicked.
    fn plugin_failed(&self, error: &ExecutionError);

    /// Invoked after every plugin of a pool was attempted.
    fn run_finished(&self, report: &RunReport);
}

impl<T> RunReporter for Arc<T>
where
    T: RunReporter,
{
    fn run_starting(&self, kind: PluginKind, plugins: usize) {
        (**self).run_starting(kind, plugins);
    }

    fn plugin_starting(&self, descriptor: &PluginDescriptor) {
        (**self).plugin_starting(descriptor);
    }

    fn plugin_succeeded(&self, descriptor: &PluginDescriptor) {
        (**self).plugin_succeeded(descriptor);
    }

    fn plugin_failed(&self, error: &ExecutionError) {
        (**self).plugin_failed(error);
    }

    fn run_finished(&self, report: &RunReport) {
        (**self).run_finished(report);
    }
}

/// Default reporter that records run events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredRunReporter;

impl StructuredRunReporter {
    /// Builds a new structured reporter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl RunReporter for StructuredRunReporter {
    fn run_starting(&self, kind: PluginKind, plugins: usize) {
        tracing::info!(
            target: "orimath_plugins::runner",
            event = "run_starting",
            kind = %kind,
            plugins,
            "running plugin pool"
        );
    }

    fn plugin_starting(&self, descriptor: &PluginDescriptor) {
        tracing::debug!(
            target: "orimath_plugins::runner",
            event = "plugin_starting",
            plugin = descriptor.id(),
            "executing plugin"
        );
    }

    fn plugin_succeeded(&self, descriptor: &PluginDescriptor) {
        tracing::debug!(
            target: "orimath_plugins::runner",
            event = "plugin_succeeded",
            plugin = descriptor.id(),
            "plugin executed"
        );
    }

    fn plugin_failed(&self, error: &ExecutionError) {
        tracing::error!(
            target: "orimath_plugins::runner",
            event = "plugin_failed",
            plugin = error.plugin_id(),
            error = %error,
            "plugin failed; continuing with the next plugin"
        );
    }

    fn run_finished(&self, report: &RunReport) {
        tracing::info!(
            target: "orimath_plugins::runner",
            event = "run_finished",
            kind = %report.kind(),
            executed = report.executed().len(),
            failed = report.failures().len(),
            subscriptions = report.subscription_count(),
            "plugin pool finished"
        );
    }
}

/// Outcome of running one pool.
///
/// Owns the subscriptions held by plugins that ran successfully; dropping
/// the report (or calling [`RunReport::teardown`]) cancels them.
pub struct RunReport {
    kind: PluginKind,
    executed: Vec<String>,
    failures: Vec<ExecutionError>,
    subscriptions: Vec<Subscription>,
}

impl RunReport {
    const fn empty(kind: PluginKind) -> Self {
        Self {
            kind,
            executed: Vec::new(),
            failures: Vec::new(),
            subscriptions: Vec::new(),
        }
    }

    /// Pool the report covers.
    #[must_use]
    pub const fn kind(&self) -> PluginKind {
        self.kind
    }

    /// Ids of plugins whose entry point completed, in execution order.
    #[must_use]
    pub fn executed(&self) -> &[String] {
        &self.executed
    }

    /// Contained failures, in execution order.
    #[must_use]
    pub fn failures(&self) -> &[ExecutionError] {
        &self.failures
    }

    /// Number of subscriptions kept alive for the plugin set.
    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Returns `true` when no plugin failed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Cancels every held subscription.
    pub fn teardown(self) {
        let Self {
            kind,
            subscriptions,
            ..
        } = self;
        let cancelled = subscriptions.len();
        for subscription in subscriptions {
            subscription.cancel();
        }
        tracing::debug!(
            target: "orimath_plugins::runner",
            event = "pool_torn_down",
            kind = %kind,
            cancelled,
            "plugin pool torn down"
        );
    }
}

impl fmt::Debug for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunReport")
            .field("kind", &self.kind)
            .field("executed", &self.executed)
            .field("failures", &self.failures)
            .field("subscriptions", &self.subscriptions.len())
            .finish()
    }
}

/// Runs resolved plugin pools against the host services.
#[derive(Debug)]
pub struct PluginRunner<R> {
    reporter: R,
}

impl<R: RunReporter> PluginRunner<R> {
    /// Creates a runner reporting through `reporter`.
    #[must_use]
    pub const fn new(reporter: R) -> Self {
        Self { reporter }
    }

    /// Returns the reporter.
    #[must_use]
    pub const fn reporter(&self) -> &R {
        &self.reporter
    }

    /// Executes every plugin in `order`, one at a time.
    ///
    /// Failures are contained and reported; the run always completes.
    pub fn run<'p, I>(&self, kind: PluginKind, order: I, services: &PluginServices) -> RunReport
    where
        I: IntoIterator<Item = &'p RegisteredPlugin>,
    {
        let plugins: Vec<&RegisteredPlugin> = order.into_iter().collect();
        self.reporter.run_starting(kind, plugins.len());

        let mut report = RunReport::empty(kind);
        for registered in plugins {
            self.run_one(registered, services, &mut report);
        }

        self.reporter.run_finished(&report);
        report
    }

    fn run_one(
        &self,
        registered: &RegisteredPlugin,
        services: &PluginServices,
        report: &mut RunReport,
    ) {
        let descriptor = registered.descriptor();
        self.reporter.plugin_starting(descriptor);

        let held = RefCell::new(Vec::new());
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let context = PluginContext::new(descriptor, services, &held);
            registered.plugin().execute(&context)
        }));

        let error = match outcome {
            Ok(Ok(())) => {
                report.executed.push(descriptor.id().to_owned());
                report.subscriptions.extend(held.into_inner());
                self.reporter.plugin_succeeded(descriptor);
                return;
            }
            Ok(Err(source)) => ExecutionError::Failed {
                id: descriptor.id().to_owned(),
                source,
            },
            Err(payload) => ExecutionError::Panicked {
                id: descriptor.id().to_owned(),
                message: panic_message(payload.as_ref()),
            },
        };
        // Handlers registered by a failed plugin are released with `held`.
        self.reporter.plugin_failed(&error);
        report.failures.push(error);
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|message| (*message).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| String::from("non-string panic payload"))
}
