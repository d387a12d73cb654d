//! Marshalling of work onto the presentation context.
//!
//! Presentation state ([`Workspace`], [`Messenger`]) lives on a single
//! thread and is reachable only through `Rc` handles. A [`Dispatcher`] is the
//! one handle that may cross threads: it queues closures that the host's
//! [`PresentationLoop`] later runs against a [`Presentation`] bundle.
//!
//! Work is modelled as a small state machine observable through
//! [`PendingWork::status`]:
//!
//! | From      | To          | Trigger                                  |
//! |-----------|-------------|------------------------------------------|
//! | `Pending` | `Running`   | the loop picks the job up                |
//! | `Pending` | `Cancelled` | [`PendingWork::cancel`]                  |
//! | `Pending` | `Dropped`   | the loop is torn down before running it  |
//! | `Running` | `Completed` | the closure returns                      |
//! | `Running` | `Panicked`  | the closure panics                       |

use std::cell::RefCell;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};

use crate::error::DispatchError;
use crate::messenger::Messenger;
use crate::workspace::Workspace;

static NEXT_LOOP_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static ACTIVE_LOOPS: RefCell<Vec<(u64, Presentation)>> = const { RefCell::new(Vec::new()) };
}

type Work = Box<dyn FnOnce(&Presentation) + Send>;

/// Presentation handles available to dispatched work.
///
/// Holds `Rc` handles, so it never leaves the presentation thread.
#[derive(Clone)]
pub struct Presentation {
    workspace: Rc<Workspace>,
    messenger: Rc<dyn Messenger>,
}

impl Presentation {
    /// Bundles the presentation handles.
    #[must_use]
    pub fn new(workspace: Rc<Workspace>, messenger: Rc<dyn Messenger>) -> Self {
        Self {
            workspace,
            messenger,
        }
    }

    /// Shared workspace.
    #[must_use]
    pub const fn workspace(&self) -> &Rc<Workspace> {
        &self.workspace
    }

    /// Shared messenger.
    #[must_use]
    pub fn messenger(&self) -> &dyn Messenger {
        self.messenger.as_ref()
    }

    /// Shared messenger handle, for callers that need to keep it.
    #[must_use]
    pub const fn messenger_handle(&self) -> &Rc<dyn Messenger> {
        &self.messenger
    }
}

impl fmt::Debug for Presentation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Presentation")
            .field("workspace", &self.workspace)
            .finish_non_exhaustive()
    }
}

/// Lifecycle state of one dispatched unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkStatus {
    /// Queued and not yet started.
    Pending,
    /// Currently executing on the presentation context.
    Running,
    /// Finished normally.
    Completed,
    /// Cancelled before it started.
    Cancelled,
    /// Discarded because the presentation loop closed first.
    Dropped,
    /// Panicked while executing.
    Panicked,
}

impl WorkStatus {
    /// Returns `true` once the work can no longer change state.
    #[must_use]
    pub const fn is_finished(self) -> bool {
        !matches!(self, Self::Pending | Self::Running)
    }
}

struct WorkState {
    status: Mutex<WorkStatus>,
}

impl WorkState {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            status: Mutex::new(WorkStatus::Pending),
        })
    }

    fn lock(&self) -> MutexGuard<'_, WorkStatus> {
        self.status.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn get(&self) -> WorkStatus {
        *self.lock()
    }

    fn transition(&self, from: WorkStatus, to: WorkStatus) -> bool {
        let mut status = self.lock();
        if *status == from {
            *status = to;
            true
        } else {
            false
        }
    }
}

struct Job {
    work: Option<Work>,
    state: Arc<WorkState>,
    // Dropped with the job; waiters observe the disconnect.
    _done: Sender<()>,
}

impl Drop for Job {
    fn drop(&mut self) {
        if self.state.transition(WorkStatus::Pending, WorkStatus::Dropped) {
            tracing::debug!(
                target: "orimath_plugins::dispatcher",
                event = "work_dropped",
                "presentation loop closed before dispatched work ran"
            );
        }
    }
}

/// Handle to deferred work queued with [`Dispatcher::invoke_async`].
///
/// Dropping the handle leaves the work queued.
#[must_use = "the handle is the only way to cancel or observe the work"]
pub struct PendingWork {
    state: Arc<WorkState>,
    done: Receiver<()>,
}

impl PendingWork {
    /// Cancels the work if it has not started yet.
    ///
    /// Returns `true` when the cancellation took effect.
    pub fn cancel(&self) -> bool {
        self.state.transition(WorkStatus::Pending, WorkStatus::Cancelled)
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn status(&self) -> WorkStatus {
        self.state.get()
    }

    /// Blocks until the work leaves the queue, returning its final state.
    ///
    /// Cancelled work returns immediately. Must not be called on the
    /// presentation thread while the work is still pending, since only that
    /// thread can run it.
    #[must_use]
    pub fn wait(&self) -> WorkStatus {
        let status = self.status();
        if status.is_finished() {
            return status;
        }
        // Nothing is ever sent; the job's sender disconnects when it is gone.
        let _finished = self.done.recv();
        self.status()
    }

    /// Like [`PendingWork::wait`] but gives up after `timeout`.
    #[must_use]
    pub fn wait_timeout(&self, timeout: Duration) -> WorkStatus {
        let status = self.status();
        if status.is_finished() {
            return status;
        }
        let _finished = self.done.recv_timeout(timeout);
        self.status()
    }
}

impl fmt::Debug for PendingWork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingWork")
            .field("status", &self.status())
            .finish()
    }
}

/// Thread-safe handle that marshals work onto the presentation context.
///
/// This is the only plugin-facing handle that is `Send + Sync`. Event
/// handlers raised on background threads capture a clone of it and use it
/// to reach the workspace or messenger.
///
/// # Example
///
/// ```
/// use std::rc::Rc;
/// use orimath_plugins::dispatcher::{Presentation, PresentationLoop};
/// use orimath_plugins::messenger::QueuedMessenger;
/// use orimath_plugins::workspace::Workspace;
///
/// let presentation = Presentation::new(
///     Rc::new(Workspace::new()),
///     Rc::new(QueuedMessenger::new()),
/// );
/// let presentation_loop = PresentationLoop::new(presentation);
/// let dispatcher = presentation_loop.dispatcher();
///
/// let worker = std::thread::spawn(move || {
///     dispatcher.invoke_async(|presentation| {
///         assert!(presentation.workspace().tools().is_empty());
///     })
/// });
/// let pending = worker.join().expect("worker thread");
///
/// assert_eq!(presentation_loop.run_pending(), 1);
/// assert!(pending.status().is_finished());
/// ```
#[derive(Clone)]
pub struct Dispatcher {
    sender: Sender<Job>,
    loop_id: u64,
}

impl Dispatcher {
    /// Returns `true` when called on the thread that owns the loop.
    #[must_use]
    pub fn is_presentation_thread(&self) -> bool {
        self.local_presentation().is_some()
    }

    /// Runs `work` on the presentation context and returns its result.
    ///
    /// On the presentation thread the work runs inline. From any other
    /// thread it is queued and the caller blocks until the loop has run it.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Closed`] when the loop has been torn down and
    /// [`DispatchError::Panicked`] when the work panicked.
    pub fn invoke<F, R>(&self, work: F) -> Result<R, DispatchError>
    where
        F: FnOnce(&Presentation) -> R + Send + 'static,
        R: Send + 'static,
    {
        if let Some(presentation) = self.local_presentation() {
            return panic::catch_unwind(AssertUnwindSafe(|| work(&presentation)))
                .map_err(|_| DispatchError::Panicked);
        }

        let (result_tx, result_rx) = crossbeam_channel::bounded(1);
        let pending = self.invoke_async(move |presentation| {
            // The caller is blocked on the receiver, so this only fails if
            // the caller itself has gone away.
            let _delivered = result_tx.send(work(presentation));
        });
        match result_rx.recv() {
            Ok(value) => Ok(value),
            Err(_) => match pending.wait() {
                WorkStatus::Panicked => Err(DispatchError::Panicked),
                _ => Err(DispatchError::Closed),
            },
        }
    }

    /// Queues `work` to run on the presentation context later.
    ///
    /// Never runs the work inline, even on the presentation thread. If the
    /// loop is already closed the returned handle reports
    /// [`WorkStatus::Dropped`].
    pub fn invoke_async<F>(&self, work: F) -> PendingWork
    where
        F: FnOnce(&Presentation) + Send + 'static,
    {
        let state = WorkState::new();
        let (done_tx, done_rx) = crossbeam_channel::bounded(0);
        let job = Job {
            work: Some(Box::new(work)),
            state: Arc::clone(&state),
            _done: done_tx,
        };
        if self.sender.send(job).is_err() {
            tracing::debug!(
                target: "orimath_plugins::dispatcher",
                event = "dispatch_rejected",
                "presentation loop is closed"
            );
        }
        PendingWork {
            state,
            done: done_rx,
        }
    }

    fn local_presentation(&self) -> Option<Presentation> {
        ACTIVE_LOOPS.with_borrow(|loops| {
            loops
                .iter()
                .find(|(id, _)| *id == self.loop_id)
                .map(|(_, presentation)| presentation.clone())
        })
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("loop_id", &self.loop_id)
            .field("queued", &self.sender.len())
            .finish()
    }
}

/// Queue of dispatched work owned by the presentation thread.
///
/// The host creates one loop per run and pumps it from its event loop.
/// Dropping the loop closes the queue: queued work is dropped and later
/// requests fail with [`DispatchError::Closed`].
pub struct PresentationLoop {
    id: u64,
    presentation: Presentation,
    sender: Sender<Job>,
    receiver: Receiver<Job>,
}

impl PresentationLoop {
    /// Creates a loop bound to the current thread.
    #[must_use]
    pub fn new(presentation: Presentation) -> Self {
        let id = NEXT_LOOP_ID.fetch_add(1, Ordering::Relaxed);
        let (sender, receiver) = crossbeam_channel::unbounded();
        ACTIVE_LOOPS.with_borrow_mut(|loops| loops.push((id, presentation.clone())));
        Self {
            id,
            presentation,
            sender,
            receiver,
        }
    }

    /// Returns a dispatcher feeding this loop.
    #[must_use]
    pub fn dispatcher(&self) -> Dispatcher {
        Dispatcher {
            sender: self.sender.clone(),
            loop_id: self.id,
        }
    }

    /// Presentation handles the loop runs work against.
    #[must_use]
    pub const fn presentation(&self) -> &Presentation {
        &self.presentation
    }

    /// Number of queued jobs, including cancelled ones not yet discarded.
    #[must_use]
    pub fn queued(&self) -> usize {
        self.receiver.len()
    }

    /// Runs the work queued so far, returning how many jobs executed.
    ///
    /// Work queued by the jobs themselves waits for the next call.
    /// Cancelled jobs are discarded without counting.
    pub fn run_pending(&self) -> usize {
        let batch = self.receiver.len();
        self.receiver
            .try_iter()
            .take(batch)
            .map(|job| self.run(job))
            .filter(|ran| *ran)
            .count()
    }

    /// Waits up to `timeout` for work, then runs everything queued.
    ///
    /// Returns how many jobs executed.
    pub fn pump(&self, timeout: Duration) -> usize {
        match self.receiver.recv_timeout(timeout) {
            Ok(job) => usize::from(self.run(job)) + self.run_pending(),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => 0,
        }
    }

    fn run(&self, mut job: Job) -> bool {
        if !job.state.transition(WorkStatus::Pending, WorkStatus::Running) {
            return false;
        }
        let Some(work) = job.work.take() else {
            return false;
        };
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| work(&self.presentation)));
        let status = if outcome.is_ok() {
            WorkStatus::Completed
        } else {
            tracing::warn!(
                target: "orimath_plugins::dispatcher",
                event = "work_panicked",
                "dispatched work panicked on the presentation context"
            );
            WorkStatus::Panicked
        };
        job.state.transition(WorkStatus::Running, status);
        true
    }
}

impl Drop for PresentationLoop {
    fn drop(&mut self) {
        ACTIVE_LOOPS.with_borrow_mut(|loops| loops.retain(|(id, _)| *id != self.id));
        let discarded = self.receiver.try_iter().count();
        if discarded > 0 {
            tracing::debug!(
                target: "orimath_plugins::dispatcher",
                event = "loop_closed",
                discarded,
                "presentation loop closed with queued work"
            );
        }
    }
}

impl fmt::Debug for PresentationLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PresentationLoop")
            .field("id", &self.id)
            .field("queued", &self.receiver.len())
            .finish_non_exhaustive()
    }
}
