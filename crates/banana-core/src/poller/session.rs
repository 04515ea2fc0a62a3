use std::sync::{
    Arc, Mutex, MutexGuard,
    atomic::{AtomicU8, Ordering},
};

use banana_model::{JobKind, TaskLocator};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::PollOutcome;

const ACTIVE: u8 = 0;
const FINISHED: u8 = 1;
const CANCELLED: u8 = 2;

/// At-most-once termination latch shared by a session and its loop.
///
/// Whoever claims it first (terminal status, attempt exhaustion, wall-clock timeout or
/// cancellation) decides the outcome; every later claim is refused.
#[derive(Debug, Default)]
pub struct TerminationGuard {
    state: AtomicU8,
}

impl TerminationGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim termination with an outcome. Returns `false` if already terminated.
    pub fn try_finish(&self) -> bool {
        self.transition(FINISHED)
    }

    /// Claim termination by cancellation. Returns `false` if already terminated.
    pub fn try_cancel(&self) -> bool {
        self.transition(CANCELLED)
    }

    pub fn is_terminated(&self) -> bool {
        self.state.load(Ordering::Acquire) != ACTIVE
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.load(Ordering::Acquire) == CANCELLED
    }

    fn transition(&self, to: u8) -> bool {
        self.state
            .compare_exchange(ACTIVE, to, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

/// Cloneable control side of a poll session.
#[derive(Debug, Clone)]
pub struct SessionControl {
    task: TaskLocator,
    kind: JobKind,
    token: CancellationToken,
    guard: Arc<TerminationGuard>,
    /// Held while a callback runs and while cancelling.
    dispatch: Arc<Mutex<()>>,
}

impl SessionControl {
    pub(crate) fn new(task: TaskLocator, kind: JobKind) -> Self {
        Self {
            task,
            kind,
            token: CancellationToken::new(),
            guard: Arc::new(TerminationGuard::new()),
            dispatch: Arc::new(Mutex::new(())),
        }
    }

    pub fn task(&self) -> &TaskLocator {
        &self.task
    }

    pub fn kind(&self) -> JobKind {
        self.kind
    }

    /// Stop the session. Waits for a callback already running; no callback fires once this
    /// returns, and a status check still in flight is discarded when it resolves.
    pub fn cancel(&self) {
        let _dispatch = self.dispatch();
        if self.guard.try_cancel() {
            debug!(task = %self.task, kind = %self.kind, "poll session cancelled");
        }
        self.token.cancel();
    }

    /// Whether the session ended through [`SessionControl::cancel`].
    pub fn is_cancelled(&self) -> bool {
        self.guard.is_cancelled()
    }

    /// Whether the session reached any end state.
    pub fn is_terminated(&self) -> bool {
        self.guard.is_terminated()
    }

    pub(crate) fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub(crate) fn guard(&self) -> &TerminationGuard {
        &self.guard
    }

    pub(crate) fn dispatch(&self) -> MutexGuard<'_, ()> {
        self.dispatch.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// A running poll over one task.
///
/// Dropping the session leaves the loop running; call [`PollSession::cancel`] on teardown or
/// wrap it with [`PollSession::cancel_on_drop`].
#[derive(Debug)]
pub struct PollSession {
    control: SessionControl,
    handle: JoinHandle<Option<PollOutcome>>,
}

impl PollSession {
    pub(crate) fn new(control: SessionControl, handle: JoinHandle<Option<PollOutcome>>) -> Self {
        Self { control, handle }
    }

    pub fn task(&self) -> &TaskLocator {
        self.control.task()
    }

    pub fn kind(&self) -> JobKind {
        self.control.kind()
    }

    pub fn control(&self) -> SessionControl {
        self.control.clone()
    }

    pub fn cancel(&self) {
        self.control.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.control.is_cancelled()
    }

    /// Whether the polling loop has exited.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the session to end. `None` when it was cancelled.
    pub async fn wait(self) -> Option<PollOutcome> {
        match self.handle.await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(task = %self.control.task, error = %e, "poll loop aborted");
                None
            }
        }
    }

    pub fn cancel_on_drop(self) -> CancelOnDrop {
        CancelOnDrop(Some(self))
    }
}

/// Cancels the wrapped session when dropped.
#[derive(Debug)]
pub struct CancelOnDrop(Option<PollSession>);

impl CancelOnDrop {
    pub fn session(&self) -> Option<&PollSession> {
        self.0.as_ref()
    }

    /// Release the session without cancelling it.
    pub fn disarm(mut self) -> Option<PollSession> {
        self.0.take()
    }
}

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        if let Some(session) = &self.0 {
            session.cancel();
        }
    }
}
