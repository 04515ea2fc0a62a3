mod config;
pub use config::{DEFAULT_INTERVAL_MS, DEFAULT_MAX_ATTEMPTS, DEFAULT_TIMEOUT_MS, PollConfig};

mod session;
pub use session::{CancelOnDrop, PollSession, SessionControl, TerminationGuard};

use std::{sync::Arc, time::Duration};

use banana_model::{JobKind, JobRequest, TaskLocator, TaskStatus};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, instrument, warn};

use crate::{
    backend::TaskBackend,
    error::{BackendError, JobError},
    interpret::{ProgressView, ResultView, interpret},
    notify::{NoticeKind, Notifier},
};

/// Callbacks of a poll session.
///
/// `on_update` calls arrive in attempt order; exactly one of the terminal callbacks fires,
/// last, unless the session is cancelled first.
///
/// Callbacks run under the session's dispatch lock, which [`SessionControl::cancel`] also takes:
/// once `cancel` returns, no callback of that session is running or will run. A callback must
/// therefore not cancel its own session.
pub trait PollObserver: Send + Sync {
    fn on_update(&self, _task: &TaskLocator, _attempt: u32, _status: &TaskStatus, _progress: &ProgressView) {}
    fn on_success(&self, _task: &TaskLocator, _result: &ResultView) {}
    fn on_failure(&self, _task: &TaskLocator, _error: &JobError) {}
    fn on_timeout(&self, _task: &TaskLocator, _attempts: u32) {}
}

/// Observer that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl PollObserver for NoopObserver {}

/// Terminal outcome of a poll session.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    Completed(ResultView),
    Failed(JobError),
    TimedOut { attempts: u32, elapsed: Duration },
}

impl PollOutcome {
    pub fn into_result(self, task: &TaskLocator) -> Result<ResultView, JobError> {
        match self {
            PollOutcome::Completed(result) => Ok(result),
            PollOutcome::Failed(err) => Err(err),
            PollOutcome::TimedOut { attempts, elapsed } => Err(JobError::PollTimeout {
                task: task.clone(),
                attempts,
                elapsed_ms: millis(elapsed),
            }),
        }
    }
}

/// Submits jobs and follows them until they finish.
#[derive(Clone)]
pub struct Poller {
    backend: Arc<dyn TaskBackend>,
    notifier: Arc<dyn Notifier>,
    config: PollConfig,
}

impl Poller {
    pub fn new(backend: Arc<dyn TaskBackend>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            backend,
            notifier,
            config: PollConfig::default(),
        }
    }

    pub fn with_config(mut self, config: PollConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &PollConfig {
        &self.config
    }

    /// Start a job. A rejection is notified once and returned; nothing is polled.
    #[instrument(level = "debug", skip(self, job), fields(kind = %job.kind()))]
    pub async fn submit(&self, job: &JobRequest) -> Result<TaskLocator, JobError> {
        let kind = job.kind();
        if let Err(e) = job.validate() {
            self.notifier
                .notify(&format!("{} not started: {e}", kind.label()), NoticeKind::Error);
            return Err(JobError::Invalid(e));
        }

        match self.backend.submit(job).await {
            Ok(task) if task.id.is_empty() => {
                let err = BackendError::MissingTaskId;
                self.notifier
                    .notify(&format!("{} not started: {err}", kind.label()), NoticeKind::Error);
                Err(JobError::Submission(err))
            }
            Ok(task) => {
                debug!(%task, "job submitted");
                Ok(task)
            }
            Err(err) => {
                warn!(error = %err, "job submission rejected");
                self.notifier
                    .notify(&format!("{} not started: {err}", kind.label()), NoticeKind::Error);
                Err(JobError::Submission(err))
            }
        }
    }

    /// Start polling `task` with the poller's configuration.
    pub fn start(&self, task: TaskLocator, kind: JobKind, observer: Arc<dyn PollObserver>) -> PollSession {
        self.start_with(self.config, task, kind, observer)
    }

    /// Start polling `task` with an explicit configuration.
    ///
    /// An invalid configuration is logged and raised to the nearest valid one (see
    /// [`PollConfig::normalized`]), so the first check still happens and a terminal callback
    /// still fires. Must be called from within a tokio runtime.
    pub fn start_with(
        &self,
        config: PollConfig,
        task: TaskLocator,
        kind: JobKind,
        observer: Arc<dyn PollObserver>,
    ) -> PollSession {
        let config = match config.validate() {
            Ok(()) => config,
            Err(e) => {
                warn!(%task, error = %e, "invalid poll config; using nearest valid values");
                config.normalized()
            }
        };
        let control = SessionControl::new(task, kind);
        let run = PollLoop {
            backend: Arc::clone(&self.backend),
            notifier: Arc::clone(&self.notifier),
            observer,
            config,
            control: control.clone(),
        };
        let handle = tokio::spawn(run.drive());
        PollSession::new(control, handle)
    }

    /// Submit a job and wait for its outcome.
    pub async fn run(&self, job: &JobRequest) -> Result<ResultView, JobError> {
        let task = self.submit(job).await?;
        let session = self.start(task.clone(), job.kind(), Arc::new(NoopObserver));
        match session.wait().await {
            Some(outcome) => outcome.into_result(&task),
            None => Err(JobError::Cancelled),
        }
    }
}

struct PollLoop {
    backend: Arc<dyn TaskBackend>,
    notifier: Arc<dyn Notifier>,
    observer: Arc<dyn PollObserver>,
    config: PollConfig,
    control: SessionControl,
}

impl PollLoop {
    async fn drive(self) -> Option<PollOutcome> {
        let task = self.control.task().clone();
        let kind = self.control.kind();
        let token = self.control.token().clone();
        let started = Instant::now();

        let deadline = tokio::time::sleep(self.config.timeout);
        tokio::pin!(deadline);

        let mut ticker = tokio::time::interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut checks: u32 = 0;
        let mut last_status: Option<TaskStatus> = None;

        debug!(%task, %kind, max_attempts = self.config.max_attempts, "polling started");

        while checks < self.config.max_attempts {
            tokio::select! {
                biased;
                _ = token.cancelled() => return None,
                _ = &mut deadline => return self.finish(&task, timed_out(checks, started)),
                _ = ticker.tick() => {}
            }

            let checked = tokio::select! {
                biased;
                _ = token.cancelled() => return None,
                _ = &mut deadline => return self.finish(&task, timed_out(checks, started)),
                res = self.backend.status(&task) => res,
            };
            checks += 1;

            if token.is_cancelled() {
                debug!(%task, attempt = checks, "discarding stale status check");
                return None;
            }
            let last_attempt = checks >= self.config.max_attempts;

            let snapshot = match checked {
                Ok(snapshot) => snapshot,
                Err(err) if last_attempt => {
                    warn!(%task, attempt = checks, error = %err, "status check failed on final attempt");
                    return self.finish(&task, PollOutcome::Failed(JobError::PollTransient(err)));
                }
                Err(err) => {
                    warn!(%task, attempt = checks, error = %err, "status check failed; retrying");
                    continue;
                }
            };

            let view = interpret(&snapshot, kind);
            if let Some(prev) = &last_status
                && !prev.can_transition_to(&view.status)
            {
                warn!(%task, from = %prev, to = %view.status, "task status moved backwards");
            }
            debug!(%task, attempt = checks, status = %view.status, percent = view.progress.percent, "status checked");

            match &view.status {
                TaskStatus::Completed => {
                    let result = view.result.unwrap_or_default();
                    return self.finish(&task, PollOutcome::Completed(result));
                }
                TaskStatus::Failed => {
                    let message = view
                        .error
                        .map(|e| e.message)
                        .unwrap_or_else(|| crate::GENERIC_FAILURE.to_string());
                    return self.finish(&task, PollOutcome::Failed(JobError::JobFailed(message)));
                }
                TaskStatus::Unknown(raw) => {
                    warn!(%task, status = %raw, "unexpected task status; still polling");
                }
                TaskStatus::Pending | TaskStatus::Running => {}
            }

            if last_attempt {
                return self.finish(&task, timed_out(checks, started));
            }
            {
                let _dispatch = self.control.dispatch();
                if !self.control.guard().is_terminated() {
                    self.observer.on_update(&task, checks, &view.status, &view.progress);
                }
            }
            last_status = Some(view.status);
        }

        self.finish(&task, timed_out(checks, started))
    }

    /// Claim termination and dispatch the terminal notification and callback exactly once.
    fn finish(&self, task: &TaskLocator, outcome: PollOutcome) -> Option<PollOutcome> {
        let _dispatch = self.control.dispatch();
        if !self.control.guard().try_finish() {
            debug!(%task, "session already terminated; dropping outcome");
            return None;
        }
        let label = self.control.kind().label();

        match &outcome {
            PollOutcome::Completed(result) => {
                info!(%task, summary = %result.summary, "task completed");
                if !result.summary.is_empty() {
                    self.notifier
                        .notify(&format!("{label} completed: {}", result.summary), NoticeKind::Success);
                } else if self.control.kind().expects_result() {
                    self.notifier.notify(
                        &format!("{label} completed but returned no result"),
                        NoticeKind::Warning,
                    );
                } else {
                    self.notifier
                        .notify(&format!("{label} completed"), NoticeKind::Success);
                }
                self.observer.on_success(task, result);
            }
            PollOutcome::Failed(err @ JobError::PollTransient(_)) => {
                info!(%task, error = %err, "giving up after failed status checks");
                self.notifier.notify(
                    &format!("could not check {label} status, check again later: {err}"),
                    NoticeKind::Error,
                );
                self.observer.on_failure(task, err);
            }
            PollOutcome::Failed(err) => {
                info!(%task, error = %err, "task failed");
                self.notifier
                    .notify(&format!("{label} failed: {}", err.user_message()), NoticeKind::Error);
                self.observer.on_failure(task, err);
            }
            PollOutcome::TimedOut { attempts, elapsed } => {
                info!(%task, attempts, elapsed_ms = millis(*elapsed), "task timed out");
                self.notifier.notify(
                    &format!("{label} is taking longer than expected, check again later"),
                    NoticeKind::Info,
                );
                self.observer.on_timeout(task, *attempts);
            }
        }
        Some(outcome)
    }
}

/// Whole milliseconds of `d`, saturating.
fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

fn timed_out(attempts: u32, started: Instant) -> PollOutcome {
    PollOutcome::TimedOut {
        attempts,
        elapsed: started.elapsed(),
    }
}
