use std::sync::Arc;

use banana_core::{JobError, PollObserver, ProgressView, ResultView};
use banana_model::{TaskLocator, TaskStatus};

use crate::subscriber::view::{EventKind, PollEvent, log_event};

/// Poll observer that writes every session event to the log, then forwards it.
#[derive(Clone, Default)]
pub struct Journal {
    inner: Option<Arc<dyn PollObserver>>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log events, then hand them to `inner`.
    pub fn wrap(inner: Arc<dyn PollObserver>) -> Self {
        Self { inner: Some(inner) }
    }
}

impl PollObserver for Journal {
    fn on_update(&self, task: &TaskLocator, attempt: u32, status: &TaskStatus, progress: &ProgressView) {
        log_event(&PollEvent {
            attempt,
            status: Some(status),
            percent: progress.percent,
            ..PollEvent::new(EventKind::Update, task)
        });
        if let Some(inner) = &self.inner {
            inner.on_update(task, attempt, status, progress);
        }
    }

    fn on_success(&self, task: &TaskLocator, result: &ResultView) {
        log_event(&PollEvent {
            detail: Some(result.summary.as_str()),
            ..PollEvent::new(EventKind::Succeeded, task)
        });
        if let Some(inner) = &self.inner {
            inner.on_success(task, result);
        }
    }

    fn on_failure(&self, task: &TaskLocator, error: &JobError) {
        let reason = error.user_message();
        log_event(&PollEvent {
            detail: Some(reason.as_str()),
            ..PollEvent::new(EventKind::Failed, task)
        });
        if let Some(inner) = &self.inner {
            inner.on_failure(task, error);
        }
    }

    fn on_timeout(&self, task: &TaskLocator, attempts: u32) {
        log_event(&PollEvent {
            attempt: attempts,
            ..PollEvent::new(EventKind::TimedOut, task)
        });
        if let Some(inner) = &self.inner {
            inner.on_timeout(task, attempts);
        }
    }
}
