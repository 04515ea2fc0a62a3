use banana_model::{TaskLocator, TaskStatus};
use tracing::{debug, info, warn};

/// Kind of poll-session event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Update,
    Succeeded,
    Failed,
    TimedOut,
}

/// One observer callback, flattened for logging.
#[derive(Debug, Clone)]
pub struct PollEvent<'a> {
    pub kind: EventKind,
    pub task: &'a TaskLocator,
    pub attempt: u32,
    pub status: Option<&'a TaskStatus>,
    pub percent: u8,
    /// Result summary or failure reason.
    pub detail: Option<&'a str>,
}

impl<'a> PollEvent<'a> {
    pub fn new(kind: EventKind, task: &'a TaskLocator) -> Self {
        Self {
            kind,
            task,
            attempt: 0,
            status: None,
            percent: 0,
            detail: None,
        }
    }

    #[inline]
    fn as_status(&self) -> &str {
        self.status.map(TaskStatus::as_str).unwrap_or("unknown")
    }

    #[inline]
    fn as_detail(&self) -> &str {
        self.detail.filter(|d| !d.is_empty()).unwrap_or("none")
    }
}

#[inline]
pub fn message_for(kind: EventKind) -> &'static str {
    match kind {
        EventKind::Update => "task still running",
        EventKind::Succeeded => "task completed",
        EventKind::Failed => "task failed or could not be checked",
        EventKind::TimedOut => "task outlived its polling budget",
    }
}

#[inline]
pub fn log_event(e: &PollEvent<'_>) {
    let msg = message_for(e.kind);

    match e.kind {
        EventKind::Update => debug!(
            task = %e.task,
            attempt = e.attempt,
            status = e.as_status(),
            percent = e.percent,
            "{msg}"
        ),
        EventKind::Succeeded => info!(task = %e.task, summary = e.as_detail(), "{msg}"),
        EventKind::Failed => warn!(task = %e.task, reason = e.as_detail(), "{msg}"),
        EventKind::TimedOut => warn!(task = %e.task, attempts = e.attempt, "{msg}"),
    }
}
