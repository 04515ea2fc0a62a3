use std::{
    collections::VecDeque,
    sync::{
        Mutex,
        atomic::{AtomicU32, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use banana_model::{JobRequest, TaskLocator, TaskScope, TaskSnapshot, TaskStatus};
use serde_json::Value;

use crate::{
    BackendError, JobError, NoticeKind, Notifier, PollObserver, ProgressView, ResultView,
    TaskBackend,
};

pub type Scripted = Result<TaskSnapshot, BackendError>;

/// Backend replaying a fixed sequence of status answers; the last one repeats.
pub struct ScriptedBackend {
    script: Mutex<VecDeque<Scripted>>,
    last: Mutex<Option<Scripted>>,
    delay: Duration,
    submit: Result<TaskLocator, BackendError>,
    status_calls: AtomicU32,
    submit_calls: AtomicU32,
}

impl ScriptedBackend {
    pub fn new(script: Vec<Scripted>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            last: Mutex::new(None),
            delay: Duration::ZERO,
            submit: Ok(locator()),
            status_calls: AtomicU32::new(0),
            submit_calls: AtomicU32::new(0),
        }
    }

    pub fn always(status: TaskStatus) -> Self {
        Self::new(vec![Ok(TaskSnapshot::new(status))])
    }

    /// Every status check takes `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn rejecting_submit(mut self, err: BackendError) -> Self {
        self.submit = Err(err);
        self
    }

    pub fn status_calls(&self) -> u32 {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub fn submit_calls(&self) -> u32 {
        self.submit_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TaskBackend for ScriptedBackend {
    async fn submit(&self, _job: &JobRequest) -> Result<TaskLocator, BackendError> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        self.submit.clone()
    }

    async fn status(&self, _task: &TaskLocator) -> Result<TaskSnapshot, BackendError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let next = self.script.lock().unwrap().pop_front();
        let mut last = self.last.lock().unwrap();
        match next {
            Some(answer) => {
                *last = Some(answer.clone());
                answer
            }
            None => last
                .clone()
                .unwrap_or_else(|| Err(BackendError::Transport("empty script".into()))),
        }
    }
}

pub fn locator() -> TaskLocator {
    TaskLocator::new("task-1", TaskScope::Project("global".into()))
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Update { attempt: u32, status: TaskStatus, percent: u8 },
    Success(Value),
    Failure(JobError),
    Timeout(u32),
}

#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<Event>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn terminal_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| !matches!(e, Event::Update { .. }))
            .count()
    }
}

impl PollObserver for RecordingObserver {
    fn on_update(&self, _task: &TaskLocator, attempt: u32, status: &TaskStatus, progress: &ProgressView) {
        self.events.lock().unwrap().push(Event::Update {
            attempt,
            status: status.clone(),
            percent: progress.percent,
        });
    }

    fn on_success(&self, _task: &TaskLocator, result: &ResultView) {
        self.events
            .lock()
            .unwrap()
            .push(Event::Success(result.payload.clone()));
    }

    fn on_failure(&self, _task: &TaskLocator, error: &JobError) {
        self.events.lock().unwrap().push(Event::Failure(error.clone()));
    }

    fn on_timeout(&self, _task: &TaskLocator, attempts: u32) {
        self.events.lock().unwrap().push(Event::Timeout(attempts));
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<(String, NoticeKind)>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<(String, NoticeKind)> {
        self.notices.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str, kind: NoticeKind) {
        self.notices.lock().unwrap().push((message.to_string(), kind));
    }
}
