use std::{
    collections::HashMap,
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use banana_model::{JobKind, TaskLocator};
use tracing::debug;

use crate::poller::{PollObserver, PollSession, Poller, SessionControl};

/// Tracks the active poll session of each logical operation.
///
/// An operation key (e.g. `"material-generator"`, `"settings-test:text-model"`) holds at most
/// one session; starting another under the same key cancels the previous one.
#[derive(Clone, Default)]
pub struct PollRegistry {
    inner: Arc<RwLock<HashMap<String, SessionControl>>>,
}

impl PollRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start polling under `key`, cancelling whatever session held it.
    pub fn start(
        &self,
        poller: &Poller,
        key: impl Into<String>,
        task: TaskLocator,
        kind: JobKind,
        observer: Arc<dyn PollObserver>,
    ) -> PollSession {
        let session = poller.start(task, kind, observer);
        self.insert(key, &session);
        session
    }

    /// Register an already running session under `key`, dropping entries of finished sessions.
    ///
    /// Returns the replaced session if it was still tracked; an active one has been cancelled.
    pub fn insert(&self, key: impl Into<String>, session: &PollSession) -> Option<SessionControl> {
        let key = key.into();
        let previous = {
            let mut inner = self.write();
            inner.retain(|_, control| !control.is_terminated());
            inner.insert(key.clone(), session.control())
        };

        if let Some(prev) = &previous
            && !prev.is_terminated()
        {
            debug!(%key, task = %prev.task(), "replacing active poll session");
            prev.cancel();
        }
        previous
    }

    /// Cancel and forget the session under `key`. Returns `true` if it was still active.
    pub fn cancel(&self, key: &str) -> bool {
        match self.write().remove(key) {
            Some(control) => {
                let active = !control.is_terminated();
                control.cancel();
                active
            }
            None => false,
        }
    }

    /// Cancel every session; used on teardown. Returns how many were still active.
    pub fn cancel_all(&self) -> usize {
        let drained: Vec<SessionControl> = self.write().drain().map(|(_, c)| c).collect();
        drained
            .into_iter()
            .filter(|control| {
                let active = !control.is_terminated();
                control.cancel();
                active
            })
            .count()
    }

    /// Session registered under `key`, if still active.
    pub fn get(&self, key: &str) -> Option<SessionControl> {
        self.read()
            .get(key)
            .filter(|control| !control.is_terminated())
            .cloned()
    }

    pub fn is_active(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Active sessions as `(key, task)` pairs; terminated entries are pruned.
    pub fn active(&self) -> Vec<(String, TaskLocator)> {
        let mut inner = self.write();
        inner.retain(|_, control| !control.is_terminated());

        let mut active: Vec<(String, TaskLocator)> = inner
            .iter()
            .map(|(key, control)| (key.clone(), control.task().clone()))
            .collect();
        active.sort_by(|a, b| a.0.cmp(&b.0));
        active
    }

    pub fn len(&self) -> usize {
        self.read()
            .values()
            .filter(|control| !control.is_terminated())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.read().len()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, SessionControl>> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, SessionControl>> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}
