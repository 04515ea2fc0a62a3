use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::lenient;
use crate::{TaskId, TaskProgress, TaskStatus};

/// One observation of a backend job, as returned by a status query.
///
/// Project tasks and settings-service tests share this shape; fields a given endpoint
/// doesn't send stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskSnapshot {
    /// Job identifier, echoed by project task endpoints.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<TaskId>,
    /// Backend job type label (e.g. `GENERATE_MATERIAL`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_type: Option<String>,
    /// Current execution state.
    pub status: TaskStatus,
    /// Dropped rather than failing the snapshot when it can't be decoded.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::or_none")]
    pub progress: Option<TaskProgress>,
    /// Job-specific payload, set once the job completes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Failure description used by project tasks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Failure description used by settings tests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Free-form status message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
}

impl TaskSnapshot {
    pub fn new(status: TaskStatus) -> Self {
        Self {
            status,
            ..Default::default()
        }
    }

    pub fn with_progress(mut self, progress: TaskProgress) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn with_result(mut self, result: Value) -> Self {
        self.result = Some(result);
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// First non-blank failure description, checking `error_message`, `error`, then `message`.
    pub fn failure_text(&self) -> Option<&str> {
        [&self.error_message, &self.error, &self.message]
            .into_iter()
            .filter_map(|s| s.as_deref())
            .map(str::trim)
            .find(|s| !s.is_empty())
    }
}
