use std::fmt;

use serde::{Deserialize, Serialize};

/// Backend-reported state of an asynchronous job.
///
/// The wire vocabulary is upper-case (`PENDING`, `RUNNING`, `COMPLETED`, `FAILED`).
/// `PROCESSING` is accepted as a synonym for `RUNNING`.
/// Anything else is kept verbatim in [`TaskStatus::Unknown`] and treated as non-terminal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TaskStatus {
    /// Job is queued and has not started.
    Pending,
    /// Job is executing.
    Running,
    /// Job finished and produced a result.
    Completed,
    /// Job finished with an error.
    Failed,
    /// Status outside the known vocabulary.
    Unknown(String),
}

impl TaskStatus {
    /// Returns `true` if the job won't transition further.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Completed | TaskStatus::Failed)
    }

    /// Returns `true` if the job is still pending or running.
    pub fn is_active(&self) -> bool {
        matches!(self, TaskStatus::Pending | TaskStatus::Running)
    }

    /// Returns `true` for statuses outside the known vocabulary.
    pub fn is_unknown(&self) -> bool {
        matches!(self, TaskStatus::Unknown(_))
    }

    /// Whether an observation of `next` may follow an observation of `self`.
    ///
    /// Statuses only move forward along `PENDING -> RUNNING -> {COMPLETED | FAILED}`.
    /// Re-observing the same status is allowed; leaving a terminal state is not.
    /// Unknown statuses carry no ordering information and are always accepted.
    pub fn can_transition_to(&self, next: &TaskStatus) -> bool {
        match (self.rank(), next.rank()) {
            (Some(from), Some(to)) => {
                if self.is_terminal() {
                    self == next
                } else {
                    to >= from
                }
            }
            _ => !self.is_terminal(),
        }
    }

    /// Wire representation.
    pub fn as_str(&self) -> &str {
        match self {
            TaskStatus::Pending => "PENDING",
            TaskStatus::Running => "RUNNING",
            TaskStatus::Completed => "COMPLETED",
            TaskStatus::Failed => "FAILED",
            TaskStatus::Unknown(raw) => raw,
        }
    }

    fn rank(&self) -> Option<u8> {
        match self {
            TaskStatus::Pending => Some(0),
            TaskStatus::Running => Some(1),
            TaskStatus::Completed | TaskStatus::Failed => Some(2),
            TaskStatus::Unknown(_) => None,
        }
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::Pending
    }
}

impl From<&str> for TaskStatus {
    fn from(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "PENDING" => TaskStatus::Pending,
            "RUNNING" | "PROCESSING" => TaskStatus::Running,
            "COMPLETED" => TaskStatus::Completed,
            "FAILED" => TaskStatus::Failed,
            _ => TaskStatus::Unknown(raw.to_string()),
        }
    }
}

impl From<String> for TaskStatus {
    fn from(raw: String) -> Self {
        TaskStatus::from(raw.as_str())
    }
}

impl From<TaskStatus> for String {
    fn from(status: TaskStatus) -> Self {
        match status {
            TaskStatus::Unknown(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        assert!(TaskStatus::Completed.is_terminal());
        assert!(TaskStatus::Failed.is_terminal());

        assert!(!TaskStatus::Pending.is_terminal());
        assert!(!TaskStatus::Running.is_terminal());
        assert!(!TaskStatus::Unknown("QUEUED".into()).is_terminal());
    }

    #[test]
    fn active_states() {
        assert!(TaskStatus::Pending.is_active());
        assert!(TaskStatus::Running.is_active());

        assert!(!TaskStatus::Completed.is_active());
        assert!(!TaskStatus::Unknown("QUEUED".into()).is_active());
    }

    #[test]
    fn processing_is_running() {
        let status: TaskStatus = serde_json::from_str(r#""PROCESSING""#).unwrap();
        assert_eq!(status, TaskStatus::Running);
    }

    #[test]
    fn unknown_status_is_preserved() {
        let status: TaskStatus = serde_json::from_str(r#""PAUSED""#).unwrap();
        assert_eq!(status, TaskStatus::Unknown("PAUSED".into()));
        assert_eq!(serde_json::to_string(&status).unwrap(), r#""PAUSED""#);
    }

    #[test]
    fn serializes_upper_case() {
        let json = serde_json::to_string(&TaskStatus::Running).unwrap();
        assert_eq!(json, r#""RUNNING""#);
    }

    #[test]
    fn transitions_are_monotonic() {
        assert!(TaskStatus::Pending.can_transition_to(&TaskStatus::Running));
        assert!(TaskStatus::Pending.can_transition_to(&TaskStatus::Completed));
        assert!(TaskStatus::Running.can_transition_to(&TaskStatus::Running));
        assert!(TaskStatus::Running.can_transition_to(&TaskStatus::Failed));

        assert!(!TaskStatus::Running.can_transition_to(&TaskStatus::Pending));
        assert!(!TaskStatus::Completed.can_transition_to(&TaskStatus::Running));
        assert!(!TaskStatus::Failed.can_transition_to(&TaskStatus::Completed));
        assert!(!TaskStatus::Completed.can_transition_to(&TaskStatus::Unknown("X".into())));
        assert!(TaskStatus::Running.can_transition_to(&TaskStatus::Unknown("X".into())));
    }
}
