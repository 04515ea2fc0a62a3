use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::lenient;

/// Progress block attached to a task snapshot.
///
/// Counters are decoded leniently: negative or fractional values and numeric strings are
/// coerced, junk falls back to 0 or `None`. Percent clamping is the interpreter's job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskProgress {
    /// Number of work items in the job.
    #[serde(default, deserialize_with = "lenient::count")]
    pub total: u64,
    /// Number of finished work items.
    #[serde(default, deserialize_with = "lenient::count")]
    pub completed: u64,
    /// Number of failed work items, when the backend tracks them.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::opt_count")]
    pub failed: Option<u64>,
    /// Explicit percentage, which may be out of range.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::opt_number")]
    pub percent: Option<f64>,
    /// Label of the step currently executing.
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::or_none")]
    pub current_step: Option<String>,
    /// Log lines, oldest first.
    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "lenient::lines")]
    pub messages: Vec<String>,
    /// Job-specific fields the backend stores next to the counters
    /// (material generation reports its `image_url` here).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TaskProgress {
    pub fn new(completed: u64, total: u64) -> Self {
        Self {
            total,
            completed,
            ..Default::default()
        }
    }

    pub fn with_percent(mut self, percent: f64) -> Self {
        self.percent = Some(percent);
        self
    }

    pub fn with_step(mut self, step: impl Into<String>) -> Self {
        self.current_step = Some(step.into());
        self
    }

    /// Append a log line; messages are never reordered.
    pub fn push_message(&mut self, line: impl Into<String>) {
        self.messages.push(line.into());
    }

    /// Most recent log line.
    pub fn last_message(&self) -> Option<&str> {
        self.messages.last().map(String::as_str)
    }

    /// Look up a job-specific extra field.
    pub fn extra(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }
}
