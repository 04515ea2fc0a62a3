//! Maps raw task snapshots to caller-facing views.
//!
//! The interpreter never fails: malformed progress is clamped, missing result fields yield an
//! empty summary, and failures always carry a non-empty message.

use banana_model::{JobKind, TaskProgress, TaskSnapshot, TaskStatus};
use serde_json::{Map, Value};

/// Message used when the backend reports a failure without any description.
pub const GENERIC_FAILURE: &str = "task failed";

const SUMMARY_MAX_CHARS: usize = 120;

/// Normalised progress of a job.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressView {
    /// Always within `0..=100`.
    pub percent: u8,
    pub completed: u64,
    pub total: u64,
    pub current_step: Option<String>,
    pub messages: Vec<String>,
}

/// Result of a completed job.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultView {
    /// One-line summary of the headline field; empty when the field is absent.
    pub summary: String,
    /// Job-specific payload as returned by the backend.
    pub payload: Value,
}

/// Failure of a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorView {
    /// Never empty.
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Interpretation {
    pub status: TaskStatus,
    pub progress: ProgressView,
    /// Set only for [`TaskStatus::Completed`].
    pub result: Option<ResultView>,
    /// Set only for [`TaskStatus::Failed`].
    pub error: Option<ErrorView>,
}

pub fn interpret(snapshot: &TaskSnapshot, kind: JobKind) -> Interpretation {
    let progress = snapshot
        .progress
        .as_ref()
        .map(progress_view)
        .unwrap_or_default();

    let result = match snapshot.status {
        TaskStatus::Completed => Some(result_view(snapshot, kind)),
        _ => None,
    };
    let error = match snapshot.status {
        TaskStatus::Failed => Some(ErrorView {
            message: snapshot
                .failure_text()
                .unwrap_or(GENERIC_FAILURE)
                .to_string(),
        }),
        _ => None,
    };

    Interpretation {
        status: snapshot.status.clone(),
        progress,
        result,
        error,
    }
}

pub fn progress_view(progress: &TaskProgress) -> ProgressView {
    ProgressView {
        percent: percent(progress),
        completed: progress.completed,
        total: progress.total,
        current_step: progress.current_step.clone(),
        messages: progress.messages.clone(),
    }
}

/// Explicit percent if present, else `completed / total`, else 0; clamped to `0..=100`.
pub fn percent(progress: &TaskProgress) -> u8 {
    let raw = match progress.percent {
        Some(explicit) => explicit,
        None if progress.total > 0 => progress.completed as f64 / progress.total as f64 * 100.0,
        None => 0.0,
    };
    if raw.is_nan() {
        return 0;
    }
    raw.round().clamp(0.0, 100.0) as u8
}

fn result_view(snapshot: &TaskSnapshot, kind: JobKind) -> ResultView {
    let extra = snapshot.progress.as_ref().map(|p| &p.extra);

    let payload = match (&snapshot.result, extra) {
        (Some(result), _) => result.clone(),
        (None, Some(extra)) if !extra.is_empty() => Value::Object(extra.clone()),
        _ => Value::Null,
    };

    let headline = kind
        .result_fields()
        .iter()
        .find_map(|field| lookup(snapshot.result.as_ref(), extra, field))
        .or_else(|| snapshot.result.as_ref().filter(|v| v.is_string()));

    ResultView {
        summary: headline.map(render).map(one_line).unwrap_or_default(),
        payload,
    }
}

fn lookup<'a>(
    result: Option<&'a Value>,
    extra: Option<&'a Map<String, Value>>,
    field: &str,
) -> Option<&'a Value> {
    result
        .and_then(|r| r.get(field))
        .or_else(|| extra.and_then(|e| e.get(field)))
        .filter(|v| !v.is_null())
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) if !items.is_empty() && items.iter().all(Value::is_number) => items
            .iter()
            .map(Value::to_string)
            .collect::<Vec<_>>()
            .join("x"),
        Value::Object(map) => match (map.get("width"), map.get("height")) {
            (Some(w), Some(h)) => format!("{w}x{h}"),
            _ => value.to_string(),
        },
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn one_line(text: String) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= SUMMARY_MAX_CHARS {
        return flat;
    }
    let mut cut: String = flat.chars().take(SUMMARY_MAX_CHARS).collect();
    cut.push('…');
    cut
}
