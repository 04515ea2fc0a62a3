use banana_model::{ModelError, TaskLocator};
use thiserror::Error;

/// Failure talking to the backend.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("backend returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("invalid response: {0}")]
    Decode(String),

    #[error("backend did not return a task id")]
    MissingTaskId,

    #[error("invalid request: {0}")]
    Invalid(String),
}

/// Why a job did not produce a result.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JobError {
    /// Rejected locally before anything was sent.
    #[error("invalid job: {0}")]
    Invalid(#[from] ModelError),

    /// The backend refused to start the job; no polling took place.
    #[error("submission rejected: {0}")]
    Submission(#[source] BackendError),

    /// A status check failed on the final allowed attempt.
    #[error("status check failed: {0}")]
    PollTransient(#[source] BackendError),

    /// Attempt or wall-clock budget exhausted while the job was still running.
    #[error("{task} still unfinished after {attempts} status checks ({elapsed_ms} ms)")]
    PollTimeout {
        task: TaskLocator,
        attempts: u32,
        elapsed_ms: u64,
    },

    /// The backend reported the job as failed.
    #[error("{0}")]
    JobFailed(String),

    #[error("polling cancelled")]
    Cancelled,
}

impl JobError {
    /// User-facing text; never empty.
    pub fn user_message(&self) -> String {
        match self {
            JobError::JobFailed(msg) if !msg.trim().is_empty() => msg.clone(),
            JobError::JobFailed(_) => crate::GENERIC_FAILURE.to_string(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("poll interval must be greater than zero")]
    ZeroInterval,
    #[error("max attempts must be at least 1")]
    ZeroAttempts,
    #[error("poll timeout must be greater than zero")]
    ZeroTimeout,
}
