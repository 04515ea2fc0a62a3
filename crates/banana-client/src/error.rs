use std::path::PathBuf;

use banana_core::BackendError;
use banana_model::ModelError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("backend returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("invalid response: {0}")]
    Decode(String),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("backend did not return a task id")]
    MissingTaskId,

    #[error(transparent)]
    Invalid(#[from] ModelError),
}

impl ClientError {
    /// HTTP status of a rejected request.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            ClientError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

impl From<ClientError> for BackendError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Http(e) if e.is_decode() => BackendError::Decode(e.to_string()),
            ClientError::Http(e) => BackendError::Transport(e.to_string()),
            ClientError::Status { status, message } => BackendError::Status { status, message },
            ClientError::Decode(msg) => BackendError::Decode(msg),
            ClientError::MissingTaskId => BackendError::MissingTaskId,
            err @ (ClientError::Io { .. } | ClientError::InvalidUrl(_) | ClientError::Invalid(_)) => {
                BackendError::Invalid(err.to_string())
            }
        }
    }
}
