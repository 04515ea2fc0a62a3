use serde::{Deserialize, Serialize};

/// Response body of the backend.
///
/// Most routes wrap their payload as `{"success": true, "data": ...}`, a few answer with
/// the payload itself; both forms decode.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Envelope<T> {
    Wrapped {
        #[serde(default)]
        success: Option<bool>,
        data: T,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },
    Bare(T),
}

impl<T> Envelope<T> {
    pub fn wrap(data: T) -> Self {
        Envelope::Wrapped {
            success: Some(true),
            data,
            message: None,
        }
    }

    pub fn into_data(self) -> T {
        match self {
            Envelope::Wrapped { data, .. } => data,
            Envelope::Bare(data) => data,
        }
    }
}

/// Error body of a non-2xx response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetail>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorDetail {
    Structured {
        #[serde(default)]
        message: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        code: Option<String>,
    },
    Text(String),
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: Some(ErrorDetail::Structured {
                message: Some(message.into()),
                code: None,
            }),
            message: None,
        }
    }

    /// Human-readable reason: `error.message`, then `error` as text, then `message`.
    pub fn reason(&self) -> Option<&str> {
        let detail = match &self.error {
            Some(ErrorDetail::Structured { message, .. }) => message.as_deref(),
            Some(ErrorDetail::Text(text)) => Some(text.as_str()),
            None => None,
        };
        detail
            .into_iter()
            .chain(self.message.as_deref())
            .map(str::trim)
            .find(|s| !s.is_empty())
    }
}
