use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("prompt must not be empty")]
    EmptyPrompt,
    #[error("{field} must be within {min}..={max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },
    #[error("invalid aspect ratio: {0} (expected W:H)")]
    InvalidAspectRatio(String),
    #[error("unknown service: {0} (expected: text-model|caption-model|baidu-ocr|baidu-inpaint|image-model|mineru-pdf)")]
    UnknownService(String),
    #[error("invalid image resolution: {0} (expected: 1K|2K|4K)")]
    InvalidResolution(String),
    #[error("invalid provider format: {0} (expected: openai|gemini)")]
    InvalidProvider(String),
    #[error("invalid material scope: {0}")]
    InvalidScope(String),
}
