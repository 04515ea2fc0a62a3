use std::path::Path;

use banana_model::{Envelope, ErrorBody};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url, multipart::Part};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::{config::ClientConfig, error::ClientError};

/// Longest slice of an undecodable body quoted in errors.
const BODY_EXCERPT_CHARS: usize = 200;

/// HTTP client of the banana slides backend.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base: Url,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let raw = config.base_url.trim();
        let base =
            Url::parse(raw).map_err(|e| ClientError::InvalidUrl(format!("{raw}: {e}")))?;
        if base.cannot_be_a_base() || !matches!(base.scheme(), "http" | "https") {
            return Err(ClientError::InvalidUrl(raw.to_string()));
        }

        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { http, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Backend URL made of `segments` appended to the base path. Segments are percent-encoded.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub(crate) fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, ClientError> {
        Ok(self.http.request(method, self.endpoint(segments)?))
    }

    /// Send `request` and decode the (possibly enveloped) JSON payload.
    pub(crate) async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let response = checked(request.send().await?).await?;
        let body = response.text().await?;
        serde_json::from_str::<Envelope<T>>(&body)
            .map(Envelope::into_data)
            .map_err(|e| ClientError::Decode(format!("{e}, body: {}", excerpt(&body))))
    }

    /// Send `request`, ignoring the payload of a successful response.
    pub(crate) async fn execute(&self, request: RequestBuilder) -> Result<(), ClientError> {
        checked(request.send().await?).await?;
        Ok(())
    }

    /// Send `request` and return the raw response body.
    pub(crate) async fn fetch_bytes(&self, request: RequestBuilder) -> Result<Vec<u8>, ClientError> {
        let response = checked(request.send().await?).await?;
        Ok(response.bytes().await?.to_vec())
    }
}

/// Pass 2xx responses through; turn anything else into [`ClientError::Status`].
async fn checked(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    debug!(url = %response.url(), %status, "backend responded");
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let err = status_error(status, &body);
    warn!(%status, error = %err, "backend rejected request");
    Err(err)
}

pub(crate) fn status_error(status: StatusCode, body: &str) -> ClientError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.reason().map(str::to_string))
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());

    ClientError::Status {
        status: status.as_u16(),
        message,
    }
}

/// Multipart part holding the contents of the file at `path`.
pub(crate) async fn file_part(path: &Path) -> Result<Part, ClientError> {
    let bytes = tokio::fs::read(path).await.map_err(|source| ClientError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());

    Ok(Part::bytes(bytes).file_name(name).mime_str(mime_for(path))?)
}

fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "pdf" => "application/pdf",
        "md" => "text/markdown",
        "txt" => "text/plain",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        _ => "application/octet-stream",
    }
}

fn excerpt(body: &str) -> String {
    let mut chars = body.chars();
    let head: String = chars.by_ref().take(BODY_EXCERPT_CHARS).collect();
    if chars.next().is_some() { format!("{head}…") } else { head }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(&ClientConfig::new(base)).unwrap()
    }

    #[test]
    fn endpoint_appends_segments_to_base_path() {
        let c = client("http://localhost:5000");
        assert_eq!(
            c.endpoint(&["api", "projects", "p 1", "tasks"]).unwrap().as_str(),
            "http://localhost:5000/api/projects/p%201/tasks"
        );

        let c = client("https://example.com/banana/");
        assert_eq!(
            c.endpoint(&["api", "settings"]).unwrap().as_str(),
            "https://example.com/banana/api/settings"
        );
    }

    #[test]
    fn rejects_non_http_base() {
        assert!(matches!(
            ApiClient::new(&ClientConfig::new("mailto:someone@example.com")),
            Err(ClientError::InvalidUrl(_))
        ));
        assert!(matches!(
            ApiClient::new(&ClientConfig::new("not a url")),
            Err(ClientError::InvalidUrl(_))
        ));
    }

    #[test]
    fn status_error_prefers_error_message() {
        let err = status_error(
            StatusCode::BAD_REQUEST,
            r#"{"success":false,"error":{"code":"INVALID","message":"prompt is required"}}"#,
        );
        assert!(matches!(
            err,
            ClientError::Status { status: 400, ref message } if message == "prompt is required"
        ));

        let err = status_error(StatusCode::NOT_FOUND, r#"{"message":"no such task"}"#);
        assert!(matches!(err, ClientError::Status { ref message, .. } if message == "no such task"));
    }

    #[test]
    fn status_error_falls_back_to_reason_phrase() {
        let err = status_error(StatusCode::BAD_GATEWAY, "<html>upstream down</html>");
        assert!(matches!(
            err,
            ClientError::Status { status: 502, ref message } if message == "Bad Gateway"
        ));
    }

    #[test]
    fn mime_follows_extension() {
        assert_eq!(mime_for(Path::new("a/b/ref.PNG")), "image/png");
        assert_eq!(mime_for(Path::new("deck.pdf")), "application/pdf");
        assert_eq!(mime_for(Path::new("blob")), "application/octet-stream");
    }
}
