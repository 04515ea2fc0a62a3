use std::path::Path;

use banana_model::ReferenceFile;
use reqwest::{Method, multipart::Form};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{ApiClient, client::file_part, error::ClientError};

#[derive(Debug, Deserialize)]
struct FileEnvelope {
    file: ReferenceFile,
}

#[derive(Debug, Serialize)]
struct AssociateFile<'a> {
    project_id: &'a str,
}

impl ApiClient {
    /// Upload a reference document (PDF, Office, Markdown).
    pub async fn upload_reference_file(
        &self,
        path: &Path,
        project_id: Option<&str>,
    ) -> Result<ReferenceFile, ClientError> {
        let mut form = Form::new().part("file", file_part(path).await?);
        if let Some(project) = project_id {
            form = form.text("project_id", project.to_string());
        }

        let request = self
            .request(Method::POST, &["api", "reference-files", "upload"])?
            .multipart(form);
        let FileEnvelope { file } = self.fetch(request).await?;
        info!(id = %file.id, filename = %file.filename, "reference file uploaded");
        Ok(file)
    }

    pub async fn associate_reference_file(
        &self,
        file_id: &str,
        project_id: &str,
    ) -> Result<ReferenceFile, ClientError> {
        let request = self
            .request(Method::POST, &["api", "reference-files", file_id, "associate"])?
            .json(&AssociateFile { project_id });
        let FileEnvelope { file } = self.fetch(request).await?;
        Ok(file)
    }

    /// Start parsing a reference file. Returns as soon as the backend accepts; parsing
    /// continues server-side and is observed through the file's `parse_status`.
    pub async fn trigger_parse(&self, file_id: &str) -> Result<ReferenceFile, ClientError> {
        let request = self.request(Method::POST, &["api", "reference-files", file_id, "parse"])?;
        let FileEnvelope { file } = self.fetch(request).await?;
        info!(id = %file.id, status = ?file.parse_status, "reference file parse triggered");
        Ok(file)
    }
}
