use std::path::Path;

use banana_model::UserTemplate;
use reqwest::{Method, multipart::Form};
use serde::Deserialize;
use tracing::info;

use crate::{ApiClient, client::file_part, error::ClientError};

#[derive(Debug, Deserialize)]
struct TemplateList {
    #[serde(default)]
    templates: Vec<UserTemplate>,
}

impl ApiClient {
    pub async fn list_user_templates(&self) -> Result<Vec<UserTemplate>, ClientError> {
        let list: TemplateList = self
            .fetch(self.request(Method::GET, &["api", "user-templates"])?)
            .await?;
        Ok(list.templates)
    }

    pub async fn upload_user_template(&self, path: &Path, name: Option<&str>) -> Result<UserTemplate, ClientError> {
        let mut form = Form::new().part("template_image", file_part(path).await?);
        if let Some(name) = name.map(str::trim).filter(|n| !n.is_empty()) {
            form = form.text("name", name.to_string());
        }

        let request = self
            .request(Method::POST, &["api", "user-templates"])?
            .multipart(form);
        let template: UserTemplate = self.fetch(request).await?;
        info!(id = %template.template_id, "user template uploaded");
        Ok(template)
    }

    pub async fn delete_user_template(&self, id: &str) -> Result<(), ClientError> {
        self.execute(self.request(Method::DELETE, &["api", "user-templates", id])?)
            .await?;
        info!(%id, "user template deleted");
        Ok(())
    }
}
