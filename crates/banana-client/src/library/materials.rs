use std::path::Path;

use banana_model::{Material, MaterialScope};
use reqwest::{Method, multipart::Form};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{ApiClient, client::file_part, error::ClientError};

#[derive(Debug, Deserialize)]
struct MaterialList {
    #[serde(default)]
    materials: Vec<Material>,
}

#[derive(Debug, Serialize)]
struct AssociateRequest<'a> {
    project_id: &'a str,
    material_urls: &'a [String],
}

#[derive(Debug, Default, Deserialize)]
struct AssociateResult {
    #[serde(default)]
    updated_ids: Vec<String>,
}

#[derive(Debug, Serialize)]
struct DownloadRequest<'a> {
    material_ids: &'a [String],
}

impl ApiClient {
    pub async fn list_materials(&self, scope: &MaterialScope) -> Result<Vec<Material>, ClientError> {
        let request = self
            .request(Method::GET, &["api", "materials"])?
            .query(&[("project_id", scope.as_param())]);
        let list: MaterialList = self.fetch(request).await?;
        debug!(%scope, count = list.materials.len(), "materials listed");
        Ok(list.materials)
    }

    /// Upload an image into the library, attached to `project_id` or global.
    pub async fn upload_material(&self, path: &Path, project_id: Option<&str>) -> Result<Material, ClientError> {
        let form = Form::new().part("file", file_part(path).await?);
        let mut request = self.request(Method::POST, &["api", "materials", "upload"])?;
        if let Some(project) = project_id {
            request = request.query(&[("project_id", project)]);
        }

        let material: Material = self.fetch(request.multipart(form)).await?;
        info!(id = %material.id, url = %material.url, "material uploaded");
        Ok(material)
    }

    pub async fn delete_material(&self, id: &str) -> Result<(), ClientError> {
        self.execute(self.request(Method::DELETE, &["api", "materials", id])?)
            .await?;
        info!(%id, "material deleted");
        Ok(())
    }

    /// Attach global materials, given by URL, to a project. Returns the updated material ids.
    pub async fn associate_materials(
        &self,
        project_id: &str,
        material_urls: &[String],
    ) -> Result<Vec<String>, ClientError> {
        let body = AssociateRequest {
            project_id,
            material_urls,
        };
        let request = self
            .request(Method::POST, &["api", "materials", "associate"])?
            .json(&body);
        let result: AssociateResult = self.fetch(request).await?;
        Ok(result.updated_ids)
    }

    /// Zip archive of the given materials.
    pub async fn download_materials_zip(&self, material_ids: &[String]) -> Result<Vec<u8>, ClientError> {
        let request = self
            .request(Method::POST, &["api", "materials", "download"])?
            .json(&DownloadRequest { material_ids });
        let archive = self.fetch_bytes(request).await?;
        debug!(count = material_ids.len(), bytes = archive.len(), "materials archive downloaded");
        Ok(archive)
    }
}
