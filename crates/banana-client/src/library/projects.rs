use banana_model::{PageQuery, Project, ProjectList, ProjectPage, ProjectUpdate};
use reqwest::Method;
use tracing::{debug, info};

use crate::{ApiClient, error::ClientError};

impl ApiClient {
    /// One page of the project history, newest first.
    pub async fn list_projects(&self, query: PageQuery) -> Result<ProjectPage, ClientError> {
        let request = self
            .request(Method::GET, &["api", "projects"])?
            .query(&[("limit", query.limit), ("offset", query.offset)]);
        let list: ProjectList = self.fetch(request).await?;
        let page = list.into_page();
        debug!(count = page.items.len(), total = page.total, "projects listed");
        Ok(page)
    }

    pub async fn update_project(&self, id: &str, update: &ProjectUpdate) -> Result<Project, ClientError> {
        let request = self
            .request(Method::PUT, &["api", "projects", id])?
            .json(update);
        let project = self.fetch(request).await?;
        info!(%id, "project updated");
        Ok(project)
    }

    /// Rename a project; its title is the idea prompt.
    pub async fn rename_project(&self, id: &str, title: &str) -> Result<Project, ClientError> {
        let update = ProjectUpdate {
            idea_prompt: Some(title.trim().to_string()),
        };
        self.update_project(id, &update).await
    }

    pub async fn delete_project(&self, id: &str) -> Result<(), ClientError> {
        self.execute(self.request(Method::DELETE, &["api", "projects", id])?)
            .await?;
        info!(%id, "project deleted");
        Ok(())
    }
}
