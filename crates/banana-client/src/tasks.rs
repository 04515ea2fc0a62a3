use async_trait::async_trait;
use banana_core::{BackendError, TaskBackend};
use banana_model::{
    JobRequest, MaterialJob, ServiceKind, SettingsUpdate, TaskId, TaskLocator, TaskScope,
    TaskSnapshot,
};
use reqwest::{Method, multipart::Form};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::{ApiClient, client::file_part, error::ClientError};

/// Acknowledgement of a job submission.
#[derive(Debug, Deserialize)]
struct TaskAccepted {
    #[serde(default)]
    task_id: Option<String>,
}

impl TaskAccepted {
    fn into_locator(self, scope: TaskScope) -> Result<TaskLocator, ClientError> {
        match self.task_id.map(TaskId::from) {
            Some(id) if !id.is_empty() => Ok(TaskLocator::new(id, scope)),
            _ => Err(ClientError::MissingTaskId),
        }
    }
}

impl ApiClient {
    /// Queue an image generation job for the materials library.
    #[instrument(level = "debug", skip_all, fields(project = job.submit_project()))]
    pub async fn generate_material(&self, job: &MaterialJob) -> Result<TaskLocator, ClientError> {
        let mut form = Form::new().text("prompt", job.prompt.trim().to_string());
        if let Some(path) = &job.ref_image {
            form = form.part("ref_image", file_part(path).await?);
        }
        for path in &job.extra_images {
            form = form.part("extra_images", file_part(path).await?);
        }

        let request = self
            .request(
                Method::POST,
                &["api", "projects", job.submit_project(), "materials", "generate"],
            )?
            .multipart(form);
        let accepted: TaskAccepted = self.fetch(request).await?;
        accepted.into_locator(TaskScope::project(job.project_id.as_deref()))
    }

    /// Queue a connectivity test of one configured service.
    ///
    /// `overrides` are tested instead of the stored values without being saved.
    #[instrument(level = "debug", skip(self, overrides))]
    pub async fn test_service(
        &self,
        service: ServiceKind,
        overrides: &SettingsUpdate,
    ) -> Result<TaskLocator, ClientError> {
        overrides.validate()?;
        let request = self
            .request(Method::POST, &["api", "settings", "test", service.slug()])?
            .json(overrides);
        let accepted: TaskAccepted = self.fetch(request).await?;
        accepted.into_locator(TaskScope::SettingsTest)
    }

    /// Current snapshot of a submitted job.
    pub async fn task_status(&self, task: &TaskLocator) -> Result<TaskSnapshot, ClientError> {
        let id = task.id.as_str();
        let segments = match &task.scope {
            TaskScope::Project(project) => vec!["api", "projects", project.as_str(), "tasks", id],
            TaskScope::SettingsTest => vec!["api", "settings", "test", "status", id],
        };
        let snapshot: TaskSnapshot = self.fetch(self.request(Method::GET, &segments)?).await?;
        debug!(%task, status = %snapshot.status, "task status fetched");
        Ok(snapshot)
    }
}

#[async_trait]
impl TaskBackend for ApiClient {
    async fn submit(&self, job: &JobRequest) -> Result<TaskLocator, BackendError> {
        let task = match job {
            JobRequest::GenerateMaterial(material) => self.generate_material(material).await?,
            JobRequest::TestService { service, overrides } => {
                self.test_service(*service, overrides).await?
            }
        };
        Ok(task)
    }

    async fn status(&self, task: &TaskLocator) -> Result<TaskSnapshot, BackendError> {
        Ok(self.task_status(task).await?)
    }
}
