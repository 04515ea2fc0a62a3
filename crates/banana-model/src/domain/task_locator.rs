use std::fmt;

use serde::{Deserialize, Serialize};

use crate::TaskId;

/// Project id the backend files tasks under when no project is selected.
pub const GLOBAL_PROJECT: &str = "global";

/// Where a job's status is queried.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "scope", content = "project_id")]
pub enum TaskScope {
    /// Task tracked under a project (`/api/projects/{id}/tasks/{task}`).
    Project(String),
    /// Settings-service connectivity test (`/api/settings/test/status/{task}`).
    SettingsTest,
}

impl TaskScope {
    /// Project scope, falling back to the global bucket.
    pub fn project(project_id: Option<&str>) -> Self {
        match project_id.map(str::trim).filter(|p| !p.is_empty()) {
            Some(id) => TaskScope::Project(id.to_string()),
            None => TaskScope::Project(GLOBAL_PROJECT.to_string()),
        }
    }
}

/// A submitted job: identifier plus the scope needed to query it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskLocator {
    pub id: TaskId,
    pub scope: TaskScope,
}

impl TaskLocator {
    pub fn new(id: impl Into<TaskId>, scope: TaskScope) -> Self {
        Self {
            id: id.into(),
            scope,
        }
    }
}

impl fmt::Display for TaskLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.scope {
            TaskScope::Project(project) => write!(f, "{project}/{}", self.id),
            TaskScope::SettingsTest => write!(f, "settings-test/{}", self.id),
        }
    }
}
