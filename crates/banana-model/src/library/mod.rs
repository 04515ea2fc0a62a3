mod query;
pub use query::{Page, PageQuery};

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ModelError;

/// An image stored in the materials library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub id: String,
    /// Owning project, `None` for global materials.
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    /// Backend-relative or absolute image URL.
    pub url: String,
    #[serde(default)]
    pub relative_path: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Material {
    /// Display name: the filename, or the last URL segment.
    pub fn display_name(&self) -> &str {
        match self.filename.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => self.url.rsplit('/').next().unwrap_or(&self.url),
        }
    }
}

/// Which materials a listing covers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum MaterialScope {
    /// Every material, global and per-project.
    #[default]
    All,
    /// Materials not attached to any project.
    Global,
    Project(String),
}

impl MaterialScope {
    /// Value of the `project_id` query parameter.
    pub fn as_param(&self) -> &str {
        match self {
            MaterialScope::All => "all",
            MaterialScope::Global => "none",
            MaterialScope::Project(id) => id,
        }
    }
}

impl FromStr for MaterialScope {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" => Err(ModelError::InvalidScope(s.to_string())),
            "all" => Ok(MaterialScope::All),
            "none" | "global" => Ok(MaterialScope::Global),
            id => Ok(MaterialScope::Project(id.to_string())),
        }
    }
}

impl fmt::Display for MaterialScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_param())
    }
}

/// A deck generation project, as listed in the history view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    #[serde(alias = "id")]
    pub project_id: String,
    #[serde(default)]
    pub idea_prompt: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub pages: Vec<Value>,
}

impl Project {
    /// Title shown for the project: its idea prompt, or a placeholder.
    pub fn title(&self) -> &str {
        self.idea_prompt
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or("untitled project")
    }
}

/// Listing returned by the projects endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectList {
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub total: Option<usize>,
}

impl ProjectList {
    pub fn into_page(self) -> ProjectPage {
        let total = self.total.unwrap_or(self.projects.len());
        Page {
            items: self.projects,
            total,
        }
    }
}

/// One page of the project history.
pub type ProjectPage = Page<Project>;

/// Patch applied to a project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idea_prompt: Option<String>,
}

/// Parse state of an uploaded reference document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ParseStatus {
    Pending,
    Parsing,
    Completed,
    Failed,
    Other(String),
}

impl From<String> for ParseStatus {
    fn from(raw: String) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "pending" => ParseStatus::Pending,
            "parsing" => ParseStatus::Parsing,
            "completed" => ParseStatus::Completed,
            "failed" => ParseStatus::Failed,
            _ => ParseStatus::Other(raw),
        }
    }
}

impl From<ParseStatus> for String {
    fn from(status: ParseStatus) -> Self {
        match status {
            ParseStatus::Pending => "pending".into(),
            ParseStatus::Parsing => "parsing".into(),
            ParseStatus::Completed => "completed".into(),
            ParseStatus::Failed => "failed".into(),
            ParseStatus::Other(raw) => raw,
        }
    }
}

/// A document uploaded to feed project generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceFile {
    pub id: String,
    pub filename: String,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub file_size: Option<u64>,
    #[serde(default = "default_parse_status")]
    pub parse_status: ParseStatus,
    #[serde(default)]
    pub error_message: Option<String>,
}

fn default_parse_status() -> ParseStatus {
    ParseStatus::Pending
}

/// A slide template uploaded by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserTemplate {
    pub template_id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub template_image_url: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn material_display_name_falls_back_to_url() {
        let m: Material = serde_json::from_value(json!({
            "id": "m1",
            "url": "/files/materials/cat.png"
        }))
        .unwrap();
        assert_eq!(m.display_name(), "cat.png");
    }

    #[test]
    fn material_scope_params() {
        assert_eq!("all".parse::<MaterialScope>().unwrap().as_param(), "all");
        assert_eq!("global".parse::<MaterialScope>().unwrap().as_param(), "none");
        assert_eq!(
            "p-1".parse::<MaterialScope>().unwrap(),
            MaterialScope::Project("p-1".into())
        );
        assert!("".parse::<MaterialScope>().is_err());
    }

    #[test]
    fn project_list_total_defaults_to_len() {
        let list: ProjectList = serde_json::from_value(json!({
            "projects": [{"project_id": "a"}, {"id": "b", "idea_prompt": "Q3 review"}]
        }))
        .unwrap();
        let page = list.into_page();
        assert_eq!(page.total, 2);
        assert_eq!(page.items[0].title(), "untitled project");
        assert_eq!(page.items[1].title(), "Q3 review");
    }

    #[test]
    fn reference_file_parse_status() {
        let file: ReferenceFile = serde_json::from_value(json!({
            "id": "f1",
            "filename": "brief.pdf",
            "parse_status": "PARSING"
        }))
        .unwrap();
        assert_eq!(file.parse_status, ParseStatus::Parsing);

        let file: ReferenceFile =
            serde_json::from_value(json!({"id": "f2", "filename": "notes.md"})).unwrap();
        assert_eq!(file.parse_status, ParseStatus::Pending);
    }
}
