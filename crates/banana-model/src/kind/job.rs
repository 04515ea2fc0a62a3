use std::{fmt, path::PathBuf, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{ModelError, SettingsUpdate, TaskScope};

/// Backend service exercised by a settings connectivity test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceKind {
    /// Chat/text generation model.
    TextModel,
    /// Image captioning model.
    CaptionModel,
    /// Baidu OCR text recognition.
    BaiduOcr,
    /// Baidu image inpainting.
    BaiduInpaint,
    /// Image generation model.
    ImageModel,
    /// MinerU PDF parsing.
    MineruPdf,
}

impl ServiceKind {
    pub const ALL: [ServiceKind; 6] = [
        ServiceKind::TextModel,
        ServiceKind::CaptionModel,
        ServiceKind::BaiduOcr,
        ServiceKind::BaiduInpaint,
        ServiceKind::ImageModel,
        ServiceKind::MineruPdf,
    ];

    /// Path segment used by the test endpoints.
    pub fn slug(&self) -> &'static str {
        match self {
            ServiceKind::TextModel => "text-model",
            ServiceKind::CaptionModel => "caption-model",
            ServiceKind::BaiduOcr => "baidu-ocr",
            ServiceKind::BaiduInpaint => "baidu-inpaint",
            ServiceKind::ImageModel => "image-model",
            ServiceKind::MineruPdf => "mineru-pdf",
        }
    }
}

impl FromStr for ServiceKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s.trim().to_ascii_lowercase().replace('_', "-");
        ServiceKind::ALL
            .into_iter()
            .find(|kind| kind.slug() == norm)
            .ok_or_else(|| ModelError::UnknownService(s.to_string()))
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Kind of asynchronous job, independent of its parameters.
///
/// Determines where the job's status lives and which result field summarises it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum JobKind {
    /// Generate a material image from a prompt.
    GenerateMaterial,
    /// Connectivity test of a configured service.
    TestService(ServiceKind),
}

impl JobKind {
    /// Short symbolic identifier, intended for logging and registry keys.
    pub fn kind(&self) -> &'static str {
        match self {
            JobKind::GenerateMaterial => "generate-material",
            JobKind::TestService(service) => match service {
                ServiceKind::TextModel => "test-text-model",
                ServiceKind::CaptionModel => "test-caption-model",
                ServiceKind::BaiduOcr => "test-baidu-ocr",
                ServiceKind::BaiduInpaint => "test-baidu-inpaint",
                ServiceKind::ImageModel => "test-image-model",
                ServiceKind::MineruPdf => "test-mineru-pdf",
            },
        }
    }

    /// Phrase used in user notifications.
    pub fn label(&self) -> &'static str {
        match self {
            JobKind::GenerateMaterial => "material generation",
            JobKind::TestService(service) => match service {
                ServiceKind::TextModel => "text model test",
                ServiceKind::CaptionModel => "caption model test",
                ServiceKind::BaiduOcr => "OCR test",
                ServiceKind::BaiduInpaint => "inpainting test",
                ServiceKind::ImageModel => "image model test",
                ServiceKind::MineruPdf => "MinerU parsing test",
            },
        }
    }

    /// Result fields carrying the job's headline value, in lookup order.
    pub fn result_fields(&self) -> &'static [&'static str] {
        match self {
            JobKind::GenerateMaterial => &["image_url"],
            JobKind::TestService(service) => match service {
                ServiceKind::TextModel => &["reply", "text"],
                ServiceKind::CaptionModel => &["caption"],
                ServiceKind::BaiduOcr => &["recognized_text", "text"],
                ServiceKind::BaiduInpaint => &["output_size", "image_size"],
                ServiceKind::ImageModel => &["image_url", "output_size", "image_size"],
                ServiceKind::MineruPdf => &["content_preview", "content", "batch_id"],
            },
        }
    }

    /// Whether a completed job without its headline field is worth warning about.
    pub fn expects_result(&self) -> bool {
        matches!(self, JobKind::GenerateMaterial)
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind())
    }
}

/// Parameters of a material generation job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialJob {
    /// Target project; `None` stores the result in the global library.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    /// Text prompt.
    pub prompt: String,
    /// Main reference image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_image: Option<PathBuf>,
    /// Additional reference images.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extra_images: Vec<PathBuf>,
}

impl MaterialJob {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    pub fn with_project(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    pub fn with_ref_image(mut self, path: impl Into<PathBuf>) -> Self {
        self.ref_image = Some(path.into());
        self
    }

    pub fn with_extra_image(mut self, path: impl Into<PathBuf>) -> Self {
        self.extra_images.push(path.into());
        self
    }

    /// Project id sent to the generation endpoint; `none` targets the global library.
    pub fn submit_project(&self) -> &str {
        self.project_id
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .unwrap_or("none")
    }
}

/// A job-kind selector together with its parameter payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum JobRequest {
    GenerateMaterial(MaterialJob),
    TestService {
        service: ServiceKind,
        /// Credentials and models to test with instead of the stored ones.
        #[serde(default)]
        overrides: SettingsUpdate,
    },
}

impl JobRequest {
    pub fn test(service: ServiceKind) -> Self {
        JobRequest::TestService {
            service,
            overrides: SettingsUpdate::default(),
        }
    }

    pub fn kind(&self) -> JobKind {
        match self {
            JobRequest::GenerateMaterial(_) => JobKind::GenerateMaterial,
            JobRequest::TestService { service, .. } => JobKind::TestService(*service),
        }
    }

    /// Scope the resulting task will be tracked under.
    pub fn scope(&self) -> TaskScope {
        match self {
            JobRequest::GenerateMaterial(job) => TaskScope::project(job.project_id.as_deref()),
            JobRequest::TestService { .. } => TaskScope::SettingsTest,
        }
    }

    /// Client-side checks done before anything is sent.
    pub fn validate(&self) -> Result<(), ModelError> {
        match self {
            JobRequest::GenerateMaterial(job) => {
                if job.prompt.trim().is_empty() {
                    return Err(ModelError::EmptyPrompt);
                }
                Ok(())
            }
            JobRequest::TestService { overrides, .. } => overrides.validate(),
        }
    }
}
