use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::ModelError;

pub const MIN_WORKERS: u32 = 1;
pub const MAX_WORKERS: u32 = 20;

/// Wire protocol spoken to the AI provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderFormat {
    Openai,
    #[default]
    Gemini,
}

impl FromStr for ProviderFormat {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(ProviderFormat::Openai),
            "gemini" => Ok(ProviderFormat::Gemini),
            _ => Err(ModelError::InvalidProvider(s.to_string())),
        }
    }
}

/// Output resolution of generated slide images.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageResolution {
    #[serde(rename = "1K")]
    OneK,
    #[default]
    #[serde(rename = "2K")]
    TwoK,
    #[serde(rename = "4K")]
    FourK,
}

impl ImageResolution {
    /// Long edge in pixels.
    pub fn pixels(&self) -> u32 {
        match self {
            ImageResolution::OneK => 1024,
            ImageResolution::TwoK => 2048,
            ImageResolution::FourK => 4096,
        }
    }
}

impl FromStr for ImageResolution {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "1K" => Ok(ImageResolution::OneK),
            "2K" => Ok(ImageResolution::TwoK),
            "4K" => Ok(ImageResolution::FourK),
            _ => Err(ModelError::InvalidResolution(s.to_string())),
        }
    }
}

impl fmt::Display for ImageResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ImageResolution::OneK => "1K",
            ImageResolution::TwoK => "2K",
            ImageResolution::FourK => "4K",
        };
        f.write_str(s)
    }
}

/// Stored backend configuration.
///
/// Secrets are never returned; only their lengths are.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub ai_provider_format: ProviderFormat,
    #[serde(default)]
    pub api_base_url: Option<String>,
    /// Length of the stored API key, `0` when unset.
    #[serde(default)]
    pub api_key_length: usize,
    #[serde(default)]
    pub text_model: Option<String>,
    #[serde(default)]
    pub image_model: Option<String>,
    #[serde(default)]
    pub image_caption_model: Option<String>,
    #[serde(default)]
    pub mineru_api_base: Option<String>,
    /// Length of the stored MinerU token, `0` when unset.
    #[serde(default)]
    pub mineru_token_length: usize,
    #[serde(default)]
    pub image_resolution: ImageResolution,
    #[serde(default = "default_aspect_ratio")]
    pub image_aspect_ratio: String,
    #[serde(default = "default_description_workers")]
    pub max_description_workers: u32,
    #[serde(default = "default_image_workers")]
    pub max_image_workers: u32,
    #[serde(default = "default_output_language")]
    pub output_language: String,
}

fn default_aspect_ratio() -> String {
    "16:9".to_string()
}

fn default_description_workers() -> u32 {
    5
}

fn default_image_workers() -> u32 {
    8
}

fn default_output_language() -> String {
    "zh".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ai_provider_format: ProviderFormat::default(),
            api_base_url: None,
            api_key_length: 0,
            text_model: None,
            image_model: None,
            image_caption_model: None,
            mineru_api_base: None,
            mineru_token_length: 0,
            image_resolution: ImageResolution::default(),
            image_aspect_ratio: default_aspect_ratio(),
            max_description_workers: default_description_workers(),
            max_image_workers: default_image_workers(),
            output_language: default_output_language(),
        }
    }
}

impl Settings {
    pub fn has_api_key(&self) -> bool {
        self.api_key_length > 0
    }

    pub fn has_mineru_token(&self) -> bool {
        self.mineru_token_length > 0
    }
}

/// Partial settings update.
///
/// `None` fields are left untouched by the backend. Secrets are only sent when non-empty:
/// an empty key means "keep the stored one".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_provider_format: Option<ProviderFormat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_caption_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mineru_api_base: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mineru_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_resolution: Option<ImageResolution>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_aspect_ratio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_description_workers: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_image_workers: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_language: Option<String>,
}

impl SettingsUpdate {
    /// Update carrying every non-secret field of `current`.
    pub fn from_settings(current: &Settings) -> Self {
        Self {
            ai_provider_format: Some(current.ai_provider_format),
            api_base_url: current.api_base_url.clone(),
            api_key: None,
            text_model: current.text_model.clone(),
            image_model: current.image_model.clone(),
            image_caption_model: current.image_caption_model.clone(),
            mineru_api_base: current.mineru_api_base.clone(),
            mineru_token: None,
            image_resolution: Some(current.image_resolution),
            image_aspect_ratio: Some(current.image_aspect_ratio.clone()),
            max_description_workers: Some(current.max_description_workers),
            max_image_workers: Some(current.max_image_workers),
            output_language: Some(current.output_language.clone()),
        }
    }

    /// Set the API key; blank input keeps the stored key.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = non_blank(key.into());
        self
    }

    /// Set the MinerU token; blank input keeps the stored token.
    pub fn with_mineru_token(mut self, token: impl Into<String>) -> Self {
        self.mineru_token = non_blank(token.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self == &SettingsUpdate::default()
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        check_workers("max_description_workers", self.max_description_workers)?;
        check_workers("max_image_workers", self.max_image_workers)?;

        if let Some(ratio) = &self.image_aspect_ratio
            && !is_aspect_ratio(ratio)
        {
            return Err(ModelError::InvalidAspectRatio(ratio.clone()));
        }
        Ok(())
    }
}

fn non_blank(s: String) -> Option<String> {
    if s.trim().is_empty() { None } else { Some(s) }
}

fn check_workers(field: &'static str, value: Option<u32>) -> Result<(), ModelError> {
    match value {
        Some(v) if !(MIN_WORKERS..=MAX_WORKERS).contains(&v) => Err(ModelError::OutOfRange {
            field,
            value: v,
            min: MIN_WORKERS,
            max: MAX_WORKERS,
        }),
        _ => Ok(()),
    }
}

fn is_aspect_ratio(s: &str) -> bool {
    match s.split_once(':') {
        Some((w, h)) => matches!(
            (w.trim().parse::<u32>(), h.trim().parse::<u32>()),
            (Ok(w), Ok(h)) if w > 0 && h > 0
        ),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_fields_use_defaults() {
        let settings: Settings = serde_json::from_value(json!({})).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.image_resolution, ImageResolution::TwoK);
        assert_eq!(settings.max_image_workers, 8);
        assert!(!settings.has_api_key());
    }

    #[test]
    fn blank_secrets_are_not_sent() {
        let update = SettingsUpdate::default()
            .with_api_key("  ")
            .with_mineru_token("");
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, json!({}));
        assert!(update.is_empty());

        let update = SettingsUpdate::default().with_api_key("sk-123");
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, json!({"api_key": "sk-123"}));
    }

    #[test]
    fn from_settings_omits_secrets() {
        let settings = Settings {
            api_key_length: 12,
            text_model: Some("gemini-2.5-flash".into()),
            ..Default::default()
        };
        let update = SettingsUpdate::from_settings(&settings);
        assert!(update.api_key.is_none());
        assert_eq!(update.text_model.as_deref(), Some("gemini-2.5-flash"));
        assert_eq!(update.max_description_workers, Some(5));
    }

    #[test]
    fn worker_counts_are_bounded() {
        let ok = SettingsUpdate {
            max_image_workers: Some(20),
            ..Default::default()
        };
        assert!(ok.validate().is_ok());

        let too_many = SettingsUpdate {
            max_image_workers: Some(21),
            ..Default::default()
        };
        assert!(matches!(
            too_many.validate(),
            Err(ModelError::OutOfRange { field: "max_image_workers", value: 21, .. })
        ));

        let zero = SettingsUpdate {
            max_description_workers: Some(0),
            ..Default::default()
        };
        assert!(zero.validate().is_err());
    }

    #[test]
    fn aspect_ratio_is_checked() {
        let bad = SettingsUpdate {
            image_aspect_ratio: Some("wide".into()),
            ..Default::default()
        };
        assert_eq!(
            bad.validate(),
            Err(ModelError::InvalidAspectRatio("wide".into()))
        );

        let good = SettingsUpdate {
            image_aspect_ratio: Some("4:3".into()),
            ..Default::default()
        };
        assert!(good.validate().is_ok());
    }

    #[test]
    fn resolution_wire_format() {
        assert_eq!(serde_json::to_value(ImageResolution::FourK).unwrap(), json!("4K"));
        assert_eq!("1k".parse::<ImageResolution>(), Ok(ImageResolution::OneK));
        assert_eq!(ImageResolution::OneK.pixels(), 1024);
    }
}
