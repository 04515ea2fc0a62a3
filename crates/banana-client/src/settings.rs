use banana_model::{Settings, SettingsUpdate};
use reqwest::Method;
use tracing::info;

use crate::{ApiClient, error::ClientError};

impl ApiClient {
    pub async fn get_settings(&self) -> Result<Settings, ClientError> {
        self.fetch(self.request(Method::GET, &["api", "settings"])?).await
    }

    /// Apply a partial update and return the stored settings.
    ///
    /// Validation happens locally first; nothing is sent for an invalid update.
    pub async fn update_settings(&self, update: &SettingsUpdate) -> Result<Settings, ClientError> {
        update.validate()?;
        let request = self.request(Method::PUT, &["api", "settings"])?.json(update);
        let settings = self.fetch(request).await?;
        info!("settings updated");
        Ok(settings)
    }

    /// Restore backend defaults.
    pub async fn reset_settings(&self) -> Result<Settings, ClientError> {
        let settings = self
            .fetch(self.request(Method::POST, &["api", "settings", "reset"])?)
            .await?;
        info!("settings reset to defaults");
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use banana_model::{ImageResolution, ModelError, ProviderFormat};

    use super::*;
    use crate::mock;

    #[tokio::test]
    async fn update_then_reset() {
        let server = mock::spawn().await;
        let initial = server.client.get_settings().await.unwrap();
        assert_eq!(initial, Settings::default());
        assert!(!initial.has_api_key());

        let update = SettingsUpdate {
            ai_provider_format: Some(ProviderFormat::Openai),
            image_resolution: Some(ImageResolution::FourK),
            max_image_workers: Some(12),
            ..Default::default()
        }
        .with_api_key("sk-123456")
        .with_mineru_token("");

        let updated = server.client.update_settings(&update).await.unwrap();
        assert_eq!(updated.ai_provider_format, ProviderFormat::Openai);
        assert_eq!(updated.image_resolution, ImageResolution::FourK);
        assert_eq!(updated.max_image_workers, 12);
        assert_eq!(updated.api_key_length, 9);

        let sent = server.state.last_json("/api/settings").unwrap();
        assert_eq!(sent["api_key"], "sk-123456");
        assert!(sent.get("mineru_token").is_none());
        assert!(sent.get("text_model").is_none());

        let reset = server.client.reset_settings().await.unwrap();
        assert_eq!(reset, Settings::default());
    }

    #[tokio::test]
    async fn invalid_update_is_not_sent() {
        let server = mock::spawn().await;
        let update = SettingsUpdate {
            max_description_workers: Some(0),
            ..Default::default()
        };

        let err = server.client.update_settings(&update).await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::Invalid(ModelError::OutOfRange { field: "max_description_workers", .. })
        ));
        assert!(server.state.paths().is_empty());
    }
}
