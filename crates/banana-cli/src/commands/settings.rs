use std::io::Write;

use anyhow::Context as _;
use banana_core::JobError;
use banana_model::{JobKind, JobRequest, ProviderFormat, ServiceKind, Settings, SettingsUpdate};
use serde::Serialize;
use tracing::warn;

use super::{Context, jobs::observer};
use crate::cli::{SettingsArgs, SettingsCommands};

impl SettingsArgs {
    pub fn into_update(self) -> SettingsUpdate {
        let mut update = SettingsUpdate {
            ai_provider_format: self.provider,
            api_base_url: self.api_base_url,
            text_model: self.text_model,
            image_model: self.image_model,
            image_caption_model: self.caption_model,
            mineru_api_base: self.mineru_api_base,
            image_resolution: self.resolution,
            image_aspect_ratio: self.aspect_ratio,
            max_description_workers: self.description_workers,
            max_image_workers: self.image_workers,
            output_language: self.language,
            ..Default::default()
        };
        if let Some(key) = self.api_key {
            update = update.with_api_key(key);
        }
        if let Some(token) = self.mineru_token {
            update = update.with_mineru_token(token);
        }
        update
    }
}

pub async fn handle(action: SettingsCommands, ctx: &Context) -> anyhow::Result<()> {
    match action {
        SettingsCommands::Show => {
            let settings = ctx.client.get_settings().await?;
            ctx.emit(&settings, || describe(&settings))
        }
        SettingsCommands::Update(args) => {
            let update = args.into_update();
            if update.is_empty() {
                anyhow::bail!("nothing to update");
            }
            let settings = ctx.client.update_settings(&update).await?;
            ctx.emit(&settings, || describe(&settings))
        }
        SettingsCommands::Reset { yes } => {
            if !yes && !confirm("Reset all settings to defaults?").await? {
                return Ok(());
            }
            let settings = ctx.client.reset_settings().await?;
            ctx.emit(&settings, || describe(&settings))
        }
        SettingsCommands::Test { services, overrides } => {
            test_services(ctx, services, overrides.into_update()).await
        }
    }
}

#[derive(Debug, Serialize)]
struct ServiceReport {
    service: ServiceKind,
    ok: bool,
    detail: String,
}

/// Run the requested service tests side by side and report each one.
async fn test_services(ctx: &Context, services: Vec<ServiceKind>, overrides: SettingsUpdate) -> anyhow::Result<()> {
    let services = if services.is_empty() {
        ServiceKind::ALL.to_vec()
    } else {
        services
    };

    let mut started = Vec::with_capacity(services.len());
    let mut reports = Vec::with_capacity(services.len());
    for service in services {
        let request = JobRequest::TestService {
            service,
            overrides: overrides.clone(),
        };
        match ctx.poller.submit(&request).await {
            Ok(task) => started.push((service, task)),
            Err(e) => reports.push(report(service, Err(e))),
        }
    }

    let sessions: Vec<_> = started
        .into_iter()
        .map(|(service, task)| {
            let key = format!("settings-test:{service}");
            let session = ctx.registry.start(
                &ctx.poller,
                key,
                task.clone(),
                JobKind::TestService(service),
                observer(ctx),
            );
            (service, task, session)
        })
        .collect();
    for (service, task, session) in sessions {
        let outcome = match session.wait().await {
            Some(outcome) => outcome.into_result(&task).map(|r| r.summary),
            None => Err(JobError::Cancelled),
        };
        reports.push(report(service, outcome));
    }

    let failed = reports.iter().filter(|r| !r.ok).count();
    ctx.emit(&reports, || {
        reports
            .iter()
            .map(|r| format!("{:<14} {:<4} {}", r.service.slug(), if r.ok { "ok" } else { "FAIL" }, r.detail))
            .collect::<Vec<_>>()
            .join("\n")
    })?;

    if failed > 0 {
        anyhow::bail!("{failed} of {} service tests failed", reports.len());
    }
    Ok(())
}

fn report(service: ServiceKind, outcome: Result<String, JobError>) -> ServiceReport {
    match outcome {
        Ok(summary) => ServiceReport {
            service,
            ok: true,
            detail: summary,
        },
        Err(e) => {
            warn!(%service, error = %e, "service test did not pass");
            ServiceReport {
                service,
                ok: false,
                detail: e.user_message(),
            }
        }
    }
}

fn describe(s: &Settings) -> String {
    let secret = |present: bool, len: usize| {
        if present { format!("set ({len} chars)") } else { "not set".to_string() }
    };
    let or_default = |v: &Option<String>| v.clone().unwrap_or_else(|| "(backend default)".to_string());

    [
        ("provider", provider_label(s.ai_provider_format).to_string()),
        ("api base url", or_default(&s.api_base_url)),
        ("api key", secret(s.has_api_key(), s.api_key_length)),
        ("text model", or_default(&s.text_model)),
        ("image model", or_default(&s.image_model)),
        ("caption model", or_default(&s.image_caption_model)),
        ("mineru api base", or_default(&s.mineru_api_base)),
        ("mineru token", secret(s.has_mineru_token(), s.mineru_token_length)),
        ("resolution", s.image_resolution.to_string()),
        ("aspect ratio", s.image_aspect_ratio.clone()),
        ("description workers", s.max_description_workers.to_string()),
        ("image workers", s.max_image_workers.to_string()),
        ("output language", s.output_language.clone()),
    ]
    .iter()
    .map(|(k, v)| format!("{k:<20} {v}"))
    .collect::<Vec<_>>()
    .join("\n")
}

fn provider_label(format: ProviderFormat) -> &'static str {
    match format {
        ProviderFormat::Openai => "openai",
        ProviderFormat::Gemini => "gemini",
    }
}

async fn confirm(question: &str) -> anyhow::Result<bool> {
    let question = question.to_string();
    tokio::task::spawn_blocking(move || -> anyhow::Result<bool> {
        print!("{question} [y/N] ");
        std::io::stdout().flush()?;
        let mut answer = String::new();
        std::io::stdin().read_line(&mut answer)?;
        Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
    })
    .await
    .context("confirmation prompt aborted")?
}

#[cfg(test)]
mod tests {
    use banana_model::ImageResolution;

    use super::*;

    #[test]
    fn args_map_onto_update() {
        let args = SettingsArgs {
            provider: Some(ProviderFormat::Openai),
            caption_model: Some("gpt-4o-mini".into()),
            resolution: Some(ImageResolution::OneK),
            api_key: Some("  ".into()),
            mineru_token: Some("tok".into()),
            ..Default::default()
        };
        let update = args.into_update();
        assert_eq!(update.ai_provider_format, Some(ProviderFormat::Openai));
        assert_eq!(update.image_caption_model.as_deref(), Some("gpt-4o-mini"));
        assert_eq!(update.image_resolution, Some(ImageResolution::OneK));
        assert_eq!(update.api_key, None);
        assert_eq!(update.mineru_token.as_deref(), Some("tok"));
    }

    #[test]
    fn empty_args_are_an_empty_update() {
        assert!(SettingsArgs::default().into_update().is_empty());
    }

    #[test]
    fn describe_hides_secrets() {
        let settings = Settings {
            api_key_length: 12,
            ..Default::default()
        };
        let text = describe(&settings);
        assert!(text.contains("set (12 chars)"));
        assert!(text.contains("mineru token         not set"));
    }
}
