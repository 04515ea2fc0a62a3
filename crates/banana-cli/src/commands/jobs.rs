use std::sync::Arc;

use banana_core::{JobError, PollObserver, ResultView};
use banana_model::{JobKind, JobRequest, MaterialJob, TaskLocator, TaskScope};
use banana_observe::Journal;
use serde_json::{Value, json};
use tracing::debug;

use super::Context;
use crate::cli::{MaterialCommands, TaskCommands};

/// Registry key of the material generator; a new generation replaces a running one.
pub const MATERIAL_KEY: &str = "material-generator";

pub async fn material(action: MaterialCommands, ctx: &Context) -> anyhow::Result<()> {
    let MaterialCommands::Generate {
        prompt,
        project,
        ref_image,
        extra_images,
        no_wait,
    } = action;

    let mut job = MaterialJob::new(prompt);
    if let Some(project) = project {
        job = job.with_project(project);
    }
    if let Some(path) = ref_image {
        job = job.with_ref_image(path);
    }
    for path in extra_images {
        job = job.with_extra_image(path);
    }
    let request = JobRequest::GenerateMaterial(job);

    let task = ctx.poller.submit(&request).await?;
    if no_wait {
        return ctx.emit(&task, || format!("submitted {task}"));
    }

    let result = follow(ctx, MATERIAL_KEY, task.clone(), request.kind()).await?;
    print_result(ctx, &task, &result)
}

pub async fn task(action: TaskCommands, ctx: &Context) -> anyhow::Result<()> {
    let TaskCommands::Poll {
        task_id,
        project,
        service,
    } = action;

    let (scope, kind) = match service {
        Some(service) => (TaskScope::SettingsTest, JobKind::TestService(service)),
        None => (TaskScope::project(project.as_deref()), JobKind::GenerateMaterial),
    };
    let task = TaskLocator::new(task_id, scope);
    if task.id.is_empty() {
        anyhow::bail!("task id must not be empty");
    }

    let key = format!("task:{task}");
    let result = follow(ctx, &key, task.clone(), kind).await?;
    print_result(ctx, &task, &result)
}

/// Poll `task` under `key` until it ends. Ctrl-C cancels through the registry.
pub async fn follow(ctx: &Context, key: &str, task: TaskLocator, kind: JobKind) -> Result<ResultView, JobError> {
    let session = ctx.registry.start(&ctx.poller, key, task.clone(), kind, observer(ctx));
    debug!(%key, %task, "following task");

    match session.wait().await {
        Some(outcome) => outcome.into_result(&task),
        None => Err(JobError::Cancelled),
    }
}

/// Progress bar behind a logging journal.
pub fn observer(ctx: &Context) -> Arc<dyn PollObserver> {
    Arc::new(Journal::wrap(Arc::new(ctx.console.session())))
}

fn print_result(ctx: &Context, task: &TaskLocator, result: &ResultView) -> anyhow::Result<()> {
    let url = match &result.payload {
        Value::Object(fields) => fields
            .get("image_url")
            .and_then(Value::as_str)
            .map(|path| ctx.client.asset_url(path, None)),
        _ => None,
    };
    let out = json!({
        "task": task,
        "summary": result.summary,
        "url": url,
        "payload": result.payload,
    });
    ctx.emit(&out, || url.clone().unwrap_or_else(|| result.summary.clone()))
}
