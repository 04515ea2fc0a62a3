use anyhow::Context as _;
use banana_model::{Material, PageQuery, ParseStatus, Project, ReferenceFile, UserTemplate};
use serde_json::json;
use tracing::{info, warn};

use super::Context;
use crate::cli::{FilesCommands, MaterialsCommands, ProjectsCommands, TemplatesCommands};

pub async fn materials(action: MaterialsCommands, ctx: &Context) -> anyhow::Result<()> {
    match action {
        MaterialsCommands::List { scope } => {
            let items = ctx.client.list_materials(&scope).await?;
            ctx.emit(&items, || {
                items
                    .iter()
                    .map(|m| material_line(ctx, m))
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        }
        MaterialsCommands::Upload { path, project } => {
            let material = ctx.client.upload_material(&path, project.as_deref()).await?;
            ctx.emit(&material, || material_line(ctx, &material))
        }
        MaterialsCommands::Delete { ids } => {
            let mut failed = Vec::new();
            for id in &ids {
                if let Err(e) = ctx.client.delete_material(id).await {
                    warn!(%id, error = %e, "failed to delete material");
                    failed.push(id.clone());
                }
            }
            finish_batch("materials", ids.len(), failed)
        }
        MaterialsCommands::Associate { project, urls } => {
            let updated = ctx.client.associate_materials(&project, &urls).await?;
            ctx.emit(&json!({ "project_id": project, "updated_ids": updated }), || {
                format!("{} material(s) attached to {project}", updated.len())
            })
        }
        MaterialsCommands::Download { ids, out } => {
            let archive = ctx.client.download_materials_zip(&ids).await?;
            tokio::fs::write(&out, &archive)
                .await
                .with_context(|| format!("failed to write {}", out.display()))?;
            info!(path = %out.display(), bytes = archive.len(), "materials archive saved");
            ctx.emit(&json!({ "path": out, "bytes": archive.len() }), || {
                format!("saved {} ({} bytes)", out.display(), archive.len())
            })
        }
    }
}

pub async fn projects(action: ProjectsCommands, ctx: &Context) -> anyhow::Result<()> {
    match action {
        ProjectsCommands::List { limit, offset, all } => {
            // Pages accumulate into `page`, so `next` keeps counting from the first offset.
            let query = PageQuery::new().with_limit(limit).with_offset(offset);
            let mut page = ctx.client.list_projects(query).await?;
            if all {
                while let Some(next) = query.next(&page) {
                    let more = ctx.client.list_projects(next).await?;
                    if more.items.is_empty() {
                        break;
                    }
                    page.items.extend(more.items);
                    page.total = more.total;
                }
            }
            ctx.emit(&page, || {
                let mut lines: Vec<_> = page.items.iter().map(project_line).collect();
                lines.push(format!("{} of {} project(s)", page.items.len(), page.total));
                lines.join("\n")
            })
        }
        ProjectsCommands::Rename { id, title } => {
            let title = title.trim();
            if title.is_empty() {
                anyhow::bail!("project title must not be empty");
            }
            let project = ctx.client.rename_project(&id, title).await?;
            ctx.emit(&project, || project_line(&project))
        }
        ProjectsCommands::Delete { ids } => {
            let mut failed = Vec::new();
            for id in &ids {
                if let Err(e) = ctx.client.delete_project(id).await {
                    warn!(%id, error = %e, "failed to delete project");
                    failed.push(id.clone());
                }
            }
            finish_batch("projects", ids.len(), failed)
        }
    }
}

pub async fn files(action: FilesCommands, ctx: &Context) -> anyhow::Result<()> {
    match action {
        FilesCommands::Upload { path, project, parse } => {
            let mut file = ctx.client.upload_reference_file(&path, project.as_deref()).await?;
            if parse {
                file = ctx.client.trigger_parse(&file.id).await?;
            }
            ctx.emit(&file, || file_line(&file))
        }
        FilesCommands::Associate { id, project } => {
            let file = ctx.client.associate_reference_file(&id, &project).await?;
            ctx.emit(&file, || file_line(&file))
        }
        FilesCommands::Parse { id } => {
            let file = ctx.client.trigger_parse(&id).await?;
            ctx.emit(&file, || file_line(&file))
        }
    }
}

pub async fn templates(action: TemplatesCommands, ctx: &Context) -> anyhow::Result<()> {
    match action {
        TemplatesCommands::List => {
            let items = ctx.client.list_user_templates().await?;
            ctx.emit(&items, || {
                items
                    .iter()
                    .map(|t| template_line(ctx, t))
                    .collect::<Vec<_>>()
                    .join("\n")
            })
        }
        TemplatesCommands::Upload { path, name } => {
            let template = ctx.client.upload_user_template(&path, name.as_deref()).await?;
            ctx.emit(&template, || template_line(ctx, &template))
        }
        TemplatesCommands::Delete { id } => {
            ctx.client.delete_user_template(&id).await?;
            ctx.emit(&json!({ "deleted": id }), || format!("deleted template {id}"))
        }
    }
}

/// Fail when any item of a batch delete failed, naming the ones left behind.
fn finish_batch(what: &str, total: usize, failed: Vec<String>) -> anyhow::Result<()> {
    if failed.is_empty() {
        return Ok(());
    }
    anyhow::bail!("{} of {total} {what} not deleted: {}", failed.len(), failed.join(", "))
}

fn material_line(ctx: &Context, m: &Material) -> String {
    let owner = m.project_id.as_deref().unwrap_or("global");
    let url = ctx.client.asset_url(&m.url, m.created_at.as_deref());
    format!("{:<24} {:<10} {:<28} {url}", m.id, owner, m.display_name())
}

fn project_line(p: &Project) -> String {
    let updated = p.updated_at.as_deref().or(p.created_at.as_deref()).unwrap_or("-");
    let status = p.status.as_deref().unwrap_or("-");
    format!("{:<38} {:<12} {:<25} {}", p.project_id, status, updated, p.title())
}

fn file_line(f: &ReferenceFile) -> String {
    let status: String = f.parse_status.clone().into();
    let mut line = format!("{} {} [{status}]", f.id, f.filename);
    if f.parse_status == ParseStatus::Failed
        && let Some(reason) = f.error_message.as_deref()
    {
        line.push_str(&format!(" {reason}"));
    }
    line
}

fn template_line(ctx: &Context, t: &UserTemplate) -> String {
    let name = t.name.as_deref().unwrap_or("(unnamed)");
    let url = ctx.client.asset_url(&t.template_image_url, t.created_at.as_deref());
    format!("{:<38} {:<20} {url}", t.template_id, name)
}
