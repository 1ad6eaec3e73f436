use anyhow::Result;
use chrono::{DateTime, Utc};
use bondi_core::models::{shorten, Revision, RevisionAction};

use super::Context;
use crate::cli::{RevisionScope, RevisionsCommand};

const DESCRIPTION_WIDTH: usize = 40;

/// Owner, project and fuzzer ids for a revision or crash command.
pub async fn resolve_fuzzer(ctx: &Context, scope: &RevisionScope) -> Result<(String, String, String)> {
    let client = &ctx.client;
    let user_id = client.resolve_user_id(scope.project.owner.user.as_deref()).await?;
    let project_id = client.resolve_project_id(&user_id, &scope.project.project).await?;
    let fuzzer_id = client
        .resolve_fuzzer_id(&user_id, &project_id, &scope.fuzzer)
        .await?;
    Ok((user_id, project_id, fuzzer_id))
}

pub async fn run(command: RevisionsCommand, ctx: &Context) -> Result<()> {
    let client = &ctx.client;
    match command {
        RevisionsCommand::List { scope } => {
            let (user_id, project_id, fuzzer_id) = resolve_fuzzer(ctx, &scope).await?;
            let revisions = client.list_revisions(&user_id, &project_id, &fuzzer_id).await?;
            ctx.output.collection(
                &revisions,
                &["ID", "Name", "Status", "Health", "Description"],
                |r| {
                    vec![
                        r.id.clone(),
                        r.name.clone(),
                        r.status.clone(),
                        r.health.clone(),
                        shorten(&r.description, DESCRIPTION_WIDTH),
                    ]
                },
            )
        }
        RevisionsCommand::Get { revision, scope } => {
            let (user_id, project_id, fuzzer_id) = resolve_fuzzer(ctx, &scope).await?;
            let revision_id = client
                .resolve_revision_id(&user_id, &project_id, &fuzzer_id, &revision)
                .await?;
            let revision = client
                .get_revision(&user_id, &project_id, &fuzzer_id, &revision_id)
                .await?;
            ctx.output.record(&revision, revision_fields(&revision))
        }
        RevisionsCommand::Start { revision, scope } => {
            control(ctx, &revision, &scope, RevisionAction::Start).await
        }
        RevisionsCommand::Restart { revision, scope } => {
            control(ctx, &revision, &scope, RevisionAction::Restart).await
        }
        RevisionsCommand::Stop { revision, scope } => {
            control(ctx, &revision, &scope, RevisionAction::Stop).await
        }
    }
}

async fn control(ctx: &Context, revision: &str, scope: &RevisionScope, action: RevisionAction) -> Result<()> {
    let (user_id, project_id, fuzzer_id) = resolve_fuzzer(ctx, scope).await?;
    let revision_id = ctx
        .client
        .resolve_revision_id(&user_id, &project_id, &fuzzer_id, revision)
        .await?;
    ctx.client
        .control_revision(&user_id, &project_id, &fuzzer_id, &revision_id, action)
        .await?;
    ctx.output
        .done(&format!("Revision '{}': {} done", revision, action.as_str()));
    Ok(())
}

fn revision_fields(revision: &Revision) -> Vec<(&'static str, String)> {
    let date = |value: Option<DateTime<Utc>>| {
        value
            .map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string())
    };
    vec![
        ("ID", revision.id.clone()),
        ("Name", revision.name.clone()),
        ("Description", revision.description.clone()),
        ("Status", revision.status.clone()),
        ("Health", revision.health.clone()),
        ("CPU usage", format!("{} mcpu", revision.cpu_usage)),
        ("RAM usage", format!("{} MB", revision.ram_usage)),
        ("Tmpfs size", format!("{} MB", revision.tmpfs_size)),
        ("Binaries", revision.binaries.to_string()),
        ("Seeds", revision.seeds.to_string()),
        ("Config", revision.config.to_string()),
        ("Image", revision.image_id.clone()),
        (
            "Feedback",
            revision
                .feedback
                .as_ref()
                .map_or_else(|| "-".to_string(), ToString::to_string),
        ),
        ("Created", date(Some(revision.created))),
        ("Last start", date(revision.last_start_date)),
        ("Last stop", date(revision.last_stop_date)),
        ("Erasure date", date(revision.erasure_date)),
    ]
}
