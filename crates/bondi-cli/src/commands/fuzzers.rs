use anyhow::Result;
use bondi_core::models::{description_or_default, shorten, DeleteAction, Fuzzer, NewFuzzer};

use super::{confirm, Context};
use crate::cli::{FuzzerScope, FuzzersCommand};

/// Longest description shown in the fuzzer table
const DESCRIPTION_WIDTH: usize = 40;

/// Owner and project ids for a fuzzer command.
async fn resolve_scope(ctx: &Context, scope: &FuzzerScope) -> Result<(String, String)> {
    let user_id = ctx.client.resolve_user_id(scope.owner.user.as_deref()).await?;
    let project_id = ctx.client.resolve_project_id(&user_id, &scope.project).await?;
    Ok((user_id, project_id))
}

pub async fn run(command: FuzzersCommand, ctx: &Context) -> Result<()> {
    let client = &ctx.client;
    match command {
        FuzzersCommand::List { scope } => {
            let (user_id, project_id) = resolve_scope(ctx, &scope).await?;
            let fuzzers = client.list_fuzzers(&user_id, &project_id).await?;
            ctx.output.collection(
                &fuzzers,
                &["ID", "Name", "Engine", "Lang", "CI", "Description"],
                |f| {
                    vec![
                        f.id.clone(),
                        f.name.clone(),
                        f.engine.clone(),
                        f.lang.clone(),
                        f.ci_integration.to_string(),
                        shorten(&f.description, DESCRIPTION_WIDTH),
                    ]
                },
            )
        }
        FuzzersCommand::Get { fuzzer, scope } => {
            let (user_id, project_id) = resolve_scope(ctx, &scope).await?;
            let fuzzer_id = client.resolve_fuzzer_id(&user_id, &project_id, &fuzzer).await?;
            let fuzzer = client.get_fuzzer(&user_id, &project_id, &fuzzer_id).await?;
            ctx.output.record(&fuzzer, fuzzer_fields(&fuzzer))
        }
        FuzzersCommand::Create {
            name,
            description,
            engine,
            lang,
            ci_integration,
            scope,
        } => {
            let (user_id, project_id) = resolve_scope(ctx, &scope).await?;
            let new_fuzzer = NewFuzzer {
                name,
                description: description_or_default(description.as_deref()),
                engine,
                lang,
                ci_integration,
            };
            let created = client.create_fuzzer(&user_id, &project_id, &new_fuzzer).await?;
            ctx.output.record(
                &created,
                vec![("ID", created.id.clone()), ("Name", created.name.clone())],
            )
        }
        FuzzersCommand::Delete { fuzzer, scope } => {
            change(ctx, &fuzzer, &scope, DeleteAction::Delete).await
        }
        FuzzersCommand::Restore { fuzzer, scope } => {
            change(ctx, &fuzzer, &scope, DeleteAction::Restore).await
        }
        FuzzersCommand::Erase { fuzzer, scope } => {
            change(ctx, &fuzzer, &scope, DeleteAction::Erase).await
        }
    }
}

async fn change(ctx: &Context, fuzzer: &str, scope: &FuzzerScope, action: DeleteAction) -> Result<()> {
    let (user_id, project_id) = resolve_scope(ctx, scope).await?;
    let fuzzer_id = ctx
        .client
        .resolve_fuzzer_id(&user_id, &project_id, fuzzer)
        .await?;

    match action {
        DeleteAction::Delete => confirm(ctx, &format!("Move fuzzer '{}' to trash bin?", fuzzer))?,
        DeleteAction::Erase => confirm(ctx, &format!("Erase fuzzer '{}' permanently?", fuzzer))?,
        DeleteAction::Restore => {}
    }

    ctx.client
        .delete_fuzzer(&user_id, &project_id, &fuzzer_id, action)
        .await?;
    ctx.output.done(&format!("Fuzzer '{}': {} done", fuzzer, action.as_str()));
    Ok(())
}

fn fuzzer_fields(fuzzer: &Fuzzer) -> Vec<(&'static str, String)> {
    vec![
        ("ID", fuzzer.id.clone()),
        ("Name", fuzzer.name.clone()),
        ("Description", fuzzer.description.clone()),
        ("Engine", fuzzer.engine.clone()),
        ("Lang", fuzzer.lang.clone()),
        ("CI integration", fuzzer.ci_integration.to_string()),
    ]
}
