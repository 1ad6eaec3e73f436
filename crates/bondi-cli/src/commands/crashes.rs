use anyhow::Result;
use bondi_core::models::{shorten, Crash};

use super::revisions::resolve_fuzzer;
use super::Context;
use crate::cli::CrashesCommand;

const BRIEF_WIDTH: usize = 60;

pub async fn run(command: CrashesCommand, ctx: &Context) -> Result<()> {
    let client = &ctx.client;
    match command {
        CrashesCommand::List { revision, scope } => {
            let (user_id, project_id, fuzzer_id) = resolve_fuzzer(ctx, &scope).await?;
            let revision_id = match revision {
                Some(revision) => Some(
                    client
                        .resolve_revision_id(&user_id, &project_id, &fuzzer_id, &revision)
                        .await?,
                ),
                None => None,
            };
            let crashes = client
                .list_crashes(&user_id, &project_id, &fuzzer_id, revision_id.as_deref())
                .await?;
            ctx.output.collection(
                &crashes,
                &["ID", "Created", "Type", "Reproduced", "Duplicates", "Brief"],
                |c| {
                    vec![
                        c.id.clone(),
                        c.created.format("%Y-%m-%d %H:%M:%S").to_string(),
                        c.kind.clone(),
                        c.reproduced.to_string(),
                        c.duplicate_count.to_string(),
                        shorten(&c.brief, BRIEF_WIDTH),
                    ]
                },
            )
        }
        CrashesCommand::Get { crash, scope } => {
            let (user_id, project_id, fuzzer_id) = resolve_fuzzer(ctx, &scope).await?;
            let crash = client.get_crash(&user_id, &project_id, &fuzzer_id, &crash).await?;
            ctx.output.record(&crash, crash_fields(&crash))
        }
        CrashesCommand::Details { crash, scope } => {
            let (user_id, project_id, fuzzer_id) = resolve_fuzzer(ctx, &scope).await?;
            let crash = client.get_crash(&user_id, &project_id, &fuzzer_id, &crash).await?;
            if ctx.output.is_json() {
                return ctx.output.record(&crash.details, Vec::new());
            }
            println!("{}", crash.details.as_deref().unwrap_or("No details available"));
            Ok(())
        }
    }
}

fn crash_fields(crash: &Crash) -> Vec<(&'static str, String)> {
    vec![
        ("ID", crash.id.clone()),
        ("Created", crash.created.format("%Y-%m-%d %H:%M:%S").to_string()),
        ("Type", crash.kind.clone()),
        ("Brief", crash.brief.clone()),
        ("Reproduced", crash.reproduced.to_string()),
        ("Duplicates", crash.duplicate_count.to_string()),
        ("Input preview", crash.preview.clone()),
    ]
}
