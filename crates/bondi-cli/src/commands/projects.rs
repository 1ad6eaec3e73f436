use anyhow::{bail, Result};
use bondi_core::models::{
    description_or_default, shorten, DeleteAction, NewPool, NewProject, Project, ProjectUpdate,
};

use super::{confirm, Context};
use crate::cli::ProjectsCommand;

/// Longest description shown in the project table
const DESCRIPTION_WIDTH: usize = 40;

pub async fn run(command: ProjectsCommand, ctx: &Context) -> Result<()> {
    let client = &ctx.client;
    match command {
        ProjectsCommand::List { owner } => {
            let user_id = client.resolve_user_id(owner.user.as_deref()).await?;
            let projects = client.list_projects(&user_id).await?;
            ctx.output.collection(
                &projects,
                &["ID", "Name", "Description", "Pool status"],
                |p| {
                    vec![
                        p.id.clone(),
                        p.name.clone(),
                        shorten(&p.description, DESCRIPTION_WIDTH),
                        pool_status(p),
                    ]
                },
            )
        }
        ProjectsCommand::Get { project, owner } => {
            let user_id = client.resolve_user_id(owner.user.as_deref()).await?;
            let project_id = client.resolve_project_id(&user_id, &project).await?;
            let project = client.get_project(&user_id, &project_id).await?;
            ctx.output.record(&project, project_fields(&project))
        }
        ProjectsCommand::Create {
            name,
            description,
            node_cpu,
            node_ram,
            owner,
        } => {
            let user_id = client.resolve_user_id(owner.user.as_deref()).await?;
            let new_project = NewProject {
                name,
                description: description_or_default(description.as_deref()),
                pool: NewPool { node_cpu, node_ram },
            };
            let created = client.create_project(&user_id, &new_project).await?;
            ctx.output.record(
                &created,
                vec![
                    ("ID", created.id.clone()),
                    ("Name", created.name.clone()),
                    ("Node group", created.pool.node_group_summary()),
                ],
            )
        }
        ProjectsCommand::Update {
            project,
            name,
            description,
            owner,
        } => {
            let update = ProjectUpdate { name, description };
            if update.is_empty() {
                bail!("Nothing to update: pass --name or --description");
            }
            let user_id = client.resolve_user_id(owner.user.as_deref()).await?;
            let project_id = client.resolve_project_id(&user_id, &project).await?;
            client.update_project(&user_id, &project_id, &update).await?;
            ctx.output.done(&format!("Project '{}' updated", project));
            Ok(())
        }
        ProjectsCommand::Delete { project, owner } => {
            change(ctx, &project, owner.user.as_deref(), DeleteAction::Delete).await
        }
        ProjectsCommand::Restore { project, owner } => {
            change(ctx, &project, owner.user.as_deref(), DeleteAction::Restore).await
        }
        ProjectsCommand::Erase { project, owner } => {
            change(ctx, &project, owner.user.as_deref(), DeleteAction::Erase).await
        }
    }
}

async fn change(ctx: &Context, project: &str, user: Option<&str>, action: DeleteAction) -> Result<()> {
    let client = &ctx.client;
    let user_id = client.resolve_user_id(user).await?;
    let project_id = client.resolve_project_id(&user_id, project).await?;

    match action {
        DeleteAction::Delete => confirm(ctx, &format!("Move project '{}' to trash bin?", project))?,
        DeleteAction::Erase => confirm(ctx, &format!("Erase project '{}' permanently?", project))?,
        DeleteAction::Restore => {}
    }

    client.delete_project(&user_id, &project_id, action).await?;
    ctx.output.done(&format!("Project '{}': {} done", project, action.as_str()));
    Ok(())
}

fn pool_status(project: &Project) -> String {
    match &project.pool {
        Some(pool) => format!("{:?}", pool.status),
        None => "Deleted".to_string(),
    }
}

fn project_fields(project: &Project) -> Vec<(&'static str, String)> {
    let mut fields = vec![
        ("ID", project.id.clone()),
        ("Name", project.name.clone()),
        ("Description", project.description.clone()),
        ("Pool status", pool_status(project)),
    ];
    if let Some(pool) = &project.pool {
        fields.push(("Node group", pool.node_group_summary()));
        fields.push(("Resources", pool.resources_summary()));
    }
    fields
}
