use anyhow::{bail, Result};
use bondi_core::models::{is_identifier, DeleteAction, NewUser, User, UserUpdate};

use super::{confirm, Context};
use crate::cli::UsersCommand;

pub async fn run(command: UsersCommand, ctx: &Context) -> Result<()> {
    match command {
        UsersCommand::List => {
            let users = ctx.client.list_users().await?;
            ctx.output.collection(
                &users,
                &["ID", "Name", "Display name", "Email", "Admin", "Deleted"],
                |u| {
                    vec![
                        u.id.clone(),
                        u.name.clone(),
                        u.display_name.clone(),
                        u.email.clone(),
                        u.is_admin.to_string(),
                        u.is_deleted().to_string(),
                    ]
                },
            )
        }
        UsersCommand::Get { user } => {
            let user = if is_identifier(&user) {
                ctx.client.get_user(&user).await?
            } else {
                ctx.client.lookup_user(&user).await?
            };
            ctx.output.record(&user, user_fields(&user))
        }
        UsersCommand::Create {
            name,
            display_name,
            email,
            password,
            admin,
        } => {
            let new_user = NewUser {
                name,
                password: password_or_prompt(password)?,
                display_name,
                email,
                is_admin: admin,
            };
            let created = ctx.client.create_user(&new_user).await?;
            ctx.output.record(
                &created,
                vec![
                    ("ID", created.id.clone()),
                    ("Name", created.name.clone()),
                    ("Admin", created.is_admin.to_string()),
                ],
            )
        }
        UsersCommand::Update {
            user,
            name,
            display_name,
            email,
        } => {
            let update = UserUpdate {
                name,
                display_name,
                email,
                ..UserUpdate::default()
            };
            if update.is_empty() {
                bail!("Nothing to update: pass --name, --display-name or --email");
            }
            update_user(ctx, &user, &update).await
        }
        UsersCommand::Enable { user } => {
            let update = UserUpdate {
                is_disabled: Some(false),
                ..UserUpdate::default()
            };
            update_user(ctx, &user, &update).await
        }
        UsersCommand::Disable { user } => {
            let update = UserUpdate {
                is_disabled: Some(true),
                ..UserUpdate::default()
            };
            update_user(ctx, &user, &update).await
        }
        UsersCommand::ChangePassword { user, password } => {
            let update = UserUpdate {
                password: Some(password_or_prompt(password)?),
                ..UserUpdate::default()
            };
            update_user(ctx, &user, &update).await
        }
        UsersCommand::Delete { user } => change(ctx, &user, DeleteAction::Delete, false).await,
        UsersCommand::Restore { user } => change(ctx, &user, DeleteAction::Restore, false).await,
        UsersCommand::Erase { user, keep_backup } => {
            change(ctx, &user, DeleteAction::Erase, keep_backup).await
        }
    }
}

fn password_or_prompt(password: Option<String>) -> Result<String> {
    match password {
        Some(password) => Ok(password),
        None => Ok(rpassword::prompt_password("Password: ")?),
    }
}

async fn update_user(ctx: &Context, user: &str, update: &UserUpdate) -> Result<()> {
    let user_id = ctx.client.resolve_user_id(Some(user)).await?;
    ctx.client.update_user(&user_id, update).await?;
    ctx.output.done(&format!("User '{}' updated", user));
    Ok(())
}

async fn change(ctx: &Context, user: &str, action: DeleteAction, keep_backup: bool) -> Result<()> {
    let user_id = ctx.client.resolve_user_id(Some(user)).await?;

    match action {
        DeleteAction::Delete => confirm(ctx, &format!("Move user '{}' to trash bin?", user))?,
        DeleteAction::Erase => confirm(ctx, &format!("Erase user '{}' permanently?", user))?,
        DeleteAction::Restore => {}
    }

    ctx.client.delete_user(&user_id, action, keep_backup).await?;
    ctx.output.done(&format!("User '{}': {} done", user, action.as_str()));
    Ok(())
}

fn user_fields(user: &User) -> Vec<(&'static str, String)> {
    let erasure = user
        .erasure_date
        .map(|date| date.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string());
    vec![
        ("ID", user.id.clone()),
        ("Name", user.name.clone()),
        ("Display name", user.display_name.clone()),
        ("Email", user.email.clone()),
        ("Confirmed", user.is_confirmed.to_string()),
        ("Disabled", user.is_disabled.to_string()),
        ("Admin", user.is_admin.to_string()),
        ("System", user.is_system.to_string()),
        ("Erasure date", erasure),
    ]
}
