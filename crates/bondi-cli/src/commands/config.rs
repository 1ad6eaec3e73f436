//! `bondi config` handlers. These work offline and never log in.

use std::io::{self, Write};

use anyhow::{bail, Context as _, Result};
use bondi_core::config::{app_dir, config_path, FIELD_NAMES};
use bondi_core::{AuthConfig, AutologinClient, Credentials, FileSessionStore, ReqwestTransport};
use tracing::info;

use crate::cli::ConfigCommand;
use crate::output::Output;

pub fn run(command: ConfigCommand, output: Output) -> Result<()> {
    let path = config_path()?;
    match command {
        ConfigCommand::Init {
            server_url,
            username,
            password,
        } => {
            let url = match server_url {
                Some(url) => url,
                None => prompt("Server URL: ")?,
            };
            let username = match username {
                Some(username) => username,
                None => prompt("Username: ")?,
            };
            let password = match password {
                Some(password) => password,
                None => rpassword::prompt_password("Password: ")?,
            };

            let config = AuthConfig::new(&url, &username, &password)?;
            config.save(&path)?;
            forget_session(&config)?;
            info!(path = %path.display(), "Config initialized");
            output.done("Configuration saved");
            Ok(())
        }
        ConfigCommand::Get { field } => {
            let config = AuthConfig::load(&path)?;
            match config.get(&field) {
                Some(value) if output.is_json() => {
                    println!("{}", serde_json::to_string(value)?);
                    Ok(())
                }
                Some(value) => {
                    println!("{}", value);
                    Ok(())
                }
                None => bail!(unknown_field(&field)),
            }
        }
        ConfigCommand::Set { field, value } => {
            let mut config = AuthConfig::load(&path)?;
            if config.get(&field).is_none() {
                bail!(unknown_field(&field));
            }
            config.set(&field, &value)?;
            config.save(&path)?;
            forget_session(&config)?;
            output.done(&format!("Field '{}' updated", field));
            Ok(())
        }
        ConfigCommand::Show { no_hide } => {
            let config = AuthConfig::load(&path)?;
            let rows = config.display_rows(no_hide);
            if output.is_json() {
                let map: serde_json::Map<String, serde_json::Value> = rows
                    .into_iter()
                    .map(|(name, value)| (name.to_string(), value.into()))
                    .collect();
                return output.record(&map, Vec::new());
            }
            output.record(&(), rows)
        }
    }
}

/// The session belongs to the previous credentials, so drop it.
fn forget_session(config: &AuthConfig) -> Result<()> {
    let store = FileSessionStore::new(&app_dir()?);
    let client = AutologinClient::new(
        Credentials::new(config.clone())?,
        Box::new(store),
        ReqwestTransport::new()?,
    );
    client
        .forget_session()
        .context("Failed to remove stale session")
}

fn unknown_field(field: &str) -> String {
    format!(
        "Unknown field '{}'. Valid names: {}",
        field,
        FIELD_NAMES.join(", ")
    )
}

fn prompt(label: &str) -> Result<String> {
    print!("{}", label);
    io::stdout().flush()?;
    let mut value = String::new();
    io::stdin().read_line(&mut value)?;
    Ok(value.trim().to_string())
}
