//! Command handlers.

mod config;
mod crashes;
mod fuzzers;
mod meta;
mod pools;
mod projects;
mod revisions;
mod users;

use std::io::{self, BufRead, Write};

use anyhow::{bail, Result};
use bondi_core::config::{app_dir, config_path};
use bondi_core::{AutologinClient, Credentials, FileSessionStore, ReqwestTransport};
use tracing::debug;

use crate::cli::{AdminCommand, Command};
use crate::output::Output;

/// Shared state for handlers that talk to the server.
pub struct Context {
    pub client: AutologinClient,
    pub output: Output,
    pub auto_approve: bool,
}

pub async fn run(command: Command, output: Output, auto_approve: bool) -> Result<()> {
    match command {
        Command::Config(command) => config::run(command, output),
        Command::Whoami => meta::whoami(&connect(output, auto_approve).await?),
        Command::Meta(command) => meta::run(command, &connect(output, auto_approve).await?).await,
        Command::Projects(command) => {
            projects::run(command, &connect(output, auto_approve).await?).await
        }
        Command::Fuzzers(command) => {
            fuzzers::run(command, &connect(output, auto_approve).await?).await
        }
        Command::Pools(command) => pools::run(command, &connect(output, auto_approve).await?).await,
        Command::Revisions(command) => {
            revisions::run(command, &connect(output, auto_approve).await?).await
        }
        Command::Crashes(command) => {
            crashes::run(command, &connect(output, auto_approve).await?).await
        }
        Command::Admin(AdminCommand::Users(command)) => {
            users::run(command, &connect(output, auto_approve).await?).await
        }
    }
}

/// Resolve credentials, open the session store and make sure a session is
/// established before any command runs.
async fn connect(output: Output, auto_approve: bool) -> Result<Context> {
    let credentials = Credentials::resolve(&config_path()?)?;
    debug!(url = %credentials.base_url(), user = %credentials.username(), "Connecting");

    let store = FileSessionStore::new(&app_dir()?);
    let client = AutologinClient::new(credentials, Box::new(store), ReqwestTransport::new()?)
        .enter()
        .await?;

    Ok(Context {
        client,
        output,
        auto_approve,
    })
}

/// Ask a yes/no question unless `--yes` was given.
pub fn confirm(ctx: &Context, question: &str) -> Result<()> {
    if ctx.auto_approve {
        return Ok(());
    }
    if !ask_yes_no(question, &mut io::stdin().lock())? {
        bail!("Cancelled");
    }
    Ok(())
}

fn ask_yes_no(question: &str, input: &mut impl BufRead) -> Result<bool> {
    loop {
        print!("{} [y/n]: ", question);
        io::stdout().flush()?;

        let mut answer = String::new();
        if input.read_line(&mut answer)? == 0 {
            return Ok(false);
        }
        match answer.trim().to_lowercase().as_str() {
            "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            _ => continue,
        }
    }
}
