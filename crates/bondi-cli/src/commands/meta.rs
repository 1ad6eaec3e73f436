use anyhow::Result;
use serde_json::json;

use super::Context;
use crate::cli::MetaCommand;

pub fn whoami(ctx: &Context) -> Result<()> {
    let session = ctx
        .client
        .session()
        .ok_or_else(|| anyhow::anyhow!("Not logged in"))?;

    let fields = vec![
        ("Server", ctx.client.credentials().base_url().to_string()),
        ("User id", session.user_id.clone()),
        ("Username", session.user_name.clone()),
        ("Display name", session.display_name.clone()),
        ("Admin", if session.is_admin { "yes" } else { "no" }.to_string()),
    ];
    let record = json!({
        "user_id": session.user_id,
        "user_name": session.user_name,
        "display_name": session.display_name,
        "is_admin": session.is_admin,
    });
    ctx.output.record(&record, fields)
}

pub async fn run(command: MetaCommand, ctx: &Context) -> Result<()> {
    match command {
        MetaCommand::Configurations => {
            let configurations = ctx.client.list_fuzzer_configurations().await?;
            let rows = configurations.display_rows();
            if ctx.output.is_json() {
                return ctx.output.record(&configurations, Vec::new());
            }
            ctx.output.collection(&rows, &["Language", "Engines"], |(lang, engines)| {
                vec![lang.clone(), engines.clone()]
            })
        }
    }
}
