use anyhow::Result;
use bondi_core::models::UserPool;

use super::Context;
use crate::cli::PoolsCommand;

pub async fn run(command: PoolsCommand, ctx: &Context) -> Result<()> {
    match command {
        PoolsCommand::List { owner } => {
            let user_id = ctx.client.resolve_user_id(owner.user.as_deref()).await?;
            let pools = ctx.client.list_pools(&user_id).await?;
            ctx.output.collection(
                &pools,
                &["ID", "CPU avail", "RAM avail", "Nodes avail"],
                |p| {
                    vec![
                        p.id.clone(),
                        format!("{} mcpu", p.resources.cpu_avail),
                        format!("{} MB", p.resources.ram_avail),
                        p.resources.nodes_avail.to_string(),
                    ]
                },
            )
        }
        PoolsCommand::Get { pool, owner } => {
            let user_id = ctx.client.resolve_user_id(owner.user.as_deref()).await?;
            let pool = ctx.client.get_pool(&user_id, &pool).await?;
            ctx.output.record(&pool, pool_fields(&pool))
        }
    }
}

fn pool_fields(pool: &UserPool) -> Vec<(&'static str, String)> {
    let r = &pool.resources;
    vec![
        ("ID", pool.id.clone()),
        ("CPU", format!("{} / {} mcpu", r.cpu_avail, r.cpu_total)),
        ("RAM", format!("{} / {} MB", r.ram_avail, r.ram_total)),
        ("Nodes", format!("{} / {}", r.nodes_avail, r.nodes_total)),
        ("Fuzzer max CPU", format!("{} mcpu", r.fuzzer_max_cpu)),
        ("Fuzzer max RAM", format!("{} MB", r.fuzzer_max_ram)),
    ]
}
