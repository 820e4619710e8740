mod ask;
mod manage;
mod status;
mod upload;

use crate::state::Context;

/// Statistics course assistant
#[poise::command(
    slash_command,
    subcommands(
        "ask::ask",
        "manage::history",
        "manage::clear",
        "status::status",
        "upload::upload"
    )
)]
pub async fn stats(_ctx: Context<'_>) -> Result<(), anyhow::Error> {
    Ok(())
}
