use crate::chat::{Role, Turn};
use crate::commands::ask::{split_chunks, MAX_MESSAGE_CHARS};
use crate::state::Context;

/// Clear the conversation and start over
#[poise::command(slash_command, guild_only)]
pub async fn clear(ctx: Context<'_>) -> Result<(), anyhow::Error> {
    ctx.data().clear_session().await;
    ctx.say(crate::chat::prompts::GREETING).await?;
    Ok(())
}

/// Show the recent conversation
#[poise::command(slash_command, guild_only)]
pub async fn history(
    ctx: Context<'_>,
    #[description = "Max turns to show"] limit: Option<u32>,
) -> Result<(), anyhow::Error> {
    let rendered = {
        let slot = ctx.data().session.lock().await;
        match slot.as_ref() {
            Some(session) => render_turns(session.recent(clamp_limit(limit))),
            None => None,
        }
    };

    let Some(output) = rendered else {
        ctx.say(crate::chat::prompts::GREETING).await?;
        return Ok(());
    };

    for chunk in split_chunks(&output, MAX_MESSAGE_CHARS) {
        ctx.say(chunk).await?;
    }
    Ok(())
}

/// A zero limit would render nothing and look like an empty session.
fn clamp_limit(limit: Option<u32>) -> Option<usize> {
    limit.map(|l| l.max(1) as usize)
}

fn render_turns(turns: &[Turn]) -> Option<String> {
    if turns.is_empty() {
        return None;
    }
    let mut output = String::new();
    for turn in turns {
        let who = match turn.role {
            Role::User => "🧑 user",
            Role::Model => "🤖 model",
        };
        output.push_str(&format!(
            "**{}** ({}):\n{}\n\n",
            who,
            turn.at.format("%H:%M"),
            turn.content
        ));
    }
    Some(output)
}
