use std::time::{Duration, Instant};

use futures::StreamExt;
use poise::{CreateReply, ReplyHandle};
use tracing::{info, warn};

use crate::chat::prompts::SYSTEM_INSTRUCTION;
use crate::chat::TurnPlan;
use crate::llm::Content;
use crate::state::{begin_acknowledged, ensure_session, Context};

/// Discord rejects messages over 2000 characters.
pub const MAX_MESSAGE_CHARS: usize = 1990;

/// Minimum gap between edits of the streaming message.
const EDIT_INTERVAL: Duration = Duration::from_millis(1200);

pub const NO_DATASET: &str =
    "❌ ไม่สามารถโหลดไฟล์ dataset ได้ กรุณาอัปโหลดไฟล์ด้วย `/stats upload` หรือตรวจสอบการติดตั้ง";

/// Ask a question about the statistics course
#[poise::command(slash_command, guild_only)]
pub async fn ask(
    ctx: Context<'_>,
    #[description = "พิมพ์คำถามเกี่ยวกับ รายวิชาสถิติ"] question: String,
) -> Result<(), anyhow::Error> {
    let Some(document) = ctx.data().document().await else {
        ctx.say(NO_DATASET).await?;
        return Ok(());
    };

    // Acknowledge first: the session may be busy streaming another answer
    let data = ctx.data();
    let (handle, mut slot, plan) = begin_acknowledged(
        &data.session,
        &document,
        data.config.limits,
        &question,
        ctx.say("…"),
    )
    .await?;

    info!(user = ctx.author().name, question, "Question received");

    let prompt = match plan {
        TurnPlan::Canned(reply) => {
            drop(slot);
            return deliver(ctx, &handle, &reply).await;
        }
        TurnPlan::Generate(prompt) => prompt,
    };

    let session = ensure_session(&mut slot, &document, data.config.limits);
    let contents = session.contents_for(&prompt);

    let started = Instant::now();
    let result = stream_reply(ctx, &handle, &contents).await;
    if let Err(e) = &result {
        warn!("Generation failed: {:#}", e);
    }
    let answer = session.finish_turn(&prompt, result);
    drop(slot);

    info!(
        answer_len = answer.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Answer delivered"
    );

    deliver(ctx, &handle, &answer).await
}

/// Consume the reply stream, editing the placeholder as text arrives.
async fn stream_reply(
    ctx: Context<'_>,
    handle: &ReplyHandle<'_>,
    contents: &[Content],
) -> anyhow::Result<String> {
    let mut stream = ctx
        .data()
        .llm
        .stream_chat(SYSTEM_INSTRUCTION, contents)
        .await?;

    let mut collected = String::new();
    let mut last_edit = Instant::now();

    while let Some(piece) = stream.next().await {
        collected.push_str(&piece?);

        if last_edit.elapsed() >= EDIT_INTERVAL {
            let preview = preview(&collected);
            if let Err(e) = handle.edit(ctx, CreateReply::default().content(preview)).await {
                warn!("Failed to update streaming message: {}", e);
            }
            last_edit = Instant::now();
        }
    }

    Ok(collected)
}

/// Replace the placeholder with the first chunk, send the rest as follow-ups.
async fn deliver(
    ctx: Context<'_>,
    handle: &ReplyHandle<'_>,
    answer: &str,
) -> Result<(), anyhow::Error> {
    let mut chunks = split_chunks(answer, MAX_MESSAGE_CHARS).into_iter();
    let first = chunks.next().unwrap_or("");
    handle
        .edit(ctx, CreateReply::default().content(first))
        .await?;
    for chunk in chunks {
        ctx.say(chunk).await?;
    }
    Ok(())
}

/// In-progress text, cut to fit a single message.
fn preview(text: &str) -> String {
    if text.chars().count() <= MAX_MESSAGE_CHARS {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(MAX_MESSAGE_CHARS - 1).collect();
    cut.push('…');
    cut
}

/// Split text into pieces of at most `max_chars` characters,
/// preferring to break after a newline, then after a space.
pub fn split_chunks(text: &str, max_chars: usize) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut remaining = text;

    while !remaining.is_empty() {
        let limit = remaining
            .char_indices()
            .nth(max_chars)
            .map(|(i, _)| i)
            .unwrap_or(remaining.len());
        let split_at = if limit < remaining.len() {
            remaining[..limit]
                .rfind('\n')
                .or_else(|| remaining[..limit].rfind(' '))
                .map(|i| i + 1)
                .unwrap_or(limit)
        } else {
            limit
        };
        chunks.push(&remaining[..split_at]);
        remaining = &remaining[split_at..];
    }

    chunks
}
