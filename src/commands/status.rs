use crate::docs;
use crate::docs::types::Document;
use crate::state::Context;

/// Show which dataset file is loaded
#[poise::command(slash_command, guild_only)]
pub async fn status(ctx: Context<'_>) -> Result<(), anyhow::Error> {
    let data = ctx.data();

    let Some(document) = data.document().await else {
        let cwd = std::env::current_dir()?;
        ctx.say(format!(
            "📁 **File Status**\n⚠️ ไม่พบไฟล์ {} ในระบบ\n💡 กรุณาอัปโหลดไฟล์ dataset ของคุณด้วย `/stats upload`\n\n🔍 **Debug Info:**\n```\n{}\n```",
            data.config.dataset_file,
            docs::describe_search(&cwd)
        ))
        .await?;
        return Ok(());
    };

    let turns = data
        .session
        .lock()
        .await
        .as_ref()
        .map(|s| s.transcript().len());

    ctx.say(render_status(&document, data.llm.model(), turns))
        .await?;
    Ok(())
}

fn render_status(document: &Document, model: &str, turns: Option<usize>) -> String {
    let session = match turns {
        Some(n) => format!("active ({} visible turns)", n),
        None => "not started".to_string(),
    };
    format!(
        "📁 **File Status**\n\
         ✅ Using file: `{}`\n\
         Full path: `{}`\n\
         📄 Content loaded: {} characters, {} pages\n\
         Fingerprint: `{}`\n\
         Loaded at: {}\n\
         Model: `{}`\n\
         Session: {}",
        document.name,
        document.path.display(),
        document.char_count(),
        document.pages,
        &document.fingerprint[..12],
        document.loaded_at.format("%Y-%m-%d %H:%M:%S UTC"),
        model,
        session
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_render_status() {
        let doc = Document::new(
            PathBuf::from("/app/DataSetMath.pdf"),
            "สถิติ".to_string(),
            3,
        );
        let out = render_status(&doc, "gemini-2.5-flash", None);
        assert!(out.contains("Using file: `DataSetMath.pdf`"));
        assert!(out.contains("Full path: `/app/DataSetMath.pdf`"));
        assert!(out.contains("5 characters, 3 pages"));
        assert!(out.contains("Session: not started"));
        assert!(render_status(&doc, "m", Some(3)).contains("active (3 visible turns)"));
    }
}
