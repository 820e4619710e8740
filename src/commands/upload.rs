use poise::serenity_prelude as serenity;
use tracing::{info, warn};

use crate::docs::ingest;
use crate::state::Context;

/// Upload the course PDF (used when the dataset is missing or outdated)
#[poise::command(slash_command, guild_only)]
pub async fn upload(
    ctx: Context<'_>,
    #[description = "ไฟล์ DataSetMath.pdf หรือไฟล์ PDF ที่มีข้อมูลรายวิชาสถิติ KMUTNB"]
    file: serenity::Attachment,
) -> Result<(), anyhow::Error> {
    ctx.defer().await?;

    info!(
        user = ctx.author().name,
        file = file.filename,
        size = file.size,
        "Upload started"
    );

    let bytes = file.download().await?;
    let dir = &ctx.data().config.upload_dir;

    match ingest::ingest_upload(dir, &file.filename, &bytes).await {
        Ok(document) => {
            let chars = document.char_count();
            ctx.data().replace_document(document).await;
            ctx.say(format!(
                "✅ อัปโหลดไฟล์ {} เรียบร้อยแล้ว\n📄 Content loaded: {} characters",
                file.filename, chars
            ))
            .await?;
        }
        Err(e) => {
            warn!("Upload rejected: {:#}", e);
            ctx.say(format!(
                "{:#}\n💡 ลองตรวจสอบไฟล์ PDF หรืออัปโหลดไฟล์ใหม่",
                e
            ))
            .await?;
        }
    }

    Ok(())
}
