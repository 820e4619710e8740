use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use poise::serenity_prelude as serenity;
use tokio::sync::{Mutex, MutexGuard, RwLock};
use tracing::info;

use crate::chat::{ChatSession, HistoryLimits, TurnPlan};
use crate::docs::types::Document;
use crate::llm::LlmClient;

/// Process configuration, read once from `.env` and the environment.
pub struct BotConfig {
    pub discord_token: String,
    pub guild_id: Option<serenity::GuildId>,
    /// Explicit dataset location; probed defaults are used when unset or missing.
    pub dataset_path: Option<PathBuf>,
    pub dataset_file: String,
    pub upload_dir: PathBuf,
    pub limits: HistoryLimits,
}

impl BotConfig {
    pub fn from_env() -> Result<Self> {
        let discord_token = dotenv::var("DISCORD_TOKEN").context("DISCORD_TOKEN required")?;
        let guild_id = dotenv::var("DISCORD_GUILD_ID")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(serenity::GuildId::new);
        let dataset_path = dotenv::var("DATASET_PATH")
            .ok()
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);
        let dataset_file =
            dotenv::var("DATASET_FILE").unwrap_or_else(|_| "DataSetMath.pdf".to_string());
        let upload_dir = dotenv::var("UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."));

        let defaults = HistoryLimits::default();
        let limits = HistoryLimits {
            max_pairs: parse_or(dotenv::var("HISTORY_MAX_PAIRS").ok(), defaults.max_pairs),
            render_limit: parse_or(dotenv::var("RENDER_LIMIT").ok(), defaults.render_limit),
        };

        Ok(Self {
            discord_token,
            guild_id,
            dataset_path,
            dataset_file,
            upload_dir,
            limits,
        })
    }
}

fn parse_or(value: Option<String>, default: usize) -> usize {
    value
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(default)
}

pub struct AppState {
    pub config: BotConfig,
    pub llm: Arc<LlmClient>,
    /// `None` until a dataset is found on disk or uploaded.
    pub document: RwLock<Option<Arc<Document>>>,
    /// Created lazily on the first question, dropped by `/stats clear`.
    pub session: Mutex<Option<ChatSession>>,
}

impl AppState {
    pub fn new(config: BotConfig, llm: Arc<LlmClient>, document: Option<Document>) -> Self {
        Self {
            config,
            llm,
            document: RwLock::new(document.map(Arc::new)),
            session: Mutex::new(None),
        }
    }

    pub async fn document(&self) -> Option<Arc<Document>> {
        self.document.read().await.clone()
    }

    /// Swap in a new document. The running session was seeded with the old one.
    pub async fn replace_document(&self, document: Document) {
        *self.document.write().await = Some(Arc::new(document));
        self.clear_session().await;
    }

    pub async fn clear_session(&self) {
        if self.session.lock().await.take().is_some() {
            info!("Chat session cleared");
        }
    }
}

/// Return the running session, seeding a new one from `document` if needed.
pub fn ensure_session<'a>(
    slot: &'a mut Option<ChatSession>,
    document: &Document,
    limits: HistoryLimits,
) -> &'a mut ChatSession {
    slot.get_or_insert_with(|| {
        info!(document = %document.name, "Starting chat session");
        ChatSession::new(&document.text, limits)
    })
}

/// Acknowledge the user, then queue on the session and record the question.
///
/// The question is only recorded once `ack` has produced a live handle, so a
/// failed acknowledgement never leaves an unanswered turn in the transcript.
pub async fn begin_acknowledged<'s, H, E, Fut>(
    slot: &'s Mutex<Option<ChatSession>>,
    document: &Document,
    limits: HistoryLimits,
    question: &str,
    ack: Fut,
) -> Result<(H, MutexGuard<'s, Option<ChatSession>>, TurnPlan)>
where
    Fut: Future<Output = std::result::Result<H, E>>,
    E: std::error::Error + Send + Sync + 'static,
{
    let handle = ack.await?;
    let mut guard = slot.lock().await;
    let plan = ensure_session(&mut guard, document, limits).begin_turn(question);
    Ok((handle, guard, plan))
}

pub type Context<'a> = poise::Context<'a, AppState, anyhow::Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_or() {
        assert_eq!(parse_or(Some(" 4 ".to_string()), 8), 4);
        assert_eq!(parse_or(Some("many".to_string()), 8), 8);
        assert_eq!(parse_or(None, 20), 20);
    }

    #[test]
    fn test_ensure_session_reuses_existing() {
        let doc = Document::new(PathBuf::from("DataSetMath.pdf"), "เนื้อหา".to_string(), 1);
        let mut slot = None;
        ensure_session(&mut slot, &doc, HistoryLimits::default()).begin_turn("add");
        let session = ensure_session(&mut slot, &doc, HistoryLimits::default());
        assert_eq!(session.transcript().len(), 3);
    }

    fn doc() -> Document {
        Document::new(PathBuf::from("DataSetMath.pdf"), "เนื้อหา".to_string(), 1)
    }

    #[tokio::test]
    async fn test_failed_ack_records_nothing() {
        let slot = Mutex::new(None);
        let ack = async { Err::<(), _>(std::io::Error::other("Unknown Interaction")) };
        let result =
            begin_acknowledged(&slot, &doc(), HistoryLimits::default(), "ค่าเฉลี่ยคืออะไร", ack).await;
        assert!(result.is_err());
        assert!(slot.lock().await.is_none());
    }

    #[tokio::test]
    async fn test_ack_happens_before_waiting_on_session() {
        let slot = Mutex::new(Some(ChatSession::new("เนื้อหา", HistoryLimits::default())));
        let acked = std::sync::atomic::AtomicBool::new(false);

        // Another question is still streaming
        let busy = slot.lock().await;
        let ack = async {
            acked.store(true, std::sync::atomic::Ordering::SeqCst);
            Ok::<_, std::io::Error>("handle")
        };
        let waiting = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            begin_acknowledged(&slot, &doc(), HistoryLimits::default(), "มัธยฐาน", ack),
        )
        .await;
        assert!(waiting.is_err());
        assert!(acked.load(std::sync::atomic::Ordering::SeqCst));
        assert_eq!(busy.as_ref().unwrap().transcript().len(), 1);
        drop(busy);

        let ack = async { Ok::<_, std::io::Error>("handle") };
        let (handle, guard, plan) =
            begin_acknowledged(&slot, &doc(), HistoryLimits::default(), "มัธยฐาน", ack)
                .await
                .unwrap();
        assert_eq!(handle, "handle");
        assert!(matches!(plan, TurnPlan::Generate(_)));
        assert_eq!(guard.as_ref().unwrap().transcript().len(), 2);
    }
}
