mod chat;
mod commands;
mod docs;
mod llm;
mod state;
mod synonyms;

use std::sync::Arc;

use poise::serenity_prelude as serenity;
use poise::{Framework, FrameworkOptions};
use tracing::{error, info, warn, Level};

use llm::LlmClient;
use state::{AppState, BotConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load env
    let _ = dotenv::dotenv();

    let level = dotenv::var("LOG_LEVEL")
        .ok()
        .and_then(|l| l.parse::<Level>().ok())
        .unwrap_or(Level::DEBUG);
    tracing_subscriber::fmt().with_max_level(level).init();

    let config = BotConfig::from_env()?;

    // Init LLM client
    let llm_client = Arc::new(LlmClient::from_env()?);
    info!(model = llm_client.model(), "LLM client initialized");

    // Load the dataset; without one the bot still starts and asks for an upload
    let document = match docs::find_dataset(config.dataset_path.as_deref(), &config.dataset_file) {
        Some(path) => match docs::load_document(&path).await {
            Ok(doc) => Some(doc),
            Err(e) => {
                error!(path = %path.display(), "{:#}", e);
                None
            }
        },
        None => {
            let cwd = std::env::current_dir()?;
            warn!(
                file = %config.dataset_file,
                "Dataset not found\n{}",
                docs::describe_search(&cwd)
            );
            None
        }
    };

    let guild_id = config.guild_id;
    let token = config.discord_token.clone();
    let app_state = AppState::new(config, llm_client, document);

    let intents = serenity::GatewayIntents::GUILDS | serenity::GatewayIntents::GUILD_MESSAGES;

    let framework = Framework::builder()
        .options(FrameworkOptions {
            commands: vec![commands::stats()],
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!("Bot connected as: {} ({})", ready.user.name, ready.user.id);

                let commands = &framework.options().commands;
                for cmd in commands {
                    info!("  /{} ({} subcommands)", cmd.name, cmd.subcommands.len());
                    for sub in &cmd.subcommands {
                        info!("    /{} {}", cmd.name, sub.name);
                    }
                }

                if let Some(gid) = guild_id {
                    info!("Registering to guild {} (instant)", gid);
                    poise::builtins::register_in_guild(ctx, &framework.options().commands, gid)
                        .await?;
                } else {
                    info!("Registering globally (up to 1 hour delay)");
                    poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                }

                Ok(app_state)
            })
        })
        .build();

    info!("Starting statistics syllabus bot...");

    let mut client = serenity::ClientBuilder::new(&token, intents)
        .framework(framework)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create client: {}", e))?;

    if let Err(e) = client.start().await {
        error!("Client error: {}", e);
    }

    Ok(())
}
