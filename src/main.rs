use std::sync::Arc;

use calorie_wizard::bot::Bot;
use calorie_wizard::channels::{ChannelManager, CliChannel, TelegramChannel};
use calorie_wizard::config::BotConfig;
use calorie_wizard::images::ImageCatalog;
use calorie_wizard::wizard::{InMemorySessionStore, WizardEngine};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env file is fine; the variables may come from the shell.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = BotConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });

    eprintln!("🥗 Calorie Wizard v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Images: {}", config.images_dir.display());

    let mut channels = ChannelManager::new();

    if let Some(token) = config.telegram_token.clone() {
        eprintln!(
            "   Telegram: enabled (allowed: {})",
            if config.allowed_users.iter().any(|u| u == "*") {
                "everyone".to_string()
            } else {
                config.allowed_users.join(", ")
            }
        );
        channels.add(Box::new(TelegramChannel::new(
            token,
            config.allowed_users.clone(),
            config.poll_timeout_secs,
        )));
    }

    if config.cli_enabled {
        eprintln!("   CLI: enabled (type text, or #payload to press a button)");
        channels.add(Box::new(CliChannel::new()));
    }

    eprintln!("   Channels: {}\n", channels.names().join(", "));

    let engine = Arc::new(WizardEngine::new(Arc::new(InMemorySessionStore::new())));
    let bot = Bot::new(engine, ImageCatalog::new(&config.images_dir), channels);
    bot.run().await?;

    Ok(())
}
