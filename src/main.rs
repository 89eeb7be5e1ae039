use std::sync::Arc;

use anyhow::Result;
use teloxide::dispatching::dialogue::InMemStorage;
use teloxide::prelude::*;
use tracing::{debug, info};

use quizlens::app::AppState;
use quizlens::bot;
use quizlens::config::{Config, LogFormat};
use quizlens::dialogue::ChatState;
use quizlens::localization::init_localization;
use quizlens::logging::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    init_tracing(LogFormat::from_env());

    info!("Starting quizlens Telegram bot");

    let config = Config::from_env()?;
    init_localization()?;

    info!(
        allowed_user = ?config.allowed_user_id,
        deadline_secs = config.answer_deadline.as_secs(),
        model = %config.services.openai_chat_model,
        "Configuration loaded"
    );

    let bot = Bot::new(&config.telegram_token);
    let state = Arc::new(AppState::from_config(config)?);

    info!("Bot initialized, starting dispatcher");

    Dispatcher::builder(bot, bot::schema())
        .dependencies(dptree::deps![state, InMemStorage::<ChatState>::new()])
        .default_handler(|update| async move {
            debug!(update_id = ?update.id, "Ignoring update");
        })
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    info!("Bot stopped");
    Ok(())
}
