//! Command Handler module for the bot's slash commands

use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;
use tracing::{debug, info};

use crate::app::AppState;
use crate::dialogue::{validate_note, ChatDialogue, ChatState, PromptNote};
use crate::localization::t_lang;

use super::ui_builder::{help_message, note_rejected_message, status_message};

#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "Commands:")]
pub enum Command {
    #[command(description = "greeting")]
    Start,
    #[command(description = "how to use the bot")]
    Help,
    #[command(description = "append a line to every question prompt")]
    Add(String),
    #[command(description = "remove the appended line")]
    Rem,
    #[command(description = "show the current settings")]
    Status,
}

pub async fn command_handler(
    bot: Bot,
    msg: Message,
    cmd: Command,
    dialogue: ChatDialogue,
    state: Arc<AppState>,
) -> Result<()> {
    let language_code = msg
        .from
        .as_ref()
        .and_then(|user| user.language_code.as_deref());

    debug!(chat_id = %msg.chat.id, command = ?cmd, "Received command");

    match cmd {
        Command::Start => {
            bot.send_message(msg.chat.id, t_lang("welcome", language_code))
                .await?;
        }
        Command::Help => {
            bot.send_message(msg.chat.id, help_message(language_code))
                .await?;
        }
        Command::Add(text) => match validate_note(&text) {
            Ok(note) => {
                info!(chat_id = %msg.chat.id, note = %note, "Prompt note added");
                dialogue
                    .update(ChatState {
                        note: Some(PromptNote {
                            text: note,
                            added_at: Utc::now(),
                        }),
                    })
                    .await?;
                bot.send_message(msg.chat.id, t_lang("note-added", language_code))
                    .await?;
            }
            Err(reason) => {
                debug!(chat_id = %msg.chat.id, reason, "Rejected prompt note");
                bot.send_message(msg.chat.id, note_rejected_message(reason, language_code))
                    .await?;
            }
        },
        Command::Rem => {
            info!(chat_id = %msg.chat.id, "Prompt note removed");
            dialogue.update(ChatState::default()).await?;
            bot.send_message(msg.chat.id, t_lang("note-removed", language_code))
                .await?;
        }
        Command::Status => {
            let chat_state = dialogue.get_or_default().await?;
            let text = status_message(
                &chat_state,
                state.config.answer_deadline.as_secs(),
                language_code,
            );
            bot.send_message(msg.chat.id, text).await?;
        }
    }

    Ok(())
}
