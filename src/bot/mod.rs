//! Bot module for handling Telegram interactions
//!
//! - `command_handler`: slash commands and the per-chat prompt note
//! - `message_handler`: photos, image documents and everything else
//! - `reply_sink`: posts race results as replies
//! - `ui_builder`: formats outgoing messages

pub mod command_handler;
pub mod message_handler;
pub mod reply_sink;
pub mod ui_builder;

use std::sync::Arc;

use teloxide::dispatching::dialogue::InMemStorage;
use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;

use crate::app::AppState;
use crate::dialogue::ChatState;

pub use command_handler::{command_handler, Command};
pub use message_handler::message_handler;
pub use reply_sink::TelegramReplySink;

/// Update handler tree: authorized messages only, commands before content
pub fn schema() -> UpdateHandler<anyhow::Error> {
    Update::filter_message()
        .filter(|msg: Message, state: Arc<AppState>| state.is_authorized(&msg))
        .enter_dialogue::<Message, InMemStorage<ChatState>, ChatState>()
        .branch(
            dptree::entry()
                .filter_command::<Command>()
                .endpoint(command_handler),
        )
        .branch(dptree::endpoint(message_handler))
}
