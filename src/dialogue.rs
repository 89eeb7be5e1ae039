//! Per-chat state kept between messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use teloxide::dispatching::dialogue::{Dialogue, InMemStorage};

/// Longest custom line accepted by `/add`
pub const MAX_NOTE_CHARS: usize = 500;

/// Line appended to every question prompt of a chat
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptNote {
    pub text: String,
    pub added_at: DateTime<Utc>,
}

/// Settings a chat changes through commands
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatState {
    pub note: Option<PromptNote>,
}

impl ChatState {
    pub fn note_text(&self) -> Option<&str> {
        self.note.as_ref().map(|note| note.text.as_str())
    }
}

/// Type alias for our chat dialogue
pub type ChatDialogue = Dialogue<ChatState, InMemStorage<ChatState>>;

/// Validates the argument of `/add`
pub fn validate_note(text: &str) -> Result<String, &'static str> {
    let trimmed = text.trim();

    if trimmed.is_empty() {
        return Err("empty");
    }

    if trimmed.chars().count() > MAX_NOTE_CHARS {
        return Err("too_long");
    }

    Ok(trimmed.to_string())
}
