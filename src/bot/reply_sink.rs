//! Reports race results as replies to the photographed question.

use anyhow::Result;
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{MessageId, ReplyParameters};
use tracing::debug;

use crate::errors::UpstreamError;
use crate::localization::t_lang;
use crate::race::{ReplySink, TaskKind};

use super::ui_builder::{split_message, task_failed_message, TELEGRAM_MAX_MESSAGE_CHARS};

pub struct TelegramReplySink {
    bot: Bot,
    chat_id: ChatId,
    reply_to: MessageId,
    language_code: Option<String>,
}

impl TelegramReplySink {
    pub fn new(
        bot: Bot,
        chat_id: ChatId,
        reply_to: MessageId,
        language_code: Option<String>,
    ) -> Self {
        Self {
            bot,
            chat_id,
            reply_to,
            language_code,
        }
    }

    async fn reply(&self, text: &str) -> Result<()> {
        for chunk in split_message(text, TELEGRAM_MAX_MESSAGE_CHARS) {
            self.bot
                .send_message(self.chat_id, chunk)
                .reply_parameters(ReplyParameters::new(self.reply_to))
                .await?;
        }
        Ok(())
    }
}

#[async_trait]
impl ReplySink for TelegramReplySink {
    async fn delivered(&self, kind: TaskKind, text: &str) -> Result<()> {
        debug!(chat_id = %self.chat_id, task = %kind, "Replying with task result");
        self.reply(text).await
    }

    async fn failed(&self, kind: TaskKind, _error: &UpstreamError) -> Result<()> {
        // the description is optional enrichment, its failures are only logged
        if kind == TaskKind::Description {
            return Ok(());
        }
        self.reply(&task_failed_message(kind, self.language_code.as_deref()))
            .await
    }

    async fn timed_out(&self, _pending: &[TaskKind]) -> Result<()> {
        self.reply(&t_lang("answer-timeout", self.language_code.as_deref()))
            .await
    }
}
