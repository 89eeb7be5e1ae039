//! Message Handler module for processing incoming Telegram messages

use std::sync::Arc;

use anyhow::Result;
use teloxide::prelude::*;
use teloxide::types::FileId;
use tracing::{debug, error, info, warn};

use crate::app::AppState;
use crate::dialogue::ChatDialogue;
use crate::localization::{t_args_lang, t_lang};
use crate::ocr::extract_text;
use crate::ocr_errors::OcrError;
use crate::question::Question;

use super::reply_sink::TelegramReplySink;

/// Download a Telegram file into memory
pub async fn download_file(bot: &Bot, http: &reqwest::Client, file_id: FileId) -> Result<Vec<u8>> {
    let file = bot.get_file(file_id).await?;
    let url = format!(
        "https://api.telegram.org/file/bot{}/{}",
        bot.token(),
        file.path
    );

    let bytes = http.get(&url).send().await?.error_for_status()?.bytes().await?;
    Ok(bytes.to_vec())
}

/// User-facing text for an OCR failure
pub fn ocr_error_message(err: &OcrError, language_code: Option<&str>) -> String {
    match err {
        OcrError::Validation(msg) => {
            t_args_lang("error-validation", &[("msg", msg.as_str())], language_code)
        }
        OcrError::NoText => t_lang("error-no-text-found", language_code),
        OcrError::Timeout(msg) => {
            t_args_lang("error-ocr-timeout", &[("msg", msg.as_str())], language_code)
        }
        OcrError::CircuitOpen(_) => t_lang("error-ocr-unavailable", language_code),
        OcrError::Request(_) | OcrError::Service { .. } => {
            t_lang("error-ocr-service", language_code)
        }
    }
}

/// Download, read and answer one photographed question
pub async fn answer_image(
    bot: &Bot,
    msg: &Message,
    file_id: FileId,
    file_size: u32,
    state: &AppState,
    dialogue: ChatDialogue,
) -> Result<()> {
    let chat_id = msg.chat.id;
    let language_code = msg
        .from
        .as_ref()
        .and_then(|user| user.language_code.clone());
    let lang = language_code.as_deref();

    if u64::from(file_size) > state.ocr_config.max_file_size {
        warn!(user_id = %chat_id, file_size, "Image too large, rejected before download");
        let limit = format!("{} bytes > {}", file_size, state.ocr_config.max_file_size);
        bot.send_message(chat_id, t_args_lang("error-validation", &[("msg", limit.as_str())], lang))
            .await?;
        return Ok(());
    }

    bot.send_message(chat_id, t_lang("processing-photo", lang))
        .await?;

    let image = match download_file(bot, &state.http, file_id).await {
        Ok(bytes) => {
            debug!(user_id = %chat_id, bytes = bytes.len(), "Image downloaded successfully");
            bytes
        }
        Err(e) => {
            error!(user_id = %chat_id, error = %e, "Failed to download image for user");
            bot.send_message(chat_id, t_lang("error-download-failed", lang))
                .await?;
            return Err(e);
        }
    };

    let text = match extract_text(
        state.recognizer.as_ref(),
        &image,
        &state.ocr_config,
        &state.breaker,
    )
    .await
    {
        Ok(text) => text,
        Err(e) => {
            error!(user_id = %chat_id, error = %e, "OCR processing failed for user");
            bot.send_message(chat_id, ocr_error_message(&e, lang))
                .await?;
            return Ok(());
        }
    };

    let chat_state = dialogue.get_or_default().await?;
    let question = match Question::from_ocr_text(&text, chat_state.note_text()) {
        Ok(question) => question,
        Err(e) => {
            warn!(user_id = %chat_id, error = %e, "No question in recognized text");
            bot.send_message(chat_id, t_lang("error-question-empty", lang))
                .await?;
            return Ok(());
        }
    };

    info!(user_id = %chat_id, prompt = %question.prompt, "Question recognized");

    let sink = TelegramReplySink::new(bot.clone(), chat_id, msg.id, language_code.clone());
    let report = state.race.run(&question, &sink).await?;

    debug!(user_id = %chat_id, report = ?report, "Question answered");
    Ok(())
}

async fn handle_photo_message(
    bot: &Bot,
    msg: &Message,
    state: &AppState,
    dialogue: ChatDialogue,
) -> Result<()> {
    debug!(user_id = %msg.chat.id, "Received photo message from user");

    // sizes are ordered smallest first
    if let Some(largest_photo) = msg.photo().and_then(|photos| photos.last()) {
        answer_image(
            bot,
            msg,
            largest_photo.file.id.clone(),
            largest_photo.file.size,
            state,
            dialogue,
        )
        .await?;
    }
    Ok(())
}

async fn handle_document_message(
    bot: &Bot,
    msg: &Message,
    state: &AppState,
    dialogue: ChatDialogue,
) -> Result<()> {
    let language_code = msg
        .from
        .as_ref()
        .and_then(|user| user.language_code.as_deref());

    if let Some(doc) = msg.document() {
        let is_image = doc
            .mime_type
            .as_ref()
            .is_some_and(|mime| mime.to_string().starts_with("image/"));

        if is_image {
            debug!(user_id = %msg.chat.id, "Received image document from user");
            answer_image(bot, msg, doc.file.id.clone(), doc.file.size, state, dialogue).await?;
        } else {
            debug!(
                user_id = %msg.chat.id,
                mime_type = ?doc.mime_type,
                "Received non-image document from user"
            );
            bot.send_message(msg.chat.id, t_lang("error-unsupported-format", language_code))
                .await?;
        }
    }
    Ok(())
}

pub async fn message_handler(
    bot: Bot,
    msg: Message,
    dialogue: ChatDialogue,
    state: Arc<AppState>,
) -> Result<()> {
    let language_code = msg
        .from
        .as_ref()
        .and_then(|user| user.language_code.as_deref());

    if msg.photo().is_some() {
        handle_photo_message(&bot, &msg, &state, dialogue).await?;
    } else if msg.document().is_some() {
        handle_document_message(&bot, &msg, &state, dialogue).await?;
    } else if msg.text().is_some() {
        debug!(user_id = %msg.chat.id, "Received text message from user");
        bot.send_message(msg.chat.id, t_lang("text-hint", language_code))
            .await?;
    } else {
        debug!(user_id = %msg.chat.id, "Received unsupported message type from user");
        bot.send_message(msg.chat.id, t_lang("unsupported-message", language_code))
            .await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::localization::init_localization;

    #[test]
    fn test_ocr_error_messages() {
        init_localization().unwrap();

        let msg = ocr_error_message(&OcrError::Validation("too big".to_string()), Some("en"));
        assert!(msg.contains("too big"));

        let msg = ocr_error_message(&OcrError::NoText, Some("pt-BR"));
        assert!(msg.contains("Não encontrei texto"));

        let msg = ocr_error_message(&OcrError::CircuitOpen("5 failures".to_string()), None);
        assert!(msg.contains("temporarily unavailable"));
    }
}
