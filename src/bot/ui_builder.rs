//! UI Builder module for formatting outgoing messages

use crate::dialogue::{ChatState, MAX_NOTE_CHARS};
use crate::localization::{t_args_lang, t_lang};
use crate::race::TaskKind;

/// Telegram rejects longer message texts
pub const TELEGRAM_MAX_MESSAGE_CHARS: usize = 4096;

pub fn help_message(language_code: Option<&str>) -> String {
    [
        t_lang("help-title", language_code),
        t_lang("help-body", language_code),
        t_lang("help-commands", language_code),
    ]
    .join("\n\n")
}

pub fn status_message(
    state: &ChatState,
    deadline_secs: u64,
    language_code: Option<&str>,
) -> String {
    let note_line = match &state.note {
        Some(note) => {
            let since = note.added_at.format("%Y-%m-%d %H:%M UTC").to_string();
            t_args_lang(
                "status-note",
                &[("note", note.text.as_str()), ("since", since.as_str())],
                language_code,
            )
        }
        None => t_lang("status-no-note", language_code),
    };

    let secs = deadline_secs.to_string();
    format!(
        "{}\n{}",
        note_line,
        t_args_lang("status-deadline", &[("secs", secs.as_str())], language_code)
    )
}

/// Reply to an `/add` whose text `validate_note` rejected
pub fn note_rejected_message(reason: &str, language_code: Option<&str>) -> String {
    match reason {
        "too_long" => {
            let max = MAX_NOTE_CHARS.to_string();
            t_args_lang("note-too-long", &[("max", max.as_str())], language_code)
        }
        _ => t_lang("note-usage", language_code),
    }
}

pub fn task_failed_message(kind: TaskKind, language_code: Option<&str>) -> String {
    let task = t_lang(&format!("task-{}", kind.as_str()), language_code);
    t_args_lang("answer-failed", &[("task", task.as_str())], language_code)
}

/// Split `text` into pieces Telegram accepts, preferring line breaks
pub fn split_message(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in text.split_inclusive('\n') {
        let line_len = line.chars().count();

        if current_len + line_len > max_chars && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if line_len > max_chars {
            // a single oversized line is cut on char boundaries
            let chars: Vec<char> = line.chars().collect();
            for piece in chars.chunks(max_chars) {
                chunks.push(piece.iter().collect());
            }
            continue;
        }

        current.push_str(line);
        current_len += line_len;
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_is_one_chunk() {
        assert_eq!(split_message("B) Lisboa", 4096), vec!["B) Lisboa".to_string()]);
        assert!(split_message("", 4096).is_empty());
    }

    #[test]
    fn test_splits_on_line_breaks() {
        let chunks = split_message("aaaa\nbbbb\ncc", 10);
        assert_eq!(chunks, vec!["aaaa\nbbbb\n".to_string(), "cc".to_string()]);
    }

    #[test]
    fn test_long_line_is_cut() {
        let chunks = split_message(&"é".repeat(25), 10);
        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.chars().count() <= 10));
        assert_eq!(chunks.concat(), "é".repeat(25));
    }
}
