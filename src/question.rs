//! # Question Module
//!
//! Turns the raw text detected on a photographed quiz screen into the prompt
//! sent to the chat model.
//!
//! The slicing is line based:
//!
//! - short leading lines (status bar, timers) are dropped
//! - a stem wrapped over several lines is merged up to its question mark
//! - everything from the watermark line on is cut
//! - the first options are labelled `A)` to `E)`

use thiserror::Error;
use tracing::{debug, trace};

use crate::question_patterns::{
    ANSWER_INSTRUCTION, CONCISE_INSTRUCTION, MAX_LABELLED_OPTIONS, MAX_NOISE_LINES,
    NOISE_LINE_MAX_CHARS, SELECTION_REGEX, STEM_SEARCH_LINES, WATERMARK_REGEX,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuestionError {
    #[error("no question text left after cleanup")]
    Empty,
}

/// A quiz question ready to be asked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    /// The question line, merged when it wrapped
    pub stem: String,
    /// Lines after the stem, the first ones labelled
    pub options: Vec<String>,
    /// Full prompt for the primary answer
    pub prompt: String,
}

impl Question {
    /// Build a question from OCR text using the default answer instruction
    pub fn from_ocr_text(text: &str, suffix: Option<&str>) -> Result<Self, QuestionError> {
        Self::with_instruction(text, suffix, ANSWER_INSTRUCTION)
    }

    /// Build a question from OCR text
    ///
    /// `suffix` is the chat's custom line appended after the instruction; blank
    /// suffixes are ignored.
    pub fn with_instruction(
        text: &str,
        suffix: Option<&str>,
        instruction: &str,
    ) -> Result<Self, QuestionError> {
        let mut lines: Vec<String> = text.lines().map(|line| line.trim().to_string()).collect();

        let noise = lines
            .iter()
            .take(MAX_NOISE_LINES)
            .take_while(|line| line.chars().count() <= NOISE_LINE_MAX_CHARS)
            .count();
        lines.drain(..noise);
        trace!(dropped = noise, "Dropped leading noise lines");

        if lines.iter().all(|line| line.is_empty()) {
            return Err(QuestionError::Empty);
        }

        let stem_end = lines
            .iter()
            .take(STEM_SEARCH_LINES)
            .position(|line| line.contains('?'))
            .unwrap_or(0);
        let continuation: Vec<String> = lines.drain(1..=stem_end).collect();
        for part in continuation {
            lines[0].push(' ');
            lines[0].push_str(&part);
        }

        if let Some(pos) = lines.iter().skip(1).position(|line| WATERMARK_REGEX.is_match(line)) {
            lines.truncate(pos + 1);
        }

        for (index, line) in lines.iter_mut().skip(1).take(MAX_LABELLED_OPTIONS).enumerate() {
            if let Some(letter) = option_letter(index + 1) {
                *line = format!("{letter}) {line}");
            }
        }

        let stem = lines[0].clone();
        let options = lines[1..].to_vec();

        lines.push(instruction.to_string());
        if let Some(suffix) = suffix.filter(|s| !s.trim().is_empty()) {
            lines.push(suffix.to_string());
        }

        debug!(stem_chars = stem.len(), options = options.len(), "Question built from OCR text");

        Ok(Self {
            stem,
            options,
            prompt: lines.join("\n"),
        })
    }

    /// Prompt asking for a short answer to the stem alone
    pub fn concise_prompt(&self) -> String {
        format!("{}\n{}", self.stem, CONCISE_INSTRUCTION)
    }

    /// Whether the stem is a "which of the following" question
    pub fn is_selection(&self) -> bool {
        is_selection_question(&self.stem)
    }
}

/// Whether a stem asks to pick among the listed options
pub fn is_selection_question(stem: &str) -> bool {
    SELECTION_REGEX.is_match(stem)
}

/// 1 → 'A' … 26 → 'Z'
pub fn option_letter(number: usize) -> Option<char> {
    match number {
        1..=26 => char::from_u32(u32::from(b'A') + number as u32 - 1),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_letter_bounds() {
        assert_eq!(option_letter(1), Some('A'));
        assert_eq!(option_letter(5), Some('E'));
        assert_eq!(option_letter(26), Some('Z'));
        assert_eq!(option_letter(0), None);
        assert_eq!(option_letter(27), None);
    }

    #[test]
    fn test_empty_text_is_rejected() {
        assert_eq!(Question::from_ocr_text("", None), Err(QuestionError::Empty));
        assert_eq!(Question::from_ocr_text("  \n \n", None), Err(QuestionError::Empty));
    }

    #[test]
    fn test_only_noise_is_rejected() {
        assert_eq!(
            Question::from_ocr_text("12:30\n4G\n85%", None),
            Err(QuestionError::Empty)
        );
    }

    #[test]
    fn test_concise_prompt() {
        let question =
            Question::from_ocr_text("Quem escreveu Os Lusíadas?\nCamões\nPessoa", None).unwrap();
        assert_eq!(
            question.concise_prompt(),
            "Quem escreveu Os Lusíadas?\nResponda de forma sucinta"
        );
    }
}
