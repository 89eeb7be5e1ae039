//! # Question Patterns Module
//!
//! Regex patterns and prompt constants used when turning OCR output into a
//! model prompt.

use lazy_static::lazy_static;
use regex::Regex;

/// Stems asking "which of the following", where a web snippet about the stem alone is useless
pub const SELECTION_PATTERN: &str = r"(?:QUAL +D(?:O|A)S +SEGUINTES)|(?:QUAL +DESTES)";

/// Watermark printed under the options on the photographed screens
pub const WATERMARK_PATTERN: &str = r"D(?:r|e)(?:\.|:)Why";

/// Instruction appended after the options
pub const ANSWER_INSTRUCTION: &str = "Por favor responde apenas com a letra correspondente à resposta (se não tiver letra considere a primeira opcão a letra A, segunda a B ...) e a resposta.\nSe não tiver opções simplesmente responda sucitamente.";

/// Appended to the stem for the short secondary answer
pub const CONCISE_INSTRUCTION: &str = "Responda de forma sucinta";

/// Leading lines this short (in characters) are OCR noise such as clocks and icons
pub const NOISE_LINE_MAX_CHARS: usize = 6;
pub const MAX_NOISE_LINES: usize = 5;
/// The question mark is looked for within this many lines
pub const STEM_SEARCH_LINES: usize = 3;
pub const MAX_LABELLED_OPTIONS: usize = 5;

lazy_static! {
    pub static ref SELECTION_REGEX: Regex =
        Regex::new(SELECTION_PATTERN).expect("Selection pattern should be valid");
    pub static ref WATERMARK_REGEX: Regex =
        Regex::new(WATERMARK_PATTERN).expect("Watermark pattern should be valid");
}
