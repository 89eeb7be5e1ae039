//! # quizlens
//!
//! A Telegram bot that reads a photographed multiple-choice question with
//! OCR, asks a chat model for the answer, and replies with whatever comes
//! back before the deadline.

pub mod app;
pub mod bot;
pub mod circuit_breaker;
pub mod config;
pub mod dialogue;
pub mod errors;
pub mod localization;
pub mod llm;
pub mod logging;
pub mod ocr;
pub mod ocr_config;
pub mod ocr_errors;
pub mod question;
pub mod question_patterns;
pub mod race;
pub mod search;
