//! Answer a question photo from disk without going through Telegram.
//!
//! Usage: `quizlens-ask <image> [extra prompt line]`
//!
//! Waits for every lookup instead of applying the bot's deadline.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use tracing::info;

use quizlens::app::Services;
use quizlens::circuit_breaker::CircuitBreaker;
use quizlens::config::{LogFormat, ServiceConfig};
use quizlens::errors::UpstreamError;
use quizlens::logging::init_tracing;
use quizlens::ocr::extract_text;
use quizlens::ocr_config::OcrConfig;
use quizlens::question::Question;
use quizlens::race::{AnswerRace, ReplySink, TaskKind};

struct PrintSink;

#[async_trait]
impl ReplySink for PrintSink {
    async fn delivered(&self, kind: TaskKind, text: &str) -> Result<()> {
        println!("== {kind}\n{text}\n");
        Ok(())
    }

    async fn failed(&self, kind: TaskKind, error: &UpstreamError) -> Result<()> {
        eprintln!("== {kind} failed: {error}");
        Ok(())
    }

    async fn timed_out(&self, pending: &[TaskKind]) -> Result<()> {
        eprintln!("== timed out waiting for {pending:?}");
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    init_tracing(LogFormat::from_env());

    let mut args = std::env::args().skip(1);
    let Some(path) = args.next() else {
        bail!("usage: quizlens-ask <image> [extra prompt line]");
    };
    let note = args.collect::<Vec<_>>().join(" ");

    let config = ServiceConfig::from_env()?;
    let ocr_config = OcrConfig::default();
    let services = Services::from_config(&config, &ocr_config)?;
    let breaker = CircuitBreaker::new(ocr_config.recovery.clone());

    let image = tokio::fs::read(&path)
        .await
        .with_context(|| format!("Failed to read {path}"))?;
    info!(path = %path, bytes = image.len(), "Image loaded");

    let text = extract_text(services.recognizer.as_ref(), &image, &ocr_config, &breaker).await?;
    let question = Question::from_ocr_text(&text, Some(note.as_str()))?;

    println!("== prompt\n{}\n", question.prompt);

    let race = AnswerRace::new(services.chat, services.search, None);
    let report = race.run(&question, &PrintSink).await?;

    info!(report = ?report, "Done");
    Ok(())
}
