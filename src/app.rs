//! Long-lived clients and settings shared by every handler.

use std::sync::Arc;

use anyhow::Result;
use teloxide::types::Message;
use tracing::info;

use crate::circuit_breaker::CircuitBreaker;
use crate::config::{Config, ServiceConfig};
use crate::llm::{ChatModel, OpenAiChatClient};
use crate::ocr::{TextRecognizer, VisionClient};
use crate::ocr_config::OcrConfig;
use crate::race::AnswerRace;
use crate::search::{RapidSearchClient, WebSearch};

/// The three outbound services a question goes through
#[derive(Clone)]
pub struct Services {
    pub recognizer: Arc<dyn TextRecognizer>,
    pub chat: Arc<dyn ChatModel>,
    pub search: Option<Arc<dyn WebSearch>>,
}

impl Services {
    pub fn from_config(config: &ServiceConfig, ocr_config: &OcrConfig) -> Result<Self> {
        let chat = OpenAiChatClient::new(config.completion_settings())?;

        let search = config.rapid_api_key.clone().map(|key| {
            Arc::new(RapidSearchClient::new(key)) as Arc<dyn WebSearch>
        });
        if search.is_none() {
            info!("RAPID_API_KEY not set, description lookup disabled");
        }

        Ok(Self {
            recognizer: Arc::new(VisionClient::new(config.vision_api_key.clone(), ocr_config)),
            chat: Arc::new(chat),
            search,
        })
    }
}

pub struct AppState {
    pub config: Config,
    pub ocr_config: OcrConfig,
    pub breaker: CircuitBreaker,
    pub recognizer: Arc<dyn TextRecognizer>,
    pub race: AnswerRace,
    /// Used for Telegram file downloads
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(config: Config, ocr_config: OcrConfig, services: Services) -> Self {
        let breaker = CircuitBreaker::new(ocr_config.recovery.clone());
        let race = AnswerRace::new(services.chat, services.search, Some(config.answer_deadline));

        Self {
            config,
            ocr_config,
            breaker,
            recognizer: services.recognizer,
            race,
            http: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: Config) -> Result<Self> {
        let ocr_config = OcrConfig::default();
        let services = Services::from_config(&config.services, &ocr_config)?;
        Ok(Self::new(config, ocr_config, services))
    }

    /// Whether the sender of `msg` may use the bot
    pub fn is_authorized(&self, msg: &Message) -> bool {
        match self.config.allowed_user_id {
            None => true,
            Some(allowed) => msg.from.as_ref().is_some_and(|user| user.id.0 == allowed),
        }
    }
}
