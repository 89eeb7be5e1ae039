use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::llm::{CompletionSettings, DEFAULT_OPENAI_BASE_URL};

pub const DEFAULT_ANSWER_DEADLINE_SECS: u64 = 5;
pub const DEFAULT_LLM_REQUEST_TIMEOUT_SECS: u64 = 4;
pub const DEFAULT_LLM_TEMPERATURE: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    /// Reads `LOG_FORMAT`, anything but `json` is plain text
    pub fn from_env() -> Self {
        match env::var("LOG_FORMAT") {
            Ok(value) if value.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Text,
        }
    }
}

/// Keys shared by the bot and the command line tool
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub openai_api_key: String,
    pub openai_chat_model: String,
    pub openai_base_url: String,
    pub vision_api_key: String,
    pub rapid_api_key: Option<String>,
    pub llm_request_timeout: Duration,
    pub llm_temperature: f32,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub telegram_token: String,
    pub allowed_user_id: Option<u64>,
    pub answer_deadline: Duration,
    pub services: ServiceConfig,
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            openai_api_key: required("OPENAI_API_KEY")?,
            openai_chat_model: required("OPENAI_CHAT_MODEL")?,
            openai_base_url: optional("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            vision_api_key: required("GOOGLE_VISION_API_KEY")?,
            rapid_api_key: optional("RAPID_API_KEY"),
            llm_request_timeout: Duration::from_secs(
                parsed("LLM_REQUEST_TIMEOUT_SECS")?.unwrap_or(DEFAULT_LLM_REQUEST_TIMEOUT_SECS),
            ),
            llm_temperature: parsed("LLM_TEMPERATURE")?.unwrap_or(DEFAULT_LLM_TEMPERATURE),
        })
    }

    pub fn completion_settings(&self) -> CompletionSettings {
        CompletionSettings {
            api_key: self.openai_api_key.clone(),
            model: self.openai_chat_model.clone(),
            base_url: self.openai_base_url.clone(),
            temperature: self.llm_temperature,
            request_timeout: self.llm_request_timeout,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            telegram_token: required("TELEGRAM_BOT_TOKEN")?,
            allowed_user_id: parsed("ALLOWED_USER_ID")?,
            answer_deadline: Duration::from_secs(
                parsed("ANSWER_DEADLINE_SECS")?.unwrap_or(DEFAULT_ANSWER_DEADLINE_SECS),
            ),
            services: ServiceConfig::from_env()?,
        })
    }
}

fn required(key: &str) -> Result<String> {
    optional(key).with_context(|| format!("{key} environment variable is required"))
}

/// Unset and blank values are both treated as absent
fn optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parsed<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    optional(key)
        .map(|value| {
            value
                .trim()
                .parse::<T>()
                .with_context(|| format!("{key} has an invalid value: {value}"))
        })
        .transpose()
}
