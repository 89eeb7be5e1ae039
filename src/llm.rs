//! Chat completion client for the question answering model.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::UpstreamError;

const SERVICE: &str = "openai";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// A model that answers a single user prompt
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, UpstreamError>;
}

#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub temperature: f32,
    pub messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
pub struct ChatMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatCompletionResponse {
    /// Content of the first choice, if any
    pub fn into_content(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
    }
}

#[derive(Debug, Clone)]
pub struct CompletionSettings {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
    pub request_timeout: Duration,
}

pub struct OpenAiChatClient {
    client: reqwest::Client,
    settings: CompletionSettings,
}

impl OpenAiChatClient {
    pub fn new(settings: CompletionSettings) -> Result<Self, UpstreamError> {
        let client = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .map_err(|e| UpstreamError::http(SERVICE, e))?;

        info!(
            model = %settings.model,
            timeout_ms = settings.request_timeout.as_millis() as u64,
            "Chat client ready"
        );

        Ok(Self { client, settings })
    }
}

#[async_trait]
impl ChatModel for OpenAiChatClient {
    async fn complete(&self, prompt: &str) -> Result<String, UpstreamError> {
        let request = ChatCompletionRequest {
            model: &self.settings.model,
            temperature: self.settings.temperature,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let url = format!("{}/chat/completions", self.settings.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.settings.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| UpstreamError::http(SERVICE, e))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Status {
                service: SERVICE,
                status,
                body,
            });
        }

        let completion: ChatCompletionResponse =
            response.json().await.map_err(|e| UpstreamError::Decode {
                service: SERVICE,
                message: e.to_string(),
            })?;

        let content = completion
            .into_content()
            .ok_or(UpstreamError::EmptyResponse { service: SERVICE })?;

        debug!(chars = content.len(), "Completion received");
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let request = ChatCompletionRequest {
            model: "gpt-4o-mini",
            temperature: 1.0,
            messages: vec![ChatMessage {
                role: "user",
                content: "Qual a capital?",
            }],
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["model"], "gpt-4o-mini");
        assert_eq!(value["messages"][0]["role"], "user");
        assert_eq!(value["messages"][0]["content"], "Qual a capital?");
    }

    #[test]
    fn test_first_choice_content() {
        let response: ChatCompletionResponse = serde_json::from_str(
            r#"{
                "id": "chatcmpl-1",
                "object": "chat.completion",
                "choices": [
                    {"index": 0, "message": {"role": "assistant", "content": "B) Lisboa"}, "finish_reason": "stop"}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(response.into_content().as_deref(), Some("B) Lisboa"));
    }

    #[test]
    fn test_missing_or_blank_content() {
        let no_choices: ChatCompletionResponse =
            serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert_eq!(no_choices.into_content(), None);

        let null_content: ChatCompletionResponse = serde_json::from_str(
            r#"{"choices": [{"message": {"role": "assistant", "content": null}}]}"#,
        )
        .unwrap();
        assert_eq!(null_content.into_content(), None);

        let blank: ChatCompletionResponse = serde_json::from_str(
            r#"{"choices": [{"message": {"role": "assistant", "content": "  "}}]}"#,
        )
        .unwrap();
        assert_eq!(blank.into_content(), None);
    }
}
