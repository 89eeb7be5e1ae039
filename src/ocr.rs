//! # OCR Module
//!
//! Image validation and text detection through the Google Cloud Vision
//! `images:annotate` API, wrapped in retries, per-attempt timeouts and a
//! circuit breaker.

use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use image::ImageFormat;
use rand::Rng;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::circuit_breaker::CircuitBreaker;
use crate::ocr_config::{OcrConfig, RecoveryConfig};
use crate::ocr_errors::OcrError;

/// Something that turns image bytes into the printed text they contain
#[async_trait]
pub trait TextRecognizer: Send + Sync {
    async fn recognize(&self, image: &[u8]) -> Result<String, OcrError>;
}

/// Google Cloud Vision text detection client
pub struct VisionClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl VisionClient {
    pub fn new(api_key: String, config: &OcrConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: config.endpoint.clone(),
            api_key,
        }
    }
}

#[async_trait]
impl TextRecognizer for VisionClient {
    async fn recognize(&self, image: &[u8]) -> Result<String, OcrError> {
        let body = json!({
            "requests": [{
                "image": { "content": general_purpose::STANDARD.encode(image) },
                "features": [{ "type": "TEXT_DETECTION" }]
            }]
        });

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(OcrError::Service {
                status: status.as_u16(),
                message: service_error_message(&text).unwrap_or(text),
            });
        }

        parse_annotate_response(&text)
    }
}

#[derive(Debug, Deserialize)]
struct AnnotateBatchResponse {
    #[serde(default)]
    responses: Vec<AnnotateImageResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnnotateImageResponse {
    #[serde(default)]
    text_annotations: Vec<EntityAnnotation>,
    error: Option<RpcStatus>,
}

#[derive(Debug, Deserialize)]
struct EntityAnnotation {
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct RpcStatus {
    #[serde(default)]
    code: i32,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: RpcStatus,
}

fn service_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .map(|envelope| envelope.error.message)
        .filter(|message| !message.is_empty())
}

/// Extract the full-text annotation from an `images:annotate` response body
///
/// The first `textAnnotations` entry holds the whole detected text; the
/// following entries are individual words and are ignored.
pub fn parse_annotate_response(body: &str) -> Result<String, OcrError> {
    let batch: AnnotateBatchResponse = serde_json::from_str(body)
        .map_err(|e| OcrError::Request(format!("Malformed annotate response: {e}")))?;

    let response = batch.responses.into_iter().next().ok_or(OcrError::NoText)?;

    if let Some(error) = response.error.filter(|e| !e.message.is_empty()) {
        // google.rpc codes mapped onto the HTTP statuses with the same retry meaning
        let status = match error.code {
            8 => 429,
            13 | 14 => 503,
            _ => 400,
        };
        return Err(OcrError::Service {
            status,
            message: error.message,
        });
    }

    response
        .text_annotations
        .into_iter()
        .next()
        .map(|annotation| annotation.description)
        .filter(|text| !text.trim().is_empty())
        .ok_or(OcrError::NoText)
}

/// Validate image bytes before upload and return the detected format
pub fn validate_image(image: &[u8], config: &OcrConfig) -> Result<ImageFormat, OcrError> {
    if image.is_empty() {
        return Err(OcrError::Validation("image is empty".to_string()));
    }

    if image.len() as u64 > config.max_file_size {
        return Err(OcrError::Validation(format!(
            "image is {} bytes, limit is {}",
            image.len(),
            config.max_file_size
        )));
    }

    if image.len() < config.min_format_bytes {
        return Err(OcrError::Validation(format!(
            "need at least {} bytes to detect the format, got {}",
            config.min_format_bytes,
            image.len()
        )));
    }

    let format = image::guess_format(image)
        .map_err(|e| OcrError::Validation(format!("unknown image format: {e}")))?;

    if is_supported_format(format) {
        debug!(format = ?format, bytes = image.len(), "Image accepted for OCR");
        Ok(format)
    } else {
        Err(OcrError::Validation(format!("unsupported image format {format:?}")))
    }
}

/// Formats the Vision API accepts inline
pub fn is_supported_format(format: ImageFormat) -> bool {
    matches!(
        format,
        ImageFormat::Png
            | ImageFormat::Jpeg
            | ImageFormat::Gif
            | ImageFormat::Bmp
            | ImageFormat::Tiff
            | ImageFormat::WebP
    )
}

/// Exponential backoff for retry `attempt` (1-based), capped, with up to 25% jitter
pub fn calculate_retry_delay(attempt: u32, config: &RecoveryConfig) -> Duration {
    let exponent = attempt.saturating_sub(1).min(16);
    let base = config
        .base_retry_delay_ms
        .saturating_mul(1u64 << exponent)
        .min(config.max_retry_delay_ms);
    let jitter = if base >= 4 {
        rand::thread_rng().gen_range(0..=base / 4)
    } else {
        0
    };
    Duration::from_millis(base.saturating_add(jitter).min(config.max_retry_delay_ms))
}

/// Run text detection with validation, timeouts, retries and circuit breaking
pub async fn extract_text(
    recognizer: &dyn TextRecognizer,
    image: &[u8],
    config: &OcrConfig,
    breaker: &CircuitBreaker,
) -> Result<String, OcrError> {
    validate_image(image, config)?;

    if breaker.is_open() {
        warn!("OCR circuit breaker is open, rejecting request");
        return Err(OcrError::CircuitOpen(format!(
            "{} consecutive failures",
            breaker.failure_count()
        )));
    }

    let recovery = &config.recovery;
    let timeout = Duration::from_secs(recovery.operation_timeout_secs);
    let mut attempt = 0;

    loop {
        attempt += 1;

        let outcome = match tokio::time::timeout(timeout, recognizer.recognize(image)).await {
            Ok(result) => result,
            Err(_) => Err(OcrError::Timeout(format!(
                "attempt {attempt} exceeded {}s",
                recovery.operation_timeout_secs
            ))),
        };

        match outcome {
            Ok(text) => {
                breaker.record_success();
                info!(attempt, chars = text.len(), "OCR extraction completed");
                return Ok(text);
            }
            Err(e) if e.is_transient() && attempt <= recovery.max_retries => {
                let delay = calculate_retry_delay(attempt, recovery);
                warn!(
                    attempt,
                    error = %e,
                    delay_ms = delay.as_millis() as u64,
                    "OCR attempt failed, retrying"
                );
                tokio::time::sleep(delay).await;
            }
            Err(OcrError::NoText) => {
                // the service worked; an image without text is not an outage
                breaker.record_success();
                return Err(OcrError::NoText);
            }
            Err(e) => {
                breaker.record_failure();
                warn!(attempt, error = %e, "OCR failed");
                return Err(e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D];

    #[test]
    fn test_parse_full_text_annotation() {
        let body = r#"{
            "responses": [{
                "textAnnotations": [
                    {"locale": "pt", "description": "QUAL A CAPITAL?\nLisboa\nPorto\n"},
                    {"description": "QUAL"}
                ]
            }]
        }"#;
        assert_eq!(
            parse_annotate_response(body).unwrap(),
            "QUAL A CAPITAL?\nLisboa\nPorto\n"
        );
    }

    #[test]
    fn test_parse_empty_response_is_no_text() {
        assert!(matches!(
            parse_annotate_response(r#"{"responses": [{}]}"#),
            Err(OcrError::NoText)
        ));
        assert!(matches!(
            parse_annotate_response(r#"{"responses": []}"#),
            Err(OcrError::NoText)
        ));
    }

    #[test]
    fn test_parse_response_level_error() {
        let body = r#"{"responses": [{"error": {"code": 3, "message": "Bad image data."}}]}"#;
        match parse_annotate_response(body) {
            Err(e @ OcrError::Service { .. }) => {
                assert!(e.to_string().contains("Bad image data."));
                assert!(!e.is_transient());
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_service_error_message_from_envelope() {
        let body = r#"{"error": {"code": 403, "message": "API key not valid."}}"#;
        assert_eq!(service_error_message(body).as_deref(), Some("API key not valid."));
        assert_eq!(service_error_message("<html>"), None);
    }

    #[test]
    fn test_validate_png() {
        let config = OcrConfig::default();
        assert_eq!(validate_image(PNG_HEADER, &config).unwrap(), ImageFormat::Png);
    }

    #[test]
    fn test_validate_rejects_short_and_unknown() {
        let config = OcrConfig::default();
        assert!(matches!(validate_image(&[], &config), Err(OcrError::Validation(_))));
        assert!(matches!(validate_image(&[0x89, b'P'], &config), Err(OcrError::Validation(_))));
        assert!(matches!(
            validate_image(b"just some plain text", &config),
            Err(OcrError::Validation(_))
        ));
    }

    #[test]
    fn test_validate_rejects_oversized() {
        let config = OcrConfig {
            max_file_size: 10,
            ..Default::default()
        };
        let err = validate_image(PNG_HEADER, &config).unwrap_err();
        assert!(err.to_string().contains("limit is 10"));
    }

    #[test]
    fn test_retry_delay_grows_and_caps() {
        let config = RecoveryConfig {
            base_retry_delay_ms: 100,
            max_retry_delay_ms: 1000,
            ..Default::default()
        };

        let first = calculate_retry_delay(1, &config).as_millis();
        let second = calculate_retry_delay(2, &config).as_millis();
        let tenth = calculate_retry_delay(10, &config).as_millis();

        assert!((100..=125).contains(&first));
        assert!((200..=250).contains(&second));
        assert_eq!(tenth, 1000);
    }
}
