//! # OCR Error Types Module
//!
//! Structured errors for image validation and remote text detection.

use thiserror::Error;

/// Error types for OCR operations
#[derive(Debug, Error)]
pub enum OcrError {
    /// Image rejected before upload (size, format)
    #[error("Validation error: {0}")]
    Validation(String),
    /// Transport failure talking to the OCR service
    #[error("Request error: {0}")]
    Request(String),
    /// The OCR service answered with an error
    #[error("Service error ({status}): {message}")]
    Service { status: u16, message: String },
    /// No text was detected in the image
    #[error("No text detected in image")]
    NoText,
    /// The attempt exceeded the operation timeout
    #[error("Timeout error: {0}")]
    Timeout(String),
    /// Too many recent failures, requests are short-circuited
    #[error("Circuit breaker open: {0}")]
    CircuitOpen(String),
}

impl OcrError {
    /// Whether another attempt may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            OcrError::Request(_) | OcrError::Timeout(_) => true,
            OcrError::Service { status, .. } => *status == 429 || *status >= 500,
            OcrError::Validation(_) | OcrError::NoText | OcrError::CircuitOpen(_) => false,
        }
    }
}

impl From<reqwest::Error> for OcrError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            OcrError::Timeout(err.to_string())
        } else {
            OcrError::Request(err.to_string())
        }
    }
}
