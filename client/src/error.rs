//! Error handling for the bean inspection client
//!
//! Every failure maps to a short notice the app can show without blocking
//! the screen.

use serde::Serialize;
use thiserror::Error;

/// Client error types
#[derive(Error, Debug)]
pub enum InspectionError {
    // Caller-side errors
    #[error("Validation error on {field}: {message}")]
    Validation { field: String, message: String },

    #[error("No signed-in user")]
    Unauthenticated,

    #[error("Image unavailable: {0}")]
    ImageUnavailable(String),

    // Prediction service errors
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Prediction service returned {status_code}: {body}")]
    Service { status_code: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    // Document store errors
    #[error("Store error: {0}")]
    Store(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal error")]
    Internal(#[from] anyhow::Error),
}

/// User-facing summary of an error
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ErrorNotice {
    pub code: String,
    pub message: String,
    /// Whether offering "try again" makes sense
    pub retryable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ErrorNotice {
    fn new(code: &str, message: impl Into<String>, retryable: bool) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            retryable,
            field: None,
        }
    }
}

impl InspectionError {
    pub fn notice(&self) -> ErrorNotice {
        match self {
            InspectionError::Validation { field, message } => ErrorNotice {
                field: Some(field.clone()),
                ..ErrorNotice::new("VALIDATION_ERROR", message.clone(), false)
            },
            InspectionError::Unauthenticated => ErrorNotice::new(
                "UNAUTHENTICATED",
                "Please log in to continue.",
                false,
            ),
            InspectionError::ImageUnavailable(_) => ErrorNotice::new(
                "IMAGE_UNAVAILABLE",
                "The selected image could not be read. Please choose another photo.",
                false,
            ),
            InspectionError::Network(_) => ErrorNotice::new(
                "NETWORK_ERROR",
                "Could not reach the prediction service. Check your connection and try again.",
                true,
            ),
            InspectionError::Timeout(_) => ErrorNotice::new(
                "TIMEOUT",
                "The request took too long. Please try again.",
                true,
            ),
            InspectionError::Service { status_code, .. } => {
                let (message, retryable) = service_message(*status_code);
                ErrorNotice::new("SERVICE_ERROR", message, retryable)
            }
            InspectionError::InvalidResponse(_) => ErrorNotice::new(
                "INVALID_RESPONSE",
                "The prediction service sent a response the app could not read.",
                true,
            ),
            InspectionError::Store(_) => ErrorNotice::new(
                "STORE_ERROR",
                "Saved reports could not be loaded right now.",
                true,
            ),
            InspectionError::Configuration(_) => ErrorNotice::new(
                "CONFIGURATION_ERROR",
                "The app is not configured correctly.",
                false,
            ),
            InspectionError::Internal(_) => {
                ErrorNotice::new("INTERNAL_ERROR", "Something went wrong.", false)
            }
        }
    }

    /// Log once at the call boundary and return the notice
    pub fn report(&self) -> ErrorNotice {
        match self {
            InspectionError::Validation { .. } | InspectionError::Unauthenticated => {
                tracing::warn!("{}", self)
            }
            _ => tracing::error!("Error: {:?}", self),
        }
        self.notice()
    }
}

fn service_message(status_code: u16) -> (String, bool) {
    match status_code {
        400 | 422 => ("The prediction service rejected the submitted data.".into(), false),
        404 => ("The prediction service endpoint was not found.".into(), false),
        413 => ("The image is too large to upload.".into(), false),
        429 => ("Too many requests. Please wait a moment and try again.".into(), true),
        500..=599 => (
            format!("The prediction service is temporarily unavailable ({status_code})."),
            true,
        ),
        _ => (format!("Server error: {status_code}"), false),
    }
}

impl From<sqlx::Error> for InspectionError {
    fn from(err: sqlx::Error) -> Self {
        InspectionError::Store(err.to_string())
    }
}

impl From<config::ConfigError> for InspectionError {
    fn from(err: config::ConfigError) -> Self {
        InspectionError::Configuration(err.to_string())
    }
}

impl From<shared::SymptomFormError> for InspectionError {
    fn from(err: shared::SymptomFormError) -> Self {
        InspectionError::Validation {
            field: err.field.to_string(),
            message: err.message.to_string(),
        }
    }
}

/// Result type alias for client operations
pub type InspectionResult<T> = Result<T, InspectionError>;
