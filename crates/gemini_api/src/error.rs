use std::fmt;

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Error as JsonError;

#[derive(Debug)]
pub enum GeminiApiError {
    MissingApiKey,
    Request(reqwest::Error),
    Status(StatusCode, String),
    Serde(JsonError),
    EmptyResponse,
    MalformedProject(String),
    RetryExhausted {
        status: Option<StatusCode>,
        last_error: Option<String>,
    },
}

/// Google-style error envelope: `{"error": {"code", "message", "status"}}`.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorPayload {
    #[serde(rename = "error")]
    pub value: Option<ErrorPayloadFields>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorPayloadFields {
    pub message: Option<String>,
    pub status: Option<String>,
}

impl fmt::Display for GeminiApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingApiKey => write!(f, "API key is required"),
            Self::Request(error) => write!(f, "request error: {error}"),
            Self::Status(status, message) => write!(f, "HTTP {status} {message}"),
            Self::Serde(error) => write!(f, "serialization error: {error}"),
            Self::EmptyResponse => write!(f, "response contained no candidate text"),
            Self::MalformedProject(message) => {
                write!(f, "response did not match the project schema: {message}")
            }
            Self::RetryExhausted { status, last_error } => {
                let status = status
                    .map(|status| status.as_u16().to_string())
                    .unwrap_or_else(|| "n/a".to_owned());
                write!(
                    f,
                    "retry exhausted after max attempts (status: {status}, last_error: {last_error:?})"
                )
            }
        }
    }
}

impl std::error::Error for GeminiApiError {}

impl From<reqwest::Error> for GeminiApiError {
    fn from(error: reqwest::Error) -> Self {
        Self::Request(error)
    }
}

impl From<JsonError> for GeminiApiError {
    fn from(error: JsonError) -> Self {
        Self::Serde(error)
    }
}

/// Extracts a human-readable message from an error response body, falling
/// back to the raw body or the status reason when the envelope is absent.
pub fn parse_error_message(status: StatusCode, body: &str) -> String {
    let fallback = || {
        if body.is_empty() {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        } else {
            body.to_string()
        }
    };

    let Ok(parsed) = serde_json::from_str::<ErrorPayload>(body) else {
        return fallback();
    };

    let Some(error) = parsed.value else {
        return fallback();
    };

    match (error.message, error.status) {
        (Some(message), Some(status)) if !message.is_empty() && !status.is_empty() => {
            format!("{status}: {message}")
        }
        (Some(message), _) if !message.is_empty() => message,
        (_, Some(status)) if !status.is_empty() => status,
        _ => fallback(),
    }
}
