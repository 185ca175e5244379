//! Typed HTTP transport for the Gemini `generateContent` endpoint.
//!
//! The crate owns the wire payload shapes (camelCase JSON), the structured
//! project-response schema, bounded retry for transient failures, and the
//! transport error taxonomy. It knows nothing about sessions or prompt
//! construction; callers hand it a finished system instruction and context
//! prompt and get back a parsed project payload.

mod client;
mod config;
mod error;
mod payload;
mod retry;

pub use client::{parse_project_payload, GeminiApiClient};
pub use config::{GeminiApiConfig, DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL};
pub use error::{parse_error_message, GeminiApiError};
pub use payload::{
    project_response_schema, Candidate, Content, GenerateContentRequest, GenerateContentResponse,
    GenerationConfig, Part, ProjectFilePayload, ProjectPayload, ThinkingConfig,
};
pub use retry::{is_retryable_http_error, retry_delay_ms, MAX_RETRIES};
