//! Minimal client-agnostic contract for executing a single project generation.
//!
//! This crate intentionally defines only the shared request/response data
//! types and the client trait. It excludes transport details, prompt
//! construction, and session orchestration concerns.

use async_trait::async_trait;
use thiserror::Error;

/// Conversation role carried in model-facing history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryRole {
    User,
    Assistant,
    System,
}

impl HistoryRole {
    /// Returns the lowercase wire name for this role.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::System => "system",
        }
    }
}

/// One model-facing history item, stripped to role and text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryMessage {
    pub role: HistoryRole,
    pub text: String,
}

/// Input required for one stateless generation call.
///
/// Every call carries the full prior history; there is no server-side
/// session state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub history: Vec<HistoryMessage>,
    pub correlation_id: String,
}

/// One generated source file. `name` is a path unique within a generation;
/// `content` is opaque text and is never partially merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectFile {
    pub name: String,
    pub language: String,
    pub content: String,
}

/// Output of one successful generation call. Replaces the prior file set
/// wholesale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedProject {
    pub preview_html: String,
    pub files: Vec<ProjectFile>,
    pub explanation: String,
}

/// Generic failure for any transport, credential, or response-schema
/// problem. Callers treat every variant of underlying cause identically.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct GenerationError {
    message: String,
}

impl GenerationError {
    /// Creates a new generation failure.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the underlying error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<String> for GenerationError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for GenerationError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// Error returned while constructing/configuring a client before any call
/// starts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ClientInitError {
    message: String,
}

impl ClientInitError {
    /// Creates a new client initialization error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the underlying error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<String> for ClientInitError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for ClientInitError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// Immutable metadata describing a generation client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientProfile {
    pub client_id: String,
    pub model_id: String,
}

/// Client interface for executing one generation request.
#[async_trait]
pub trait GenerationClient: Send + Sync + 'static {
    /// Returns client/model identity metadata.
    fn profile(&self) -> ClientProfile;

    /// Executes one stateless generation call.
    ///
    /// Implementations fail with a single generic [`GenerationError`] for
    /// transport, credential, and schema-validation problems alike.
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GeneratedProject, GenerationError>;
}
