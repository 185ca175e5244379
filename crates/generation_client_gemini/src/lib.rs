//! Gemini-backed implementation of the shared `generation_client` contract.
//!
//! This adapter renders conversation history into the context-prompt format
//! expected by the builder system prompt, delegates transport to
//! `gemini_api`, and collapses every transport or schema failure into the
//! contract's single generic `GenerationError`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use generation_client::{
    ClientInitError, ClientProfile, GeneratedProject, GenerationClient, GenerationError,
    GenerationRequest, HistoryMessage, ProjectFile,
};
use gemini_api::{GeminiApiClient, GeminiApiConfig, GeminiApiError, ProjectPayload};
use tracing::debug;

/// Stable client identifier used for explicit startup selection.
pub const GEMINI_CLIENT_ID: &str = "gemini";

/// Environment variable holding the Gemini API key.
pub const API_KEY_ENV_VAR: &str = "GEMINI_API_KEY";

/// Optional environment variable overriding the generation model.
pub const MODEL_ENV_VAR: &str = "APPFORGE_GEMINI_MODEL";

/// Builder persona and output rules sent as the system instruction on every
/// call. The preview must stay a self-contained document because it is
/// rendered in a sandboxed frame with no module loader.
const SYSTEM_PROMPT: &str = "\
You are AppForge, an expert full-stack engineer and UI designer.
You build complete, responsive web applications from natural-language prompts.

RULES:
1. DESIGN: Use modern layout and typography. Default to a dark aesthetic unless asked otherwise.
2. PREVIEW: 'previewHtml' must be one fully self-contained HTML document. Inline or CDN-load everything it needs; it runs in a sandboxed frame with no build step.
3. FILES: Populate 'files' with a realistic project structure (entry point, components, styles). Paths use forward slashes.
4. TONE: 'explanation' is brief, professional, and friendly.
5. ITERATION: When history is present, treat the new request as a change to the previously generated application and regenerate the whole project.";

/// Runtime configuration for the Gemini generation client.
#[derive(Debug, Clone)]
pub struct GeminiClientConfig {
    pub api_key: String,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub timeout: Option<Duration>,
}

impl GeminiClientConfig {
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: None,
            base_url: None,
            timeout: None,
        }
    }

    /// Reads configuration from the process environment. A missing or blank
    /// API key fails construction, not the later generation calls.
    pub fn from_env() -> Result<Self, ClientInitError> {
        let api_key = std::env::var(API_KEY_ENV_VAR)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .ok_or_else(|| {
                ClientInitError::new(format!("{API_KEY_ENV_VAR} is not set or empty"))
            })?;

        let model = std::env::var(MODEL_ENV_VAR)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());

        Ok(Self {
            api_key,
            model,
            base_url: None,
            timeout: None,
        })
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn into_api_config(self) -> GeminiApiConfig {
        let mut config = GeminiApiConfig::new(self.api_key);

        if let Some(model) = self.model {
            config = config.with_model(model);
        }

        if let Some(base_url) = self.base_url {
            config = config.with_base_url(base_url);
        }

        if let Some(timeout) = self.timeout {
            config = config.with_timeout(timeout);
        }

        config
    }
}

#[async_trait]
trait ProjectApi: Send + Sync {
    async fn generate_project(
        &self,
        system_instruction: &str,
        context_prompt: &str,
    ) -> Result<ProjectPayload, GeminiApiError>;
}

struct DefaultProjectApi {
    client: GeminiApiClient,
}

#[async_trait]
impl ProjectApi for DefaultProjectApi {
    async fn generate_project(
        &self,
        system_instruction: &str,
        context_prompt: &str,
    ) -> Result<ProjectPayload, GeminiApiError> {
        self.client
            .generate_project(system_instruction, context_prompt)
            .await
    }
}

/// `GenerationClient` adapter backed by `gemini_api` transport primitives.
pub struct GeminiGenerationClient {
    model_id: String,
    api: Arc<dyn ProjectApi>,
}

impl GeminiGenerationClient {
    /// Creates a client using real Gemini API transport.
    pub fn new(config: GeminiClientConfig) -> Result<Self, ClientInitError> {
        let api_config = config.into_api_config();
        let model_id = api_config.model.clone();
        let client = GeminiApiClient::new(api_config).map_err(map_init_error)?;

        Ok(Self {
            model_id,
            api: Arc::new(DefaultProjectApi { client }),
        })
    }

    /// Creates a client from `GEMINI_API_KEY` / `APPFORGE_GEMINI_MODEL`.
    pub fn from_env() -> Result<Self, ClientInitError> {
        Self::new(GeminiClientConfig::from_env()?)
    }

    #[cfg(test)]
    fn with_project_api_for_tests(model_id: impl Into<String>, api: Arc<dyn ProjectApi>) -> Self {
        Self {
            model_id: model_id.into(),
            api,
        }
    }
}

#[async_trait]
impl GenerationClient for GeminiGenerationClient {
    fn profile(&self) -> ClientProfile {
        ClientProfile {
            client_id: GEMINI_CLIENT_ID.to_string(),
            model_id: self.model_id.clone(),
        }
    }

    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GeneratedProject, GenerationError> {
        let context_prompt = render_context_prompt(&request.history, &request.prompt);
        debug!(
            correlation_id = %request.correlation_id,
            model = %self.model_id,
            history_len = request.history.len(),
            "dispatching gemini generation"
        );

        match self.api.generate_project(SYSTEM_PROMPT, &context_prompt).await {
            Ok(payload) => Ok(project_from_payload(payload)),
            Err(error) => Err(GenerationError::new(format!(
                "Gemini generation failed: {error}"
            ))),
        }
    }
}

/// Renders prior history plus the new request into one context prompt. The
/// call is stateless, so the full history rides along every time; the new
/// prompt itself is not part of the history block.
fn render_context_prompt(history: &[HistoryMessage], prompt: &str) -> String {
    let mut rendered = String::from("Current conversation history:\n");

    if history.is_empty() {
        rendered.push_str("(none)\n");
    } else {
        for message in history {
            rendered.push_str(&message.role.as_str().to_ascii_uppercase());
            rendered.push_str(": ");
            rendered.push_str(&message.text);
            rendered.push('\n');
        }
    }

    rendered.push_str("\nUser's new request: ");
    rendered.push_str(prompt);
    rendered.push_str(
        "\n\nBased on the history and the new request, generate the updated application code and preview.",
    );
    rendered
}

fn project_from_payload(payload: ProjectPayload) -> GeneratedProject {
    GeneratedProject {
        preview_html: payload.preview_html,
        files: payload
            .files
            .into_iter()
            .map(|file| ProjectFile {
                name: file.name,
                language: file.language,
                content: file.content,
            })
            .collect(),
        explanation: payload.explanation,
    }
}

fn map_init_error(error: GeminiApiError) -> ClientInitError {
    ClientInitError::new(format!("Failed to initialize gemini client: {error}"))
}
