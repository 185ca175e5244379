use std::time::Duration;

/// Default public Gemini API origin.
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default model used for project generation.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-3-flash-preview";

/// Transport configuration for Gemini API requests.
#[derive(Debug, Clone)]
pub struct GeminiApiConfig {
    /// API key passed in the `x-goog-api-key` header.
    pub api_key: String,
    /// Base URL for the Gemini endpoints.
    pub base_url: String,
    /// Model identifier addressed by `generateContent`.
    pub model: String,
    /// Optional request timeout.
    pub timeout: Option<Duration>,
    /// Thinking-token budget; zero keeps responses fast for interactive use.
    pub thinking_budget: i64,
}

impl Default for GeminiApiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
            timeout: None,
            thinking_budget: 0,
        }
    }
}

impl GeminiApiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_thinking_budget(mut self, thinking_budget: i64) -> Self {
        self.thinking_budget = thinking_budget;
        self
    }

    /// Returns the full `generateContent` endpoint for the configured model.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_base_url_and_model() {
        let config = GeminiApiConfig::new("key").with_model("gemini-test");
        assert_eq!(
            config.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-test:generateContent"
        );
    }

    #[test]
    fn endpoint_tolerates_trailing_slash_in_base_url() {
        let config = GeminiApiConfig::new("key")
            .with_base_url("http://localhost:8080/")
            .with_model("m");
        assert_eq!(
            config.endpoint(),
            "http://localhost:8080/v1beta/models/m:generateContent"
        );
    }
}
