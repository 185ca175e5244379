//! Deterministic mock implementation of the shared `generation_client`
//! contract.
//!
//! This crate contains no transport logic and is intended for local
//! development and contract-level integration testing. The configurable
//! latency is a real suspension point (`tokio::time::sleep`), so callers
//! can exercise cooperative interleaving against it.

use std::time::Duration;

use async_trait::async_trait;
use generation_client::{
    ClientProfile, GeneratedProject, GenerationClient, GenerationError, GenerationRequest,
    ProjectFile,
};

/// Stable client identifier used for explicit startup selection.
pub const MOCK_CLIENT_ID: &str = "mock";

const PREVIEW_TEMPLATE: &str = "\
<!doctype html>
<html>
  <head>
    <meta charset=\"utf-8\" />
    <title>Mock Preview</title>
    <style>body { font-family: sans-serif; background: #111; color: #eee; }</style>
  </head>
  <body>
    <main>
      <h1>Mock landing page</h1>
      <p>Deterministic preview generated without a model call.</p>
    </main>
  </body>
</html>
";

#[derive(Debug, Clone)]
enum MockOutcome {
    Project(GeneratedProject),
    Failure(String),
}

/// Deterministic mock client used by the CLI's `mock` mode and by session
/// controller tests.
#[derive(Debug, Clone)]
pub struct MockGenerationClient {
    latency: Duration,
    outcome: MockOutcome,
}

impl MockGenerationClient {
    /// Creates a mock client returning the built-in landing-page project.
    #[must_use]
    pub fn new() -> Self {
        Self {
            latency: Duration::ZERO,
            outcome: MockOutcome::Project(default_project()),
        }
    }

    /// Creates a mock client that fails every call with `message`.
    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            latency: Duration::ZERO,
            outcome: MockOutcome::Failure(message.into()),
        }
    }

    /// Overrides the built-in project template.
    #[must_use]
    pub fn with_project(mut self, project: GeneratedProject) -> Self {
        self.outcome = MockOutcome::Project(project);
        self
    }

    /// Suspends each call for `latency` before settling.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

impl Default for MockGenerationClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GenerationClient for MockGenerationClient {
    fn profile(&self) -> ClientProfile {
        ClientProfile {
            client_id: MOCK_CLIENT_ID.to_string(),
            model_id: "mock-builder".to_string(),
        }
    }

    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GeneratedProject, GenerationError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        match &self.outcome {
            MockOutcome::Failure(message) => Err(GenerationError::new(message.clone())),
            MockOutcome::Project(project) => {
                let mut project = project.clone();
                project.explanation = format!("{} (request: {})", project.explanation, request.prompt);
                Ok(project)
            }
        }
    }
}

fn default_project() -> GeneratedProject {
    GeneratedProject {
        preview_html: PREVIEW_TEMPLATE.to_string(),
        files: vec![
            ProjectFile {
                name: "index.html".to_string(),
                language: "html".to_string(),
                content: "<main><h1>Mock landing page</h1></main>\n".to_string(),
            },
            ProjectFile {
                name: "styles/main.css".to_string(),
                language: "css".to_string(),
                content: "body { font-family: sans-serif; }\n".to_string(),
            },
            ProjectFile {
                name: "app.js".to_string(),
                language: "javascript".to_string(),
                content: "console.log('mock app ready');\n".to_string(),
            },
        ],
        explanation: "Generated the deterministic starter project".to_string(),
    }
}
