use reqwest::{Client, StatusCode};

use crate::config::GeminiApiConfig;
use crate::error::{parse_error_message, GeminiApiError};
use crate::payload::{GenerateContentRequest, GenerateContentResponse, ProjectPayload};
use crate::retry::{is_retryable_http_error, retry_delay_ms, MAX_RETRIES};

#[derive(Debug)]
pub struct GeminiApiClient {
    http: Client,
    config: GeminiApiConfig,
}

impl GeminiApiClient {
    pub fn new(config: GeminiApiConfig) -> Result<Self, GeminiApiError> {
        if config.api_key.trim().is_empty() {
            return Err(GeminiApiError::MissingApiKey);
        }

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(GeminiApiError::from)?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &GeminiApiConfig {
        &self.config
    }

    fn build_request(&self, payload: &GenerateContentRequest) -> reqwest::RequestBuilder {
        self.http
            .post(self.config.endpoint())
            .header("x-goog-api-key", self.config.api_key.trim())
            .json(payload)
    }

    /// Sends one `generateContent` request, retrying transient failures
    /// with exponential backoff.
    pub async fn send_with_retry(
        &self,
        payload: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GeminiApiError> {
        let mut last_status: Option<StatusCode> = None;
        let mut last_error = None;

        for attempt in 0..=MAX_RETRIES {
            match self.build_request(payload).send().await {
                Ok(response) if response.status().is_success() => {
                    return response
                        .json::<GenerateContentResponse>()
                        .await
                        .map_err(GeminiApiError::from);
                }
                Ok(response) => {
                    let status = response.status();
                    last_status = Some(status);
                    let body = response.text().await.unwrap_or_else(|_| {
                        status
                            .canonical_reason()
                            .unwrap_or("request failed")
                            .to_string()
                    });
                    let message = parse_error_message(status, &body);
                    last_error = Some(message.clone());

                    if attempt < MAX_RETRIES && is_retryable_http_error(status.as_u16(), &message) {
                        tokio::time::sleep(retry_delay_ms(attempt)).await;
                        continue;
                    }

                    return Err(GeminiApiError::Status(status, message));
                }
                Err(error) => {
                    last_error = Some(error.to_string());
                    if attempt < MAX_RETRIES {
                        tokio::time::sleep(retry_delay_ms(attempt)).await;
                        continue;
                    }
                }
            }
        }

        Err(GeminiApiError::RetryExhausted {
            status: last_status,
            last_error,
        })
    }

    /// Runs one structured project generation and parses the model output
    /// against the project schema.
    pub async fn generate_project(
        &self,
        system_instruction: &str,
        context_prompt: &str,
    ) -> Result<ProjectPayload, GeminiApiError> {
        let request = GenerateContentRequest::project(system_instruction, context_prompt, &self.config);
        let response = self.send_with_retry(&request).await?;
        let text = response.first_text().ok_or(GeminiApiError::EmptyResponse)?;
        parse_project_payload(&text)
    }
}

/// Parses candidate text as a schema-conforming project payload. Any
/// deviation from the schema is reported as a malformed project.
pub fn parse_project_payload(text: &str) -> Result<ProjectPayload, GeminiApiError> {
    serde_json::from_str::<ProjectPayload>(text)
        .map_err(|error| GeminiApiError::MalformedProject(error.to_string()))
}
