use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::config::GeminiApiConfig;

/// One text part of a content block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    pub text: String,
}

/// A role-tagged block of parts. The system instruction omits the role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Content {
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Some("user".to_string()),
            parts: vec![Part { text: text.into() }],
        }
    }

    #[must_use]
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: None,
            parts: vec![Part { text: text.into() }],
        }
    }

    /// Concatenated text of all parts.
    #[must_use]
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .map(|part| part.text.as_str())
            .collect::<Vec<_>>()
            .join("")
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThinkingConfig {
    pub thinking_budget: i64,
}

/// Structured-output knobs for one `generateContent` call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub response_mime_type: String,
    pub response_schema: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thinking_config: Option<ThinkingConfig>,
}

/// Canonical request payload for the `generateContent` endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

impl GenerateContentRequest {
    /// Builds a structured project-generation request: JSON-only output
    /// constrained to [`project_response_schema`].
    #[must_use]
    pub fn project(
        system_instruction: impl Into<String>,
        context_prompt: impl Into<String>,
        config: &GeminiApiConfig,
    ) -> Self {
        Self {
            system_instruction: Some(Content::system(system_instruction)),
            contents: vec![Content::user(context_prompt)],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: project_response_schema(),
                thinking_config: Some(ThinkingConfig {
                    thinking_budget: config.thinking_budget,
                }),
            },
        }
    }
}

/// JSON schema the model output must conform to: a self-contained preview
/// document, an ordered file list, and a short explanation.
#[must_use]
pub fn project_response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "previewHtml": {
                "type": "STRING",
                "description": "A single, self-contained HTML document rendering the requested application.",
            },
            "files": {
                "type": "ARRAY",
                "description": "Source files representing the generated project structure.",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "name": { "type": "STRING", "description": "File path, e.g. 'src/App.tsx'" },
                        "language": { "type": "STRING", "description": "Language tag, e.g. 'typescript'" },
                        "content": { "type": "STRING", "description": "Full source text." }
                    },
                    "required": ["name", "language", "content"]
                }
            },
            "explanation": {
                "type": "STRING",
                "description": "A brief, friendly explanation of what was built.",
            }
        },
        "required": ["previewHtml", "files", "explanation"]
    })
}

/// One candidate of a `generateContent` response.
#[derive(Debug, Clone, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
}

/// Response envelope for `generateContent`.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    /// Text of the first candidate, when present and non-empty.
    #[must_use]
    pub fn first_text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text = content.text();
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

/// Parsed model output conforming to [`project_response_schema`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPayload {
    pub preview_html: String,
    pub files: Vec<ProjectFilePayload>,
    pub explanation: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectFilePayload {
    pub name: String,
    pub language: String,
    pub content: String,
}
