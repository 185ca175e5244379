use serde::{Deserialize, Serialize};

/// Role tag persisted with each stored turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoredRole {
    User,
    Assistant,
    System,
}

/// One persisted conversation turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredTurn {
    #[serde(default)]
    pub id: String,
    pub role: StoredRole,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub ts: String,
}

/// One persisted generated file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredFile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub content: String,
}

/// The single durable snapshot of a workspace session.
///
/// Every field defaults so a snapshot written by an older build, or with
/// fields stripped, still hydrates instead of blocking startup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceSnapshot {
    #[serde(default)]
    pub messages: Vec<StoredTurn>,
    #[serde(default)]
    pub files: Vec<StoredFile>,
    #[serde(default)]
    pub preview_html: String,
    #[serde(default)]
    pub request_count: u64,
    #[serde(default)]
    pub updated_at: Option<String>,
}
