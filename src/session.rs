use generation_client::{HistoryMessage, HistoryRole, ProjectFile};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use uuid::Uuid;
use workspace_store::{StoredFile, StoredRole, StoredTurn, WorkspaceSnapshot};

/// Role of one conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    fn to_stored(self) -> StoredRole {
        match self {
            Self::User => StoredRole::User,
            Self::Assistant => StoredRole::Assistant,
            Self::System => StoredRole::System,
        }
    }

    fn from_stored(role: StoredRole) -> Self {
        match role {
            StoredRole::User => Self::User,
            StoredRole::Assistant => Self::Assistant,
            StoredRole::System => Self::System,
        }
    }

    fn to_history(self) -> HistoryRole {
        match self {
            Self::User => HistoryRole::User,
            Self::Assistant => HistoryRole::Assistant,
            Self::System => HistoryRole::System,
        }
    }
}

/// One message in the conversation log. Immutable once appended; ordering
/// is append order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub id: String,
    pub role: Role,
    pub text: String,
    pub ts: String,
}

impl Turn {
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self::stamped(Role::User, text)
    }

    #[must_use]
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::stamped(Role::Assistant, text)
    }

    #[must_use]
    pub fn system(text: impl Into<String>) -> Self {
        Self::stamped(Role::System, text)
    }

    fn stamped(role: Role, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            text: text.into(),
            ts: now_rfc3339(),
        }
    }
}

fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}

/// The whole session state: history log, current artifact set, current
/// preview document, and the request counter. The sole unit of persistence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub turns: Vec<Turn>,
    pub files: Vec<ProjectFile>,
    pub preview_html: String,
    pub request_count: u64,
    pub updated_at: Option<String>,
}

impl Session {
    /// Rebuilds a session from a hydrated snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: WorkspaceSnapshot) -> Self {
        Self {
            turns: snapshot
                .messages
                .into_iter()
                .map(|turn| Turn {
                    id: turn.id,
                    role: Role::from_stored(turn.role),
                    text: turn.text,
                    ts: turn.ts,
                })
                .collect(),
            files: snapshot
                .files
                .into_iter()
                .map(|file| ProjectFile {
                    name: file.name,
                    language: file.language,
                    content: file.content,
                })
                .collect(),
            preview_html: snapshot.preview_html,
            request_count: snapshot.request_count,
            updated_at: snapshot.updated_at,
        }
    }

    /// Projects the session into the durable snapshot shape.
    #[must_use]
    pub fn to_snapshot(&self) -> WorkspaceSnapshot {
        WorkspaceSnapshot {
            messages: self
                .turns
                .iter()
                .map(|turn| StoredTurn {
                    id: turn.id.clone(),
                    role: turn.role.to_stored(),
                    text: turn.text.clone(),
                    ts: turn.ts.clone(),
                })
                .collect(),
            files: self
                .files
                .iter()
                .map(|file| StoredFile {
                    name: file.name.clone(),
                    language: file.language.clone(),
                    content: file.content.clone(),
                })
                .collect(),
            preview_html: self.preview_html.clone(),
            request_count: self.request_count,
            updated_at: self.updated_at.clone(),
        }
    }

    /// Model-facing projection of the history log: role and text only,
    /// ids and timestamps stripped.
    #[must_use]
    pub fn history_for_client(&self) -> Vec<HistoryMessage> {
        self.turns
            .iter()
            .map(|turn| HistoryMessage {
                role: turn.role.to_history(),
                text: turn.text.clone(),
            })
            .collect()
    }
}
