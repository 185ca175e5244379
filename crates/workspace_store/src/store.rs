use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::warn;

use crate::error::WorkspaceStoreError;
use crate::paths::workspace_file;
use crate::schema::WorkspaceSnapshot;

/// Durable single-slot store for a workspace session.
///
/// Both operations are best-effort from the session's point of view:
/// `hydrate` degrades to "no prior session" on any problem, and callers are
/// expected to log and continue when `save` fails.
#[derive(Debug, Clone)]
pub struct WorkspaceStore {
    slot: PathBuf,
}

impl WorkspaceStore {
    /// Creates a store rooted at `cwd`, using the default slot location.
    #[must_use]
    pub fn at_root(cwd: &Path) -> Self {
        Self {
            slot: workspace_file(cwd),
        }
    }

    /// Creates a store over an explicit slot file path.
    #[must_use]
    pub fn at_slot(slot: impl Into<PathBuf>) -> Self {
        Self { slot: slot.into() }
    }

    #[must_use]
    pub fn slot(&self) -> &Path {
        &self.slot
    }

    /// Reads the last snapshot, or `None` when the slot is absent,
    /// unreadable, or unparsable. Never fatal.
    #[must_use]
    pub fn hydrate(&self) -> Option<WorkspaceSnapshot> {
        let raw = match fs::read_to_string(&self.slot) {
            Ok(raw) => raw,
            Err(error) if error.kind() == ErrorKind::NotFound => return None,
            Err(error) => {
                warn!(
                    slot = %self.slot.display(),
                    %error,
                    "workspace slot unreadable, starting with an empty session"
                );
                return None;
            }
        };

        match serde_json::from_str::<WorkspaceSnapshot>(&raw) {
            Ok(snapshot) => Some(snapshot),
            Err(error) => {
                warn!(
                    slot = %self.slot.display(),
                    %error,
                    "workspace slot unparsable, starting with an empty session"
                );
                None
            }
        }
    }

    /// Overwrites the slot with `snapshot`, stamping `updatedAt` with the
    /// current UTC time. Returns the stamp on success.
    ///
    /// The snapshot is written to a sibling temp file and renamed over the
    /// slot, so the slot always holds the last successful write.
    pub fn save(&self, snapshot: &WorkspaceSnapshot) -> Result<String, WorkspaceStoreError> {
        let stamp = now_rfc3339()?;
        let mut stamped = snapshot.clone();
        stamped.updated_at = Some(stamp.clone());

        let serialized = serde_json::to_vec_pretty(&stamped)
            .map_err(|source| WorkspaceStoreError::json_serialize(&self.slot, source))?;

        if let Some(parent) = self.slot.parent() {
            fs::create_dir_all(parent).map_err(|source| {
                WorkspaceStoreError::io("creating workspace directory", parent, source)
            })?;
        }

        let staging = self.staging_path();
        fs::write(&staging, serialized).map_err(|source| {
            WorkspaceStoreError::io("writing workspace snapshot", &staging, source)
        })?;
        fs::rename(&staging, &self.slot).map_err(|source| {
            WorkspaceStoreError::io("publishing workspace snapshot", &self.slot, source)
        })?;

        Ok(stamp)
    }

    /// Removes the slot. An already-absent slot is success.
    pub fn reset(&self) -> Result<(), WorkspaceStoreError> {
        match fs::remove_file(&self.slot) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(WorkspaceStoreError::io(
                "clearing workspace snapshot",
                &self.slot,
                source,
            )),
        }
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .slot
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_else(|| "workspace.json".into());
        name.push(".tmp");
        self.slot.with_file_name(name)
    }
}

/// Formats the current UTC time as an RFC3339 string.
pub fn now_rfc3339() -> Result<String, WorkspaceStoreError> {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .map_err(WorkspaceStoreError::ClockFormat)
}
