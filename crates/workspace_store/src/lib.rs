mod error;
mod paths;
mod schema;
mod store;

pub use error::WorkspaceStoreError;
pub use paths::{workspace_file, workspace_root, WORKSPACE_DIR, WORKSPACE_FILE};
pub use schema::{StoredFile, StoredRole, StoredTurn, WorkspaceSnapshot};
pub use store::{now_rfc3339, WorkspaceStore};
