use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use generation_client::{GeneratedProject, GenerationClient, GenerationRequest, ProjectFile};
use tracing::{error, info, warn};
use workspace_store::WorkspaceStore;

use crate::export::{export_archive, ExportArchive, ExportError};
use crate::guard::{AdmissionRefused, RequestGuard};
use crate::selection::resolve_active_path;
use crate::session::{Session, Turn};

/// Fixed assistant reply appended when a generation attempt fails.
pub const GENERATION_FAILURE_TEXT: &str = "I'm sorry, I encountered an error while generating the application. Please try again or check your API key.";

/// Default minimum visible duration of the `Coding` status. Purely a pacing
/// contract so the status signal never flickers for a single frame.
pub const DEFAULT_MIN_CODING_VISIBILITY: Duration = Duration::from_millis(500);

/// Externally visible generation status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Idle,
    Thinking,
    Coding,
}

/// Outcome of one submit attempt. Rejections are silent by design: nothing
/// queues, and no error propagates out of `submit` for a generation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The attempt settled: either committed a new project or recovered a
    /// failure into the history log.
    Settled { correlation_id: String },
    /// Admission was refused; session state is untouched.
    Rejected(AdmissionRefused),
}

/// Controller tunables.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    pub min_coding_visibility: Duration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            min_coding_visibility: DEFAULT_MIN_CODING_VISIBILITY,
        }
    }
}

impl ControllerConfig {
    /// Configuration without the pacing floor, for non-interactive use.
    #[must_use]
    pub fn unpaced() -> Self {
        Self {
            min_coding_visibility: Duration::ZERO,
        }
    }
}

type StatusObserver = Box<dyn Fn(SessionStatus) + Send + Sync>;

struct ControllerState {
    session: Session,
    active_path: Option<String>,
    status: SessionStatus,
}

/// Orchestrates guard admission, the external generation call, history and
/// artifact updates, selection re-resolution, and settle-time persistence.
///
/// The controller exclusively owns the session record and the durable slot.
/// The state mutex is never held across a suspension point; the guard alone
/// serializes call initiation.
pub struct SessionController {
    state: Mutex<ControllerState>,
    guard: RequestGuard,
    client: Arc<dyn GenerationClient>,
    store: WorkspaceStore,
    config: ControllerConfig,
    observer: Option<StatusObserver>,
}

impl SessionController {
    /// Creates a controller with default pacing, hydrating any prior
    /// session from `store`.
    #[must_use]
    pub fn new(client: Arc<dyn GenerationClient>, store: WorkspaceStore) -> Self {
        Self::with_config(client, store, ControllerConfig::default())
    }

    /// Creates a controller with explicit tunables, hydrating any prior
    /// session from `store`. Hydration failure degrades to an empty session.
    #[must_use]
    pub fn with_config(
        client: Arc<dyn GenerationClient>,
        store: WorkspaceStore,
        config: ControllerConfig,
    ) -> Self {
        let session = store
            .hydrate()
            .map(Session::from_snapshot)
            .unwrap_or_default();
        let guard = RequestGuard::seeded(session.request_count);
        let active_path = resolve_active_path(None, &session.files);

        Self {
            state: Mutex::new(ControllerState {
                session,
                active_path,
                status: SessionStatus::Idle,
            }),
            guard,
            client,
            store,
            config,
            observer: None,
        }
    }

    /// Installs a status observer invoked on every visible status change.
    #[must_use]
    pub fn with_status_observer(mut self, observer: StatusObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Runs one full submit cycle: admission, synchronous user-turn append,
    /// external call, commit or failure recovery, persistence.
    ///
    /// At most one cycle is in flight at a time; concurrent attempts are
    /// dropped, not buffered.
    pub async fn submit(&self, prompt: &str) -> SubmitOutcome {
        let prompt = prompt.trim();

        // The status flag alone is not reentrancy-safe against rapid double
        // submission, so the guard repeats the check atomically below.
        if self.status() != SessionStatus::Idle {
            return SubmitOutcome::Rejected(AdmissionRefused::Busy);
        }

        let admitted = match self.guard.try_acquire(prompt) {
            Ok(admitted) => admitted,
            Err(refused) => return SubmitOutcome::Rejected(refused),
        };
        let correlation_id = admitted.correlation_id().to_string();
        let sequence = admitted.sequence();

        // The log must reflect intent even if the call later fails, so the
        // user turn lands before the suspension point. The client context is
        // snapshotted first: the prompt rides in its own field.
        let history = {
            let mut state = self.lock_state();
            let history = state.session.history_for_client();
            state.session.turns.push(Turn::user(prompt));
            history
        };
        self.set_status(SessionStatus::Thinking);
        info!(correlation_id = %correlation_id, sequence, "generation admitted");

        let request = GenerationRequest {
            prompt: prompt.to_string(),
            history,
            correlation_id: correlation_id.clone(),
        };

        match self.client.generate(request).await {
            Ok(project) => {
                self.set_status(SessionStatus::Coding);
                if !self.config.min_coding_visibility.is_zero() {
                    tokio::time::sleep(self.config.min_coding_visibility).await;
                }
                self.commit_project(sequence, project);
                info!(correlation_id = %correlation_id, "generation committed");
            }
            Err(failure) => {
                error!(correlation_id = %correlation_id, error = %failure, "generation failed");
                self.record_failure(sequence);
            }
        }

        self.persist();
        self.set_status(SessionStatus::Idle);
        SubmitOutcome::Settled { correlation_id }
        // `admitted` drops here: the guard releases on every exit path.
    }

    /// Clears the durable slot, reinitializes the in-memory session, and
    /// force-clears the guard.
    pub fn reset(&self) {
        if let Err(failure) = self.store.reset() {
            warn!(error = %failure, "workspace reset could not clear the slot");
        }

        {
            let mut state = self.lock_state();
            state.session = Session::default();
            state.active_path = None;
            state.status = SessionStatus::Idle;
        }
        self.guard.force_release();
        self.notify(SessionStatus::Idle);
    }

    /// Packages the current artifact set and preview into an archive.
    pub fn export(&self) -> Result<ExportArchive, ExportError> {
        let (files, preview_html) = {
            let state = self.lock_state();
            (
                state.session.files.clone(),
                state.session.preview_html.clone(),
            )
        };
        export_archive(&files, &preview_html)
    }

    /// Points the viewed-file pointer at `path`. Returns false (and leaves
    /// the pointer unchanged) when no such file exists in the current set.
    pub fn select_file(&self, path: &str) -> bool {
        let mut state = self.lock_state();
        if state.session.files.iter().any(|file| file.name == path) {
            state.active_path = Some(path.to_string());
            true
        } else {
            false
        }
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.lock_state().status
    }

    #[must_use]
    pub fn turns(&self) -> Vec<Turn> {
        self.lock_state().session.turns.clone()
    }

    #[must_use]
    pub fn files(&self) -> Vec<ProjectFile> {
        self.lock_state().session.files.clone()
    }

    #[must_use]
    pub fn preview_html(&self) -> String {
        self.lock_state().session.preview_html.clone()
    }

    #[must_use]
    pub fn request_count(&self) -> u64 {
        self.lock_state().session.request_count
    }

    #[must_use]
    pub fn active_path(&self) -> Option<String> {
        self.lock_state().active_path.clone()
    }

    /// The currently viewed file, resolved against the current set.
    #[must_use]
    pub fn active_file(&self) -> Option<ProjectFile> {
        let state = self.lock_state();
        let path = state.active_path.as_deref()?;
        state
            .session
            .files
            .iter()
            .find(|file| file.name == path)
            .cloned()
    }

    /// Commits a successful generation as one unit: artifact set, preview,
    /// assistant turn, counter, and re-resolved selection all move together
    /// under a single lock.
    fn commit_project(&self, sequence: u64, project: GeneratedProject) {
        let mut state = self.lock_state();
        state.session.files = project.files;
        state.session.preview_html = project.preview_html;
        state.session.turns.push(Turn::assistant(project.explanation));
        state.session.request_count = sequence;
        let resolved = resolve_active_path(state.active_path.as_deref(), &state.session.files);
        state.active_path = resolved;
    }

    /// Records a failed attempt: one fixed-text assistant turn, counter
    /// moved (the attempt counted), artifacts and preview untouched.
    fn record_failure(&self, sequence: u64) {
        let mut state = self.lock_state();
        state.session.turns.push(Turn::assistant(GENERATION_FAILURE_TEXT));
        state.session.request_count = sequence;
    }

    /// Writes the snapshot on settle. Persistence failure is non-fatal; the
    /// session continues in memory only.
    fn persist(&self) {
        let snapshot = self.lock_state().session.to_snapshot();
        match self.store.save(&snapshot) {
            Ok(stamp) => {
                self.lock_state().session.updated_at = Some(stamp);
            }
            Err(failure) => {
                warn!(error = %failure, "workspace snapshot not saved, continuing in memory");
            }
        }
    }

    fn set_status(&self, status: SessionStatus) {
        self.lock_state().status = status;
        self.notify(status);
    }

    fn notify(&self, status: SessionStatus) {
        if let Some(observer) = &self.observer {
            observer(status);
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, ControllerState> {
        match self.state.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
