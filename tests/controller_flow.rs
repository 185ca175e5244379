use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use appforge::controller::{
    ControllerConfig, SessionController, SessionStatus, SubmitOutcome, GENERATION_FAILURE_TEXT,
};
use appforge::guard::AdmissionRefused;
use appforge::session::Role;
use async_trait::async_trait;
use generation_client::{
    ClientProfile, GeneratedProject, GenerationClient, GenerationError, GenerationRequest,
    ProjectFile,
};
use generation_client_mock::MockGenerationClient;
use tempfile::TempDir;
use workspace_store::WorkspaceStore;

/// Per-call scripted client: pops one outcome per generate call and records
/// every request it receives.
struct ScriptedClient {
    outcomes: Mutex<VecDeque<Result<GeneratedProject, String>>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedClient {
    fn new(outcomes: Vec<Result<GeneratedProject, String>>) -> Arc<Self> {
        Arc::new(Self {
            outcomes: Mutex::new(outcomes.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().expect("requests lock").clone()
    }
}

#[async_trait]
impl GenerationClient for ScriptedClient {
    fn profile(&self) -> ClientProfile {
        ClientProfile {
            client_id: "scripted".to_string(),
            model_id: "scripted".to_string(),
        }
    }

    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GeneratedProject, GenerationError> {
        self.requests.lock().expect("requests lock").push(request);
        match self
            .outcomes
            .lock()
            .expect("outcomes lock")
            .pop_front()
            .expect("scripted client ran out of outcomes")
        {
            Ok(project) => Ok(project),
            Err(message) => Err(GenerationError::new(message)),
        }
    }
}

fn project(files: &[(&str, &str)], explanation: &str) -> GeneratedProject {
    GeneratedProject {
        preview_html: format!("<html><body>{explanation}</body></html>"),
        files: files
            .iter()
            .map(|(name, language)| ProjectFile {
                name: (*name).to_string(),
                language: (*language).to_string(),
                content: format!("// {name}"),
            })
            .collect(),
        explanation: explanation.to_string(),
    }
}

fn controller_in(
    dir: &TempDir,
    client: Arc<dyn GenerationClient>,
) -> SessionController {
    SessionController::with_config(
        client,
        WorkspaceStore::at_root(dir.path()),
        ControllerConfig::unpaced(),
    )
}

fn observed_controller_in(
    dir: &TempDir,
    client: Arc<dyn GenerationClient>,
) -> (SessionController, Arc<Mutex<Vec<SessionStatus>>>) {
    let observed = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&observed);
    let controller = controller_in(dir, client).with_status_observer(Box::new(move |status| {
        sink.lock().expect("status lock").push(status);
    }));
    (controller, observed)
}

#[tokio::test]
async fn first_submit_builds_a_project_from_empty_history() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (controller, observed) =
        observed_controller_in(&dir, Arc::new(MockGenerationClient::new()));

    let outcome = controller.submit("Build a landing page").await;

    assert!(matches!(outcome, SubmitOutcome::Settled { .. }));
    assert_eq!(
        *observed.lock().expect("status lock"),
        vec![
            SessionStatus::Thinking,
            SessionStatus::Coding,
            SessionStatus::Idle
        ]
    );

    let turns = controller.turns();
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0].role, Role::User);
    assert_eq!(turns[0].text, "Build a landing page");
    assert_eq!(turns[1].role, Role::Assistant);

    assert!(!controller.files().is_empty());
    assert!(!controller.preview_html().is_empty());
    assert_eq!(controller.request_count(), 1);
    assert_eq!(controller.status(), SessionStatus::Idle);
}

#[tokio::test(start_paused = true)]
async fn rapid_double_submit_drops_the_second_prompt() {
    let dir = tempfile::tempdir().expect("tempdir");
    let client = Arc::new(MockGenerationClient::new().with_latency(Duration::from_millis(200)));
    let controller = controller_in(&dir, client);

    let (first, second) = tokio::join!(controller.submit("A"), controller.submit("B"));

    assert!(matches!(first, SubmitOutcome::Settled { .. }));
    assert_eq!(second, SubmitOutcome::Rejected(AdmissionRefused::Busy));

    let user_turns: Vec<_> = controller
        .turns()
        .into_iter()
        .filter(|turn| turn.role == Role::User)
        .collect();
    assert_eq!(user_turns.len(), 1);
    assert_eq!(user_turns[0].text, "A");
    assert_eq!(controller.request_count(), 1);
}

#[tokio::test]
async fn blank_prompts_are_dropped_without_any_state_change() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (controller, observed) =
        observed_controller_in(&dir, Arc::new(MockGenerationClient::new()));

    let outcome = controller.submit("   \n\t").await;

    assert_eq!(
        outcome,
        SubmitOutcome::Rejected(AdmissionRefused::BlankPrompt)
    );
    assert!(controller.turns().is_empty());
    assert_eq!(controller.request_count(), 0);
    assert!(observed.lock().expect("status lock").is_empty());
}

#[tokio::test]
async fn failed_generation_recovers_into_one_fixed_assistant_turn() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (controller, observed) = observed_controller_in(
        &dir,
        Arc::new(MockGenerationClient::failing("upstream unavailable")),
    );

    let outcome = controller.submit("Build a dashboard").await;

    assert!(matches!(outcome, SubmitOutcome::Settled { .. }));
    assert_eq!(
        *observed.lock().expect("status lock"),
        vec![SessionStatus::Thinking, SessionStatus::Idle]
    );

    let turns = controller.turns();
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0].role, Role::User);
    assert_eq!(turns[1].role, Role::Assistant);
    assert_eq!(turns[1].text, GENERATION_FAILURE_TEXT);

    assert!(controller.files().is_empty());
    assert!(controller.preview_html().is_empty());
    // The attempt counted even though it failed.
    assert_eq!(controller.request_count(), 1);
}

#[tokio::test]
async fn failure_leaves_the_prior_artifact_set_exactly_unchanged() {
    let dir = tempfile::tempdir().expect("tempdir");
    let client = ScriptedClient::new(vec![
        Ok(project(&[("index.html", "html")], "v1")),
        Err("boom".to_string()),
    ]);
    let controller = controller_in(&dir, Arc::clone(&client) as Arc<dyn GenerationClient>);

    controller.submit("build v1").await;
    let files_before = controller.files();
    let preview_before = controller.preview_html();

    controller.submit("break it").await;

    assert_eq!(controller.files(), files_before);
    assert_eq!(controller.preview_html(), preview_before);
    assert_eq!(controller.request_count(), 2);
    assert_eq!(
        controller.turns().last().expect("failure turn").text,
        GENERATION_FAILURE_TEXT
    );
}

#[tokio::test]
async fn client_receives_history_without_the_pending_prompt() {
    let dir = tempfile::tempdir().expect("tempdir");
    let client = ScriptedClient::new(vec![
        Ok(project(&[("index.html", "html")], "v1")),
        Ok(project(&[("index.html", "html")], "v2")),
    ]);
    let controller = controller_in(&dir, Arc::clone(&client) as Arc<dyn GenerationClient>);

    controller.submit("first prompt").await;
    controller.submit("second prompt").await;

    let requests = client.requests();
    assert_eq!(requests.len(), 2);

    assert!(requests[0].history.is_empty());
    assert_eq!(requests[0].prompt, "first prompt");

    // Second call sees the settled first exchange, not its own prompt.
    let history: Vec<&str> = requests[1]
        .history
        .iter()
        .map(|message| message.text.as_str())
        .collect();
    assert_eq!(history, vec!["first prompt", "v1"]);
    assert_eq!(requests[1].prompt, "second prompt");

    assert_ne!(requests[0].correlation_id, requests[1].correlation_id);
}

#[tokio::test]
async fn replacement_keeps_selection_when_path_survives() {
    let dir = tempfile::tempdir().expect("tempdir");
    let client = ScriptedClient::new(vec![
        Ok(project(&[("index.html", "html"), ("app.js", "javascript")], "v1")),
        Ok(project(&[("app.js", "javascript"), ("style.css", "css")], "v2")),
    ]);
    let controller = controller_in(&dir, client);

    controller.submit("build v1").await;
    assert_eq!(controller.active_path().as_deref(), Some("index.html"));

    assert!(controller.select_file("app.js"));
    controller.submit("build v2").await;

    assert_eq!(controller.active_path().as_deref(), Some("app.js"));
    let active = controller.active_file().expect("active file resolves");
    assert_eq!(active.content, "// app.js");
}

#[tokio::test]
async fn replacement_falls_back_to_first_file_when_path_disappears() {
    let dir = tempfile::tempdir().expect("tempdir");
    let client = ScriptedClient::new(vec![
        Ok(project(&[("index.html", "html"), ("app.js", "javascript")], "v1")),
        Ok(project(&[("main.rs", "rust")], "v2")),
    ]);
    let controller = controller_in(&dir, client);

    controller.submit("build v1").await;
    assert!(controller.select_file("app.js"));

    controller.submit("rewrite in rust").await;

    assert_eq!(controller.active_path().as_deref(), Some("main.rs"));
}

#[tokio::test]
async fn selecting_a_missing_file_is_refused() {
    let dir = tempfile::tempdir().expect("tempdir");
    let controller = controller_in(&dir, Arc::new(MockGenerationClient::new()));

    controller.submit("build").await;

    assert!(!controller.select_file("nope.txt"));
    assert_eq!(controller.active_path().as_deref(), Some("index.html"));
}

#[tokio::test]
async fn failed_generation_keeps_the_current_selection() {
    let dir = tempfile::tempdir().expect("tempdir");
    let client = ScriptedClient::new(vec![
        Ok(project(&[("index.html", "html"), ("app.js", "javascript")], "v1")),
        Err("boom".to_string()),
    ]);
    let controller = controller_in(&dir, client);

    controller.submit("build v1").await;
    assert!(controller.select_file("app.js"));

    controller.submit("break it").await;

    assert_eq!(controller.active_path().as_deref(), Some("app.js"));
}

#[tokio::test]
async fn reset_returns_the_session_to_its_empty_default() {
    let dir = tempfile::tempdir().expect("tempdir");
    let controller = controller_in(&dir, Arc::new(MockGenerationClient::new()));

    controller.submit("build something").await;
    assert!(!controller.turns().is_empty());

    controller.reset();

    assert!(controller.turns().is_empty());
    assert!(controller.files().is_empty());
    assert!(controller.preview_html().is_empty());
    assert_eq!(controller.request_count(), 0);
    assert_eq!(controller.active_path(), None);
    assert_eq!(controller.status(), SessionStatus::Idle);
    assert!(WorkspaceStore::at_root(dir.path()).hydrate().is_none());

    // The controller accepts new work immediately after a reset.
    let outcome = controller.submit("start over").await;
    assert!(matches!(outcome, SubmitOutcome::Settled { .. }));
}

#[tokio::test(start_paused = true)]
async fn coding_status_honors_the_minimum_visibility_floor() {
    let dir = tempfile::tempdir().expect("tempdir");
    let controller = SessionController::with_config(
        Arc::new(MockGenerationClient::new()),
        WorkspaceStore::at_root(dir.path()),
        ControllerConfig::default(),
    );

    let started = tokio::time::Instant::now();
    controller.submit("instant response").await;

    assert!(started.elapsed() >= Duration::from_millis(500));
}
