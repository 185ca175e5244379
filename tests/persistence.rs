use std::fs;
use std::sync::Arc;

use appforge::controller::{
    ControllerConfig, SessionController, SubmitOutcome, GENERATION_FAILURE_TEXT,
};
use generation_client_mock::MockGenerationClient;
use tempfile::TempDir;
use workspace_store::{workspace_file, WorkspaceStore};

fn controller_in(dir: &TempDir, client: MockGenerationClient) -> SessionController {
    SessionController::with_config(
        Arc::new(client),
        WorkspaceStore::at_root(dir.path()),
        ControllerConfig::unpaced(),
    )
}

#[tokio::test]
async fn a_settled_session_survives_a_restart() {
    let dir = tempfile::tempdir().expect("tempdir");

    let first = controller_in(&dir, MockGenerationClient::new());
    first.submit("build a shop").await;

    let turns = first.turns();
    let files = first.files();
    let preview = first.preview_html();
    drop(first);

    let restored = controller_in(&dir, MockGenerationClient::new());
    assert_eq!(restored.turns(), turns);
    assert_eq!(restored.files(), files);
    assert_eq!(restored.preview_html(), preview);
    assert_eq!(restored.request_count(), 1);
}

#[tokio::test]
async fn restored_sessions_continue_the_request_counter() {
    let dir = tempfile::tempdir().expect("tempdir");

    let first = controller_in(&dir, MockGenerationClient::new());
    first.submit("one").await;
    first.submit("two").await;
    drop(first);

    let restored = controller_in(&dir, MockGenerationClient::new());
    assert_eq!(restored.request_count(), 2);

    restored.submit("three").await;
    assert_eq!(restored.request_count(), 3);
}

#[tokio::test]
async fn failure_turns_are_persisted_as_history() {
    let dir = tempfile::tempdir().expect("tempdir");

    let failing = controller_in(&dir, MockGenerationClient::failing("outage"));
    failing.submit("build anyway").await;
    drop(failing);

    let restored = controller_in(&dir, MockGenerationClient::new());
    let turns = restored.turns();
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[1].text, GENERATION_FAILURE_TEXT);
    assert_eq!(restored.request_count(), 1);
}

#[tokio::test]
async fn a_corrupt_slot_degrades_to_an_empty_working_session() {
    let dir = tempfile::tempdir().expect("tempdir");
    let slot = workspace_file(dir.path());
    fs::create_dir_all(slot.parent().expect("slot parent")).expect("workspace dir");
    fs::write(&slot, "][ definitely not json").expect("corrupt slot");

    let controller = controller_in(&dir, MockGenerationClient::new());
    assert!(controller.turns().is_empty());
    assert_eq!(controller.request_count(), 0);

    let outcome = controller.submit("fresh start").await;
    assert!(matches!(outcome, SubmitOutcome::Settled { .. }));
    assert_eq!(controller.request_count(), 1);
}

#[tokio::test]
async fn hydration_restores_a_first_file_selection() {
    let dir = tempfile::tempdir().expect("tempdir");

    let first = controller_in(&dir, MockGenerationClient::new());
    first.submit("build").await;
    drop(first);

    let restored = controller_in(&dir, MockGenerationClient::new());
    assert_eq!(restored.active_path().as_deref(), Some("index.html"));
}

#[tokio::test]
async fn reset_then_submit_hydrates_only_the_new_session() {
    let dir = tempfile::tempdir().expect("tempdir");

    let controller = controller_in(&dir, MockGenerationClient::new());
    controller.submit("old world").await;
    controller.reset();
    controller.submit("new world").await;
    drop(controller);

    let restored = controller_in(&dir, MockGenerationClient::new());
    let turns = restored.turns();
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0].text, "new world");
    assert_eq!(restored.request_count(), 1);
}
