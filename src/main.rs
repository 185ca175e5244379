use std::io::{self, BufRead, Write};
use std::sync::Arc;

use appforge::commands::{parse_slash_command, SlashCommand};
use appforge::controller::{SessionController, SubmitOutcome};
use appforge::session::Role;
use generation_client::GenerationClient;
use generation_client_gemini::GeminiGenerationClient;
use generation_client_mock::MockGenerationClient;
use tracing_subscriber::EnvFilter;
use workspace_store::WorkspaceStore;

const CLIENT_ENV_VAR: &str = "APPFORGE_CLIENT";
const DEFAULT_CLIENT_ID: &str = "mock";

const HELP_TEXT: &str = "Commands: /help, /files, /export, /reset, /quit. Anything else is a build prompt.";

fn client_from_env() -> Result<Arc<dyn GenerationClient>, String> {
    let client_id = std::env::var(CLIENT_ENV_VAR)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty());

    client_for_id(client_id.as_deref().unwrap_or(DEFAULT_CLIENT_ID))
}

fn client_for_id(client_id: &str) -> Result<Arc<dyn GenerationClient>, String> {
    match client_id {
        "mock" => Ok(Arc::new(MockGenerationClient::new())),
        "gemini" => GeminiGenerationClient::from_env()
            .map(|client| Arc::new(client) as Arc<dyn GenerationClient>)
            .map_err(|error| error.to_string()),
        unknown => Err(format!(
            "Unsupported client '{unknown}'. Available clients: mock, gemini"
        )),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let client = client_from_env().map_err(io::Error::other)?;
    let profile = client.profile();

    let cwd = std::env::current_dir()?;
    let store = WorkspaceStore::at_root(&cwd);
    let controller = SessionController::new(client, store);

    println!("appforge ({} / {})", profile.client_id, profile.model_id);
    if controller.request_count() > 0 {
        println!(
            "Restored session: {} turns, {} files, {} requests so far",
            controller.turns().len(),
            controller.files().len(),
            controller.request_count()
        );
    }
    println!("{HELP_TEXT}");

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;

        if let Some(command) = parse_slash_command(&line) {
            match command {
                SlashCommand::Help => println!("{HELP_TEXT}"),
                SlashCommand::Files => print_files(&controller),
                SlashCommand::Export => run_export(&controller)?,
                SlashCommand::Reset => {
                    controller.reset();
                    println!("Workspace reset");
                }
                SlashCommand::Quit => break,
                SlashCommand::Unknown(command) => println!("Unknown command: {command}"),
            }
            continue;
        }

        match controller.submit(&line).await {
            SubmitOutcome::Settled { .. } => print_latest_reply(&controller),
            // Dropped admissions stay silent; blank input just re-prompts.
            SubmitOutcome::Rejected(_) => {}
        }
    }

    Ok(())
}

fn print_files(controller: &SessionController) {
    let files = controller.files();
    if files.is_empty() {
        println!("No generated files yet");
        return;
    }

    let active = controller.active_path();
    for file in files {
        let marker = if active.as_deref() == Some(file.name.as_str()) {
            "*"
        } else {
            " "
        };
        println!("{marker} {} ({})", file.name, file.language);
    }
}

fn run_export(controller: &SessionController) -> io::Result<()> {
    match controller.export() {
        Ok(archive) => {
            std::fs::write(&archive.file_name, &archive.bytes)?;
            println!("Exported {}", archive.file_name);
        }
        Err(error) => println!("Export failed: {error}"),
    }

    Ok(())
}

fn print_latest_reply(controller: &SessionController) {
    let turns = controller.turns();
    if let Some(reply) = turns.iter().rev().find(|turn| turn.role == Role::Assistant) {
        println!("{}", reply.text);
    }
    println!(
        "[{} files, request #{}]",
        controller.files().len(),
        controller.request_count()
    );
}
