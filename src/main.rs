mod cli;
mod editor;
mod state;
mod tui;
mod ui;

use std::sync::Arc;

use clap::Parser;
use tokio::runtime::Runtime;
use tracing::info;

use ficous_quiz::api::{ExerciseApi, FicousClient};
use ficous_quiz::auth::{self, TokenStore};
use ficous_quiz::config::{self, Config};
use ficous_quiz::controller::QuizController;
use ficous_quiz::logging;
use ficous_quiz::model::{choice_label, ExerciseDetail, ExerciseFilters, ExerciseSummary};

use crate::cli::{Cli, Command};
use crate::state::AppState;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let cli = Cli::parse();

    let mut config = config::load_config(cli.config.as_deref())?;
    if let Some(url) = cli.api_url.as_deref() {
        config.set_api_url(url);
    }
    let store = TokenStore::default_location();

    match cli.command {
        Command::Login { token } => {
            let store = store.ok_or("Cannot determine a data directory for the token")?;
            store.save(&token)?;
            eprintln!("Token saved to {}", store.path().display());
            Ok(())
        }
        Command::Logout => {
            if let Some(store) = store {
                store.clear()?;
            }
            eprintln!("Token removed.");
            Ok(())
        }
        Command::Quiz { exercise_id } => {
            match config::data_dir() {
                Some(dir) => logging::init_file(&dir, &config.log_filter)?,
                None => logging::init_stderr(&config.log_filter)?,
            }
            let (runtime, client) = connect(&config, store.as_ref())?;
            info!(api_url = %client.base_url(), "starting quiz");

            let api: Arc<dyn ExerciseApi> = Arc::new(client);
            let controller = QuizController::new(api, exercise_id, runtime.handle().clone());
            tui::run_tui(AppState::new(controller), &runtime)
        }
        Command::List {
            kind,
            difficulty,
            tag,
            limit,
            offset,
        } => {
            logging::init_stderr(&config.log_filter)?;
            let (runtime, client) = connect(&config, store.as_ref())?;
            let filters = ExerciseFilters {
                kind,
                difficulty,
                tag,
                limit,
                offset,
            };
            let exercises = runtime
                .block_on(client.list_exercises(&filters))
                .map_err(|e| e.to_string())?;
            print_list(&exercises);
            Ok(())
        }
        Command::Show { exercise_id } => {
            logging::init_stderr(&config.log_filter)?;
            let (runtime, client) = connect(&config, store.as_ref())?;
            let detail = runtime
                .block_on(client.get_exercise_detail(&exercise_id))
                .map_err(|e| e.to_string())?;
            print_detail(&detail);
            Ok(())
        }
    }
}

fn connect(config: &Config, store: Option<&TokenStore>) -> Result<(Runtime, FicousClient), String> {
    let token = auth::resolve_token(store, std::env::var(auth::ENV_TOKEN).ok())?;
    let runtime = Runtime::new().map_err(|e| format!("Cannot start async runtime: {}", e))?;
    let client = FicousClient::new(&config.api_url, token, config.request_timeout_secs);
    Ok((runtime, client))
}

fn print_list(exercises: &[ExerciseSummary]) {
    if exercises.is_empty() {
        println!("No exercises.");
        return;
    }
    for ex in exercises {
        let mut extra = Vec::new();
        if let Some(kind) = ex.kind() {
            extra.push(kind.to_string());
        }
        if let Some(difficulty) = ex.difficulty() {
            extra.push(difficulty.to_string());
        }
        let tags = ex.tags();
        if !tags.is_empty() {
            extra.push(tags.join(","));
        }
        if extra.is_empty() {
            println!("{}  {}", ex.id, ex.display_title());
        } else {
            println!("{}  {}  ({})", ex.id, ex.display_title(), extra.join(" · "));
        }
    }
}

fn print_detail(detail: &ExerciseDetail) {
    println!("{}", detail.summary.display_title());
    println!("{} questions", detail.items.len());
    for (i, item) in detail.items.iter().enumerate() {
        println!();
        println!("{}. [{}] {}", i + 1, item.kind.label(), item.question);
        for (j, choice) in item.choices().iter().enumerate() {
            println!("   ({}) {}", choice_label(j), choice);
        }
    }
}
