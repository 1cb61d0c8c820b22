//! # todo - terminal to-do list client
//!
//! A to-do list backed by a remote REST task API, with an interactive
//! terminal UI and a scriptable CLI over the same operations.
//!
//! ## Key Features
//!
//! - **Server is the source of truth**: tasks are created, toggled, renamed and
//!   deleted on the server; the local list only changes once the server answers.
//! - **Filters**: show all, completed or pending tasks.
//! - **Light and dark themes** for the terminal UI.
//! - **Persisted preferences**: the chosen filter and theme survive restarts.
//!
//! ## Quick Start
//!
//! ```bash
//! # Launch the interactive list
//! todo
//!
//! # Add, toggle, rename and delete from the shell
//! todo add "Buy milk"
//! todo toggle 3
//! todo rename 3 "Buy oat milk"
//! todo delete 3
//!
//! # Print pending tasks
//! todo list --filter pending
//!
//! # Talk to a local backend that serves /todos
//! todo --api-url http://localhost:8000 --layout todos
//! ```
//!
//! Preferences are kept in `~/.todo/preferences.json` and logs in
//! `~/.todo/logs/`. Set `TODO_DATA_DIR` or pass `--data-dir` to move both.

use std::fs;

use clap::Parser;

pub mod api;
pub mod cli;
pub mod cmd;
pub mod config;
pub mod controller;
pub mod fields;
pub mod logging;
pub mod prefs;
pub mod task;
pub mod view;
pub mod tui {
    pub mod app;
    pub mod colors;
    pub mod enums;
    pub mod input;
    pub mod run;
    pub mod utils;
}

use api::HttpTaskApi;
use cli::Cli;
use cmd::*;
use config::Settings;
use controller::TaskListController;
use prefs::JsonPreferenceStore;

fn main() {
    let cli = Cli::parse();

    let settings = match Settings::resolve(&cli) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    };

    let command = cli.command.unwrap_or(Commands::Ui);

    // Completions need neither network nor data directory.
    if let Commands::Completions { shell } = command {
        cmd_completions(shell);
        return;
    }

    if let Err(e) = fs::create_dir_all(&settings.data_dir) {
        eprintln!("Failed to create data directory {}: {}", settings.data_dir.display(), e);
        std::process::exit(1);
    }
    let guard = logging::init_tracing(&settings.log_dir(), cli.verbose);
    tracing::info!(api_url = %settings.api_url, layout = ?settings.layout, "starting");

    let api = match HttpTaskApi::new(&settings.api_url, settings.layout) {
        Ok(api) => api,
        Err(e) => {
            eprintln!("Failed to set up HTTP client: {}", e);
            std::process::exit(1);
        }
    };
    let store = JsonPreferenceStore::new(&settings.preferences_path());
    let controller = TaskListController::new(api, store);

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to start async runtime: {}", e);
            std::process::exit(1);
        }
    };
    let result = runtime.block_on(run_command(command, controller));

    // Flush buffered log lines before a possible exit.
    drop(guard);
    if let Err(message) = result {
        eprintln!("{}", message);
        std::process::exit(1);
    }
}
