//! Command implementations for the CLI interface.
//!
//! Every command goes through the same `TaskListController` operations the
//! interactive UI uses, so confirmation, blank-input and failure rules are
//! identical in both front-ends.

use std::io::{self, BufRead, Write};

use clap::Subcommand;
use clap_complete::{generate, Shell};

use crate::api::TaskApi;
use crate::controller::{Outcome, TaskListController};
use crate::fields::{Filter, Theme};
use crate::prefs::PreferenceStore;
use crate::task::Task;
use crate::tui::run::run_tui;
use crate::view::{format_lines, project, ListView, RowView};

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the interactive UI (default).
    Ui,

    /// Print tasks.
    List {
        /// Filter to apply instead of the saved one: all | completed | pending.
        #[arg(long, value_enum)]
        filter: Option<Filter>,
        /// Ask the server to filter (todos layout only).
        #[arg(long)]
        server_filter: bool,
    },

    /// Add a new task.
    Add {
        /// Title of the task.
        title: String,
    },

    /// Toggle a task between pending and completed.
    Toggle {
        /// Task ID.
        id: String,
    },

    /// Change a task's title.
    Rename {
        /// Task ID.
        id: String,
        /// New title.
        title: String,
    },

    /// Delete a task after confirmation.
    Delete {
        /// Task ID.
        id: String,
        /// Skip the confirmation prompt.
        #[arg(long, short)]
        yes: bool,
    },

    /// Show or set the saved list filter.
    Filter {
        #[arg(value_enum)]
        value: Option<Filter>,
    },

    /// Show or set the saved color theme.
    Theme {
        #[arg(value_enum)]
        value: Option<Theme>,
    },

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

/// Run one command against `controller`. Errors are user-facing messages.
pub async fn run_command<A: TaskApi, P: PreferenceStore>(
    command: Commands,
    mut controller: TaskListController<A, P>,
) -> Result<(), String> {
    match command {
        Commands::Ui => run_tui(controller)
            .await
            .map_err(|e| format!("Terminal error: {e}")),
        Commands::List { filter, server_filter } => cmd_list(&mut controller, filter, server_filter).await,
        Commands::Add { title } => cmd_add(&mut controller, &title).await,
        Commands::Toggle { id } => cmd_toggle(&mut controller, &id).await,
        Commands::Rename { id, title } => cmd_rename(&mut controller, &id, &title).await,
        Commands::Delete { id, yes } => {
            let stdin = io::stdin();
            cmd_delete(&mut controller, &id, yes, &mut stdin.lock(), &mut io::stdout()).await
        }
        Commands::Filter { value } => {
            cmd_filter(&mut controller, value);
            Ok(())
        }
        Commands::Theme { value } => {
            cmd_theme(&mut controller, value);
            Ok(())
        }
        Commands::Completions { shell } => {
            cmd_completions(shell);
            Ok(())
        }
    }
}

/// Map a failed outcome to the alert text the UI would show.
fn check<A: TaskApi, P: PreferenceStore>(
    controller: &TaskListController<A, P>,
    outcome: Outcome,
) -> Result<Outcome, String> {
    match outcome {
        Outcome::Failed => Err(controller
            .alert()
            .map(|a| a.message.clone())
            .unwrap_or_else(|| "Request failed".to_string())),
        other => Ok(other),
    }
}

/// Fetch the list and find `raw_id` in it.
async fn load_task<A: TaskApi, P: PreferenceStore>(
    controller: &mut TaskListController<A, P>,
    raw_id: &str,
) -> Result<Task, String> {
    let outcome = controller.initialize().await;
    check(controller, outcome)?;
    let raw_id = raw_id.trim();
    // Ids are opaque: compare their printed form, whatever their JSON type.
    controller
        .tasks()
        .iter()
        .find(|t| t.id.to_string() == raw_id)
        .cloned()
        .ok_or_else(|| format!("Task {raw_id} not found."))
}

pub async fn cmd_list<A: TaskApi, P: PreferenceStore>(
    controller: &mut TaskListController<A, P>,
    filter: Option<Filter>,
    server_filter: bool,
) -> Result<(), String> {
    let lines = if server_filter {
        // One filtered request; the saved filter is only needed as the fallback.
        controller.load_preferences();
        let filter = filter.unwrap_or(controller.filter());
        let completed = match filter {
            Filter::All => None,
            Filter::Completed => Some(true),
            Filter::Pending => Some(false),
        };
        let tasks = controller
            .api()
            .list(completed)
            .await
            .map_err(|e| e.user_message().to_string())?;
        // Servers that ignore the query still get filtered here.
        format_lines(&rows_of(tasks.iter().filter(|t| filter.matches(t)).collect()))
    } else {
        let outcome = controller.initialize().await;
        check(controller, outcome)?;
        match filter {
            Some(filter) if filter != controller.filter() => {
                format_lines(&rows_of(controller.tasks().iter().filter(|t| filter.matches(t)).collect()))
            }
            _ => format_lines(&project(controller)),
        }
    };

    for line in lines {
        println!("{line}");
    }
    Ok(())
}

fn rows_of(tasks: Vec<&Task>) -> ListView<'_> {
    if tasks.is_empty() {
        return ListView::Empty;
    }
    ListView::Rows(tasks.into_iter().map(|task| RowView::Display { task }).collect())
}

pub async fn cmd_add<A: TaskApi, P: PreferenceStore>(
    controller: &mut TaskListController<A, P>,
    title: &str,
) -> Result<(), String> {
    let outcome = controller.add_task(title).await;
    match check(controller, outcome)? {
        Outcome::Skipped => Err("Title cannot be empty.".to_string()),
        _ => {
            if let Some(task) = controller.tasks().last() {
                println!("Added task {}: {}", task.id, task.title);
            }
            Ok(())
        }
    }
}

pub async fn cmd_toggle<A: TaskApi, P: PreferenceStore>(
    controller: &mut TaskListController<A, P>,
    raw_id: &str,
) -> Result<(), String> {
    let task = load_task(controller, raw_id).await?;
    let outcome = controller.toggle_completion(&task.id).await;
    check(controller, outcome)?;
    if let Some(updated) = controller.find(&task.id) {
        let state = if updated.completed { "completed" } else { "pending" };
        println!("Task {} marked {}.", updated.id, state);
    }
    Ok(())
}

pub async fn cmd_rename<A: TaskApi, P: PreferenceStore>(
    controller: &mut TaskListController<A, P>,
    raw_id: &str,
    title: &str,
) -> Result<(), String> {
    let task = load_task(controller, raw_id).await?;
    controller.start_edit(&task.id, &task.title);
    controller.set_edit_draft(title);
    let outcome = controller.save_edit().await;
    match check(controller, outcome)? {
        Outcome::Skipped => Err("Title cannot be empty.".to_string()),
        _ => {
            println!("Renamed task {} to '{}'.", task.id, title);
            Ok(())
        }
    }
}

/// Delete a task. Without `yes`, asks on `output` and reads the answer from `input`.
pub async fn cmd_delete<A: TaskApi, P: PreferenceStore, R: BufRead, W: Write>(
    controller: &mut TaskListController<A, P>,
    raw_id: &str,
    yes: bool,
    input: &mut R,
    output: &mut W,
) -> Result<(), String> {
    let task = load_task(controller, raw_id).await?;
    controller.request_delete(&task.id);

    if !yes && !confirm(&task, input, output).map_err(|e| format!("Could not read answer: {e}"))? {
        controller.cancel_delete();
        let _ = writeln!(output, "Cancelled.");
        return Ok(());
    }

    let outcome = controller.confirm_delete().await;
    check(controller, outcome)?;
    let _ = writeln!(output, "Deleted task {}.", task.id);
    Ok(())
}

fn confirm<R: BufRead, W: Write>(task: &Task, input: &mut R, output: &mut W) -> io::Result<bool> {
    write!(output, "Delete task {} '{}'? This cannot be undone. [y/N] ", task.id, task.title)?;
    output.flush()?;
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

pub fn cmd_filter<A: TaskApi, P: PreferenceStore>(controller: &mut TaskListController<A, P>, value: Option<Filter>) {
    controller.load_preferences();
    match value {
        Some(filter) => {
            controller.set_filter(filter);
            println!("Filter set to {filter}.");
        }
        None => println!("{}", controller.filter()),
    }
}

pub fn cmd_theme<A: TaskApi, P: PreferenceStore>(controller: &mut TaskListController<A, P>, value: Option<Theme>) {
    controller.load_preferences();
    match value {
        Some(theme) => {
            controller.set_theme(theme);
            println!("Theme set to {theme}.");
        }
        None => println!("{}", controller.theme()),
    }
}

pub fn cmd_completions(shell: Shell) {
    use crate::cli::Cli;
    use clap::CommandFactory;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, &mut io::stdout());
}
