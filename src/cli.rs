use std::path::PathBuf;

use clap::{ArgAction, Parser};

use crate::cmd::Commands;
use crate::fields::ApiLayout;

/// Terminal to-do list backed by a remote task API.
/// Runs the interactive UI when no subcommand is given.
#[derive(Parser)]
#[command(name = "todo", version, about = "To-do list client for a REST task API")]
pub struct Cli {
    /// Base URL of the task API [env: TODO_API_URL].
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Path convention of the API [env: TODO_API_LAYOUT].
    #[arg(long, global = true, value_enum)]
    pub layout: Option<ApiLayout>,

    /// Directory for preferences and logs [env: TODO_DATA_DIR, default: ~/.todo].
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}
