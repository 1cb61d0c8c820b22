//! Enumerations for TUI state management.

use crate::task::TaskId;

/// Which screen or overlay receives key presses.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AppState {
    TaskList,
    AddTask,
    EditTask,
    Help,
    Confirm,
}

/// A request the event loop must send to the server.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Intent {
    Refresh,
    Add,
    Toggle(TaskId),
    SaveEdit,
    ConfirmDelete,
    Quit,
}

impl Intent {
    /// Status line shown while the request is in flight.
    pub fn busy_label(&self) -> &'static str {
        match self {
            Intent::Refresh => "Loading tasks...",
            Intent::Add => "Adding task...",
            Intent::Toggle(_) => "Updating task...",
            Intent::SaveEdit => "Saving task...",
            Intent::ConfirmDelete => "Deleting task...",
            Intent::Quit => "",
        }
    }
}
