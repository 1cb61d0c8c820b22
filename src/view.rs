//! Projection of controller state into displayable rows.
//!
//! Both front-ends render from [`ListView`]: the terminal UI draws it as a
//! table, the CLI prints it as plain text.

use crate::api::TaskApi;
use crate::controller::TaskListController;
use crate::prefs::PreferenceStore;
use crate::task::Task;

/// One visible row.
#[derive(Debug, Clone, PartialEq)]
pub enum RowView<'a> {
    Display { task: &'a Task },
    /// The single row in edit mode, with the text being typed.
    Editing { task: &'a Task, draft: &'a str },
}

impl<'a> RowView<'a> {
    pub fn task(&self) -> &'a Task {
        match self {
            RowView::Display { task } | RowView::Editing { task, .. } => task,
        }
    }
}

/// What the list area should show.
#[derive(Debug, Clone, PartialEq)]
pub enum ListView<'a> {
    Loading,
    Empty,
    Rows(Vec<RowView<'a>>),
}

impl ListView<'_> {
    /// Placeholder text for an empty list.
    pub fn placeholder(&self) -> Option<&'static str> {
        match self {
            ListView::Loading => Some("Loading tasks..."),
            ListView::Empty => Some("No tasks found"),
            ListView::Rows(_) => None,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ListView::Rows(rows) => rows.len(),
            _ => 0,
        }
    }
}

/// Build the list for the controller's active filter.
pub fn project<A: TaskApi, P: PreferenceStore>(controller: &TaskListController<A, P>) -> ListView<'_> {
    let visible = controller.filtered_tasks();
    if visible.is_empty() {
        return if controller.is_loading() {
            ListView::Loading
        } else {
            ListView::Empty
        };
    }
    let editing = controller.editing();
    let rows = visible
        .into_iter()
        .map(|task| match editing {
            Some(edit) if edit.id == task.id => RowView::Editing {
                task,
                draft: &edit.draft,
            },
            _ => RowView::Display { task },
        })
        .collect();
    ListView::Rows(rows)
}

/// Checkbox glyph for a task.
pub fn checkbox(task: &Task) -> &'static str {
    if task.completed {
        "[x]"
    } else {
        "[ ]"
    }
}

/// Render a view as plain text lines for terminal output.
pub fn format_lines(view: &ListView<'_>) -> Vec<String> {
    match view {
        ListView::Rows(rows) => {
            let width = rows
                .iter()
                .map(|r| r.task().id.to_string().len())
                .max()
                .unwrap_or(2)
                .max(2);
            rows.iter()
                .map(|row| {
                    let task = row.task();
                    format!("{} {:<width$}  {}", checkbox(task), task.id.to_string(), task.title)
                })
                .collect()
        }
        other => other.placeholder().map(|p| vec![p.to_string()]).unwrap_or_default(),
    }
}
