//! Task data structure and related functionality.
//!
//! This module defines the `Task` record mirrored from the remote API, its
//! opaque server-assigned identifier, and the payload used to create one.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Server-assigned task identifier.
///
/// Depending on the backend this is a JSON number or a JSON string; the
/// client never interprets it beyond equality and display.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskId {
    Number(i64),
    Text(String),
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskId::Number(n) => write!(f, "{n}"),
            TaskId::Text(s) => f.write_str(s),
        }
    }
}

/// A single to-do item as last reported by the server.
///
/// Fields the client does not know about are kept in `extra` and sent back
/// unchanged on update, so an update always replaces the full resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Task {
    /// Create a task with no extra server fields.
    pub fn new(id: TaskId, title: &str, completed: bool) -> Self {
        Task {
            id,
            title: title.to_string(),
            completed,
            extra: Map::new(),
        }
    }

    /// Full representation with completion flipped.
    pub fn toggled(&self) -> Task {
        Task {
            completed: !self.completed,
            ..self.clone()
        }
    }

    /// Full representation with a new title.
    pub fn renamed(&self, title: &str) -> Task {
        Task {
            title: title.to_string(),
            ..self.clone()
        }
    }
}

/// Body sent when creating a task.
#[derive(Debug, Clone, Serialize)]
pub struct NewTask<'a> {
    pub title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}
