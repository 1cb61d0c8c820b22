//! HTTP client for the remote task API.
//!
//! Each operation is a single request with no retry. Failures are mapped to
//! one `ApiError` variant per operation kind; callers only care whether an
//! operation succeeded, and use [`ApiError::user_message`] to tell the user.

use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

use crate::fields::ApiLayout;
use crate::task::{NewTask, Task, TaskId};

/// Default origin of the task API.
pub const DEFAULT_API_URL: &str = "https://fastapitbackend.onrender.com";

/// Which field an update was changing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateKind {
    Completion,
    Title,
}

/// Why a single request failed.
#[derive(Debug, Error)]
pub enum RequestFailure {
    /// Transport, TLS or body decoding failure.
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("server responded with {0}")]
    Status(StatusCode),
}

/// A failed task API operation.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("failed to fetch tasks: {source}")]
    Fetch { source: RequestFailure },

    #[error("failed to create task '{title}': {source}")]
    Create { title: String, source: RequestFailure },

    #[error("failed to update task {id}: {source}")]
    Update {
        id: TaskId,
        kind: UpdateKind,
        source: RequestFailure,
    },

    #[error("failed to delete task {id}: {source}")]
    Delete { id: TaskId, source: RequestFailure },
}

impl ApiError {
    /// Plain-language description of the failed action.
    pub fn user_message(&self) -> &'static str {
        match self {
            ApiError::Fetch { .. } => "There was an issue fetching the tasks.",
            ApiError::Create { .. } => "There was an issue adding the task.",
            ApiError::Update { kind: UpdateKind::Completion, .. } => {
                "There was an issue updating the task."
            }
            ApiError::Update { kind: UpdateKind::Title, .. } => "There was an issue saving the task.",
            ApiError::Delete { .. } => "There was an issue deleting the task.",
        }
    }
}

/// The operations the client needs from the server.
///
/// Futures are driven on a single-threaded runtime, so they need not be `Send`.
#[allow(async_fn_in_trait)]
pub trait TaskApi {
    /// Fetch the task collection, optionally asking the server to filter by completion.
    async fn list(&self, completed: Option<bool>) -> Result<Vec<Task>, ApiError>;

    /// Create a task and return the server's copy.
    async fn create(&self, title: &str) -> Result<Task, ApiError>;

    /// Replace a task with `body` and return the server's copy.
    async fn update(&self, id: &TaskId, body: &Task, kind: UpdateKind) -> Result<Task, ApiError>;

    /// Delete a task.
    async fn remove(&self, id: &TaskId) -> Result<(), ApiError>;
}

/// `TaskApi` over HTTP using `reqwest`.
pub struct HttpTaskApi {
    http: reqwest::Client,
    base: String,
    layout: ApiLayout,
}

impl HttpTaskApi {
    /// Build a client for `base_url`. Trailing slashes on the base are ignored.
    pub fn new(base_url: &str, layout: ApiLayout) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("todo-client/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(HttpTaskApi {
            http,
            base: base_url.trim_end_matches('/').to_string(),
            layout,
        })
    }

    /// URL of the task collection.
    pub fn collection_url(&self) -> String {
        match self.layout {
            ApiLayout::TrailingSlash => format!("{}/", self.base),
            ApiLayout::Todos => format!("{}/todos", self.base),
        }
    }

    /// URL of a single task.
    pub fn item_url(&self, id: &TaskId) -> String {
        match self.layout {
            ApiLayout::TrailingSlash => format!("{}/{}/", self.base, id),
            ApiLayout::Todos => format!("{}/todos/{}", self.base, id),
        }
    }

    async fn send(request: RequestBuilder) -> Result<Response, RequestFailure> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RequestFailure::Status(status));
        }
        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, RequestFailure> {
        let response = Self::send(request).await?;
        Ok(response.json().await?)
    }
}

impl TaskApi for HttpTaskApi {
    async fn list(&self, completed: Option<bool>) -> Result<Vec<Task>, ApiError> {
        let mut request = self.http.get(self.collection_url());
        // Only the /todos backend understands the completion query.
        if let (ApiLayout::Todos, Some(flag)) = (self.layout, completed) {
            request = request.query(&[("completed", flag)]);
        }
        debug!(url = %self.collection_url(), ?completed, "fetching tasks");

        match Self::send_json::<Vec<Task>>(request).await {
            Ok(tasks) => {
                debug!(count = tasks.len(), "fetched tasks");
                Ok(tasks)
            }
            Err(source) => {
                warn!(error = %source, "fetch failed");
                Err(ApiError::Fetch { source })
            }
        }
    }

    async fn create(&self, title: &str) -> Result<Task, ApiError> {
        let body = NewTask {
            title,
            completed: match self.layout {
                ApiLayout::TrailingSlash => Some(false),
                ApiLayout::Todos => None,
            },
        };
        debug!(url = %self.collection_url(), title, "creating task");

        let request = self.http.post(self.collection_url()).json(&body);
        Self::send_json::<Task>(request).await.map_err(|source| {
            warn!(error = %source, title, "create failed");
            ApiError::Create {
                title: title.to_string(),
                source,
            }
        })
    }

    async fn update(&self, id: &TaskId, body: &Task, kind: UpdateKind) -> Result<Task, ApiError> {
        let url = self.item_url(id);
        debug!(%url, ?kind, "updating task");

        Self::send_json::<Task>(self.http.put(&url).json(body))
            .await
            .map_err(|source| {
                warn!(error = %source, %id, ?kind, "update failed");
                ApiError::Update {
                    id: id.clone(),
                    kind,
                    source,
                }
            })
    }

    async fn remove(&self, id: &TaskId) -> Result<(), ApiError> {
        let url = self.item_url(id);
        debug!(%url, "deleting task");

        match Self::send(self.http.delete(&url)).await {
            Ok(_) => Ok(()),
            Err(source) => {
                warn!(error = %source, %id, "delete failed");
                Err(ApiError::Delete {
                    id: id.clone(),
                    source,
                })
            }
        }
    }
}
