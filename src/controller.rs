//! Task list state and the operations that change it.
//!
//! `TaskListController` owns the local mirror of the server's task list,
//! the active filter and theme, the add-task draft and the single inline
//! edit. Local state only changes after the server has confirmed a change;
//! a failed request leaves everything as it was and raises an [`Alert`].

use chrono::{DateTime, Local};
use tracing::{debug, info};

use crate::api::{ApiError, TaskApi, UpdateKind};
use crate::fields::{Filter, Theme};
use crate::prefs::{save_key, PreferenceStore, Preferences, FILTER_KEY, THEME_KEY};
use crate::task::{Task, TaskId};

/// A dismissible message shown to the user after a failed action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub message: String,
}

impl Alert {
    fn from_api(err: &ApiError) -> Self {
        Alert {
            title: "Error".to_string(),
            message: err.user_message().to_string(),
        }
    }
}

/// The row currently being renamed. At most one exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditState {
    pub id: TaskId,
    pub draft: String,
}

/// Result of a controller operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The server confirmed the change and local state was updated.
    Applied,
    /// Nothing was sent: empty input, unknown task, or nothing to confirm.
    Skipped,
    /// The request failed; local state is unchanged and an alert was raised.
    Failed,
}

pub struct TaskListController<A: TaskApi, P: PreferenceStore> {
    api: A,
    store: P,
    tasks: Vec<Task>,
    prefs: Preferences,
    draft: String,
    editing: Option<EditState>,
    pending_delete: Option<TaskId>,
    loading: bool,
    alert: Option<Alert>,
    last_synced: Option<DateTime<Local>>,
}

impl<A: TaskApi, P: PreferenceStore> TaskListController<A, P> {
    pub fn new(api: A, store: P) -> Self {
        TaskListController {
            api,
            store,
            tasks: Vec::new(),
            prefs: Preferences::default(),
            draft: String::new(),
            editing: None,
            pending_delete: None,
            loading: true,
            alert: None,
            last_synced: None,
        }
    }

    /// Load preferences, then fetch the task list.
    pub async fn initialize(&mut self) -> Outcome {
        self.load_preferences();
        self.refresh().await
    }

    /// Read filter and theme from the store. Never touches the network.
    pub fn load_preferences(&mut self) {
        self.prefs = Preferences::load(&self.store);
    }

    /// Replace the local list with the server's.
    pub async fn refresh(&mut self) -> Outcome {
        self.loading = true;
        let result = self.api.list(None).await;
        self.loading = false;
        match result {
            Ok(tasks) => {
                info!(count = tasks.len(), "task list synchronised");
                self.tasks = tasks;
                self.last_synced = Some(Local::now());
                Outcome::Applied
            }
            Err(e) => self.fail(e),
        }
    }

    /// Create a task from `title`. Blank titles are ignored; others are sent as typed.
    pub async fn add_task(&mut self, title: &str) -> Outcome {
        if title.trim().is_empty() {
            return Outcome::Skipped;
        }
        match self.api.create(title).await {
            Ok(task) => {
                debug!(id = %task.id, "task added");
                self.tasks.push(task);
                self.draft.clear();
                Outcome::Applied
            }
            Err(e) => self.fail(e),
        }
    }

    /// Flip completion of the task with `id` once the server agrees.
    pub async fn toggle_completion(&mut self, id: &TaskId) -> Outcome {
        let Some(task) = self.find(id).cloned() else {
            return Outcome::Skipped;
        };
        match self.api.update(&task.id, &task.toggled(), UpdateKind::Completion).await {
            Ok(updated) => {
                self.replace(updated);
                Outcome::Applied
            }
            Err(e) => self.fail(e),
        }
    }

    /// Put one row into edit mode, replacing any edit in progress.
    pub fn start_edit(&mut self, id: &TaskId, title: &str) {
        self.editing = Some(EditState {
            id: id.clone(),
            draft: title.to_string(),
        });
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Replace the edit draft.
    pub fn set_edit_draft(&mut self, text: &str) {
        if let Some(edit) = self.editing.as_mut() {
            edit.draft = text.to_string();
        }
    }

    /// Send the edit draft as the task's new title. The edit stays open on failure.
    pub async fn save_edit(&mut self) -> Outcome {
        let Some(edit) = self.editing.clone() else {
            return Outcome::Skipped;
        };
        if edit.draft.trim().is_empty() {
            return Outcome::Skipped;
        }
        let Some(task) = self.find(&edit.id).cloned() else {
            return Outcome::Skipped;
        };
        match self.api.update(&task.id, &task.renamed(&edit.draft), UpdateKind::Title).await {
            Ok(updated) => {
                self.replace(updated);
                self.editing = None;
                Outcome::Applied
            }
            Err(e) => self.fail(e),
        }
    }

    /// Ask for confirmation before deleting `id`. Nothing is sent yet.
    pub fn request_delete(&mut self, id: &TaskId) {
        if self.find(id).is_some() {
            self.pending_delete = Some(id.clone());
        }
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Delete the task awaiting confirmation.
    pub async fn confirm_delete(&mut self) -> Outcome {
        let Some(id) = self.pending_delete.take() else {
            return Outcome::Skipped;
        };
        match self.api.remove(&id).await {
            Ok(()) => {
                self.tasks.retain(|t| t.id != id);
                if self.editing.as_ref().is_some_and(|e| e.id == id) {
                    self.editing = None;
                }
                Outcome::Applied
            }
            Err(e) => self.fail(e),
        }
    }

    pub fn set_filter(&mut self, filter: Filter) {
        self.prefs.filter = filter;
        save_key(&self.store, FILTER_KEY, filter.as_str());
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.prefs.theme = theme;
        save_key(&self.store, THEME_KEY, theme.as_str());
    }

    /// Tasks matching the active filter, in list order.
    pub fn filtered_tasks(&self) -> Vec<&Task> {
        let filter = self.prefs.filter;
        self.tasks.iter().filter(|t| filter.matches(t)).collect()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn find(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    pub fn filter(&self) -> Filter {
        self.prefs.filter
    }

    pub fn theme(&self) -> Theme {
        self.prefs.theme
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, text: &str) {
        self.draft = text.to_string();
    }

    pub fn editing(&self) -> Option<&EditState> {
        self.editing.as_ref()
    }

    pub fn pending_delete(&self) -> Option<&TaskId> {
        self.pending_delete.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn alert(&self) -> Option<&Alert> {
        self.alert.as_ref()
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    pub fn last_synced(&self) -> Option<DateTime<Local>> {
        self.last_synced
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    fn replace(&mut self, updated: Task) {
        if let Some(slot) = self.tasks.iter_mut().find(|t| t.id == updated.id) {
            *slot = updated;
        }
    }

    fn fail(&mut self, err: ApiError) -> Outcome {
        self.alert = Some(Alert::from_api(&err));
        Outcome::Failed
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::api::RequestFailure;
    use crate::prefs::tests::MemoryPreferenceStore;
    use reqwest::StatusCode;
    use std::cell::{Cell, RefCell};

    /// In-memory stand-in for the task server.
    #[derive(Default)]
    pub(crate) struct FakeApi {
        pub server: RefCell<Vec<Task>>,
        pub calls: RefCell<Vec<String>>,
        pub failing: Cell<bool>,
        next_id: Cell<i64>,
    }

    impl FakeApi {
        pub fn with_tasks(tasks: Vec<Task>) -> Self {
            let next = tasks.len() as i64 + 100;
            FakeApi {
                server: RefCell::new(tasks),
                next_id: Cell::new(next),
                ..Default::default()
            }
        }

        pub fn call_count(&self) -> usize {
            self.calls.borrow().len()
        }

        fn boom() -> RequestFailure {
            RequestFailure::Status(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }

    impl TaskApi for FakeApi {
        async fn list(&self, _completed: Option<bool>) -> Result<Vec<Task>, ApiError> {
            self.calls.borrow_mut().push("list".into());
            if self.failing.get() {
                return Err(ApiError::Fetch { source: Self::boom() });
            }
            Ok(self.server.borrow().clone())
        }

        async fn create(&self, title: &str) -> Result<Task, ApiError> {
            self.calls.borrow_mut().push(format!("create {title}"));
            if self.failing.get() {
                return Err(ApiError::Create {
                    title: title.to_string(),
                    source: Self::boom(),
                });
            }
            let id = self.next_id.get();
            self.next_id.set(id + 1);
            let task = Task::new(TaskId::Number(id), title, false);
            self.server.borrow_mut().push(task.clone());
            Ok(task)
        }

        async fn update(&self, id: &TaskId, body: &Task, kind: UpdateKind) -> Result<Task, ApiError> {
            self.calls.borrow_mut().push(format!("update {id}"));
            if self.failing.get() {
                return Err(ApiError::Update {
                    id: id.clone(),
                    kind,
                    source: Self::boom(),
                });
            }
            let mut server = self.server.borrow_mut();
            let slot = server.iter_mut().find(|t| &t.id == id).ok_or_else(|| ApiError::Update {
                id: id.clone(),
                kind,
                source: RequestFailure::Status(StatusCode::NOT_FOUND),
            })?;
            *slot = body.clone();
            Ok(body.clone())
        }

        async fn remove(&self, id: &TaskId) -> Result<(), ApiError> {
            self.calls.borrow_mut().push(format!("remove {id}"));
            if self.failing.get() {
                return Err(ApiError::Delete {
                    id: id.clone(),
                    source: Self::boom(),
                });
            }
            self.server.borrow_mut().retain(|t| &t.id != id);
            Ok(())
        }
    }

    pub(crate) fn sample_tasks() -> Vec<Task> {
        vec![
            Task::new(TaskId::Number(1), "Buy milk", false),
            Task::new(TaskId::Number(2), "Walk dog", true),
            Task::new(TaskId::Number(3), "Write report", false),
            Task::new(TaskId::Number(4), "Call mum", true),
        ]
    }

    async fn ready() -> TaskListController<FakeApi, MemoryPreferenceStore> {
        let mut c = TaskListController::new(FakeApi::with_tasks(sample_tasks()), MemoryPreferenceStore::new());
        assert_eq!(c.initialize().await, Outcome::Applied);
        c
    }

    fn ids(tasks: &[&Task]) -> Vec<TaskId> {
        tasks.iter().map(|t| t.id.clone()).collect()
    }

    #[tokio::test]
    async fn test_initialize_loads_tasks_and_defaults() {
        let c = ready().await;
        assert_eq!(c.tasks().len(), 4);
        assert_eq!(c.filter(), Filter::All);
        assert_eq!(c.theme(), Theme::Light);
        assert!(!c.is_loading());
        assert!(c.last_synced().is_some());
    }

    #[tokio::test]
    async fn test_filtered_tasks_preserve_order_and_do_not_mutate() {
        let mut c = ready().await;
        let before = c.tasks().to_vec();

        c.set_filter(Filter::Completed);
        assert_eq!(ids(&c.filtered_tasks()), vec![TaskId::Number(2), TaskId::Number(4)]);
        c.set_filter(Filter::Pending);
        assert_eq!(ids(&c.filtered_tasks()), vec![TaskId::Number(1), TaskId::Number(3)]);
        c.set_filter(Filter::All);
        assert_eq!(c.filtered_tasks().len(), 4);

        assert_eq!(c.tasks(), before.as_slice());
    }

    #[tokio::test]
    async fn test_blank_add_is_a_no_op() {
        let mut c = ready().await;
        let calls = c.api().call_count();
        assert_eq!(c.add_task("").await, Outcome::Skipped);
        assert_eq!(c.add_task("   ").await, Outcome::Skipped);
        assert_eq!(c.api().call_count(), calls);
        assert_eq!(c.tasks().len(), 4);
    }

    #[tokio::test]
    async fn test_add_appends_server_copy_and_clears_draft() {
        let mut c = ready().await;
        c.set_draft("Buy milk");
        assert_eq!(c.add_task("Buy milk").await, Outcome::Applied);

        assert_eq!(c.tasks().len(), 5);
        let last = c.tasks().last().unwrap();
        assert_eq!(last, c.api().server.borrow().last().unwrap());
        assert_eq!(last.title, "Buy milk");
        assert_eq!(c.draft(), "");
    }

    #[tokio::test]
    async fn test_failed_add_keeps_state_and_alerts() {
        let mut c = ready().await;
        c.set_draft("Buy milk");
        c.api().failing.set(true);
        assert_eq!(c.add_task("Buy milk").await, Outcome::Failed);

        assert_eq!(c.tasks().len(), 4);
        assert_eq!(c.draft(), "Buy milk");
        assert_eq!(c.alert().unwrap().message, "There was an issue adding the task.");
        c.dismiss_alert();
        assert!(c.alert().is_none());
    }

    #[tokio::test]
    async fn test_toggle_changes_only_target() {
        let mut c = ready().await;
        let before = c.tasks().to_vec();
        assert_eq!(c.toggle_completion(&TaskId::Number(1)).await, Outcome::Applied);

        assert!(c.find(&TaskId::Number(1)).unwrap().completed);
        for (old, new) in before.iter().zip(c.tasks()).skip(1) {
            assert_eq!(old, new);
        }
    }

    #[tokio::test]
    async fn test_failed_toggle_is_not_optimistic() {
        let mut c = ready().await;
        c.api().failing.set(true);
        assert_eq!(c.toggle_completion(&TaskId::Number(1)).await, Outcome::Failed);
        assert!(!c.find(&TaskId::Number(1)).unwrap().completed);
        assert_eq!(c.alert().unwrap().message, "There was an issue updating the task.");
    }

    #[tokio::test]
    async fn test_edit_lifecycle() {
        let mut c = ready().await;
        c.start_edit(&TaskId::Number(3), "Write report");
        c.set_edit_draft("Write final report");
        assert_eq!(c.save_edit().await, Outcome::Applied);
        assert_eq!(c.find(&TaskId::Number(3)).unwrap().title, "Write final report");
        assert!(c.editing().is_none());

        c.start_edit(&TaskId::Number(1), "Buy milk");
        c.start_edit(&TaskId::Number(2), "Walk dog");
        assert_eq!(c.editing().unwrap().id, TaskId::Number(2));
        c.cancel_edit();
        assert!(c.editing().is_none());
    }

    #[tokio::test]
    async fn test_titles_are_sent_as_typed() {
        let mut c = ready().await;
        assert_eq!(c.add_task("  Buy milk  ").await, Outcome::Applied);
        let added = c.tasks().last().unwrap().clone();
        assert_eq!(added.title, "  Buy milk  ");

        c.start_edit(&TaskId::Number(1), "Buy milk");
        c.set_edit_draft("  Oat milk ");
        assert_eq!(c.save_edit().await, Outcome::Applied);
        assert_eq!(c.find(&TaskId::Number(1)).unwrap().title, "  Oat milk ");

        let calls = c.api().calls.borrow().clone();
        assert_eq!(calls[1..], ["create   Buy milk  ".to_string(), "update 1".to_string()]);
        let server = c.api().server.borrow();
        assert_eq!(server[0].title, "  Oat milk ");
        assert_eq!(server.last().unwrap().title, "  Buy milk  ");
    }

    #[tokio::test]
    async fn test_empty_edit_draft_sends_nothing() {
        let mut c = ready().await;
        let before = c.tasks().to_vec();
        c.start_edit(&TaskId::Number(1), "Buy milk");
        c.set_edit_draft("  ");
        let calls = c.api().call_count();

        assert_eq!(c.save_edit().await, Outcome::Skipped);
        assert_eq!(c.api().call_count(), calls);
        assert_eq!(c.tasks(), before.as_slice());
        assert_eq!(c.editing().unwrap().id, TaskId::Number(1));
    }

    #[tokio::test]
    async fn test_failed_edit_stays_open() {
        let mut c = ready().await;
        c.start_edit(&TaskId::Number(1), "Buy oat milk");
        c.api().failing.set(true);
        assert_eq!(c.save_edit().await, Outcome::Failed);
        assert_eq!(c.editing().unwrap().draft, "Buy oat milk");
        assert_eq!(c.find(&TaskId::Number(1)).unwrap().title, "Buy milk");
        assert_eq!(c.alert().unwrap().message, "There was an issue saving the task.");
    }

    #[tokio::test]
    async fn test_delete_requires_confirmation() {
        let mut c = ready().await;
        let calls = c.api().call_count();

        c.request_delete(&TaskId::Number(2));
        assert_eq!(c.pending_delete(), Some(&TaskId::Number(2)));
        c.cancel_delete();
        assert_eq!(c.confirm_delete().await, Outcome::Skipped);
        assert_eq!(c.api().call_count(), calls);
        assert!(c.find(&TaskId::Number(2)).is_some());

        c.request_delete(&TaskId::Number(2));
        assert_eq!(c.confirm_delete().await, Outcome::Applied);
        assert!(c.find(&TaskId::Number(2)).is_none());
        assert!(c.pending_delete().is_none());
    }

    #[tokio::test]
    async fn test_failed_delete_keeps_entry() {
        let mut c = ready().await;
        c.api().failing.set(true);
        c.request_delete(&TaskId::Number(4));
        assert_eq!(c.confirm_delete().await, Outcome::Failed);
        assert!(c.find(&TaskId::Number(4)).is_some());
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_last_known_list() {
        let mut c = ready().await;
        c.api().server.borrow_mut().clear();
        c.api().failing.set(true);
        assert_eq!(c.refresh().await, Outcome::Failed);
        assert_eq!(c.tasks().len(), 4);
        assert!(!c.is_loading());
        assert_eq!(c.alert().unwrap().message, "There was an issue fetching the tasks.");
    }

    #[tokio::test]
    async fn test_set_filter_persists_without_touching_tasks() {
        let store = MemoryPreferenceStore::new();
        let mut c = TaskListController::new(FakeApi::with_tasks(sample_tasks()), store.clone());
        c.initialize().await;
        let calls = c.api().call_count();

        c.set_filter(Filter::Pending);
        assert_eq!(store.get(FILTER_KEY).unwrap().as_deref(), Some("pending"));
        assert_eq!(c.tasks().len(), 4);
        assert_eq!(c.api().call_count(), calls);
    }

    #[tokio::test]
    async fn test_theme_survives_restart() {
        let store = MemoryPreferenceStore::new();
        let mut first = TaskListController::new(FakeApi::with_tasks(sample_tasks()), store.clone());
        first.initialize().await;
        first.set_theme(Theme::Dark);

        let offline = FakeApi::default();
        offline.failing.set(true);
        let mut second = TaskListController::new(offline, store);
        assert_eq!(second.initialize().await, Outcome::Failed);
        assert_eq!(second.theme(), Theme::Dark);
    }
}
