//! The board: the surface a presentation layer talks to.
//!
//! A [`Board`] owns three stores (todos, filter criteria, toasts) and exposes
//! the user-level commands and queries on top of them. It performs the input
//! validation the todo reducer assumes has already happened, and it shows a
//! toast after each successful user command.
//!
//! Startup is two-phase: build the board, then `load()` it. Commands issued
//! before the load completes are rejected with [`BoardError::NotReady`].

use crate::config::Config;
use crate::filter::{self, CategoryFilter, FilterParams, PriorityFilter, SortMode, StatusFilter};
use crate::filter_state::{FilterAction, FilterReducer};
use crate::persistence::{FileKeyValueStore, SnapshotRepository};
use crate::reducer::{TodoAction, TodoEnvironment, TodoReducer, TodoState};
use crate::toast::{Toast, ToastAction, ToastEnvironment, ToastId, ToastReducer, ToastState};
use crate::types::{
    Category, CategoryColor, CategoryId, CategoryPatch, NewTodo, Todo, TodoCounts, TodoId,
    TodoPatch,
};
use std::sync::Arc;
use std::time::Duration;
use taskdeck_core::environment::{IdGenerator, RandomIdGenerator, SystemClock};
use taskdeck_runtime::{Store, StoreError};
use thiserror::Error;
use tokio::sync::Mutex;

/// Messages shown after successful commands
pub mod messages {
    /// After `add_todo`
    pub const TODO_ADDED: &str = "Todo added";
    /// After `update_todo`
    pub const TODO_UPDATED: &str = "Todo updated";
    /// After `delete_todo`
    pub const TODO_DELETED: &str = "Todo deleted";
    /// After `add_category`
    pub const CATEGORY_ADDED: &str = "Category added";
    /// After `update_category`
    pub const CATEGORY_UPDATED: &str = "Category updated";
    /// After `delete_category`
    pub const CATEGORY_DELETED: &str = "Category deleted";
}

/// Errors returned by board commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    /// The persisted snapshot has not been loaded yet
    #[error("Board is not loaded yet")]
    NotReady,

    /// A todo title was empty after trimming
    #[error("Todo title cannot be empty")]
    EmptyTitle,

    /// A category name was empty after trimming
    #[error("Category name cannot be empty")]
    EmptyCategoryName,

    /// Manual reordering requested while another sort mode is active
    #[error("Todos can only be reordered in manual sort mode")]
    ManualSortRequired,

    /// The underlying store refused the action
    #[error(transparent)]
    Store(#[from] StoreError),
}

type TodoStore = Store<TodoState, TodoAction, TodoEnvironment, TodoReducer>;
type FilterStore = Store<FilterParams, FilterAction, (), FilterReducer>;
type ToastStore = Store<ToastState, ToastAction, ToastEnvironment, ToastReducer>;

/// Todos, categories, filters and notifications behind one handle
///
/// Clones share the same stores. Todo commands from all clones are applied
/// one at a time.
#[derive(Clone)]
pub struct Board {
    todos: TodoStore,
    filters: FilterStore,
    toasts: ToastStore,
    commands: Arc<Mutex<()>>,
}

impl Board {
    /// Build an unloaded board from its environments
    #[must_use]
    pub fn new(todo_env: TodoEnvironment, toast_env: ToastEnvironment) -> Self {
        Self {
            todos: Store::new(TodoState::new(), TodoReducer::new(), todo_env),
            filters: Store::new(FilterParams::default(), FilterReducer, ()),
            toasts: Store::new(ToastState::default(), ToastReducer, toast_env),
            commands: Arc::new(Mutex::new(())),
        }
    }

    /// Build an unloaded, file-backed board from configuration
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let storage = Arc::new(FileKeyValueStore::new(config.data_dir.clone()));
        let repository = SnapshotRepository::with_key(storage, config.storage_key.clone());
        let ids: Arc<dyn IdGenerator> = Arc::new(RandomIdGenerator);

        Self::new(
            TodoEnvironment::new(Arc::new(SystemClock), Arc::clone(&ids), Arc::new(repository)),
            ToastEnvironment::new(ids, config.toast_duration()),
        )
    }

    // ========== Lifecycle ==========

    /// Load the persisted snapshot and wait until the board is ready
    ///
    /// Calling `load` on a ready board does nothing.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Store`] if the board is shutting down.
    #[tracing::instrument(skip(self))]
    pub async fn load(&self) -> Result<(), BoardError> {
        if self.is_ready().await {
            return Ok(());
        }
        let mut handle = self.todos.send(TodoAction::Load).await?;
        handle.wait().await;
        tracing::info!(ready = self.is_ready().await, "Board loaded");
        Ok(())
    }

    /// Whether the persisted snapshot has been loaded
    pub async fn is_ready(&self) -> bool {
        self.todos.state(|s| s.hydrated).await
    }

    /// Stop accepting commands and wait for pending saves
    ///
    /// Pending toast timers are cancelled.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Store`] with [`StoreError::ShutdownTimeout`] if
    /// effects are still running when `timeout` elapses.
    pub async fn shutdown(&self, timeout: Duration) -> Result<(), BoardError> {
        self.toasts.shutdown(timeout).await?;
        self.filters.shutdown(timeout).await?;
        self.todos.shutdown(timeout).await?;
        Ok(())
    }

    // ========== Todo commands ==========

    /// Add a todo; title and description are trimmed
    ///
    /// # Errors
    ///
    /// [`BoardError::NotReady`] before `load`, [`BoardError::EmptyTitle`]
    /// if the trimmed title is empty.
    pub async fn add_todo(&self, mut new: NewTodo) -> Result<(), BoardError> {
        self.ensure_ready().await?;
        new.title = non_empty(&new.title).ok_or(BoardError::EmptyTitle)?;
        new.description = new.description.trim().to_string();

        self.apply(TodoAction::AddTodo(new), messages::TODO_ADDED).await
    }

    /// Apply `patch` to a todo
    ///
    /// A patch that sets the title must carry a non-empty (trimmed) title.
    /// Unknown ids are ignored.
    ///
    /// # Errors
    ///
    /// [`BoardError::NotReady`] before `load`, [`BoardError::EmptyTitle`]
    /// for a blank title.
    pub async fn update_todo(&self, id: TodoId, mut patch: TodoPatch) -> Result<(), BoardError> {
        self.ensure_ready().await?;
        if let Some(title) = patch.title.as_deref() {
            patch.title = Some(non_empty(title).ok_or(BoardError::EmptyTitle)?);
        }
        patch.description = patch.description.map(|d| d.trim().to_string());

        self.apply(TodoAction::UpdateTodo { id, patch }, messages::TODO_UPDATED)
            .await
    }

    /// Delete a todo. Unknown ids are ignored.
    ///
    /// # Errors
    ///
    /// [`BoardError::NotReady`] before `load`.
    pub async fn delete_todo(&self, id: TodoId) -> Result<(), BoardError> {
        self.ensure_ready().await?;
        self.apply(TodoAction::DeleteTodo { id }, messages::TODO_DELETED)
            .await
    }

    /// Flip a todo between complete and incomplete
    ///
    /// # Errors
    ///
    /// [`BoardError::NotReady`] before `load`.
    pub async fn toggle_todo_status(&self, id: TodoId) -> Result<(), BoardError> {
        self.ensure_ready().await?;
        self.dispatch(TodoAction::ToggleTodoStatus { id }).await?;
        Ok(())
    }

    /// Move `active_id` to the slot of `over_id` in the manual order
    ///
    /// Dropping an item onto itself does nothing.
    ///
    /// # Errors
    ///
    /// [`BoardError::NotReady`] before `load`,
    /// [`BoardError::ManualSortRequired`] unless the sort mode is manual.
    pub async fn reorder_todos(&self, active_id: TodoId, over_id: TodoId) -> Result<(), BoardError> {
        self.ensure_ready().await?;
        let sort = self.filters.state(|f| f.sort).await;
        if !sort.allows_manual_reorder() {
            return Err(BoardError::ManualSortRequired);
        }
        if active_id == over_id {
            return Ok(());
        }
        self.dispatch(TodoAction::ReorderTodos { active_id, over_id })
            .await?;
        Ok(())
    }

    // ========== Category commands ==========

    /// Add a category; the name is trimmed
    ///
    /// # Errors
    ///
    /// [`BoardError::NotReady`] before `load`,
    /// [`BoardError::EmptyCategoryName`] if the trimmed name is empty.
    pub async fn add_category(&self, name: &str, color: CategoryColor) -> Result<(), BoardError> {
        self.ensure_ready().await?;
        let name = non_empty(name).ok_or(BoardError::EmptyCategoryName)?;

        self.apply(TodoAction::AddCategory { name, color }, messages::CATEGORY_ADDED)
            .await
    }

    /// Apply `patch` to a category. Unknown ids are ignored.
    ///
    /// # Errors
    ///
    /// [`BoardError::NotReady`] before `load`,
    /// [`BoardError::EmptyCategoryName`] for a blank name.
    pub async fn update_category(
        &self,
        id: CategoryId,
        mut patch: CategoryPatch,
    ) -> Result<(), BoardError> {
        self.ensure_ready().await?;
        if let Some(name) = patch.name.as_deref() {
            patch.name = Some(non_empty(name).ok_or(BoardError::EmptyCategoryName)?);
        }

        self.apply(
            TodoAction::UpdateCategory { id, patch },
            messages::CATEGORY_UPDATED,
        )
        .await
    }

    /// Delete a category; its todos become uncategorized
    ///
    /// Todos still pointing at an id that is no longer a category are
    /// uncategorized too. If the category filter pointed at it, the filter
    /// falls back to all.
    ///
    /// # Errors
    ///
    /// [`BoardError::NotReady`] before `load`.
    pub async fn delete_category(&self, id: CategoryId) -> Result<(), BoardError> {
        self.ensure_ready().await?;
        if self.filters.state(|f| f.category).await == CategoryFilter::Only(id) {
            self.filters
                .send(FilterAction::SetCategory(CategoryFilter::All))
                .await?;
        }
        self.apply(TodoAction::DeleteCategory { id }, messages::CATEGORY_DELETED)
            .await
    }

    // ========== Filter commands ==========

    /// Replace the search text
    ///
    /// # Errors
    ///
    /// [`BoardError::Store`] after shutdown.
    pub async fn set_search(&self, search: impl Into<String>) -> Result<(), BoardError> {
        self.filter(FilterAction::SetSearch(search.into())).await
    }

    /// Replace the status filter
    ///
    /// # Errors
    ///
    /// [`BoardError::Store`] after shutdown.
    pub async fn set_status_filter(&self, status: StatusFilter) -> Result<(), BoardError> {
        self.filter(FilterAction::SetStatus(status)).await
    }

    /// Replace the category filter
    ///
    /// # Errors
    ///
    /// [`BoardError::Store`] after shutdown.
    pub async fn set_category_filter(&self, category: CategoryFilter) -> Result<(), BoardError> {
        self.filter(FilterAction::SetCategory(category)).await
    }

    /// Replace the priority filter
    ///
    /// # Errors
    ///
    /// [`BoardError::Store`] after shutdown.
    pub async fn set_priority_filter(&self, priority: PriorityFilter) -> Result<(), BoardError> {
        self.filter(FilterAction::SetPriority(priority)).await
    }

    /// Replace the sort mode
    ///
    /// # Errors
    ///
    /// [`BoardError::Store`] after shutdown.
    pub async fn set_sort(&self, sort: SortMode) -> Result<(), BoardError> {
        self.filter(FilterAction::SetSort(sort)).await
    }

    /// Restore the default filters
    ///
    /// # Errors
    ///
    /// [`BoardError::Store`] after shutdown.
    pub async fn reset_filters(&self) -> Result<(), BoardError> {
        self.filter(FilterAction::Reset).await
    }

    // ========== Toasts ==========

    /// Remove a toast before it expires
    ///
    /// # Errors
    ///
    /// [`BoardError::Store`] after shutdown.
    pub async fn dismiss_toast(&self, id: ToastId) -> Result<(), BoardError> {
        self.toasts.send(ToastAction::Dismiss { id }).await?;
        Ok(())
    }

    // ========== Queries ==========

    /// Todos matching the current filters, in display order
    pub async fn visible_todos(&self) -> Vec<Todo> {
        let params = self.filters().await;
        self.todos.state(|s| filter::view(&s.todos, &params)).await
    }

    /// All todos in stored order
    pub async fn todos(&self) -> Vec<Todo> {
        self.todos.state(|s| s.todos.clone()).await
    }

    /// A single todo
    pub async fn todo(&self, id: TodoId) -> Option<Todo> {
        self.todos.state(|s| s.todo(id).cloned()).await
    }

    /// All categories in stored order
    pub async fn categories(&self) -> Vec<Category> {
        self.todos.state(|s| s.categories.clone()).await
    }

    /// Totals over all todos, ignoring filters
    pub async fn counts(&self) -> TodoCounts {
        self.todos.state(TodoState::counts).await
    }

    /// Current filter criteria
    pub async fn filters(&self) -> FilterParams {
        self.filters.state(Clone::clone).await
    }

    /// Visible toasts, oldest first
    pub async fn toasts(&self) -> Vec<Toast> {
        self.toasts.state(|s| s.toasts.clone()).await
    }

    // ========== Internals ==========

    async fn ensure_ready(&self) -> Result<(), BoardError> {
        if self.is_ready().await {
            Ok(())
        } else {
            Err(BoardError::NotReady)
        }
    }

    /// Send a todo command; returns whether it changed anything
    ///
    /// The revision is read under the command lock, so a command from
    /// another clone cannot land between the two reads.
    async fn dispatch(&self, action: TodoAction) -> Result<bool, BoardError> {
        let _serial = self.commands.lock().await;
        let before = self.todos.state(|s| s.revision).await;
        self.todos.send(action).await?;
        Ok(self.todos.state(|s| s.revision).await != before)
    }

    /// Send a todo command and show `message` if it changed anything
    async fn apply(&self, action: TodoAction, message: &str) -> Result<(), BoardError> {
        if self.dispatch(action).await? {
            self.notify(message).await
        } else {
            tracing::debug!(toast = message, "Command matched nothing");
            Ok(())
        }
    }

    async fn filter(&self, action: FilterAction) -> Result<(), BoardError> {
        self.filters.send(action).await?;
        Ok(())
    }

    async fn notify(&self, message: &str) -> Result<(), BoardError> {
        self.toasts
            .send(ToastAction::Show {
                message: message.to_string(),
            })
            .await?;
        Ok(())
    }
}

fn non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
