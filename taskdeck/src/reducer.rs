//! Reducer logic for the todo store.
//!
//! The store owns the authoritative todo and category sequences. It starts
//! unready; `Load` fetches the persisted snapshot and feeds back `Hydrate`,
//! which flips the `hydrated` gate exactly once. Content commands received
//! before that are ignored so an empty default never overwrites stored data.
//!
//! Once hydrated, every command that changes state returns one save effect
//! carrying the full snapshot. Commands that reference an unknown id are
//! silent no-ops and schedule nothing.

use crate::persistence::SnapshotRepository;
use crate::types::{
    AppState, Category, CategoryColor, CategoryId, CategoryPatch, NewTodo, Todo, TodoCounts,
    TodoId, TodoPatch, TodoStatus,
};
use std::sync::Arc;
use taskdeck_core::{
    effect::Effect,
    environment::{Clock, IdGenerator},
    reducer::Reducer,
    smallvec, SmallVec,
};

/// Commands and feedback handled by [`TodoReducer`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TodoAction {
    /// Read the persisted snapshot; feeds back [`TodoAction::Hydrate`]
    Load,

    /// Replace all content with `snapshot` and mark the store ready
    Hydrate {
        /// Loaded todos and categories
        snapshot: AppState,
    },

    /// Append a new todo at the end of the manual order
    AddTodo(NewTodo),

    /// Merge `patch` into a todo
    UpdateTodo {
        /// Todo to update
        id: TodoId,
        /// Fields to change
        patch: TodoPatch,
    },

    /// Remove a todo (remaining sort orders keep their gaps)
    DeleteTodo {
        /// Todo to delete
        id: TodoId,
    },

    /// Flip a todo between complete and incomplete
    ToggleTodoStatus {
        /// Todo to toggle
        id: TodoId,
    },

    /// Move `active_id` to the position currently held by `over_id`
    ReorderTodos {
        /// Todo being dragged
        active_id: TodoId,
        /// Todo it was dropped on
        over_id: TodoId,
    },

    /// Append a new category
    AddCategory {
        /// Name (already validated non-empty by the caller)
        name: String,
        /// Palette color
        color: CategoryColor,
    },

    /// Merge `patch` into a category
    UpdateCategory {
        /// Category to update
        id: CategoryId,
        /// Fields to change
        patch: CategoryPatch,
    },

    /// Remove a category and uncategorize every todo that referenced it
    DeleteCategory {
        /// Category to delete
        id: CategoryId,
    },
}

/// State of the todo store
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TodoState {
    /// Todos in stored order
    pub todos: Vec<Todo>,
    /// Categories in stored order
    pub categories: Vec<Category>,
    /// Whether the persisted snapshot has been loaded
    pub hydrated: bool,
    /// Bumped on every change; orders snapshot writes
    pub revision: u64,
}

impl TodoState {
    /// Creates an empty, unhydrated state
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a todo by ID
    #[must_use]
    pub fn todo(&self, id: TodoId) -> Option<&Todo> {
        self.todos.iter().find(|t| t.id == id)
    }

    /// Returns a category by ID
    #[must_use]
    pub fn category(&self, id: CategoryId) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    /// Copy of the persistable content
    #[must_use]
    pub fn snapshot(&self) -> AppState {
        AppState {
            todos: self.todos.clone(),
            categories: self.categories.clone(),
        }
    }

    /// Totals by status over all todos
    #[must_use]
    pub fn counts(&self) -> TodoCounts {
        TodoCounts::of(&self.todos)
    }

    fn todo_mut(&mut self, id: TodoId) -> Option<&mut Todo> {
        self.todos.iter_mut().find(|t| t.id == id)
    }

    fn category_mut(&mut self, id: CategoryId) -> Option<&mut Category> {
        self.categories.iter_mut().find(|c| c.id == id)
    }
}

/// Environment dependencies for the todo reducer
#[derive(Clone)]
pub struct TodoEnvironment {
    /// Clock for timestamps
    pub clock: Arc<dyn Clock>,
    /// Source of todo and category ids
    pub ids: Arc<dyn IdGenerator>,
    /// Where snapshots are loaded from and saved to
    pub repository: Arc<SnapshotRepository>,
}

impl TodoEnvironment {
    /// Creates a new `TodoEnvironment`
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
        repository: Arc<SnapshotRepository>,
    ) -> Self {
        Self {
            clock,
            ids,
            repository,
        }
    }
}

/// Reducer for the todo store
#[derive(Clone, Debug, Default)]
pub struct TodoReducer;

impl TodoReducer {
    /// Creates a new `TodoReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn load_effect(env: &TodoEnvironment) -> Effect<TodoAction> {
        let repository = Arc::clone(&env.repository);
        Effect::Future(Box::pin(async move {
            Some(TodoAction::Hydrate {
                snapshot: repository.load().await,
            })
        }))
    }

    fn save_effect(state: &TodoState, env: &TodoEnvironment) -> Effect<TodoAction> {
        let repository = Arc::clone(&env.repository);
        let revision = state.revision;
        let snapshot = state.snapshot();
        Effect::Future(Box::pin(async move {
            repository.save(revision, &snapshot).await;
            None
        }))
    }

    /// Applies a content command; returns whether anything changed
    fn apply(state: &mut TodoState, action: TodoAction, env: &TodoEnvironment) -> bool {
        match action {
            TodoAction::AddTodo(new) => {
                let now = env.clock.now();
                let todo = Todo {
                    id: TodoId::from_uuid(env.ids.next_id()),
                    title: new.title,
                    description: new.description,
                    status: TodoStatus::Incomplete,
                    priority: new.priority,
                    category_id: new.category_id,
                    due_date: new.due_date,
                    sort_order: state.todos.len(),
                    created_at: now,
                    updated_at: now,
                };
                tracing::debug!(id = %todo.id, sort_order = todo.sort_order, "Todo added");
                state.todos.push(todo);
                true
            },

            TodoAction::UpdateTodo { id, patch } => {
                let now = env.clock.now();
                let Some(todo) = state.todo_mut(id) else {
                    tracing::debug!(%id, "UpdateTodo: no such todo");
                    return false;
                };
                patch.apply_to(todo);
                todo.updated_at = now;
                true
            },

            TodoAction::DeleteTodo { id } => {
                let before = state.todos.len();
                state.todos.retain(|t| t.id != id);
                let removed = state.todos.len() != before;
                if !removed {
                    tracing::debug!(%id, "DeleteTodo: no such todo");
                }
                removed
            },

            TodoAction::ToggleTodoStatus { id } => {
                let now = env.clock.now();
                let Some(todo) = state.todo_mut(id) else {
                    tracing::debug!(%id, "ToggleTodoStatus: no such todo");
                    return false;
                };
                todo.status = todo.status.toggled();
                todo.updated_at = now;
                true
            },

            TodoAction::ReorderTodos { active_id, over_id } => {
                let from = state.todos.iter().position(|t| t.id == active_id);
                let to = state.todos.iter().position(|t| t.id == over_id);
                let (Some(from), Some(to)) = (from, to) else {
                    tracing::debug!(%active_id, %over_id, "ReorderTodos: stale id");
                    return false;
                };

                let moved = state.todos.remove(from);
                state.todos.insert(to, moved);
                for (index, todo) in state.todos.iter_mut().enumerate() {
                    todo.sort_order = index;
                }
                true
            },

            TodoAction::AddCategory { name, color } => {
                let category = Category {
                    id: CategoryId::from_uuid(env.ids.next_id()),
                    name,
                    color,
                    created_at: env.clock.now(),
                };
                tracing::debug!(id = %category.id, "Category added");
                state.categories.push(category);
                true
            },

            TodoAction::UpdateCategory { id, patch } => {
                let Some(category) = state.category_mut(id) else {
                    tracing::debug!(%id, "UpdateCategory: no such category");
                    return false;
                };
                patch.apply_to(category);
                true
            },

            TodoAction::DeleteCategory { id } => {
                let before = state.categories.len();
                state.categories.retain(|c| c.id != id);
                let removed = state.categories.len() != before;

                // Todos may reference a category that is already gone
                let mut orphaned = 0_usize;
                for todo in state
                    .todos
                    .iter_mut()
                    .filter(|t| t.category_id == Some(id))
                {
                    todo.category_id = None;
                    orphaned += 1;
                }

                if !removed && orphaned == 0 {
                    tracing::debug!(%id, "DeleteCategory: no such category");
                    return false;
                }
                tracing::debug!(%id, removed, orphaned, "Category deleted");
                true
            },

            TodoAction::Load | TodoAction::Hydrate { .. } => false,
        }
    }
}

impl Reducer for TodoReducer {
    type State = TodoState;
    type Action = TodoAction;
    type Environment = TodoEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            TodoAction::Load => {
                if state.hydrated {
                    tracing::warn!("Load ignored: store already hydrated");
                    return SmallVec::new();
                }
                smallvec![Self::load_effect(env)]
            },

            TodoAction::Hydrate { snapshot } => {
                if state.hydrated {
                    tracing::warn!("Hydrate ignored: store already hydrated");
                    return SmallVec::new();
                }
                tracing::info!(
                    todos = snapshot.todos.len(),
                    categories = snapshot.categories.len(),
                    "Store hydrated"
                );
                state.todos = snapshot.todos;
                state.categories = snapshot.categories;
                state.hydrated = true;
                state.revision += 1;
                smallvec![Self::save_effect(state, env)]
            },

            action if !state.hydrated => {
                tracing::debug!(?action, "Ignoring command before hydration");
                SmallVec::new()
            },

            action => {
                if Self::apply(state, action, env) {
                    state.revision += 1;
                    smallvec![Self::save_effect(state, env)]
                } else {
                    SmallVec::new()
                }
            },
        }
    }
}
