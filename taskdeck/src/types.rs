//! Domain types for taskdeck.
//!
//! Todos and categories are plain serializable records. Their JSON form uses
//! camelCase keys so a persisted snapshot reads as
//! `{"id": .., "title": .., "categoryId": .., "dueDate": "2025-03-01", ..}`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a todo item
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(Uuid);

impl TodoId {
    /// Creates a `TodoId` from a UUID
    #[must_use]
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Returns the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a category
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(Uuid);

impl CategoryId {
    /// Creates a `CategoryId` from a UUID
    #[must_use]
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Returns the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Completion status of a todo
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TodoStatus {
    /// Still to do
    #[default]
    Incomplete,
    /// Done
    Complete,
}

impl TodoStatus {
    /// The opposite status
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Incomplete => Self::Complete,
            Self::Complete => Self::Incomplete,
        }
    }
}

/// Priority of a todo
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Most urgent
    High,
    /// Default priority
    #[default]
    Medium,
    /// Least urgent
    Low,
}

impl Priority {
    /// Sort rank: high sorts first
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::High => 0,
            Self::Medium => 1,
            Self::Low => 2,
        }
    }

    /// Human-readable label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

/// Fixed palette a category color is chosen from
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryColor {
    /// `blue`
    #[default]
    Blue,
    /// `red`
    Red,
    /// `green`
    Green,
    /// `yellow`
    Yellow,
    /// `purple`
    Purple,
    /// `pink`
    Pink,
    /// `indigo`
    Indigo,
    /// `orange`
    Orange,
}

impl CategoryColor {
    /// Every palette entry, in display order
    pub const ALL: [Self; 8] = [
        Self::Blue,
        Self::Red,
        Self::Green,
        Self::Yellow,
        Self::Purple,
        Self::Pink,
        Self::Indigo,
        Self::Orange,
    ];

    /// Palette token as stored
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Blue => "blue",
            Self::Red => "red",
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Purple => "purple",
            Self::Pink => "pink",
            Self::Indigo => "indigo",
            Self::Orange => "orange",
        }
    }
}

impl fmt::Display for CategoryColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single todo item
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    /// Unique identifier
    pub id: TodoId,
    /// Non-empty title
    pub title: String,
    /// Free-form description, may be empty
    pub description: String,
    /// Completion status
    pub status: TodoStatus,
    /// Priority
    pub priority: Priority,
    /// Owning category, `None` when uncategorized
    pub category_id: Option<CategoryId>,
    /// Calendar due date
    pub due_date: Option<NaiveDate>,
    /// Position in the manual order
    pub sort_order: usize,
    /// When the todo was created
    pub created_at: DateTime<Utc>,
    /// When the todo was last changed
    pub updated_at: DateTime<Utc>,
}

impl Todo {
    /// Whether the todo is complete
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.status == TodoStatus::Complete
    }

    /// Whether the todo is past its due date on `today` and still open
    #[must_use]
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.is_complete() && self.due_date.is_some_and(|due| due < today)
    }
}

/// A named, colored tag todos can reference
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// Unique identifier
    pub id: CategoryId,
    /// Non-empty name
    pub name: String,
    /// Palette color
    pub color: CategoryColor,
    /// When the category was created
    pub created_at: DateTime<Utc>,
}

/// Todos and categories: the unit of persistence
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppState {
    /// Todos in stored order
    pub todos: Vec<Todo>,
    /// Categories in stored order
    pub categories: Vec<Category>,
}

impl AppState {
    /// Whether the snapshot holds nothing
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.todos.is_empty() && self.categories.is_empty()
    }
}

/// Fields supplied when adding a todo
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NewTodo {
    /// Title (already validated non-empty by the caller)
    pub title: String,
    /// Description
    pub description: String,
    /// Priority
    pub priority: Priority,
    /// Owning category
    pub category_id: Option<CategoryId>,
    /// Due date
    pub due_date: Option<NaiveDate>,
}

impl NewTodo {
    /// A medium-priority, uncategorized todo with no description
    #[must_use]
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Set the description
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the priority
    #[must_use]
    pub const fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Set the category
    #[must_use]
    pub const fn category(mut self, category_id: CategoryId) -> Self {
        self.category_id = Some(category_id);
        self
    }

    /// Set the due date
    #[must_use]
    pub const fn due(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }
}

/// Partial update of a todo
///
/// `None` leaves a field untouched. Nullable fields use a nested option:
/// `Some(None)` clears the value. Identity, creation time and manual
/// position are not patchable.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TodoPatch {
    /// New title
    pub title: Option<String>,
    /// New description
    pub description: Option<String>,
    /// New status
    pub status: Option<TodoStatus>,
    /// New priority
    pub priority: Option<Priority>,
    /// New category (`Some(None)` to uncategorize)
    pub category_id: Option<Option<CategoryId>>,
    /// New due date (`Some(None)` to clear)
    pub due_date: Option<Option<NaiveDate>>,
}

impl TodoPatch {
    /// Set the title
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the description
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the status
    #[must_use]
    pub const fn status(mut self, status: TodoStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Set the priority
    #[must_use]
    pub const fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Set or clear the category
    #[must_use]
    pub const fn category(mut self, category_id: Option<CategoryId>) -> Self {
        self.category_id = Some(category_id);
        self
    }

    /// Set or clear the due date
    #[must_use]
    pub const fn due(mut self, due_date: Option<NaiveDate>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Merge the patch into `todo` (timestamps are the caller's concern)
    pub fn apply_to(self, todo: &mut Todo) {
        if let Some(title) = self.title {
            todo.title = title;
        }
        if let Some(description) = self.description {
            todo.description = description;
        }
        if let Some(status) = self.status {
            todo.status = status;
        }
        if let Some(priority) = self.priority {
            todo.priority = priority;
        }
        if let Some(category_id) = self.category_id {
            todo.category_id = category_id;
        }
        if let Some(due_date) = self.due_date {
            todo.due_date = due_date;
        }
    }
}

/// Partial update of a category
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CategoryPatch {
    /// New name
    pub name: Option<String>,
    /// New color
    pub color: Option<CategoryColor>,
}

impl CategoryPatch {
    /// Set the name
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the color
    #[must_use]
    pub const fn color(mut self, color: CategoryColor) -> Self {
        self.color = Some(color);
        self
    }

    /// Merge the patch into `category`
    pub fn apply_to(self, category: &mut Category) {
        if let Some(name) = self.name {
            category.name = name;
        }
        if let Some(color) = self.color {
            category.color = color;
        }
    }
}

/// Todo totals shown next to the status filter
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TodoCounts {
    /// Every todo
    pub all: usize,
    /// Open todos
    pub incomplete: usize,
    /// Finished todos
    pub complete: usize,
}

impl TodoCounts {
    /// Count `todos` by status
    #[must_use]
    pub fn of(todos: &[Todo]) -> Self {
        let complete = todos.iter().filter(|t| t.is_complete()).count();
        Self {
            all: todos.len(),
            incomplete: todos.len() - complete,
            complete,
        }
    }
}
