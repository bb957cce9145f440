//! Taskdeck: a local, single-user task manager.
//!
//! Todos carry a status, a priority, an optional category and due date, and a
//! position in a user-controlled manual order. The whole board is persisted
//! as one versioned JSON snapshot.
//!
//! - [`reducer`]: the todo store (hydration gate, mutations, save effects)
//! - [`persistence`]: snapshot encoding, migration and file storage
//! - [`filter`]: the derived, sorted view of todos
//! - [`filter_state`]: the selected filter and sort criteria
//! - [`toast`]: self-expiring notifications
//! - [`board`]: the facade tying the stores together
//!
//! # Quick Start
//!
//! ```no_run
//! use taskdeck::{Board, Config, NewTodo, Priority};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::from_env();
//! let board = Board::from_config(&config);
//! board.load().await?;
//!
//! board
//!     .add_todo(NewTodo::titled("Buy milk").priority(Priority::High))
//!     .await?;
//!
//! for todo in board.visible_todos().await {
//!     println!("{} [{}]", todo.title, todo.priority.label());
//! }
//!
//! board.shutdown(config.shutdown_timeout()).await?;
//! # Ok(())
//! # }
//! ```

pub mod board;
pub mod config;
pub mod filter;
pub mod filter_state;
pub mod persistence;
pub mod reducer;
pub mod toast;
pub mod types;

// Re-export commonly used types
pub use board::{Board, BoardError};
pub use config::Config;
pub use filter::{view, CategoryFilter, FilterParams, PriorityFilter, SortMode, StatusFilter};
pub use persistence::{FileKeyValueStore, SnapshotRepository};
pub use reducer::{TodoAction, TodoEnvironment, TodoReducer, TodoState};
pub use toast::{Toast, ToastEnvironment, ToastId};
pub use types::{
    AppState, Category, CategoryColor, CategoryId, CategoryPatch, NewTodo, Priority, Todo,
    TodoCounts, TodoId, TodoPatch, TodoStatus,
};
