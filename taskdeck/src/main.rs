//! Taskdeck demo binary
//!
//! Loads the board from the configured data directory, runs a short scripted
//! session and prints the resulting views. Run it twice to see the snapshot
//! survive between runs.

use chrono::{Days, Utc};
use taskdeck::{
    Board, CategoryColor, CategoryFilter, Config, NewTodo, Priority, SortMode, StatusFilter, Todo,
    TodoStatus,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env();

    // Initialize tracing
    let level = &config.log_level;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("taskdeck={level},taskdeck_runtime={level}").into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("=== Taskdeck ===\n");
    println!("Data directory: {}", config.data_dir.display());

    let board = Board::from_config(&config);
    board.load().await?;

    let counts = board.counts().await;
    println!(
        "Loaded {} todos ({} open, {} done), {} categories",
        counts.all,
        counts.incomplete,
        counts.complete,
        board.categories().await.len()
    );

    // Scripted session
    let today = Utc::now().date_naive();
    board.add_category("Work", CategoryColor::Blue).await?;
    board.add_category("Home", CategoryColor::Green).await?;
    let categories = board.categories().await;
    let work = categories.iter().rev().find(|c| c.name == "Work").map(|c| c.id);
    let home = categories.iter().rev().find(|c| c.name == "Home").map(|c| c.id);

    let mut report = NewTodo::titled("Write quarterly report")
        .description("Numbers from finance first")
        .priority(Priority::High);
    report.category_id = work;
    report.due_date = today.checked_add_days(Days::new(3));
    board.add_todo(report).await?;

    let mut groceries = NewTodo::titled("Buy groceries").description("Milk, eggs, bread");
    groceries.category_id = home;
    groceries.due_date = today.checked_sub_days(Days::new(1));
    board.add_todo(groceries).await?;

    board
        .add_todo(NewTodo::titled("Call the plumber").priority(Priority::Low))
        .await?;

    print_view("Manual order", &board.visible_todos().await, today);

    // Drag the last todo to the top
    let todos = board.visible_todos().await;
    if let (Some(first), Some(last)) = (todos.first(), todos.last()) {
        board.reorder_todos(last.id, first.id).await?;
    }
    print_view("After moving the last todo to the top", &board.visible_todos().await, today);

    let todos = board.visible_todos().await;
    if let Some(todo) = todos.iter().find(|t| t.title == "Buy groceries") {
        board.toggle_todo_status(todo.id).await?;
    }

    board.set_sort(SortMode::Priority).await?;
    print_view("By priority", &board.visible_todos().await, today);

    board
        .set_status_filter(StatusFilter::Only(TodoStatus::Incomplete))
        .await?;
    board.set_search("report").await?;
    print_view("Open todos matching \"report\"", &board.visible_todos().await, today);

    board.reset_filters().await?;
    board.set_category_filter(CategoryFilter::Uncategorized).await?;
    print_view("Uncategorized", &board.visible_todos().await, today);
    board.reset_filters().await?;

    println!("\nNotifications:");
    for toast in board.toasts().await {
        println!("  - {}", toast.message);
    }

    let counts = board.counts().await;
    println!(
        "\nTotals: {} todos, {} open, {} done",
        counts.all, counts.incomplete, counts.complete
    );

    board.shutdown(config.shutdown_timeout()).await?;
    println!("\n=== Saved ===");
    Ok(())
}

fn print_view(title: &str, todos: &[Todo], today: chrono::NaiveDate) {
    println!("\n{title}:");
    if todos.is_empty() {
        println!("  (nothing)");
    }
    for todo in todos {
        let check = if todo.is_complete() { "x" } else { " " };
        let due = todo
            .due_date
            .map(|d| format!(" due {d}"))
            .unwrap_or_default();
        let overdue = if todo.is_overdue(today) { " OVERDUE" } else { "" };
        println!(
            "  [{check}] #{} {} ({}){due}{overdue}",
            todo.sort_order,
            todo.title,
            todo.priority.label()
        );
    }
}
