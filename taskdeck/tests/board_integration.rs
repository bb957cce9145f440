//! Integration tests for the board: stores, persistence and toasts together.

#![allow(clippy::unwrap_used)] // Test code

use std::sync::Arc;
use std::time::Duration;
use taskdeck::board::messages;
use taskdeck::persistence::{self, DEFAULT_STORAGE_KEY};
use taskdeck::toast::DEFAULT_TOAST_DURATION;
use taskdeck::{
    AppState, Board, BoardError, CategoryColor, CategoryFilter, CategoryPatch, NewTodo, Priority,
    SnapshotRepository, SortMode, StatusFilter, TodoEnvironment, TodoPatch, TodoStatus,
    ToastEnvironment,
};
use taskdeck_runtime::StoreError;
use taskdeck_testing::{test_clock, InMemoryKeyValueStore, SequentialIdGenerator};

const SHUTDOWN: Duration = Duration::from_secs(5);

fn board_on(storage: &InMemoryKeyValueStore) -> Board {
    let repository = SnapshotRepository::new(Arc::new(storage.clone()));
    Board::new(
        TodoEnvironment::new(
            Arc::new(test_clock()),
            Arc::new(SequentialIdGenerator::new()),
            Arc::new(repository),
        ),
        ToastEnvironment::new(Arc::new(SequentialIdGenerator::new()), DEFAULT_TOAST_DURATION),
    )
}

async fn loaded_board() -> (Board, InMemoryKeyValueStore) {
    let storage = InMemoryKeyValueStore::new();
    let board = board_on(&storage);
    board.load().await.unwrap();
    (board, storage)
}

async fn titles(board: &Board) -> Vec<String> {
    board
        .visible_todos()
        .await
        .into_iter()
        .map(|t| t.title)
        .collect()
}

async fn add(board: &Board, titles: &[&str]) {
    for title in titles {
        board.add_todo(NewTodo::titled(*title)).await.unwrap();
    }
}

#[tokio::test]
async fn test_commands_before_load_are_rejected() {
    let board = board_on(&InMemoryKeyValueStore::new());

    assert!(!board.is_ready().await);
    assert_eq!(
        board.add_todo(NewTodo::titled("early")).await,
        Err(BoardError::NotReady)
    );
    assert_eq!(
        board.add_category("early", CategoryColor::Red).await,
        Err(BoardError::NotReady)
    );
    assert!(board.todos().await.is_empty());
}

#[tokio::test]
async fn test_load_hydrates_from_stored_snapshot() {
    let (seed, storage) = loaded_board().await;
    add(&seed, &["A", "B"]).await;
    seed.shutdown(SHUTDOWN).await.unwrap();

    let board = board_on(&storage);
    board.load().await.unwrap();

    assert!(board.is_ready().await);
    assert_eq!(titles(&board).await, ["A", "B"]);
}

#[tokio::test]
async fn test_load_twice_is_harmless() {
    let (board, _storage) = loaded_board().await;
    add(&board, &["A"]).await;

    board.load().await.unwrap();

    assert_eq!(titles(&board).await, ["A"]);
}

#[tokio::test]
async fn test_malformed_snapshot_starts_empty_and_is_rewritten() {
    let storage = InMemoryKeyValueStore::with_entry(DEFAULT_STORAGE_KEY, "corrupt{");
    let board = board_on(&storage);

    board.load().await.unwrap();
    board.shutdown(SHUTDOWN).await.unwrap();

    assert!(board.is_ready().await);
    assert!(board.todos().await.is_empty());
    let rewritten = persistence::decode(&storage.raw(DEFAULT_STORAGE_KEY).unwrap()).unwrap();
    assert_eq!(rewritten, AppState::default());
}

#[tokio::test]
async fn test_add_todo_trims_and_validates() {
    let (board, _storage) = loaded_board().await;

    assert_eq!(
        board.add_todo(NewTodo::titled("   ")).await,
        Err(BoardError::EmptyTitle)
    );

    board
        .add_todo(NewTodo::titled("  Buy milk ").description(" 2 litres  "))
        .await
        .unwrap();

    let todos = board.todos().await;
    assert_eq!(todos.len(), 1);
    assert_eq!(todos[0].title, "Buy milk");
    assert_eq!(todos[0].description, "2 litres");
    assert_eq!(todos[0].priority, Priority::Medium);
    assert_eq!(todos[0].status, TodoStatus::Incomplete);

    let toasts = board.toasts().await;
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].message, messages::TODO_ADDED);
}

#[tokio::test]
async fn test_every_change_is_persisted() {
    let (board, storage) = loaded_board().await;
    add(&board, &["A", "B", "C"]).await;
    let todos = board.todos().await;

    board.toggle_todo_status(todos[1].id).await.unwrap();
    board.reorder_todos(todos[2].id, todos[0].id).await.unwrap();
    board
        .update_todo(todos[0].id, TodoPatch::default().priority(Priority::High))
        .await
        .unwrap();
    board.shutdown(SHUTDOWN).await.unwrap();

    let restored = board_on(&storage);
    restored.load().await.unwrap();

    assert_eq!(restored.todos().await, board.todos().await);
    assert_eq!(titles(&restored).await, ["C", "A", "B"]);
    let counts = restored.counts().await;
    assert_eq!((counts.all, counts.complete), (3, 1));
}

#[tokio::test]
async fn test_reorder_requires_manual_sort() {
    let (board, _storage) = loaded_board().await;
    add(&board, &["A", "B"]).await;
    let todos = board.todos().await;

    board.set_sort(SortMode::CreatedAt).await.unwrap();
    assert_eq!(
        board.reorder_todos(todos[1].id, todos[0].id).await,
        Err(BoardError::ManualSortRequired)
    );

    board.set_sort(SortMode::Manual).await.unwrap();
    board.reorder_todos(todos[1].id, todos[0].id).await.unwrap();
    assert_eq!(titles(&board).await, ["B", "A"]);
}

#[tokio::test]
async fn test_reorder_onto_itself_keeps_order() {
    let (board, _storage) = loaded_board().await;
    add(&board, &["A", "B"]).await;
    let todos = board.todos().await;

    board.reorder_todos(todos[0].id, todos[0].id).await.unwrap();

    assert_eq!(board.todos().await, todos);
}

#[tokio::test]
async fn test_unknown_ids_are_silent() {
    let (board, _storage) = loaded_board().await;
    add(&board, &["A"]).await;
    let ghost = taskdeck::TodoId::from_uuid(SequentialIdGenerator::nth(999));
    let before = board.todos().await;

    board
        .update_todo(ghost, TodoPatch::default().title("ghost"))
        .await
        .unwrap();
    board.delete_todo(ghost).await.unwrap();
    board.toggle_todo_status(ghost).await.unwrap();

    assert_eq!(board.todos().await, before);
    assert_eq!(board.toasts().await.len(), 1);
}

#[tokio::test]
async fn test_delete_category_uncategorizes_todos_and_resets_filter() {
    let (board, _storage) = loaded_board().await;
    board.add_category(" Work ", CategoryColor::Blue).await.unwrap();
    let work = board.categories().await[0].id;
    assert_eq!(board.categories().await[0].name, "Work");

    board
        .add_todo(NewTodo::titled("report").category(work))
        .await
        .unwrap();
    board.add_todo(NewTodo::titled("laundry")).await.unwrap();
    board
        .set_category_filter(CategoryFilter::Only(work))
        .await
        .unwrap();
    assert_eq!(titles(&board).await, ["report"]);

    board.delete_category(work).await.unwrap();

    assert!(board.categories().await.is_empty());
    assert!(board.todos().await.iter().all(|t| t.category_id.is_none()));
    assert_eq!(board.filters().await.category, CategoryFilter::All);
    assert_eq!(titles(&board).await, ["report", "laundry"]);
}

#[tokio::test]
async fn test_delete_category_clears_references_to_missing_category() {
    let (board, _storage) = loaded_board().await;
    let ghost = taskdeck::CategoryId::from_uuid(SequentialIdGenerator::nth(404));
    board
        .add_todo(NewTodo::titled("dangling").category(ghost))
        .await
        .unwrap();

    board.delete_category(ghost).await.unwrap();

    assert_eq!(board.todos().await[0].category_id, None);
    board
        .set_category_filter(CategoryFilter::Uncategorized)
        .await
        .unwrap();
    assert_eq!(titles(&board).await, ["dangling"]);
    let shown: Vec<String> = board.toasts().await.into_iter().map(|t| t.message).collect();
    assert_eq!(shown, [messages::TODO_ADDED, messages::CATEGORY_DELETED]);
}

#[tokio::test]
async fn test_racing_deletes_show_one_toast() {
    let (board, _storage) = loaded_board().await;
    add(&board, &["A"]).await;
    let id = board.todos().await[0].id;
    let other = board.clone();

    let (first, second) = tokio::join!(board.delete_todo(id), other.delete_todo(id));
    first.unwrap();
    second.unwrap();

    assert!(board.todos().await.is_empty());
    let deleted = board
        .toasts()
        .await
        .into_iter()
        .filter(|t| t.message == messages::TODO_DELETED)
        .count();
    assert_eq!(deleted, 1);
}

#[tokio::test]
async fn test_category_validation_and_update() {
    let (board, _storage) = loaded_board().await;

    assert_eq!(
        board.add_category("  ", CategoryColor::Pink).await,
        Err(BoardError::EmptyCategoryName)
    );

    board.add_category("Home", CategoryColor::Pink).await.unwrap();
    let home = board.categories().await[0].id;
    assert_eq!(
        board
            .update_category(home, CategoryPatch::default().name(""))
            .await,
        Err(BoardError::EmptyCategoryName)
    );

    board
        .update_category(home, CategoryPatch::default().color(CategoryColor::Indigo))
        .await
        .unwrap();
    assert_eq!(board.categories().await[0].color, CategoryColor::Indigo);

    let shown: Vec<String> = board.toasts().await.into_iter().map(|t| t.message).collect();
    assert_eq!(shown, [messages::CATEGORY_ADDED, messages::CATEGORY_UPDATED]);
}

#[tokio::test]
async fn test_visible_todos_follow_filters() {
    let (board, _storage) = loaded_board().await;
    board
        .add_todo(NewTodo::titled("Pay rent").priority(Priority::High))
        .await
        .unwrap();
    board
        .add_todo(NewTodo::titled("Water plants").priority(Priority::Low))
        .await
        .unwrap();
    board
        .add_todo(NewTodo::titled("Pay taxes").priority(Priority::Medium))
        .await
        .unwrap();
    let rent = board.todos().await[0].id;
    board.toggle_todo_status(rent).await.unwrap();

    board.set_search("pay").await.unwrap();
    assert_eq!(titles(&board).await, ["Pay rent", "Pay taxes"]);

    board
        .set_status_filter(StatusFilter::Only(TodoStatus::Incomplete))
        .await
        .unwrap();
    assert_eq!(titles(&board).await, ["Pay taxes"]);

    board.reset_filters().await.unwrap();
    board.set_sort(SortMode::Priority).await.unwrap();
    assert_eq!(
        titles(&board).await,
        ["Pay rent", "Pay taxes", "Water plants"]
    );

    let counts = board.counts().await;
    assert_eq!((counts.all, counts.incomplete, counts.complete), (3, 2, 1));
}

#[tokio::test(start_paused = true)]
async fn test_toasts_expire_unless_dismissed_first() {
    let (board, _storage) = loaded_board().await;
    add(&board, &["A"]).await;
    let first = board.toasts().await[0].id;

    tokio::time::sleep(Duration::from_millis(1000)).await;
    board.delete_todo(board.todos().await[0].id).await.unwrap();
    board.dismiss_toast(first).await.unwrap();

    let remaining = board.toasts().await;
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].message, messages::TODO_DELETED);

    tokio::time::sleep(DEFAULT_TOAST_DURATION + Duration::from_millis(10)).await;
    assert!(board.toasts().await.is_empty());
}

#[tokio::test]
async fn test_shutdown_rejects_further_commands() {
    let (board, storage) = loaded_board().await;
    add(&board, &["A"]).await;

    board.shutdown(SHUTDOWN).await.unwrap();

    assert_eq!(
        board.add_todo(NewTodo::titled("late")).await,
        Err(BoardError::Store(StoreError::ShutdownInProgress))
    );
    let stored = persistence::decode(&storage.raw(DEFAULT_STORAGE_KEY).unwrap()).unwrap();
    assert_eq!(stored.todos.len(), 1);
}
