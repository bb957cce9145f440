//! Filter engine: the derived, ordered view of todos shown to the user.
//!
//! [`view`] narrows by status, category, priority and search text, then sorts.
//! It never mutates its input and always returns a fresh `Vec`.

use crate::types::{CategoryId, Priority, Todo, TodoStatus};
use std::cmp::Ordering;

/// Which statuses to show
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StatusFilter {
    /// Every status
    #[default]
    All,
    /// Only todos with this status
    Only(TodoStatus),
}

impl StatusFilter {
    fn matches(self, todo: &Todo) -> bool {
        match self {
            Self::All => true,
            Self::Only(status) => todo.status == status,
        }
    }
}

/// Which category to show
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    /// Every todo
    #[default]
    All,
    /// Only todos without a category
    Uncategorized,
    /// Only todos in this category
    Only(CategoryId),
}

impl CategoryFilter {
    fn matches(self, todo: &Todo) -> bool {
        match self {
            Self::All => true,
            Self::Uncategorized => todo.category_id.is_none(),
            Self::Only(id) => todo.category_id == Some(id),
        }
    }
}

/// Which priority to show
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PriorityFilter {
    /// Every priority
    #[default]
    All,
    /// Only todos with this priority
    Only(Priority),
}

impl PriorityFilter {
    fn matches(self, todo: &Todo) -> bool {
        match self {
            Self::All => true,
            Self::Only(priority) => todo.priority == priority,
        }
    }
}

/// Ordering of the visible list
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortMode {
    /// Ascending manual position
    #[default]
    Manual,
    /// Earliest due date first, undated last
    DueDate,
    /// High, then medium, then low
    Priority,
    /// Newest first
    CreatedAt,
}

impl SortMode {
    /// Every mode, in display order
    pub const ALL: [Self; 4] = [Self::Manual, Self::DueDate, Self::Priority, Self::CreatedAt];

    /// Human-readable label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Manual => "Manual",
            Self::DueDate => "Due date",
            Self::Priority => "Priority",
            Self::CreatedAt => "Created",
        }
    }

    /// Drag reordering is only meaningful when the list shows manual order
    #[must_use]
    pub const fn allows_manual_reorder(self) -> bool {
        matches!(self, Self::Manual)
    }

    fn compare(self, a: &Todo, b: &Todo) -> Ordering {
        match self {
            Self::Manual => a.sort_order.cmp(&b.sort_order),
            Self::DueDate => match (a.due_date, b.due_date) {
                (Some(a), Some(b)) => a.cmp(&b),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
            Self::Priority => a.priority.rank().cmp(&b.priority.rank()),
            Self::CreatedAt => b.created_at.cmp(&a.created_at),
        }
    }
}

/// Current filter and sort criteria
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterParams {
    /// Free-text search over title and description
    pub search: String,
    /// Status filter
    pub status: StatusFilter,
    /// Category filter
    pub category: CategoryFilter,
    /// Priority filter
    pub priority: PriorityFilter,
    /// Sort mode
    pub sort: SortMode,
}

impl FilterParams {
    /// Whether any criterion other than the sort mode narrows the list
    #[must_use]
    pub fn is_filtering(&self) -> bool {
        !self.search.trim().is_empty()
            || self.status != StatusFilter::All
            || self.category != CategoryFilter::All
            || self.priority != PriorityFilter::All
    }
}

/// Compute the visible todos for `params`
///
/// Ties under the chosen sort keep their input order.
///
/// # Example
///
/// ```
/// use taskdeck::filter::{view, FilterParams, SortMode};
///
/// let params = FilterParams { sort: SortMode::Priority, ..FilterParams::default() };
/// assert!(view(&[], &params).is_empty());
/// ```
#[must_use]
pub fn view(todos: &[Todo], params: &FilterParams) -> Vec<Todo> {
    // Trimming only decides whether search is active; the query itself
    // matches as typed.
    let query = (!params.search.trim().is_empty()).then(|| params.search.to_lowercase());

    let mut visible: Vec<Todo> = todos
        .iter()
        .filter(|t| params.status.matches(t))
        .filter(|t| params.category.matches(t))
        .filter(|t| params.priority.matches(t))
        .filter(|t| {
            query.as_deref().is_none_or(|q| {
                t.title.to_lowercase().contains(q) || t.description.to_lowercase().contains(q)
            })
        })
        .cloned()
        .collect();

    visible.sort_by(|a, b| params.sort.compare(a, b));
    visible
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TodoId;
    use chrono::{DateTime, Duration, NaiveDate, Utc};
    use uuid::Uuid;

    #[allow(clippy::unwrap_used)] // Test code
    fn epoch() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn todo(n: u128, title: &str) -> Todo {
        let created = epoch() + Duration::hours(i64::try_from(n).unwrap_or_default());
        Todo {
            id: TodoId::from_uuid(Uuid::from_u128(n)),
            title: title.to_string(),
            description: String::new(),
            status: TodoStatus::Incomplete,
            priority: Priority::Medium,
            category_id: None,
            due_date: None,
            sort_order: usize::try_from(n).unwrap_or_default(),
            created_at: created,
            updated_at: created,
        }
    }

    fn titles(todos: &[Todo]) -> Vec<&str> {
        todos.iter().map(|t| t.title.as_str()).collect()
    }

    fn category(n: u128) -> CategoryId {
        CategoryId::from_uuid(Uuid::from_u128(1000 + n))
    }

    #[test]
    fn test_defaults_show_everything_in_manual_order() {
        let mut b = todo(1, "B");
        b.sort_order = 5;
        let todos = vec![b, todo(2, "A")];

        assert_eq!(titles(&view(&todos, &FilterParams::default())), ["A", "B"]);
        assert!(!FilterParams::default().is_filtering());
    }

    #[test]
    fn test_status_filter() {
        let mut done = todo(1, "done");
        done.status = TodoStatus::Complete;
        let todos = vec![done, todo(2, "open")];

        let params = FilterParams {
            status: StatusFilter::Only(TodoStatus::Complete),
            ..FilterParams::default()
        };
        assert_eq!(titles(&view(&todos, &params)), ["done"]);
    }

    #[test]
    fn test_category_filter_variants() {
        let mut work = todo(1, "work");
        work.category_id = Some(category(1));
        let mut home = todo(2, "home");
        home.category_id = Some(category(2));
        let todos = vec![work, home, todo(3, "loose")];

        let only = |category| FilterParams {
            category,
            ..FilterParams::default()
        };
        assert_eq!(titles(&view(&todos, &only(CategoryFilter::All))).len(), 3);
        assert_eq!(
            titles(&view(&todos, &only(CategoryFilter::Uncategorized))),
            ["loose"]
        );
        assert_eq!(
            titles(&view(&todos, &only(CategoryFilter::Only(category(2))))),
            ["home"]
        );
    }

    #[test]
    fn test_priority_filter() {
        let mut urgent = todo(1, "urgent");
        urgent.priority = Priority::High;
        let todos = vec![urgent, todo(2, "normal")];

        let params = FilterParams {
            priority: PriorityFilter::Only(Priority::High),
            ..FilterParams::default()
        };
        assert_eq!(titles(&view(&todos, &params)), ["urgent"]);
    }

    #[test]
    fn test_search_matches_title_or_description_case_insensitively() {
        let mut described = todo(2, "Groceries");
        described.description = "Pick up MILK and eggs".to_string();
        let todos = vec![todo(1, "Milk the cow"), described, todo(3, "Taxes")];

        let params = FilterParams {
            search: "milk".to_string(),
            ..FilterParams::default()
        };
        assert_eq!(titles(&view(&todos, &params)), ["Milk the cow", "Groceries"]);
    }

    #[test]
    fn test_search_uses_untrimmed_query_once_active() {
        let todos = vec![todo(1, "pay rent"), todo(2, "payroll")];

        let spaced = FilterParams {
            search: "pay ".to_string(),
            ..FilterParams::default()
        };
        assert_eq!(titles(&view(&todos, &spaced)), ["pay rent"]);

        let blank = FilterParams {
            search: "   ".to_string(),
            ..FilterParams::default()
        };
        assert_eq!(view(&todos, &blank).len(), 2);
    }

    #[test]
    #[allow(clippy::unwrap_used)] // Test code
    fn test_due_date_sort_puts_undated_last() {
        let mut later = todo(1, "2024-01-01");
        later.due_date = NaiveDate::from_ymd_opt(2024, 1, 1);
        let undated = todo(2, "none");
        let mut earlier = todo(3, "2023-05-05");
        earlier.due_date = NaiveDate::from_ymd_opt(2023, 5, 5);
        let todos = vec![later, undated, earlier];

        let params = FilterParams {
            sort: SortMode::DueDate,
            ..FilterParams::default()
        };
        assert_eq!(
            titles(&view(&todos, &params)),
            ["2023-05-05", "2024-01-01", "none"]
        );
    }

    #[test]
    fn test_priority_sort_is_stable() {
        let mut low = todo(1, "low");
        low.priority = Priority::Low;
        let mut first_high = todo(2, "high-1");
        first_high.priority = Priority::High;
        let mut second_high = todo(3, "high-2");
        second_high.priority = Priority::High;
        let todos = vec![low, second_high, todo(4, "medium"), first_high];

        let params = FilterParams {
            sort: SortMode::Priority,
            ..FilterParams::default()
        };
        assert_eq!(
            titles(&view(&todos, &params)),
            ["high-2", "high-1", "medium", "low"]
        );
    }

    #[test]
    fn test_created_at_sort_is_newest_first() {
        let todos = vec![todo(1, "old"), todo(3, "new"), todo(2, "mid")];

        let params = FilterParams {
            sort: SortMode::CreatedAt,
            ..FilterParams::default()
        };
        assert_eq!(titles(&view(&todos, &params)), ["new", "mid", "old"]);
    }

    #[test]
    fn test_view_is_pure() {
        let todos = vec![todo(3, "c"), todo(1, "a"), todo(2, "b")];
        let original = todos.clone();
        let params = FilterParams {
            sort: SortMode::CreatedAt,
            search: "a".to_string(),
            ..FilterParams::default()
        };

        let first = view(&todos, &params);
        let second = view(&todos, &params);

        assert_eq!(first, second);
        assert_eq!(todos, original);
    }

    #[test]
    fn test_only_manual_mode_allows_reorder() {
        let allowed: Vec<SortMode> = SortMode::ALL
            .into_iter()
            .filter(|mode| mode.allows_manual_reorder())
            .collect();
        assert_eq!(allowed, [SortMode::Manual]);
    }
}
