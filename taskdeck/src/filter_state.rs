//! Filter state: the currently selected criteria. Never persisted.

use crate::filter::{CategoryFilter, FilterParams, PriorityFilter, SortMode, StatusFilter};
use taskdeck_core::{effect::Effect, reducer::Reducer, SmallVec};

/// Changes to the selected criteria
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FilterAction {
    /// Replace the search text
    SetSearch(String),
    /// Replace the status filter
    SetStatus(StatusFilter),
    /// Replace the category filter
    SetCategory(CategoryFilter),
    /// Replace the priority filter
    SetPriority(PriorityFilter),
    /// Replace the sort mode
    SetSort(SortMode),
    /// Restore the defaults
    Reset,
}

/// Reducer holding [`FilterParams`]
#[derive(Clone, Copy, Debug, Default)]
pub struct FilterReducer;

impl Reducer for FilterReducer {
    type State = FilterParams;
    type Action = FilterAction;
    type Environment = ();

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        _env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            FilterAction::SetSearch(search) => state.search = search,
            FilterAction::SetStatus(status) => state.status = status,
            FilterAction::SetCategory(category) => state.category = category,
            FilterAction::SetPriority(priority) => state.priority = priority,
            FilterAction::SetSort(sort) => state.sort = sort,
            FilterAction::Reset => *state = FilterParams::default(),
        }
        SmallVec::new()
    }
}
