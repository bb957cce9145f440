//! Transient notifications that expire on their own.
//!
//! `Show` appends a toast and schedules an `Expire` for it as a cancellable
//! effect keyed by the toast id. `Dismiss` removes the toast and cancels that
//! timer, so an expiry never acts on an entry that is already gone.

use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use taskdeck_core::{
    effect::{Effect, EffectId},
    environment::{IdGenerator, RandomIdGenerator},
    reducer::Reducer,
    smallvec, SmallVec,
};
use uuid::Uuid;

/// How long a toast stays up unless dismissed
pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_millis(3000);

/// Unique identifier for a toast
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ToastId(Uuid);

impl ToastId {
    /// Creates a `ToastId` from a UUID
    #[must_use]
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Key of the expiry timer owned by this toast
    #[must_use]
    pub fn expiry_effect(self) -> EffectId {
        EffectId::new(format!("toast-expiry-{}", self.0))
    }
}

impl fmt::Display for ToastId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A short-lived message
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Toast {
    /// Unique identifier
    pub id: ToastId,
    /// Text shown to the user
    pub message: String,
}

/// Toasts currently shown, oldest first
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ToastState {
    /// Visible toasts
    pub toasts: Vec<Toast>,
}

impl ToastState {
    /// Whether `id` is still shown
    #[must_use]
    pub fn contains(&self, id: ToastId) -> bool {
        self.toasts.iter().any(|t| t.id == id)
    }

    fn remove(&mut self, id: ToastId) -> bool {
        let before = self.toasts.len();
        self.toasts.retain(|t| t.id != id);
        self.toasts.len() != before
    }
}

/// Actions for the toast queue
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ToastAction {
    /// Show a new toast
    Show {
        /// Text to show
        message: String,
    },
    /// Remove a toast before it expires
    Dismiss {
        /// Toast to remove
        id: ToastId,
    },
    /// Timer feedback: the toast's time is up
    Expire {
        /// Toast that expired
        id: ToastId,
    },
}

/// Environment for the toast reducer
#[derive(Clone)]
pub struct ToastEnvironment {
    /// Source of toast ids
    pub ids: Arc<dyn IdGenerator>,
    /// How long each toast stays up
    pub duration: Duration,
}

impl ToastEnvironment {
    /// Creates a new `ToastEnvironment`
    #[must_use]
    pub fn new(ids: Arc<dyn IdGenerator>, duration: Duration) -> Self {
        Self { ids, duration }
    }
}

impl Default for ToastEnvironment {
    fn default() -> Self {
        Self::new(Arc::new(RandomIdGenerator), DEFAULT_TOAST_DURATION)
    }
}

/// Reducer for the toast queue
#[derive(Clone, Copy, Debug, Default)]
pub struct ToastReducer;

impl Reducer for ToastReducer {
    type State = ToastState;
    type Action = ToastAction;
    type Environment = ToastEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            ToastAction::Show { message } => {
                let id = ToastId::from_uuid(env.ids.next_id());
                tracing::debug!(%id, %message, "Showing toast");
                state.toasts.push(Toast { id, message });

                let expire = Effect::Delay {
                    duration: env.duration,
                    action: Box::new(ToastAction::Expire { id }),
                };
                smallvec![expire.cancellable(id.expiry_effect())]
            },

            ToastAction::Dismiss { id } => {
                if state.remove(id) {
                    smallvec![Effect::Cancel(id.expiry_effect())]
                } else {
                    tracing::debug!(%id, "Dismiss: toast already gone");
                    SmallVec::new()
                }
            },

            ToastAction::Expire { id } => {
                if !state.remove(id) {
                    tracing::debug!(%id, "Expire: toast already gone");
                }
                SmallVec::new()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskdeck_runtime::Store;
    use taskdeck_testing::{assertions, ReducerTest, SequentialIdGenerator};

    fn test_env() -> ToastEnvironment {
        ToastEnvironment::new(Arc::new(SequentialIdGenerator::new()), DEFAULT_TOAST_DURATION)
    }

    fn toast_id(n: u128) -> ToastId {
        ToastId::from_uuid(SequentialIdGenerator::nth(n))
    }

    fn showing(ids: &[u128]) -> ToastState {
        ToastState {
            toasts: ids
                .iter()
                .map(|n| Toast {
                    id: toast_id(*n),
                    message: format!("toast {n}"),
                })
                .collect(),
        }
    }

    #[test]
    fn test_show_appends_and_schedules_expiry() {
        ReducerTest::new(ToastReducer)
            .with_env(test_env())
            .given_state(ToastState::default())
            .when_action(ToastAction::Show {
                message: "Todo added".to_string(),
            })
            .then_state(|state| {
                assert_eq!(state.toasts.len(), 1);
                assert_eq!(state.toasts[0].message, "Todo added");
            })
            .then_effects(|effects| assertions::assert_effects_count(effects, 1))
            .then_effects(assertions::assert_has_cancellable_effect)
            .then_effects(|effects| {
                match &effects[0] {
                    Effect::Cancellable { id, effect } => {
                        assert_eq!(*id, toast_id(1).expiry_effect());
                        assert!(matches!(
                            **effect,
                            Effect::Delay { duration, ref action }
                                if duration == DEFAULT_TOAST_DURATION
                                    && **action == ToastAction::Expire { id: toast_id(1) }
                        ));
                    },
                    other => unreachable!("expected cancellable expiry, got {other:?}"),
                }
            })
            .run();
    }

    #[test]
    fn test_dismiss_removes_and_cancels_timer() {
        ReducerTest::new(ToastReducer)
            .with_env(test_env())
            .given_state(showing(&[1, 2]))
            .when_action(ToastAction::Dismiss { id: toast_id(1) })
            .then_state(|state| assert_eq!(*state, showing(&[2])))
            .then_effects(|effects| {
                assertions::assert_cancels(effects, &toast_id(1).expiry_effect());
            })
            .run();
    }

    #[test]
    fn test_dismiss_unknown_is_no_op() {
        ReducerTest::new(ToastReducer)
            .with_env(test_env())
            .given_state(showing(&[1]))
            .when_action(ToastAction::Dismiss { id: toast_id(9) })
            .then_state(|state| assert_eq!(*state, showing(&[1])))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn test_expire_of_dismissed_toast_is_no_op() {
        ReducerTest::new(ToastReducer)
            .with_env(test_env())
            .given_state(showing(&[2]))
            .when_action(ToastAction::Expire { id: toast_id(1) })
            .then_state(|state| assert_eq!(*state, showing(&[2])))
            .run();
    }

    #[tokio::test(start_paused = true)]
    #[allow(clippy::unwrap_used)] // Test code
    async fn test_toast_expires_after_duration() {
        let store = Store::new(ToastState::default(), ToastReducer, test_env());

        let mut handle = store
            .send(ToastAction::Show {
                message: "Todo added".to_string(),
            })
            .await
            .unwrap();
        assert!(store.state(|s| s.contains(toast_id(1))).await);

        tokio::time::sleep(Duration::from_millis(2999)).await;
        assert!(store.state(|s| s.contains(toast_id(1))).await);

        handle.wait().await;
        assert!(store.state(|s| s.toasts.is_empty()).await);
    }

    #[tokio::test(start_paused = true)]
    #[allow(clippy::unwrap_used)] // Test code
    async fn test_dismissed_toast_timer_never_fires() {
        let store = Store::new(ToastState::default(), ToastReducer, test_env());
        let mut expiries = store.subscribe_actions();

        let show = |message: &str| ToastAction::Show {
            message: message.to_string(),
        };
        let _ = store.send(show("first")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(1000)).await;
        let mut second = store.send(show("second")).await.unwrap();
        tokio::time::sleep(Duration::from_millis(500)).await;
        let _ = store
            .send(ToastAction::Dismiss { id: toast_id(1) })
            .await
            .unwrap();

        // Past the first toast's original deadline, before the second's.
        tokio::time::sleep(Duration::from_millis(2000)).await;
        let visible = store.state(|s| s.toasts.clone()).await;
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, toast_id(2));

        second.wait().await;
        assert!(store.state(|s| s.toasts.is_empty()).await);
        assert_eq!(
            expiries.recv().await.unwrap(),
            ToastAction::Expire { id: toast_id(2) }
        );
        assert!(expiries.try_recv().is_err());
        assert_eq!(store.cancellable_in_flight(), 0);
    }
}
