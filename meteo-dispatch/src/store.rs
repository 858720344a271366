//! Middleware hooks around store dispatch

use crate::action::ActionSummary;
use crate::Action;

/// Middleware trait for intercepting actions
///
/// Implement this trait to add logging or other cross-cutting concerns
/// to a store.
pub trait Middleware<A: Action> {
    /// Called before the action is dispatched to the reducer
    fn before(&mut self, action: &A);

    /// Called after the action is processed by the reducer
    fn after(&mut self, action: &A, state_changed: bool);
}

/// Middleware that traces every dispatched action
///
/// Emits one `debug` event per action after the reducer ran, carrying the
/// action summary and whether the state changed. High-frequency actions
/// (animation ticks) can be filtered out by name.
#[derive(Debug, Clone, Default)]
pub struct LoggingMiddleware {
    ignored: Vec<&'static str>,
    dispatched: u64,
}

impl LoggingMiddleware {
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip actions with the given name.
    pub fn ignore(mut self, name: &'static str) -> Self {
        self.ignored.push(name);
        self
    }

    /// Number of actions seen so far, ignored ones included.
    pub fn dispatched(&self) -> u64 {
        self.dispatched
    }

    fn is_ignored(&self, name: &str) -> bool {
        self.ignored.iter().any(|ignored| *ignored == name)
    }
}

impl<A: ActionSummary> Middleware<A> for LoggingMiddleware {
    fn before(&mut self, _action: &A) {
        self.dispatched += 1;
    }

    fn after(&mut self, action: &A, state_changed: bool) {
        if self.is_ignored(action.name()) {
            return;
        }
        tracing::debug!(
            action = %action.summary(),
            state_changed,
            "Action processed"
        );
    }
}
