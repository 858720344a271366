//! Action trait for type-safe state mutations

use std::fmt::Debug;

/// Marker trait for actions that can be dispatched to the store
///
/// Actions describe something that happened: a key press turned into an
/// intent (`WeatherFetch`) or an async result coming back (`WeatherDidLoad`).
/// They cross task boundaries through the action channel, hence
/// `Send + 'static`.
pub trait Action: Clone + Debug + Send + 'static {
    /// Get the action name for logging and filtering
    fn name(&self) -> &'static str;
}

/// Short, log-friendly description of an action.
///
/// The default is the `Debug` output. Override it for actions carrying
/// payloads that would flood the log (search results, snapshots).
pub trait ActionSummary: Action {
    fn summary(&self) -> String {
        format!("{:?}", self)
    }
}
