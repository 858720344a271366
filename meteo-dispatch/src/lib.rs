//! Store, effect and task runtime for the meteo terminal client
//!
//! The client follows a Redux/Elm-style loop:
//!
//! 1. A terminal event reaches a [`Component`], which returns actions
//! 2. Actions are dispatched to an [`EffectStore`]; the reducer mutates state
//!    and returns [`DispatchResult`] with declared effects
//! 3. The effect handler turns effects into keyed tasks ([`TaskManager`]) or
//!    interval [`Subscriptions`]
//! 4. Tasks send result actions (`WeatherDidLoad`, `LookupDidError`, ...)
//!    back through the same channel
//! 5. If state changed, the frame is re-rendered
//!
//! The `Did*` naming convention marks result actions: `WeatherFetch` is the
//! intent, `WeatherDidLoad` / `WeatherDidError` carry the outcome.

pub mod action;
pub mod component;
pub mod effect;
pub mod event;
pub mod runtime;
pub mod store;
pub mod subscriptions;
pub mod tasks;
pub mod testing;

pub use action::{Action, ActionSummary};
pub use component::Component;
pub use effect::{
    DispatchResult, EffectReducer, EffectStore, EffectStoreLike, EffectStoreWithMiddleware,
};
pub use event::{process_raw_event, spawn_event_poller, EventKind, RawEvent};
pub use runtime::{EffectContext, EffectRuntime, EventOutcome};
pub use store::{LoggingMiddleware, Middleware};
pub use subscriptions::{SubKey, Subscriptions};
pub use tasks::{TaskKey, TaskManager};
