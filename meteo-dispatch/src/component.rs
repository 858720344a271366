//! Component trait for pure UI elements

use ratatui::{layout::Rect, Frame};

use crate::event::EventKind;

/// A UI element that renders from props and answers events with actions
///
/// 1. Props carry all read-only data needed for rendering, borrowed from state
/// 2. `handle_event` returns actions and never mutates application state
/// 3. `render` draws from props plus internal UI state
///
/// Internal UI state (cursor position inside an input, the last rendered
/// area used for mouse hit-testing) may live in `&mut self`; anything other
/// components care about goes through actions.
pub trait Component<A> {
    /// Data required to render the component (read-only)
    type Props<'a>;

    /// Handle an event and return actions to dispatch
    ///
    /// Focus arrives through props. The default returns no actions
    /// (render-only components).
    #[allow(unused_variables)]
    fn handle_event(&mut self, event: &EventKind, props: Self::Props<'_>) -> Vec<A> {
        Vec::new()
    }

    /// Render the component to the frame
    fn render(&mut self, frame: &mut Frame, area: Rect, props: Self::Props<'_>);
}
