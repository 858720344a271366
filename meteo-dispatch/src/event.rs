//! Terminal events and the background poller that produces them

use std::time::Duration;

use crossterm::event::{self, KeyEvent, KeyEventKind, MouseEvent, MouseEventKind};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Raw event from crossterm before processing
#[derive(Debug)]
pub enum RawEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize(u16, u16),
}

/// The event payload handed to components
#[derive(Debug, Clone)]
pub enum EventKind {
    /// Keyboard event (presses and repeats only)
    Key(KeyEvent),
    /// Mouse click/drag/move
    Mouse(MouseEvent),
    /// Scroll wheel with position and direction (+1 down, -1 up)
    Scroll { column: u16, row: u16, delta: isize },
    /// Terminal resize
    Resize(u16, u16),
}

impl EventKind {
    /// Whether this is a left-button press at a position, and where.
    pub fn click_position(&self) -> Option<(u16, u16)> {
        match self {
            EventKind::Mouse(mouse)
                if matches!(
                    mouse.kind,
                    MouseEventKind::Down(crossterm::event::MouseButton::Left)
                ) =>
            {
                Some((mouse.column, mouse.row))
            }
            _ => None,
        }
    }

    /// Cell under the pointer for mouse and scroll events.
    pub fn position(&self) -> Option<(u16, u16)> {
        match self {
            EventKind::Mouse(mouse) => Some((mouse.column, mouse.row)),
            EventKind::Scroll { column, row, .. } => Some((*column, *row)),
            _ => None,
        }
    }
}

/// Spawn the event polling task with cancellation support
///
/// Polls crossterm in short slices so the tokio worker is never blocked for
/// long, forwarding key, mouse and resize events until `cancel_token` fires
/// or the receiver is dropped.
pub fn spawn_event_poller(
    tx: mpsc::UnboundedSender<RawEvent>,
    poll_timeout: Duration,
    loop_sleep: Duration,
    cancel_token: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        const MAX_EVENTS_PER_BATCH: usize = 20;

        loop {
            tokio::select! {
                _ = cancel_token.cancelled() => {
                    // Leave no half-read input behind for the shell.
                    while event::poll(Duration::ZERO).unwrap_or(false) {
                        let _ = event::read();
                    }
                    break;
                }
                _ = tokio::time::sleep(loop_sleep) => {
                    let mut processed = 0;
                    while processed < MAX_EVENTS_PER_BATCH
                        && event::poll(poll_timeout).unwrap_or(false)
                    {
                        processed += 1;
                        let raw = match event::read() {
                            Ok(event::Event::Key(key)) => Some(RawEvent::Key(key)),
                            Ok(event::Event::Mouse(mouse)) => Some(RawEvent::Mouse(mouse)),
                            Ok(event::Event::Resize(w, h)) => Some(RawEvent::Resize(w, h)),
                            _ => None,
                        };
                        if let Some(raw) = raw {
                            if tx.send(raw).is_err() {
                                debug!("Event channel closed, stopping poller");
                                return;
                            }
                        }
                    }
                }
            }
        }
    })
}

/// Process a raw event into an [`EventKind`]
///
/// Key releases are dropped (Windows reports them), scroll wheel events get
/// their own variant.
pub fn process_raw_event(raw: RawEvent) -> Option<EventKind> {
    match raw {
        RawEvent::Key(key) if key.kind == KeyEventKind::Release => None,
        RawEvent::Key(key) => Some(EventKind::Key(key)),
        RawEvent::Mouse(mouse) => Some(match mouse.kind {
            MouseEventKind::ScrollDown => EventKind::Scroll {
                column: mouse.column,
                row: mouse.row,
                delta: 1,
            },
            MouseEventKind::ScrollUp => EventKind::Scroll {
                column: mouse.column,
                row: mouse.row,
                delta: -1,
            },
            _ => EventKind::Mouse(mouse),
        }),
        RawEvent::Resize(w, h) => Some(EventKind::Resize(w, h)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyEventState, KeyModifiers, MouseButton};

    fn mouse(kind: MouseEventKind) -> MouseEvent {
        MouseEvent {
            kind,
            column: 10,
            row: 20,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn test_process_raw_event_key() {
        let press = KeyEvent {
            code: KeyCode::Char('r'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::empty(),
        };
        assert!(matches!(
            process_raw_event(RawEvent::Key(press)),
            Some(EventKind::Key(_))
        ));

        let release = KeyEvent {
            kind: KeyEventKind::Release,
            ..press
        };
        assert!(process_raw_event(RawEvent::Key(release)).is_none());
    }

    #[test]
    fn test_process_raw_event_scroll() {
        match process_raw_event(RawEvent::Mouse(mouse(MouseEventKind::ScrollUp))) {
            Some(EventKind::Scroll { column, row, delta }) => {
                assert_eq!((column, row, delta), (10, 20, -1));
            }
            other => panic!("Expected Scroll event, got {:?}", other),
        }
    }

    #[test]
    fn test_click_position() {
        let click = process_raw_event(RawEvent::Mouse(mouse(MouseEventKind::Down(
            MouseButton::Left,
        ))))
        .expect("mouse events are kept");
        assert_eq!(click.click_position(), Some((10, 20)));

        let moved = EventKind::Mouse(mouse(MouseEventKind::Moved));
        assert_eq!(moved.click_position(), None);
        assert_eq!(EventKind::Resize(80, 24).click_position(), None);
    }

    #[test]
    fn test_position_covers_mouse_and_scroll() {
        let moved = EventKind::Mouse(mouse(MouseEventKind::Moved));
        assert_eq!(moved.position(), Some((10, 20)));

        let scroll = process_raw_event(RawEvent::Mouse(mouse(MouseEventKind::ScrollDown)))
            .expect("scroll events are kept");
        assert_eq!(scroll.position(), Some((10, 20)));
        assert_eq!(EventKind::Resize(80, 24).position(), None);
    }
}
