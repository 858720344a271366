//! Test utilities for components and reducers
//!
//! - [`key`]: build a `KeyEvent` from a string such as `"ctrl+c"` or `"enter"`
//! - [`click`]: a left mouse press at a cell
//! - [`RenderHarness`]: render into a `TestBackend` and read the buffer back
//! - [`ActionAssertions`]: assertions on the actions a component returned
//!
//! ```ignore
//! use meteo_dispatch::testing::*;
//!
//! let actions = panel.handle_event(&EventKind::Key(key("r")), props);
//! actions.assert_first(Action::WeatherFetch);
//! ```

use std::fmt::Debug;

use crossterm::event::{
    KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use ratatui::backend::TestBackend;
use ratatui::buffer::Buffer;
use ratatui::{Frame, Terminal};

use crate::event::EventKind;

/// Parse a key description into a `KeyEvent`.
///
/// Accepts an optional `ctrl+`, `alt+` or `shift+` prefix followed by a
/// single character or a named key (`esc`, `enter`, `tab`, `backtab`,
/// `backspace`, `up`, `down`, `left`, `right`, `pageup`, `pagedown`,
/// `home`, `end`, `delete`, `space`, `f1`..`f12`).
pub fn parse_key_string(key_str: &str) -> Option<KeyEvent> {
    let key_str = key_str.trim().to_lowercase();
    let mut parts: Vec<&str> = key_str.split('+').collect();
    let key_part = parts.pop()?;

    let mut modifiers = KeyModifiers::empty();
    for part in parts {
        match part {
            "ctrl" | "control" => modifiers |= KeyModifiers::CONTROL,
            "shift" => modifiers |= KeyModifiers::SHIFT,
            "alt" => modifiers |= KeyModifiers::ALT,
            _ => return None,
        }
    }

    let code = match key_part {
        "esc" | "escape" => KeyCode::Esc,
        "enter" | "return" => KeyCode::Enter,
        "tab" if modifiers.contains(KeyModifiers::SHIFT) => KeyCode::BackTab,
        "tab" => KeyCode::Tab,
        "backtab" => {
            modifiers |= KeyModifiers::SHIFT;
            KeyCode::BackTab
        }
        "backspace" => KeyCode::Backspace,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "pageup" => KeyCode::PageUp,
        "pagedown" => KeyCode::PageDown,
        "delete" => KeyCode::Delete,
        "space" => KeyCode::Char(' '),
        f if f.len() > 1 && f.starts_with('f') => KeyCode::F(f[1..].parse().ok()?),
        c => {
            let mut chars = c.chars();
            let ch = chars.next()?;
            if chars.next().is_some() {
                return None;
            }
            KeyCode::Char(ch)
        }
    };

    Some(KeyEvent {
        code,
        modifiers,
        kind: KeyEventKind::Press,
        state: KeyEventState::empty(),
    })
}

/// Create a `KeyEvent` from a key string, panicking on invalid input.
pub fn key(s: &str) -> KeyEvent {
    parse_key_string(s).unwrap_or_else(|| panic!("Invalid key string: {:?}", s))
}

/// Create a `KeyEvent` for a character with no modifiers.
pub fn char_key(c: char) -> KeyEvent {
    KeyEvent {
        code: KeyCode::Char(c),
        modifiers: KeyModifiers::empty(),
        kind: KeyEventKind::Press,
        state: KeyEventState::empty(),
    }
}

/// Key events for each character of `text`, for typing into inputs.
pub fn type_text(text: &str) -> Vec<EventKind> {
    text.chars().map(|c| EventKind::Key(char_key(c))).collect()
}

/// A left mouse button press at `(column, row)`.
pub fn click(column: u16, row: u16) -> EventKind {
    EventKind::Mouse(MouseEvent {
        kind: MouseEventKind::Down(MouseButton::Left),
        column,
        row,
        modifiers: KeyModifiers::NONE,
    })
}

/// Renders into an in-memory terminal of a fixed size.
pub struct RenderHarness {
    terminal: Terminal<TestBackend>,
}

impl RenderHarness {
    pub fn new(width: u16, height: u16) -> Self {
        let terminal = Terminal::new(TestBackend::new(width, height))
            .unwrap_or_else(|e| panic!("test terminal: {}", e));
        Self { terminal }
    }

    /// Draw one frame and return the resulting buffer.
    pub fn render<F>(&mut self, draw: F) -> Buffer
    where
        F: FnOnce(&mut Frame),
    {
        let completed = self
            .terminal
            .draw(draw)
            .unwrap_or_else(|e| panic!("test draw: {}", e));
        completed.buffer.clone()
    }

    /// Draw one frame and return its text, one line per row, without styles.
    pub fn render_to_string_plain<F>(&mut self, draw: F) -> String
    where
        F: FnOnce(&mut Frame),
    {
        buffer_to_string_plain(&self.render(draw))
    }
}

/// Buffer contents as plain text, trailing spaces trimmed on each row.
pub fn buffer_to_string_plain(buffer: &Buffer) -> String {
    let area = buffer.area;
    let mut out = String::new();
    for y in area.top()..area.bottom() {
        let mut line = String::new();
        for x in area.left()..area.right() {
            line.push_str(buffer[(x, y)].symbol());
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

/// Assertions over the actions returned by `handle_event` or a reducer test.
pub trait ActionAssertions<A> {
    fn assert_empty(&self);
    fn assert_count(&self, n: usize);
    fn assert_first(&self, expected: A);
    fn assert_contains(&self, expected: A);
}

impl<A, T> ActionAssertions<A> for T
where
    A: PartialEq + Debug,
    for<'a> &'a T: IntoIterator<Item = &'a A>,
{
    fn assert_empty(&self) {
        let actions: Vec<&A> = self.into_iter().collect();
        assert!(actions.is_empty(), "Expected no actions, got {:?}", actions);
    }

    fn assert_count(&self, n: usize) {
        let actions: Vec<&A> = self.into_iter().collect();
        assert_eq!(actions.len(), n, "Unexpected actions: {:?}", actions);
    }

    fn assert_first(&self, expected: A) {
        let first = self.into_iter().next();
        assert_eq!(first, Some(&expected), "First action mismatch");
    }

    fn assert_contains(&self, expected: A) {
        let actions: Vec<&A> = self.into_iter().collect();
        assert!(
            actions.contains(&&expected),
            "Expected {:?} in {:?}",
            expected,
            actions
        );
    }
}
