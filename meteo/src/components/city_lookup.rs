//! City search input with a result dropdown

use crossterm::event::{KeyCode, KeyModifiers};
use meteo_dispatch::EventKind;
use ratatui::{
    Frame,
    layout::{Position, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};

use super::{Component, SPINNERS};
use crate::action::Action;
use crate::state::LookupState;

const PLACEHOLDER: &str = "Type a city name...";
const MAX_DROPDOWN_ROWS: u16 = 6;

#[derive(Clone, Copy)]
pub struct CityLookupProps<'a> {
    pub lookup: &'a LookupState,
    pub is_focused: bool,
    pub tick_count: u32,
}

/// Single-line search input; owns only its cursor and the last dropdown layout
#[derive(Default)]
pub struct CityLookup {
    /// Cursor position (byte index into the query)
    cursor: usize,
    /// Whole overlay of the last rendered dropdown, border included
    dropdown: Option<Rect>,
    /// Result rows of the last rendered dropdown
    rows: Option<Rect>,
    /// First result visible in `rows`
    scroll: usize,
}

impl CityLookup {
    pub fn new() -> Self {
        Self::default()
    }

    fn clamp_cursor(&mut self, value: &str) {
        self.cursor = self.cursor.min(value.len());
        while !value.is_char_boundary(self.cursor) {
            self.cursor -= 1;
        }
    }

    fn move_left(&mut self, value: &str) {
        if let Some((i, _)) = value[..self.cursor].char_indices().last() {
            self.cursor = i;
        }
    }

    fn move_right(&mut self, value: &str) {
        if let Some(c) = value[self.cursor..].chars().next() {
            self.cursor += c.len_utf8();
        }
    }

    fn insert(&mut self, value: &str, c: char) -> String {
        let mut next = String::with_capacity(value.len() + c.len_utf8());
        next.push_str(&value[..self.cursor]);
        next.push(c);
        next.push_str(&value[self.cursor..]);
        self.cursor += c.len_utf8();
        next
    }

    fn backspace(&mut self, value: &str) -> Option<String> {
        let (start, _) = value[..self.cursor].char_indices().last()?;
        let next = format!("{}{}", &value[..start], &value[self.cursor..]);
        self.cursor = start;
        Some(next)
    }

    fn delete(&self, value: &str) -> Option<String> {
        let c = value[self.cursor..].chars().next()?;
        Some(format!(
            "{}{}",
            &value[..self.cursor],
            &value[self.cursor + c.len_utf8()..]
        ))
    }

    /// Whether `(column, row)` falls on the dropdown drawn by the last frame
    pub fn overlay_contains(&self, column: u16, row: u16) -> bool {
        self.dropdown
            .is_some_and(|area| area.contains(Position::new(column, row)))
    }

    /// Whether the dropdown has anything to show
    fn dropdown_visible(props: &CityLookupProps<'_>) -> bool {
        let lookup = props.lookup;
        props.is_focused
            && (!lookup.results.is_empty()
                || lookup.error.is_some()
                || (lookup.searchable_query().is_some() && !lookup.searching))
    }

    /// Draw the dropdown below `anchor`, clipped to `bounds`.
    ///
    /// Called after every other pane so it overlays them.
    pub fn render_dropdown(
        &mut self,
        frame: &mut Frame,
        anchor: Rect,
        bounds: Rect,
        props: CityLookupProps<'_>,
    ) {
        self.dropdown = None;
        self.rows = None;
        self.scroll = 0;
        if !Self::dropdown_visible(&props) {
            return;
        }
        let lookup = props.lookup;

        let rows = (lookup.results.len() as u16).clamp(1, MAX_DROPDOWN_ROWS);
        let top = anchor.bottom();
        let height = (rows + 2).min(bounds.bottom().saturating_sub(top));
        if height < 3 {
            return;
        }
        let area = Rect::new(anchor.x, top, anchor.width, height);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));
        let inner = block.inner(area);
        self.dropdown = Some(area);

        frame.render_widget(Clear, area);
        frame.render_widget(block, area);

        if let Some(error) = &lookup.error {
            let line = Line::from(vec![
                Span::styled("⚠ ", Style::default().fg(Color::Red)),
                Span::styled(error.as_str(), Style::default().fg(Color::Red)),
            ]);
            frame.render_widget(Paragraph::new(line), inner);
            return;
        }

        if lookup.results.is_empty() {
            frame.render_widget(
                Paragraph::new("No cities found").style(Style::default().fg(Color::DarkGray)),
                inner,
            );
            return;
        }

        let items: Vec<ListItem> = lookup
            .results
            .iter()
            .map(|result| {
                let mut spans = vec![Span::raw(result.name.as_str())];
                if !result.country.is_empty() {
                    spans.push(Span::styled(
                        format!(", {}", result.country),
                        Style::default().fg(Color::DarkGray),
                    ));
                }
                ListItem::new(Line::from(spans))
            })
            .collect();
        let list = List::new(items)
            .highlight_style(Style::default().bg(Color::Rgb(40, 60, 90)).bold())
            .highlight_symbol("› ");
        let mut list_state = ListState::default().with_selected(Some(lookup.highlighted));
        frame.render_stateful_widget(list, inner, &mut list_state);

        self.rows = Some(inner);
        self.scroll = list_state.offset();
    }
}

impl Component<Action> for CityLookup {
    type Props<'a> = CityLookupProps<'a>;

    fn handle_event(&mut self, event: &EventKind, props: CityLookupProps<'_>) -> Vec<Action> {
        if !props.is_focused {
            return vec![];
        }
        let value = props.lookup.query.as_str();
        self.clamp_cursor(value);

        if let Some((column, row)) = event.click_position() {
            return match self.rows {
                Some(area) if area.contains(Position::new(column, row)) => {
                    let index = self.scroll + (row - area.y) as usize;
                    if index < props.lookup.results.len() {
                        vec![Action::LookupHighlight(index), Action::LookupConfirm]
                    } else {
                        vec![]
                    }
                }
                _ => vec![],
            };
        }

        let EventKind::Key(key) = event else {
            return vec![];
        };

        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('a') => {
                    self.cursor = 0;
                    vec![]
                }
                KeyCode::Char('e') => {
                    self.cursor = value.len();
                    vec![]
                }
                KeyCode::Char('u') => {
                    self.cursor = 0;
                    vec![Action::LookupQueryChange(String::new())]
                }
                _ => vec![],
            };
        }

        match key.code {
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::ALT) => {
                vec![Action::LookupQueryChange(self.insert(value, c))]
            }
            KeyCode::Backspace => self
                .backspace(value)
                .map(Action::LookupQueryChange)
                .into_iter()
                .collect(),
            KeyCode::Delete => self
                .delete(value)
                .map(Action::LookupQueryChange)
                .into_iter()
                .collect(),
            KeyCode::Left => {
                self.move_left(value);
                vec![]
            }
            KeyCode::Right => {
                self.move_right(value);
                vec![]
            }
            KeyCode::Home => {
                self.cursor = 0;
                vec![]
            }
            KeyCode::End => {
                self.cursor = value.len();
                vec![]
            }
            KeyCode::Up if !props.lookup.results.is_empty() => {
                vec![Action::LookupHighlight(
                    props.lookup.highlighted.saturating_sub(1),
                )]
            }
            KeyCode::Down if !props.lookup.results.is_empty() => {
                vec![Action::LookupHighlight(props.lookup.highlighted + 1)]
            }
            KeyCode::Enter => vec![Action::LookupConfirm],
            KeyCode::Esc => vec![Action::LookupClear],
            _ => vec![],
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, props: CityLookupProps<'_>) {
        let lookup = props.lookup;
        self.clamp_cursor(&lookup.query);

        let border = if props.is_focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::Rgb(80, 80, 100))
        };
        let mut title = vec![Span::styled(" 🔍 Search ", Style::default().bold())];
        if lookup.searching {
            let spinner = SPINNERS[(props.tick_count as usize / 2) % SPINNERS.len()];
            title.push(Span::styled(
                format!("{} ", spinner),
                Style::default().fg(Color::Yellow),
            ));
        }
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(Line::from(title));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let text = if lookup.query.is_empty() {
            Paragraph::new(Span::styled(
                PLACEHOLDER,
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            ))
        } else {
            Paragraph::new(lookup.query.as_str())
        };
        frame.render_widget(text, inner);

        if props.is_focused && inner.width > 0 {
            let offset = lookup.query[..self.cursor].chars().count() as u16;
            let x = (inner.x + offset).min(inner.right().saturating_sub(1));
            frame.set_cursor_position(Position::new(x, inner.y));
        }
    }
}
