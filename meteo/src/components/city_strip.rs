//! Popular cities: four cards at a time from the preset catalog

use crossterm::event::KeyCode;
use meteo_dispatch::EventKind;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Position, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use super::{Component, SPINNERS, temperature_color};
use crate::action::Action;
use crate::cities::{self, PRESET_CITIES, STRIP_WINDOW};
use crate::format;
use crate::state::{CardState, StripState};

pub struct CityStripProps<'a> {
    pub strip: &'a StripState,
    pub selected_city: &'a str,
    pub is_focused: bool,
    pub tick_count: u32,
}

/// Card strip; keeps the rendered card areas for click selection
#[derive(Default)]
pub struct CityStrip {
    cards: Vec<(Rect, &'static str)>,
}

impl CityStrip {
    pub fn new() -> Self {
        Self::default()
    }

    fn card_at(&self, column: u16, row: u16) -> Option<&'static str> {
        self.cards
            .iter()
            .find(|(area, _)| area.contains(Position::new(column, row)))
            .map(|(_, key)| *key)
    }
}

impl Component<Action> for CityStrip {
    type Props<'a> = CityStripProps<'a>;

    fn handle_event(&mut self, event: &EventKind, props: CityStripProps<'_>) -> Vec<Action> {
        if let Some((column, row)) = event.click_position() {
            return self
                .card_at(column, row)
                .map(|key| Action::CitySelect(key.to_string()))
                .into_iter()
                .collect();
        }

        if !props.is_focused {
            return vec![];
        }
        let EventKind::Key(key) = event else {
            return vec![];
        };
        match key.code {
            KeyCode::Left => vec![Action::StripCursorMove(-1)],
            KeyCode::Right => vec![Action::StripCursorMove(1)],
            KeyCode::Char(']') | KeyCode::Char('n') | KeyCode::PageDown => {
                vec![Action::StripNextPage]
            }
            KeyCode::Char('[') | KeyCode::Char('p') | KeyCode::PageUp => {
                vec![Action::StripPrevPage]
            }
            KeyCode::Char('r') | KeyCode::F(5) => vec![Action::StripFetchAll],
            KeyCode::Enter => cities::window(props.strip.window_start)
                .get(props.strip.cursor)
                .map(|city| Action::CitySelect(city.key.to_string()))
                .into_iter()
                .collect(),
            _ => vec![],
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, props: CityStripProps<'_>) {
        let strip = props.strip;
        let visible = cities::window(strip.window_start);
        let first = PRESET_CITIES.len().min(strip.window_start + 1);
        let last = (strip.window_start + visible.len()).min(PRESET_CITIES.len());

        let max_start = cities::max_window_start(PRESET_CITIES.len(), STRIP_WINDOW);
        let arrow = |enabled: bool, symbol: &'static str| {
            let color = if enabled { Color::Cyan } else { Color::DarkGray };
            Span::styled(symbol, Style::default().fg(color))
        };
        let title = Line::from(vec![
            Span::styled(" Popular cities ", Style::default().bold()),
            arrow(strip.window_start > 0, "◀ "),
            Span::raw(format!("{}-{} of {}", first, last, PRESET_CITIES.len())),
            arrow(strip.window_start < max_start, " ▶"),
            Span::raw(" "),
        ]);
        let border = if props.is_focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::Rgb(80, 80, 100))
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(title);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let columns = Layout::horizontal(vec![Constraint::Ratio(1, STRIP_WINDOW as u32); STRIP_WINDOW])
            .split(inner);

        self.cards.clear();
        for (index, (city, card_area)) in visible.iter().zip(columns.iter().copied()).enumerate() {
            let is_selected = city.key == props.selected_city;
            let is_cursor = props.is_focused && index == strip.cursor;
            render_card(
                frame,
                card_area,
                city.label,
                strip.card(city.key),
                is_selected,
                is_cursor,
                props.tick_count,
            );
            self.cards.push((card_area, city.key));
        }
    }
}

fn render_card(
    frame: &mut Frame,
    area: Rect,
    label: &str,
    card: Option<&CardState>,
    is_selected: bool,
    is_cursor: bool,
    tick_count: u32,
) {
    let border = match (is_cursor, is_selected) {
        (true, _) => Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        (false, true) => Style::default().fg(Color::Yellow),
        (false, false) => Style::default().fg(Color::Rgb(60, 60, 80)),
    };
    let title_style = if is_selected {
        Style::default().fg(Color::Yellow).bold()
    } else {
        Style::default().fg(Color::White)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(Span::styled(label.to_string(), title_style))
        .title_alignment(Alignment::Center);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let value = match card {
        Some(CardState {
            snapshot: Some(snapshot),
            ..
        }) => Span::styled(
            format::temperature(snapshot.temperature),
            Style::default()
                .fg(temperature_color(snapshot.temperature))
                .bold(),
        ),
        Some(CardState { loading: true, .. }) => Span::styled(
            SPINNERS[(tick_count as usize / 2) % SPINNERS.len()],
            Style::default().fg(Color::Cyan),
        ),
        Some(CardState { error: Some(_), .. }) => {
            Span::styled("n/a", Style::default().fg(Color::Red))
        }
        _ => Span::styled("-", Style::default().fg(Color::DarkGray)),
    };
    frame.render_widget(Paragraph::new(Line::from(value)).alignment(Alignment::Center), inner);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::WeatherSnapshot;
    use meteo_dispatch::testing::*;

    fn props<'a>(strip: &'a StripState, is_focused: bool) -> CityStripProps<'a> {
        CityStripProps {
            strip,
            selected_city: "moscow",
            is_focused,
            tick_count: 0,
        }
    }

    #[test]
    fn test_paging_keys() {
        let mut component = CityStrip::new();
        let strip = StripState::default();
        component
            .handle_event(&EventKind::Key(key("]")), props(&strip, true))
            .assert_first(Action::StripNextPage);
        component
            .handle_event(&EventKind::Key(key("pageup")), props(&strip, true))
            .assert_first(Action::StripPrevPage);
        component
            .handle_event(&EventKind::Key(key("right")), props(&strip, true))
            .assert_first(Action::StripCursorMove(1));
        component
            .handle_event(&EventKind::Key(key("]")), props(&strip, false))
            .assert_empty();
    }

    #[test]
    fn test_enter_selects_card_under_cursor() {
        let mut component = CityStrip::new();
        let strip = StripState {
            window_start: 4,
            cursor: 1,
            ..Default::default()
        };
        component
            .handle_event(&EventKind::Key(key("enter")), props(&strip, true))
            .assert_first(Action::CitySelect("berlin".into()));
    }

    #[test]
    fn test_render_window_and_click_selects() {
        let mut harness = RenderHarness::new(80, 6);
        let mut component = CityStrip::new();
        let mut strip = StripState {
            window_start: 4,
            ..Default::default()
        };
        strip.cards.insert(
            "berlin".into(),
            CardState {
                snapshot: Some(WeatherSnapshot {
                    name: "berlin".into(),
                    temperature: 7.5,
                    timestamp: "2024-01-01T12:00:00Z".into(),
                }),
                ..Default::default()
            },
        );
        strip.cards.insert(
            "rome".into(),
            CardState {
                error: Some("timeout".into()),
                ..Default::default()
            },
        );

        let output = harness.render_to_string_plain(|frame| {
            component.render(frame, frame.area(), props(&strip, false));
        });
        assert!(output.contains("5-8 of 12"));
        for label in ["Tokyo", "Berlin", "Rome", "Madrid"] {
            assert!(output.contains(label), "missing {label} in\n{output}");
        }
        assert!(!output.contains("Moscow"));
        assert!(output.contains("7.5°C"));
        assert!(output.contains("n/a"));

        // Second card spans columns 20..39 of the 78-wide inner area.
        component
            .handle_event(&click(25, 3), props(&strip, false))
            .assert_first(Action::CitySelect("berlin".into()));
        component
            .handle_event(&click(0, 0), props(&strip, false))
            .assert_empty();
    }
}
