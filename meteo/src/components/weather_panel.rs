//! Current weather for the selected city

use chrono::{DateTime, Utc};
use crossterm::event::KeyCode;
use meteo_dispatch::EventKind;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Flex, Layout, Position, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use super::{Component, ERROR_ICON, SPINNERS};
use crate::action::Action;
use crate::format;
use crate::state::{PanelState, WeatherSnapshot};

pub struct WeatherPanelProps<'a> {
    pub panel: &'a PanelState,
    /// Selected city key
    pub city: &'a str,
    pub tick_count: u32,
    /// Reference time for "N min ago"
    pub now: DateTime<Utc>,
    pub is_focused: bool,
}

/// Weather panel; remembers its area so a click can retry after an error
#[derive(Default)]
pub struct WeatherPanel {
    area: Option<Rect>,
}

impl WeatherPanel {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Component<Action> for WeatherPanel {
    type Props<'a> = WeatherPanelProps<'a>;

    fn handle_event(&mut self, event: &EventKind, props: WeatherPanelProps<'_>) -> Vec<Action> {
        if let Some((column, row)) = event.click_position() {
            let inside = self
                .area
                .is_some_and(|area| area.contains(Position::new(column, row)));
            return if inside && props.panel.error.is_some() && !props.panel.loading {
                vec![Action::WeatherFetch]
            } else {
                vec![]
            };
        }

        if !props.is_focused {
            return vec![];
        }
        match event {
            EventKind::Key(key) => match key.code {
                KeyCode::Char('r') | KeyCode::F(5) => vec![Action::WeatherFetch],
                _ => vec![],
            },
            _ => vec![],
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, props: WeatherPanelProps<'_>) {
        self.area = Some(area);
        let spinner = SPINNERS[(props.tick_count as usize / 2) % SPINNERS.len()];

        let mut title = vec![Span::styled(" ☁ Weather ", Style::default().fg(Color::Cyan).bold())];
        if props.panel.loading {
            title.push(Span::styled(
                format!("{} ", spinner),
                Style::default().fg(Color::Yellow),
            ));
        }
        let border = if props.is_focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::Rgb(80, 80, 100))
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(Line::from(title))
            .title_alignment(Alignment::Center);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let lines = body_lines(&props, spinner);
        let [body] = Layout::vertical([Constraint::Length(lines.len() as u16)])
            .flex(Flex::Center)
            .areas(inner);
        frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), body);
    }
}

enum PanelView<'a> {
    Loading,
    Error(&'a str),
    Ready(&'a WeatherSnapshot),
    Empty,
}

impl<'a> PanelView<'a> {
    fn from_props(props: &WeatherPanelProps<'a>) -> Self {
        let panel = props.panel;
        match (&panel.snapshot, panel.error.as_deref()) {
            (Some(snapshot), _) => PanelView::Ready(snapshot),
            (None, _) if panel.loading => PanelView::Loading,
            (None, Some(error)) => PanelView::Error(error),
            (None, None) => PanelView::Empty,
        }
    }
}

fn body_lines(props: &WeatherPanelProps<'_>, spinner: &'static str) -> Vec<Line<'static>> {
    match PanelView::from_props(props) {
        PanelView::Loading => vec![Line::from(vec![
            Span::styled(spinner, Style::default().fg(Color::Cyan)),
            Span::styled(
                format!(" Loading weather for {}...", format::capitalize(props.city)),
                Style::default().fg(Color::Gray),
            ),
        ])],
        PanelView::Error(error) => vec![
            error_line(error),
            Line::from(""),
            retry_hint(),
        ],
        PanelView::Ready(snapshot) => {
            let mut lines = vec![
                Line::from(Span::styled(
                    format::capitalize(&snapshot.name),
                    Style::default().fg(Color::White).bold(),
                )),
                Line::from(Span::styled(
                    format::temperature(snapshot.temperature),
                    Style::default()
                        .fg(temperature_color(snapshot.temperature))
                        .bold(),
                )),
                Line::from(Span::styled(
                    format::observed_at(&snapshot.timestamp),
                    Style::default().fg(Color::Gray),
                )),
            ];
            if let Some(ago) = props
                .panel
                .last_updated
                .and_then(|updated| format::updated_ago(updated, props.now))
            {
                lines.push(Line::from(Span::styled(
                    format!("Updated {}", ago),
                    Style::default().fg(Color::DarkGray),
                )));
            }
            if let Some(error) = props.panel.error.as_deref() {
                lines.push(error_line(error));
                lines.push(retry_hint());
            }
            lines
        }
        PanelView::Empty => vec![Line::from(vec![
            Span::styled("Press ", Style::default().fg(Color::DarkGray)),
            Span::styled("r", Style::default().fg(Color::Cyan).bold()),
            Span::styled(" to fetch weather", Style::default().fg(Color::DarkGray)),
        ])],
    }
}

fn error_line(error: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{} ", ERROR_ICON), Style::default().fg(Color::Red)),
        Span::styled(error.to_string(), Style::default().fg(Color::Rgb(200, 100, 100))),
    ])
}

fn retry_hint() -> Line<'static> {
    Line::from(vec![
        Span::styled("Press ", Style::default().fg(Color::DarkGray)),
        Span::styled("r", Style::default().fg(Color::Cyan).bold()),
        Span::styled(" or click to retry", Style::default().fg(Color::DarkGray)),
    ])
}

/// Temperature-based color
pub fn temperature_color(celsius: f64) -> Color {
    match celsius.round() as i32 {
        ..=-10 => Color::Rgb(150, 200, 255),
        -9..=0 => Color::Rgb(100, 180, 255),
        1..=10 => Color::Rgb(100, 220, 200),
        11..=20 => Color::Rgb(150, 230, 150),
        21..=30 => Color::Rgb(255, 220, 100),
        31..=40 => Color::Rgb(255, 150, 80),
        _ => Color::Rgb(255, 100, 100),
    }
}
