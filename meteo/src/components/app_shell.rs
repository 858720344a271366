//! Page layout, focus routing and global keys

use chrono::{DateTime, Utc};
use crossterm::event::{KeyCode, KeyModifiers};
use meteo_dispatch::{EventKind, EventOutcome};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
};

use super::{
    CityLookup, CityLookupProps, CityStrip, CityStripProps, Component, HelpBar, HelpBarProps,
    WeatherPanel, WeatherPanelProps, WorldMap, WorldMapProps,
};
use crate::action::Action;
use crate::state::{AppState, Focus};

/// Owns the pane components and the areas they were last drawn in
#[derive(Default)]
pub struct AppShell {
    lookup: CityLookup,
    panel: WeatherPanel,
    strip: CityStrip,
    map: WorldMap,
    help: HelpBar,
}

impl AppShell {
    pub fn new() -> Self {
        Self::default()
    }

    fn lookup_props(state: &AppState) -> CityLookupProps<'_> {
        CityLookupProps {
            lookup: &state.lookup,
            is_focused: state.focus == Focus::Lookup,
            tick_count: state.tick_count,
        }
    }

    fn panel_props(state: &AppState, now: DateTime<Utc>) -> WeatherPanelProps<'_> {
        WeatherPanelProps {
            panel: &state.panel,
            city: &state.selected_city,
            tick_count: state.tick_count,
            now,
            is_focused: state.focus == Focus::Panel,
        }
    }

    fn strip_props(state: &AppState) -> CityStripProps<'_> {
        CityStripProps {
            strip: &state.strip,
            selected_city: &state.selected_city,
            is_focused: state.focus == Focus::Strip,
            tick_count: state.tick_count,
        }
    }

    fn map_props(state: &AppState) -> WorldMapProps<'_> {
        WorldMapProps {
            map: &state.map,
            selected_city: &state.selected_city,
            is_focused: state.focus == Focus::Map,
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, state: &AppState, now: DateTime<Utc>) {
        let [lookup, panel, strip, map, help] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Length(9),
            Constraint::Length(5),
            Constraint::Min(6),
            Constraint::Length(1),
        ])
        .areas(area);

        self.lookup.render(frame, lookup, Self::lookup_props(state));
        self.panel.render(frame, panel, Self::panel_props(state, now));
        self.strip.render(frame, strip, Self::strip_props(state));
        self.map.render(frame, map, Self::map_props(state));
        self.help
            .render(frame, help, HelpBarProps { focus: state.focus });

        // Last, so the dropdown overlays the panes below the input.
        self.lookup
            .render_dropdown(frame, lookup, area, Self::lookup_props(state));
    }

    pub fn map_event(&mut self, event: &EventKind, state: &AppState) -> EventOutcome<Action> {
        match event {
            EventKind::Resize(width, height) => {
                return EventOutcome::action(Action::UiTerminalResize(*width, *height))
                    .with_render();
            }
            EventKind::Key(key) => {
                if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c')
                {
                    return EventOutcome::action(Action::Quit);
                }
                match key.code {
                    KeyCode::Tab => return EventOutcome::action(Action::UiFocusNext),
                    KeyCode::BackTab => return EventOutcome::action(Action::UiFocusPrev),
                    // In the search box `q` is text.
                    KeyCode::Char('q')
                        if state.focus != Focus::Lookup && key.modifiers.is_empty() =>
                    {
                        return EventOutcome::action(Action::Quit);
                    }
                    _ => {}
                }
                return match state.focus {
                    // Cursor moves inside the input change no state.
                    Focus::Lookup => EventOutcome::from_actions(
                        self.lookup.handle_event(event, Self::lookup_props(state)),
                    )
                    .with_render(),
                    Focus::Panel => EventOutcome::from_actions(
                        self.panel
                            .handle_event(event, Self::panel_props(state, Utc::now())),
                    ),
                    Focus::Strip => EventOutcome::from_actions(
                        self.strip.handle_event(event, Self::strip_props(state)),
                    ),
                    Focus::Map => EventOutcome::from_actions(
                        self.map.handle_event(event, Self::map_props(state)),
                    ),
                };
            }
            _ => {}
        }

        // Mouse: the dropdown sits on top and swallows everything inside it.
        if let Some((column, row)) = event.position() {
            if self.lookup.overlay_contains(column, row) {
                return self
                    .lookup
                    .handle_event(event, Self::lookup_props(state))
                    .into();
            }
        }
        let actions = self
            .panel
            .handle_event(event, Self::panel_props(state, Utc::now()));
        if !actions.is_empty() {
            return actions.into();
        }
        let actions = self.strip.handle_event(event, Self::strip_props(state));
        if !actions.is_empty() {
            return actions.into();
        }
        self.map.handle_event(event, Self::map_props(state)).into()
    }
}
