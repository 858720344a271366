//! Reducer - (state, action) -> (changed, effects)
//!
//! All state mutations happen here. Network work and timers are declared
//! as [`Effect`]s and executed by the effect handler.

use meteo_dispatch::DispatchResult;

use crate::action::Action;
use crate::cities::{self, PRESET_CITIES, STRIP_WINDOW};
use crate::effect::Effect;
use crate::state::{AppState, CardState, LookupState, normalize_city};

pub fn reducer(state: &mut AppState, action: Action) -> DispatchResult<Effect> {
    match action {
        // ===== Lookup =====
        Action::LookupQueryChange(query) => {
            state.lookup.query = query;
            state.lookup.highlighted = 0;
            state.lookup.error = None;
            match state.lookup.searchable_query().map(str::to_string) {
                Some(query) => {
                    state.lookup.searching = true;
                    DispatchResult::changed_with(Effect::SearchCities { query })
                }
                None => {
                    state.lookup.results.clear();
                    state.lookup.searching = false;
                    DispatchResult::changed_with(Effect::CancelSearch)
                }
            }
        }

        Action::LookupDidLoad { query, results } => {
            if state.lookup.searchable_query() != Some(query.as_str()) {
                tracing::debug!(%query, "Dropping stale search results");
                return DispatchResult::unchanged();
            }
            state.lookup.results = results;
            state.lookup.highlighted = 0;
            state.lookup.searching = false;
            state.lookup.error = None;
            DispatchResult::changed()
        }

        Action::LookupDidError { query, error } => {
            if state.lookup.searchable_query() != Some(query.as_str()) {
                return DispatchResult::unchanged();
            }
            state.lookup.results.clear();
            state.lookup.searching = false;
            state.lookup.error = Some(error);
            DispatchResult::changed()
        }

        Action::LookupHighlight(index) => {
            let Some(last) = state.lookup.results.len().checked_sub(1) else {
                return DispatchResult::unchanged();
            };
            let index = index.min(last);
            if index == state.lookup.highlighted {
                return DispatchResult::unchanged();
            }
            state.lookup.highlighted = index;
            DispatchResult::changed()
        }

        Action::LookupConfirm => {
            let key = match state.lookup.results.get(state.lookup.highlighted) {
                Some(result) => result.city_key(),
                None => match state.lookup.searchable_query() {
                    Some(query) => normalize_city(query),
                    None => return DispatchResult::unchanged(),
                },
            };
            state.lookup = LookupState::default();
            let mut result = select_city(state, &key).with(Effect::CancelSearch);
            result.changed = true;
            result
        }

        Action::LookupClear => {
            if state.lookup == LookupState::default() {
                return DispatchResult::unchanged();
            }
            state.lookup = LookupState::default();
            DispatchResult::changed_with(Effect::CancelSearch)
        }

        // ===== Selection =====
        Action::CitySelect(city) => select_city(state, &city),

        // ===== Weather panel =====
        Action::WeatherFetch => {
            state.panel.loading = true;
            state.panel.error = None;
            DispatchResult::changed_with(Effect::FetchWeather {
                city: state.selected_city.clone(),
            })
        }

        Action::WeatherDidLoad {
            city,
            snapshot,
            fetched_at,
        } => {
            if city != state.selected_city {
                tracing::debug!(%city, selected = %state.selected_city, "Dropping stale weather");
                return DispatchResult::unchanged();
            }
            state.panel.snapshot = Some(snapshot);
            state.panel.last_updated = Some(fetched_at);
            state.panel.loading = false;
            state.panel.error = None;
            DispatchResult::changed()
        }

        Action::WeatherDidError { city, error } => {
            if city != state.selected_city {
                return DispatchResult::unchanged();
            }
            state.panel.loading = false;
            state.panel.error = Some(error);
            DispatchResult::changed()
        }

        // ===== Strip =====
        Action::StripFetchAll => {
            let effects = PRESET_CITIES
                .iter()
                .map(|city| {
                    state.strip.cards.entry(city.key.to_string()).or_default().loading = true;
                    Effect::FetchCard {
                        city: city.key.to_string(),
                    }
                })
                .collect();
            DispatchResult::changed_with_many(effects)
        }

        Action::StripDidLoad { city, snapshot } => {
            let Some(card) = preset_card(state, &city) else {
                return DispatchResult::unchanged();
            };
            *card = CardState {
                loading: false,
                snapshot: Some(snapshot),
                error: None,
            };
            DispatchResult::changed()
        }

        Action::StripDidError { city, error } => {
            let Some(card) = preset_card(state, &city) else {
                return DispatchResult::unchanged();
            };
            card.loading = false;
            card.error = Some(error);
            DispatchResult::changed()
        }

        Action::StripNextPage => {
            let start =
                cities::next_window_start(state.strip.window_start, PRESET_CITIES.len(), STRIP_WINDOW);
            move_window(state, start)
        }

        Action::StripPrevPage => {
            let start = cities::prev_window_start(state.strip.window_start, STRIP_WINDOW);
            move_window(state, start)
        }

        Action::StripCursorMove(delta) => {
            let visible = cities::window(state.strip.window_start).len();
            let cursor = state
                .strip
                .cursor
                .saturating_add_signed(delta)
                .min(visible.saturating_sub(1));
            if cursor == state.strip.cursor {
                return DispatchResult::unchanged();
            }
            state.strip.cursor = cursor;
            DispatchResult::changed()
        }

        // ===== Map =====
        Action::MapPan { lon, lat } => {
            let before = state.map.viewport;
            let (step_lon, step_lat) = before.pan_step();
            state
                .map
                .viewport
                .pan(f64::from(lon) * step_lon, f64::from(lat) * step_lat);
            changed_if(state.map.viewport != before)
        }

        Action::MapZoomIn => {
            let before = state.map.viewport;
            state.map.viewport.zoom_in();
            changed_if(state.map.viewport != before)
        }

        Action::MapZoomOut => {
            let before = state.map.viewport;
            state.map.viewport.zoom_out();
            changed_if(state.map.viewport != before)
        }

        Action::MapReset => {
            let before = state.map.viewport;
            state.map.viewport = Default::default();
            changed_if(state.map.viewport != before)
        }

        Action::MapMarkerCycle(delta) => {
            let len = PRESET_CITIES.len() as isize;
            let cursor = (state.map.marker_cursor as isize + delta).rem_euclid(len) as usize;
            if cursor == state.map.marker_cursor {
                return DispatchResult::unchanged();
            }
            state.map.marker_cursor = cursor;
            DispatchResult::changed()
        }

        // ===== UI =====
        Action::UiFocusNext => {
            state.focus = state.focus.next();
            DispatchResult::changed()
        }

        Action::UiFocusPrev => {
            state.focus = state.focus.prev();
            DispatchResult::changed()
        }

        Action::UiTerminalResize(width, height) => {
            if state.terminal_size == (width, height) {
                return DispatchResult::unchanged();
            }
            state.terminal_size = (width, height);
            DispatchResult::changed()
        }

        // ===== Global =====
        Action::Tick => {
            state.tick_count = state.tick_count.wrapping_add(1);
            // Only re-render while a spinner is visible.
            changed_if(state.is_busy())
        }

        // Handled by the runtime loop.
        Action::Quit => DispatchResult::unchanged(),
    }
}

/// Make `city` the shared selection.
///
/// Re-selecting the current city is a no-op. A new city resets the panel
/// error, starts a fetch that supersedes any fetch in flight and restarts
/// the polling interval.
fn select_city(state: &mut AppState, city: &str) -> DispatchResult<Effect> {
    let key = normalize_city(city);
    if key.is_empty() || key == state.selected_city {
        return DispatchResult::unchanged();
    }

    tracing::info!(city = %key, "City selected");
    if let Some(index) = cities::position(&key) {
        state.map.marker_cursor = index;
    }
    state.selected_city = key.clone();
    state.panel.loading = true;
    state.panel.error = None;
    DispatchResult::changed_with_many(vec![
        Effect::FetchWeather { city: key },
        Effect::ScheduleWeatherRefresh,
    ])
}

fn preset_card<'a>(state: &'a mut AppState, city: &str) -> Option<&'a mut CardState> {
    cities::find(city)?;
    Some(state.strip.cards.entry(city.to_string()).or_default())
}

fn move_window(state: &mut AppState, start: usize) -> DispatchResult<Effect> {
    if start == state.strip.window_start {
        return DispatchResult::unchanged();
    }
    state.strip.window_start = start;
    state.strip.cursor = state
        .strip
        .cursor
        .min(cities::window(start).len().saturating_sub(1));
    DispatchResult::changed()
}

fn changed_if(changed: bool) -> DispatchResult<Effect> {
    if changed {
        DispatchResult::changed()
    } else {
        DispatchResult::unchanged()
    }
}
