//! Application state - single source of truth
//!
//! Components receive borrowed slices of `AppState` as props; only the
//! reducer mutates it.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cities::PRESET_CITIES;

pub const DEFAULT_CITY: &str = "moscow";

/// Minimum trimmed query length before a search is issued
pub const MIN_QUERY_LEN: usize = 2;

/// Normalize a city identifier: trimmed and lowercased.
pub fn normalize_city(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Current weather for one city, as returned by `GET /{city}`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub name: String,
    /// Degrees Celsius
    pub temperature: f64,
    /// ISO-8601 observation time
    pub timestamp: String,
}

/// One entry of `GET /cities/search?q=`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CitySearchResult {
    pub name: String,
    #[serde(default)]
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl CitySearchResult {
    /// Selection key for this result
    pub fn city_key(&self) -> String {
        normalize_city(&self.name)
    }
}

/// Which pane receives key events
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Focus {
    #[default]
    Lookup,
    Panel,
    Strip,
    Map,
}

impl Focus {
    pub fn next(self) -> Self {
        match self {
            Focus::Lookup => Focus::Panel,
            Focus::Panel => Focus::Strip,
            Focus::Strip => Focus::Map,
            Focus::Map => Focus::Lookup,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Focus::Lookup => Focus::Map,
            Focus::Panel => Focus::Lookup,
            Focus::Strip => Focus::Panel,
            Focus::Map => Focus::Strip,
        }
    }
}

/// Search box and its result list
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LookupState {
    pub query: String,
    pub results: Vec<CitySearchResult>,
    pub highlighted: usize,
    /// A search is pending (debouncing or in flight)
    pub searching: bool,
    pub error: Option<String>,
}

impl LookupState {
    /// The trimmed query when it is long enough to search for.
    pub fn searchable_query(&self) -> Option<&str> {
        let trimmed = self.query.trim();
        (trimmed.chars().count() >= MIN_QUERY_LEN).then_some(trimmed)
    }
}

/// Weather panel for the selected city
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PanelState {
    pub snapshot: Option<WeatherSnapshot>,
    pub loading: bool,
    pub error: Option<String>,
    /// Local time of the last successful fetch
    pub last_updated: Option<DateTime<Utc>>,
}

/// Per-city state of one strip card
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CardState {
    pub loading: bool,
    pub snapshot: Option<WeatherSnapshot>,
    pub error: Option<String>,
}

/// Popular-cities strip
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StripState {
    /// Index of the first visible preset
    pub window_start: usize,
    /// Highlighted card, relative to `window_start`
    pub cursor: usize,
    /// Card state keyed by preset key
    pub cards: HashMap<String, CardState>,
}

impl StripState {
    pub fn card(&self, key: &str) -> Option<&CardState> {
        self.cards.get(key)
    }

    pub fn any_loading(&self) -> bool {
        self.cards.values().any(|card| card.loading)
    }
}

pub const MIN_ZOOM: f64 = 1.0;
pub const MAX_ZOOM: f64 = 8.0;

/// Visible region of the world map
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MapViewport {
    pub center_lon: f64,
    pub center_lat: f64,
    pub zoom: f64,
}

impl Default for MapViewport {
    fn default() -> Self {
        Self {
            center_lon: 0.0,
            center_lat: 20.0,
            zoom: MIN_ZOOM,
        }
    }
}

impl MapViewport {
    /// Longitude bounds `[west, east]`
    pub fn x_bounds(&self) -> [f64; 2] {
        let half = 180.0 / self.zoom;
        [self.center_lon - half, self.center_lon + half]
    }

    /// Latitude bounds `[south, north]`
    pub fn y_bounds(&self) -> [f64; 2] {
        let half = 90.0 / self.zoom;
        [self.center_lat - half, self.center_lat + half]
    }

    /// Degrees moved by one pan step at the current zoom
    pub fn pan_step(&self) -> (f64, f64) {
        (30.0 / self.zoom, 15.0 / self.zoom)
    }

    pub fn pan(&mut self, d_lon: f64, d_lat: f64) {
        self.center_lon = (self.center_lon + d_lon).clamp(-180.0, 180.0);
        self.center_lat = (self.center_lat + d_lat).clamp(-90.0, 90.0);
    }

    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom * 2.0).min(MAX_ZOOM);
    }

    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom / 2.0).max(MIN_ZOOM);
    }
}

/// World map pane
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MapState {
    pub viewport: MapViewport,
    /// Index into the preset catalog of the keyboard-highlighted marker
    pub marker_cursor: usize,
}

/// Application state - everything the UI needs to render
#[derive(Clone, Debug, PartialEq)]
pub struct AppState {
    /// The one shared value: lowercase key of the city shown in the panel
    pub selected_city: String,
    pub focus: Focus,
    pub lookup: LookupState,
    pub panel: PanelState,
    pub strip: StripState,
    pub map: MapState,
    /// Animation frame counter (for spinners)
    pub tick_count: u32,
    pub terminal_size: (u16, u16),
}

impl AppState {
    pub fn new(selected_city: &str) -> Self {
        let selected_city = match normalize_city(selected_city) {
            key if key.is_empty() => DEFAULT_CITY.to_string(),
            key => key,
        };
        let marker_cursor = PRESET_CITIES
            .iter()
            .position(|city| city.key == selected_city)
            .unwrap_or(0);
        Self {
            selected_city,
            focus: Focus::default(),
            lookup: LookupState::default(),
            panel: PanelState::default(),
            strip: StripState::default(),
            map: MapState {
                marker_cursor,
                ..MapState::default()
            },
            tick_count: 0,
            terminal_size: (80, 24),
        }
    }

    /// Anything that animates a spinner
    pub fn is_busy(&self) -> bool {
        self.panel.loading || self.lookup.searching || self.strip.any_loading()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(DEFAULT_CITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_normalizes_city() {
        let state = AppState::new("  Berlin ");
        assert_eq!(state.selected_city, "berlin");
        assert_eq!(state.map.marker_cursor, 5);

        let state = AppState::new("   ");
        assert_eq!(state.selected_city, DEFAULT_CITY);
    }

    #[test]
    fn test_focus_cycle() {
        let mut focus = Focus::Lookup;
        for _ in 0..4 {
            focus = focus.next();
        }
        assert_eq!(focus, Focus::Lookup);
        assert_eq!(Focus::Lookup.prev(), Focus::Map);
    }

    #[test]
    fn test_searchable_query() {
        let mut lookup = LookupState {
            query: " b ".into(),
            ..Default::default()
        };
        assert_eq!(lookup.searchable_query(), None);
        lookup.query = " be".into();
        assert_eq!(lookup.searchable_query(), Some("be"));
    }

    #[test]
    fn test_viewport_zoom_and_pan_clamp() {
        let mut viewport = MapViewport::default();
        viewport.zoom_out();
        assert_eq!(viewport.zoom, MIN_ZOOM);
        for _ in 0..5 {
            viewport.zoom_in();
        }
        assert_eq!(viewport.zoom, MAX_ZOOM);
        assert_eq!(viewport.x_bounds(), [-22.5, 22.5]);

        viewport.pan(500.0, -500.0);
        assert_eq!((viewport.center_lon, viewport.center_lat), (180.0, -90.0));
    }

    #[test]
    fn test_search_result_key() {
        let result = CitySearchResult {
            name: "New York".into(),
            country: "US".into(),
            latitude: 40.7,
            longitude: -74.0,
        };
        assert_eq!(result.city_key(), "new york");
    }
}
