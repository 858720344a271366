//! Actions
//!
//! Naming convention: the prefix names the pane (`Lookup`, `Weather`,
//! `Strip`, `Map`, `Ui`), `Did` marks an async result.

use chrono::{DateTime, Utc};
use meteo_dispatch::ActionSummary;

use crate::state::{CitySearchResult, WeatherSnapshot};

#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    // ===== Lookup =====
    /// The search input text changed
    LookupQueryChange(String),

    /// Result: search finished for `query`
    LookupDidLoad {
        query: String,
        results: Vec<CitySearchResult>,
    },

    /// Result: search failed for `query`
    LookupDidError { query: String, error: String },

    /// Move the result highlight to an index
    LookupHighlight(usize),

    /// Choose the highlighted result (or the typed text when there are none)
    LookupConfirm,

    /// Clear the input and the results
    LookupClear,

    // ===== Selection =====
    /// Make a city the shared selection
    CitySelect(String),

    // ===== Weather panel =====
    /// Intent: fetch weather for the selected city
    WeatherFetch,

    /// Result: weather loaded
    WeatherDidLoad {
        city: String,
        snapshot: WeatherSnapshot,
        fetched_at: DateTime<Utc>,
    },

    /// Result: weather fetch failed
    WeatherDidError { city: String, error: String },

    // ===== Popular cities strip =====
    /// Intent: fetch every preset city
    StripFetchAll,

    StripDidLoad {
        city: String,
        snapshot: WeatherSnapshot,
    },

    StripDidError { city: String, error: String },

    StripNextPage,
    StripPrevPage,

    /// Move the card cursor by a signed offset within the window
    StripCursorMove(isize),

    // ===== World map =====
    /// Pan by pan steps (`-1`, `0` or `1` on each axis)
    MapPan { lon: i8, lat: i8 },
    MapZoomIn,
    MapZoomOut,
    MapReset,

    /// Move the marker highlight by a signed offset, wrapping
    MapMarkerCycle(isize),

    // ===== UI =====
    UiFocusNext,
    UiFocusPrev,
    UiTerminalResize(u16, u16),

    // ===== Global =====
    /// Periodic tick for spinners
    Tick,

    /// Exit the application
    Quit,
}

impl meteo_dispatch::Action for Action {
    fn name(&self) -> &'static str {
        match self {
            Action::LookupQueryChange(_) => "LookupQueryChange",
            Action::LookupDidLoad { .. } => "LookupDidLoad",
            Action::LookupDidError { .. } => "LookupDidError",
            Action::LookupHighlight(_) => "LookupHighlight",
            Action::LookupConfirm => "LookupConfirm",
            Action::LookupClear => "LookupClear",
            Action::CitySelect(_) => "CitySelect",
            Action::WeatherFetch => "WeatherFetch",
            Action::WeatherDidLoad { .. } => "WeatherDidLoad",
            Action::WeatherDidError { .. } => "WeatherDidError",
            Action::StripFetchAll => "StripFetchAll",
            Action::StripDidLoad { .. } => "StripDidLoad",
            Action::StripDidError { .. } => "StripDidError",
            Action::StripNextPage => "StripNextPage",
            Action::StripPrevPage => "StripPrevPage",
            Action::StripCursorMove(_) => "StripCursorMove",
            Action::MapPan { .. } => "MapPan",
            Action::MapZoomIn => "MapZoomIn",
            Action::MapZoomOut => "MapZoomOut",
            Action::MapReset => "MapReset",
            Action::MapMarkerCycle(_) => "MapMarkerCycle",
            Action::UiFocusNext => "UiFocusNext",
            Action::UiFocusPrev => "UiFocusPrev",
            Action::UiTerminalResize(..) => "UiTerminalResize",
            Action::Tick => "Tick",
            Action::Quit => "Quit",
        }
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        format!("{}...", text.chars().take(max - 3).collect::<String>())
    } else {
        text.to_string()
    }
}

/// Concise log lines for data-heavy actions
impl ActionSummary for Action {
    fn summary(&self) -> String {
        match self {
            Action::LookupDidLoad { query, results } => {
                format!("LookupDidLoad {{ query: {:?}, results: {} }}", query, results.len())
            }
            Action::WeatherDidLoad { city, snapshot, .. } => {
                format!(
                    "WeatherDidLoad {{ city: {:?}, temp: {}°C }}",
                    city, snapshot.temperature
                )
            }
            Action::StripDidLoad { city, snapshot } => {
                format!(
                    "StripDidLoad {{ city: {:?}, temp: {}°C }}",
                    city, snapshot.temperature
                )
            }
            Action::LookupDidError { query, error } => {
                format!("LookupDidError({:?}, {:?})", query, truncate(error, 40))
            }
            Action::WeatherDidError { city, error } => {
                format!("WeatherDidError({:?}, {:?})", city, truncate(error, 40))
            }
            Action::StripDidError { city, error } => {
                format!("StripDidError({:?}, {:?})", city, truncate(error, 40))
            }
            _ => format!("{:?}", self),
        }
    }
}
