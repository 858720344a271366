//! Terminal weather lookup
//!
//! A city search with debounced suggestions, a weather panel for the
//! selected city that polls every two minutes, a strip of popular cities
//! refreshed every five minutes and a world map with clickable markers.
//! All panes share one selected city held in [`state::AppState`].

pub mod action;
pub mod api;
pub mod cities;
pub mod components;
pub mod config;
pub mod effect;
pub mod format;
pub mod reducer;
pub mod state;

/// Animation tick period for spinners
pub const TICK_MS: u64 = 100;
