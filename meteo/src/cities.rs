//! Preset cities offered for one-click selection
//!
//! The strip pages through this list four cards at a time and the world map
//! draws one marker per entry.

/// Number of cards visible in the strip at once
pub const STRIP_WINDOW: usize = 4;

/// A city from the fixed catalog
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PresetCity {
    /// Lowercase key used in requests and as the selection value
    pub key: &'static str,
    /// Display label
    pub label: &'static str,
    pub lon: f64,
    pub lat: f64,
}

const fn preset(key: &'static str, label: &'static str, lon: f64, lat: f64) -> PresetCity {
    PresetCity {
        key,
        label,
        lon,
        lat,
    }
}

pub const PRESET_CITIES: [PresetCity; 12] = [
    preset("moscow", "Moscow", 37.6173, 55.7558),
    preset("london", "London", -0.1278, 51.5074),
    preset("paris", "Paris", 2.3522, 48.8566),
    preset("new york", "New York", -74.0060, 40.7128),
    preset("tokyo", "Tokyo", 139.6503, 35.6762),
    preset("berlin", "Berlin", 13.4050, 52.5200),
    preset("rome", "Rome", 12.4964, 41.9028),
    preset("madrid", "Madrid", -3.7038, 40.4168),
    preset("kyiv", "Kyiv", 30.5234, 50.4501),
    preset("beijing", "Beijing", 116.4074, 39.9042),
    preset("sydney", "Sydney", 151.2093, -33.8688),
    preset("cairo", "Cairo", 31.2357, 30.0444),
];

/// Look up a preset by key.
pub fn find(key: &str) -> Option<&'static PresetCity> {
    PRESET_CITIES.iter().find(|city| city.key == key)
}

/// Index of a preset in the catalog.
pub fn position(key: &str) -> Option<usize> {
    PRESET_CITIES.iter().position(|city| city.key == key)
}

/// Largest valid window start for `len` entries.
pub fn max_window_start(len: usize, window: usize) -> usize {
    len.saturating_sub(window)
}

/// Window start after "next": `start + window`, clamped to the last full window.
pub fn next_window_start(start: usize, len: usize, window: usize) -> usize {
    (start + window).min(max_window_start(len, window))
}

/// Window start after "previous": `start - window`, clamped at zero.
pub fn prev_window_start(start: usize, window: usize) -> usize {
    start.saturating_sub(window)
}

/// The presets visible from `start`.
pub fn window(start: usize) -> &'static [PresetCity] {
    let start = start.min(max_window_start(PRESET_CITIES.len(), STRIP_WINDOW));
    let end = (start + STRIP_WINDOW).min(PRESET_CITIES.len());
    &PRESET_CITIES[start..end]
}
