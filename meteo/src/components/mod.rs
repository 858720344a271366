pub mod app_shell;
pub mod city_lookup;
pub mod city_strip;
pub mod help_bar;
pub mod weather_panel;
pub mod world_map;

// Re-export core Component trait
pub use meteo_dispatch::Component;

pub use app_shell::AppShell;
pub use city_lookup::{CityLookup, CityLookupProps};
pub use city_strip::{CityStrip, CityStripProps};
pub use help_bar::{HelpBar, HelpBarProps};
pub use weather_panel::{WeatherPanel, WeatherPanelProps, temperature_color};
pub use world_map::{WorldMap, WorldMapProps, marker_at, marker_cell};

pub const ERROR_ICON: &str = "⚠";
pub const SPINNERS: [&str; 4] = ["◐", "◓", "◑", "◒"];
