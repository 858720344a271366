//! # Configuration
//!
//! Override hierarchy: defaults → config file → env vars → CLI flags.
//!
//! The file lives at `<config_dir>/meteo/config.toml` unless `--config`
//! points elsewhere. Every field is optional.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::state::{DEFAULT_CITY, normalize_city};

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_API_URL: &str = "http://localhost:8080";
pub const DEFAULT_WEATHER_REFRESH_SECS: u64 = 120;
pub const DEFAULT_STRIP_REFRESH_SECS: u64 = 300;
pub const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 300;

/// Upper bound for both refresh intervals (one day)
pub const MAX_REFRESH_SECS: u64 = 24 * 60 * 60;
/// Upper bound for the search debounce
pub const MAX_SEARCH_DEBOUNCE_MS: u64 = 10_000;

pub const ENV_API_URL: &str = "METEO_API_URL";
pub const ENV_CITY: &str = "METEO_CITY";

// ============================================================================
// File config (sparse TOML)
// ============================================================================

#[derive(Debug, Default, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub api_url: Option<String>,
    pub default_city: Option<String>,
    pub weather_refresh_secs: Option<u64>,
    pub strip_refresh_secs: Option<u64>,
    pub search_debounce_ms: Option<u64>,
    pub log_file: Option<PathBuf>,
}

/// Values given on the command line
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub api_url: Option<String>,
    pub city: Option<String>,
    pub log_file: Option<PathBuf>,
    pub refresh_interval_secs: Option<u64>,
}

// ============================================================================
// Resolved config (concrete values)
// ============================================================================

/// Timer settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    pub weather_refresh: Duration,
    pub strip_refresh: Duration,
    pub search_debounce: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            weather_refresh: Duration::from_secs(DEFAULT_WEATHER_REFRESH_SECS),
            strip_refresh: Duration::from_secs(DEFAULT_STRIP_REFRESH_SECS),
            search_debounce: Duration::from_millis(DEFAULT_SEARCH_DEBOUNCE_MS),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub api_url: Url,
    pub default_city: String,
    pub timings: Timings,
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid API URL {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("API URL {0:?} must use http or https")]
    UnsupportedScheme(String),

    #[error("{0} must be greater than zero")]
    ZeroInterval(&'static str),

    #[error("{field} = {value} exceeds the maximum of {max}")]
    OutOfRange {
        field: &'static str,
        value: u64,
        max: u64,
    },
}

// ============================================================================
// Loading
// ============================================================================

/// `<config_dir>/meteo/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("meteo").join("config.toml"))
}

impl FileConfig {
    pub fn parse(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Read a config file. A missing file is only an error when `required`.
    pub fn load(path: &Path, required: bool) -> Result<Self, ConfigError> {
        if !required && !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&contents, path)?;
        tracing::debug!(path = %path.display(), ?config, "Loaded config");
        Ok(config)
    }
}

/// Load the file (explicit path or the default location) and resolve it
/// against the process environment and the CLI.
pub fn load(explicit: Option<&Path>, cli: &CliOverrides) -> Result<ResolvedConfig, ConfigError> {
    let file = match (explicit, default_config_path()) {
        (Some(path), _) => FileConfig::load(path, true)?,
        (None, Some(path)) => FileConfig::load(&path, false)?,
        (None, None) => FileConfig::default(),
    };
    resolve(&file, |name| std::env::var(name).ok(), cli)
}

// ============================================================================
// Resolution
// ============================================================================

/// Collapse defaults → file → env → CLI into concrete values.
///
/// `env` looks up one environment variable.
pub fn resolve(
    file: &FileConfig,
    env: impl Fn(&str) -> Option<String>,
    cli: &CliOverrides,
) -> Result<ResolvedConfig, ConfigError> {
    // API URL: CLI → env → file → default
    let api_url = cli
        .api_url
        .clone()
        .or_else(|| env(ENV_API_URL))
        .or_else(|| file.api_url.clone())
        .unwrap_or_else(|| DEFAULT_API_URL.to_string());
    let api_url = parse_api_url(&api_url)?;

    // City: CLI → env → file → default
    let default_city = cli
        .city
        .clone()
        .or_else(|| env(ENV_CITY))
        .or_else(|| file.default_city.clone())
        .map(|city| normalize_city(&city))
        .filter(|city| !city.is_empty())
        .unwrap_or_else(|| DEFAULT_CITY.to_string());

    let weather_refresh_secs = cli
        .refresh_interval_secs
        .or(file.weather_refresh_secs)
        .unwrap_or(DEFAULT_WEATHER_REFRESH_SECS);
    let strip_refresh_secs = file.strip_refresh_secs.unwrap_or(DEFAULT_STRIP_REFRESH_SECS);
    let search_debounce_ms = file.search_debounce_ms.unwrap_or(DEFAULT_SEARCH_DEBOUNCE_MS);

    if weather_refresh_secs == 0 {
        return Err(ConfigError::ZeroInterval("weather_refresh_secs"));
    }
    if strip_refresh_secs == 0 {
        return Err(ConfigError::ZeroInterval("strip_refresh_secs"));
    }
    check_max("weather_refresh_secs", weather_refresh_secs, MAX_REFRESH_SECS)?;
    check_max("strip_refresh_secs", strip_refresh_secs, MAX_REFRESH_SECS)?;
    check_max("search_debounce_ms", search_debounce_ms, MAX_SEARCH_DEBOUNCE_MS)?;

    Ok(ResolvedConfig {
        api_url,
        default_city,
        timings: Timings {
            weather_refresh: Duration::from_secs(weather_refresh_secs),
            strip_refresh: Duration::from_secs(strip_refresh_secs),
            search_debounce: Duration::from_millis(search_debounce_ms),
        },
        log_file: cli.log_file.clone().or_else(|| file.log_file.clone()),
    })
}

fn check_max(field: &'static str, value: u64, max: u64) -> Result<(), ConfigError> {
    if value > max {
        return Err(ConfigError::OutOfRange { field, value, max });
    }
    Ok(())
}

fn parse_api_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|source| ConfigError::InvalidUrl {
        url: raw.to_string(),
        source,
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(ConfigError::UnsupportedScheme(raw.to_string())),
    }
}
