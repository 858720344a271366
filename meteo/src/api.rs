//! Weather service client
//!
//! Two endpoints, both `GET`:
//! - `/{city}` returns a [`WeatherSnapshot`], non-2xx for unknown cities
//! - `/cities/search?q=<text>` returns a list of [`CitySearchResult`]

use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;
use url::Url;

use crate::state::{CitySearchResult, WeatherSnapshot};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection, DNS or timeout failure
    #[error("weather service unreachable: {0}")]
    Transport(#[source] reqwest::Error),

    /// The service has no data for the city
    #[error("no data found for \"{city}\"")]
    NotFound { city: String },

    /// Any other non-success status
    #[error("weather service returned {status}")]
    Status { status: StatusCode },

    /// The body was not the expected JSON
    #[error("unexpected response from weather service: {0}")]
    Decode(#[source] reqwest::Error),
}

/// Client for one weather service base URL; cheap to clone
#[derive(Clone, Debug)]
pub struct WeatherClient {
    http: reqwest::Client,
    base_url: Url,
}

impl WeatherClient {
    pub fn new(base_url: Url) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(ApiError::Transport)?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.as_str().trim_end_matches('/'), path)
    }

    /// `GET /{city}`
    pub async fn fetch_weather(&self, city: &str) -> Result<WeatherSnapshot, ApiError> {
        let url = self.endpoint(&urlencoding::encode(city));
        tracing::debug!(%url, "Fetching weather");

        let response = self.http.get(&url).send().await.map_err(ApiError::Transport)?;
        match response.status() {
            status if status.is_success() => response.json().await.map_err(ApiError::Decode),
            StatusCode::NOT_FOUND => Err(ApiError::NotFound {
                city: city.to_string(),
            }),
            status => Err(ApiError::Status { status }),
        }
    }

    /// `GET /cities/search?q=<query>`
    pub async fn search_cities(&self, query: &str) -> Result<Vec<CitySearchResult>, ApiError> {
        let url = format!(
            "{}?q={}",
            self.endpoint("cities/search"),
            urlencoding::encode(query)
        );
        tracing::debug!(%url, "Searching cities");

        let response = self.http.get(&url).send().await.map_err(ApiError::Transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status { status });
        }
        response.json().await.map_err(ApiError::Decode)
    }
}
