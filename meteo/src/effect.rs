//! Effects - side effects declared by the reducer
//!
//! The reducer stays pure; [`EffectHandler`] turns each effect into a keyed
//! task or a subscription on the runtime.

use std::time::Duration;

use chrono::Utc;
use meteo_dispatch::{EffectContext, TaskKey};

use crate::action::Action;
use crate::api::WeatherClient;

/// Task key of the selected-city weather fetch
pub const WEATHER_TASK: &str = "weather";
/// Task key of the debounced city search
pub const SEARCH_TASK: &str = "city_search";
/// Subscription key of the panel polling interval
pub const WEATHER_REFRESH_SUB: &str = "weather_refresh";
/// Subscription key of the strip polling interval
pub const STRIP_REFRESH_SUB: &str = "strip_refresh";

/// Task key for one strip card
pub fn card_task(city: &str) -> String {
    format!("card:{}", city)
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Fetch weather for the panel; supersedes any fetch in flight
    FetchWeather { city: String },

    /// Restart the panel polling interval from now
    ScheduleWeatherRefresh,

    /// Search after the debounce delay; supersedes a pending search
    SearchCities { query: String },

    /// Drop a pending or in-flight search
    CancelSearch,

    /// Fetch weather for one strip card
    FetchCard { city: String },
}

/// Executes effects against the weather service
#[derive(Clone, Debug)]
pub struct EffectHandler {
    client: WeatherClient,
    weather_refresh: Duration,
    search_debounce: Duration,
}

impl EffectHandler {
    pub fn new(client: WeatherClient, weather_refresh: Duration, search_debounce: Duration) -> Self {
        Self {
            client,
            weather_refresh,
            search_debounce,
        }
    }

    pub fn handle(&self, effect: Effect, ctx: &mut EffectContext<Action>) {
        match effect {
            Effect::FetchWeather { city } => {
                let client = self.client.clone();
                ctx.tasks().spawn(WEATHER_TASK, async move {
                    match client.fetch_weather(&city).await {
                        Ok(snapshot) => Action::WeatherDidLoad {
                            city,
                            snapshot,
                            fetched_at: Utc::now(),
                        },
                        Err(e) => {
                            tracing::warn!(city = %city, error = %e, "Weather fetch failed");
                            Action::WeatherDidError {
                                city,
                                error: e.to_string(),
                            }
                        }
                    }
                });
            }

            Effect::ScheduleWeatherRefresh => {
                ctx.subscriptions()
                    .interval(WEATHER_REFRESH_SUB, self.weather_refresh, || {
                        Action::WeatherFetch
                    });
            }

            Effect::SearchCities { query } => {
                let client = self.client.clone();
                ctx.tasks()
                    .debounce(SEARCH_TASK, self.search_debounce, async move {
                        match client.search_cities(&query).await {
                            Ok(results) => Action::LookupDidLoad { query, results },
                            Err(e) => {
                                tracing::warn!(query = %query, error = %e, "City search failed");
                                Action::LookupDidError {
                                    query,
                                    error: e.to_string(),
                                }
                            }
                        }
                    });
            }

            Effect::CancelSearch => {
                ctx.tasks().cancel(&TaskKey::new(SEARCH_TASK));
            }

            Effect::FetchCard { city } => {
                let client = self.client.clone();
                ctx.tasks().spawn(card_task(&city), async move {
                    match client.fetch_weather(&city).await {
                        Ok(snapshot) => Action::StripDidLoad { city, snapshot },
                        Err(e) => {
                            tracing::debug!(city = %city, error = %e, "Card fetch failed");
                            Action::StripDidError {
                                city,
                                error: e.to_string(),
                            }
                        }
                    }
                });
            }
        }
    }
}
