//! Core library for the weather aggregator.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The upstream provider seam and its OpenWeather implementation
//! - Location resolution, the three fetchers and forecast aggregation
//! - Report assembly and the request error taxonomy
//!
//! It is used by `weather-server`, but has no HTTP surface of its own.

pub mod air_quality;
pub mod cache;
pub mod config;
pub mod current;
pub mod error;
pub mod forecast;
pub mod model;
pub mod provider;
pub mod resolver;
pub mod service;

pub use config::Config;
pub use error::{ProviderError, WeatherError};
pub use model::{
    AirQuality, AqiLevel, Coordinates, CurrentConditions, DailyForecastEntry, LocationQuery,
    ResolvedLocation, WeatherReport,
};
pub use provider::{WeatherProvider, openweather::OpenWeatherProvider};
pub use service::{CURRENT_LOCATION_PLACEHOLDER, WeatherService};
