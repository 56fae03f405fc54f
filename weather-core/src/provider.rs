use async_trait::async_trait;
use serde_json::Value;
use std::fmt::Debug;

use crate::error::ProviderError;
use crate::provider::openweather::{
    OwAirPollutionResponse, OwCurrentResponse, OwForecastResponse, OwGeoCandidate,
};

pub mod openweather;

/// The upstream weather API, one method per endpoint.
///
/// Implementations return the provider's own shapes; reshaping into report
/// types happens in the fetchers.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn direct_geocode(&self, city: &str) -> Result<Vec<OwGeoCandidate>, ProviderError>;

    async fn reverse_geocode(&self, lat: f64, lon: f64)
    -> Result<Vec<OwGeoCandidate>, ProviderError>;

    async fn current_weather(&self, lat: f64, lon: f64)
    -> Result<OwCurrentResponse, ProviderError>;

    async fn forecast(&self, lat: f64, lon: f64) -> Result<OwForecastResponse, ProviderError>;

    /// The forecast body exactly as the provider sent it.
    async fn forecast_raw(&self, lat: f64, lon: f64) -> Result<Value, ProviderError>;

    async fn air_pollution(&self, lat: f64, lon: f64)
    -> Result<OwAirPollutionResponse, ProviderError>;
}
