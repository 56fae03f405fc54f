use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;

use crate::{
    air_quality::fetch_air_quality,
    current::fetch_current,
    error::WeatherError,
    forecast::fetch_forecast,
    model::{Coordinates, LocationQuery, ResolvedLocation, WeatherReport},
    provider::WeatherProvider,
    resolver::{resolve_city, resolve_coordinates},
};

/// Label used when reverse geocoding finds nothing for the coordinates.
pub const CURRENT_LOCATION_PLACEHOLDER: &str = "Current Location";

const WEATHER_SERVICE: &str = "Weather";
const FORECAST_SERVICE: &str = "Forecast";

/// Runs one lookup end to end: resolve, fetch, assemble.
#[derive(Debug, Clone)]
pub struct WeatherService {
    provider: Arc<dyn WeatherProvider>,
}

impl WeatherService {
    pub fn new(provider: Arc<dyn WeatherProvider>) -> Self {
        Self { provider }
    }

    pub async fn weather(&self, query: LocationQuery) -> Result<WeatherReport, WeatherError> {
        let location = self.locate(query).await?;
        let Coordinates { lat, lon } = location.coordinates;
        let provider = self.provider.as_ref();

        // Current and forecast are mandatory; the first failure wins and the
        // other calls are dropped.
        let (current, forecast, air_quality) = tokio::try_join!(
            async {
                fetch_current(provider, lat, lon)
                    .await
                    .map_err(|err| WeatherError::from_provider(WEATHER_SERVICE, err))
            },
            async {
                fetch_forecast(provider, lat, lon)
                    .await
                    .map_err(|err| WeatherError::from_provider(WEATHER_SERVICE, err))
            },
            async { Ok::<_, WeatherError>(fetch_air_quality(provider, lat, lon).await) },
        )?;

        Ok(WeatherReport {
            current,
            forecast,
            air_quality,
            location,
            timestamp: Utc::now(),
        })
    }

    /// The provider's three-hour forecast, unmodified.
    pub async fn hourly_forecast(&self, coordinates: Coordinates) -> Result<Value, WeatherError> {
        self.provider
            .forecast_raw(coordinates.lat, coordinates.lon)
            .await
            .map_err(|err| WeatherError::from_provider(FORECAST_SERVICE, err))
    }

    async fn locate(&self, query: LocationQuery) -> Result<ResolvedLocation, WeatherError> {
        match query {
            LocationQuery::City(city) => resolve_city(self.provider.as_ref(), &city)
                .await
                .ok_or(WeatherError::LocationNotFound(city)),
            LocationQuery::Coordinates(coordinates) => {
                let location = resolve_coordinates(self.provider.as_ref(), coordinates).await;
                Ok(location.unwrap_or_else(|| ResolvedLocation {
                    name: CURRENT_LOCATION_PLACEHOLDER.to_string(),
                    country: String::new(),
                    state: String::new(),
                    coordinates,
                }))
            }
        }
    }
}
