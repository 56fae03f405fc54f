use std::{collections::BTreeMap, time::Duration};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{
    cache::{CacheTarget, ResponseCache, cache_key},
    config::Config,
    error::{ProviderError, WeatherError},
};

use super::WeatherProvider;

const DIRECT_GEOCODE_PATH: &str = "/geo/1.0/direct";
const REVERSE_GEOCODE_PATH: &str = "/geo/1.0/reverse";
const CURRENT_WEATHER_PATH: &str = "/data/2.5/weather";
const FORECAST_PATH: &str = "/data/2.5/forecast";
const AIR_POLLUTION_PATH: &str = "/data/2.5/air_pollution";

/// Candidates requested from either geocoding endpoint.
const GEOCODE_LIMIT: &str = "10";
/// Five days of three-hour slots.
const FORECAST_SLOTS: &str = "40";

#[derive(Debug)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
    cache: Option<ResponseCache>,
}

impl OpenWeatherProvider {
    pub fn new(
        api_key: String,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| ProviderError::Transport {
                endpoint: "client",
                source,
            })?;

        Ok(Self {
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
            cache: None,
        })
    }

    /// Build the provider the server runs with. Fails with
    /// `MissingConfiguration` when no credential is set.
    pub fn from_config(config: &Config) -> Result<Self, WeatherError> {
        let api_key = config.require_api_key()?.to_owned();
        let provider = Self::new(api_key, config.base_url.as_str(), config.request_timeout())
            .map_err(|err| WeatherError::Internal(err.to_string()))?;

        Ok(match config.cache_ttl() {
            Some(ttl) => provider.with_cache(ttl),
            None => provider,
        })
    }

    pub fn with_cache(mut self, ttl: Duration) -> Self {
        self.cache = Some(ResponseCache::new(ttl));
        self
    }

    async fn get_json(
        &self,
        endpoint: &'static str,
        target: CacheTarget<'_>,
        extra: &[(&str, &str)],
    ) -> Result<Value, ProviderError> {
        let key = cache_key(endpoint, target);
        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.get(&key) {
                tracing::debug!(endpoint, %key, "serving provider response from cache");
                return Ok(hit);
            }
        }

        let mut query: Vec<(&str, String)> = match target {
            CacheTarget::City(city) => vec![("q", city.to_string())],
            CacheTarget::Coordinates { lat, lon } => {
                vec![("lat", lat.to_string()), ("lon", lon.to_string())]
            }
        };
        query.extend(extra.iter().map(|(k, v)| (*k, (*v).to_string())));
        query.push(("appid", self.api_key.clone()));

        let url = format!("{}{}", self.base_url, endpoint);

        // The URL carries the credential, so strip it from transport errors.
        let res = self
            .http
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|source| ProviderError::Transport {
                endpoint,
                source: source.without_url(),
            })?;

        let status = res.status();
        let body = res.text().await.map_err(|source| ProviderError::Transport {
            endpoint,
            source: source.without_url(),
        })?;

        if !status.is_success() {
            return Err(ProviderError::Status {
                endpoint,
                status,
                body: truncate_body(&body),
            });
        }

        let value: Value = serde_json::from_str(&body)
            .map_err(|source| ProviderError::Decode { endpoint, source })?;

        tracing::debug!(endpoint, %status, "provider call succeeded");

        if let Some(cache) = &self.cache {
            cache.insert(key, value.clone());
        }

        Ok(value)
    }

    async fn get_typed<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        target: CacheTarget<'_>,
        extra: &[(&str, &str)],
    ) -> Result<T, ProviderError> {
        let value = self.get_json(endpoint, target, extra).await?;
        serde_json::from_value(value).map_err(|source| ProviderError::Decode { endpoint, source })
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn direct_geocode(&self, city: &str) -> Result<Vec<OwGeoCandidate>, ProviderError> {
        self.get_typed(
            DIRECT_GEOCODE_PATH,
            CacheTarget::City(city),
            &[("limit", GEOCODE_LIMIT)],
        )
        .await
    }

    async fn reverse_geocode(
        &self,
        lat: f64,
        lon: f64,
    ) -> Result<Vec<OwGeoCandidate>, ProviderError> {
        self.get_typed(
            REVERSE_GEOCODE_PATH,
            CacheTarget::Coordinates { lat, lon },
            &[("limit", GEOCODE_LIMIT)],
        )
        .await
    }

    async fn current_weather(
        &self,
        lat: f64,
        lon: f64,
    ) -> Result<OwCurrentResponse, ProviderError> {
        self.get_typed(
            CURRENT_WEATHER_PATH,
            CacheTarget::Coordinates { lat, lon },
            &[("units", "metric")],
        )
        .await
    }

    async fn forecast(&self, lat: f64, lon: f64) -> Result<OwForecastResponse, ProviderError> {
        self.get_typed(
            FORECAST_PATH,
            CacheTarget::Coordinates { lat, lon },
            &[("units", "metric"), ("cnt", FORECAST_SLOTS)],
        )
        .await
    }

    async fn forecast_raw(&self, lat: f64, lon: f64) -> Result<Value, ProviderError> {
        self.get_json(
            FORECAST_PATH,
            CacheTarget::Coordinates { lat, lon },
            &[("units", "metric"), ("cnt", FORECAST_SLOTS)],
        )
        .await
    }

    async fn air_pollution(
        &self,
        lat: f64,
        lon: f64,
    ) -> Result<OwAirPollutionResponse, ProviderError> {
        self.get_typed(AIR_POLLUTION_PATH, CacheTarget::Coordinates { lat, lon }, &[])
            .await
    }
}

/// One match from the direct or reverse geocoding endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OwGeoCandidate {
    #[serde(default)]
    pub name: String,
    pub local_names: Option<BTreeMap<String, String>>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub importance: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OwMain {
    pub temp: f64,
    pub feels_like: f64,
    pub humidity: u8,
    pub pressure: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OwCondition {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OwWind {
    /// m/s under metric units.
    pub speed: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OwSys {
    pub sunrise: i64,
    pub sunset: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OwCurrentResponse {
    pub dt: i64,
    pub main: OwMain,
    #[serde(default)]
    pub weather: Vec<OwCondition>,
    pub wind: OwWind,
    /// Metres.
    pub visibility: Option<f64>,
    pub sys: OwSys,
    /// Shift from UTC in seconds for the requested location.
    #[serde(default)]
    pub timezone: i32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OwForecastMain {
    pub temp_min: f64,
    pub temp_max: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OwForecastEntry {
    pub dt: i64,
    pub main: OwForecastMain,
    #[serde(default)]
    pub weather: Vec<OwCondition>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OwCity {
    #[serde(default)]
    pub timezone: i32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OwForecastResponse {
    pub list: Vec<OwForecastEntry>,
    #[serde(default)]
    pub city: OwCity,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OwAirIndex {
    pub aqi: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OwAirSample {
    pub main: OwAirIndex,
    #[serde(default)]
    pub components: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OwAirPollutionResponse {
    #[serde(default)]
    pub list: Vec<OwAirSample>,
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}
