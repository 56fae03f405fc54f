use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State, rejection::JsonRejection, rejection::QueryRejection},
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use weather_core::{
    Config, Coordinates, LocationQuery, OpenWeatherProvider, WeatherError, WeatherReport,
    WeatherService,
};

use crate::error::ApiError;

/// Shared handler state. `service` is absent when no API key was configured;
/// every lookup then fails with a configuration error.
#[derive(Debug, Clone)]
pub struct AppState {
    service: Option<WeatherService>,
}

impl AppState {
    pub fn new(service: WeatherService) -> Self {
        Self {
            service: Some(service),
        }
    }

    pub fn unconfigured() -> Self {
        Self { service: None }
    }

    pub fn from_config(config: &Config) -> Self {
        match OpenWeatherProvider::from_config(config) {
            Ok(provider) => Self::new(WeatherService::new(Arc::new(provider))),
            Err(err) => {
                tracing::error!(error = %err, "weather provider not available; lookups will fail");
                Self::unconfigured()
            }
        }
    }

    fn service(&self) -> Result<&WeatherService, ApiError> {
        self.service
            .as_ref()
            .ok_or(ApiError(WeatherError::MissingConfiguration))
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/get_weather",
            get(weather_by_coordinates).post(weather_by_city),
        )
        .route("/get_hourly_forecast", get(hourly_forecast))
        .route("/health", get(health))
        .with_state(state)
}

#[derive(Debug, Default, Deserialize)]
pub struct CoordinateParams {
    lat: Option<String>,
    lon: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CityRequest {
    city: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    status: &'static str,
    timestamp: DateTime<Utc>,
}

fn coordinate_params(params: Result<Query<CoordinateParams>, QueryRejection>) -> CoordinateParams {
    params.map(|Query(params)| params).unwrap_or_default()
}

async fn weather_by_coordinates(
    State(state): State<AppState>,
    params: Result<Query<CoordinateParams>, QueryRejection>,
) -> Result<Json<WeatherReport>, ApiError> {
    let service = state.service()?;
    let params = coordinate_params(params);
    let query = LocationQuery::coordinates(params.lat.as_deref(), params.lon.as_deref())?;

    Ok(Json(service.weather(query).await?))
}

async fn weather_by_city(
    State(state): State<AppState>,
    payload: Result<Json<CityRequest>, JsonRejection>,
) -> Result<Json<WeatherReport>, ApiError> {
    let service = state.service()?;
    let city = match payload {
        Ok(Json(body)) => body.city,
        Err(rejection) => {
            tracing::debug!(%rejection, "unreadable city request body");
            None
        }
    };
    let query = LocationQuery::city(city.as_deref())?;

    Ok(Json(service.weather(query).await?))
}

async fn hourly_forecast(
    State(state): State<AppState>,
    params: Result<Query<CoordinateParams>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let service = state.service()?;
    let params = coordinate_params(params);
    let coordinates = Coordinates::parse(params.lat.as_deref(), params.lon.as_deref())?;

    Ok(Json(service.hourly_forecast(coordinates).await?))
}

async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "healthy",
        timestamp: Utc::now(),
    })
}
