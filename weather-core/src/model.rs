use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::WeatherError;

/// What the client asked about. Exactly one form arrives per request.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationQuery {
    City(String),
    Coordinates(Coordinates),
}

impl LocationQuery {
    /// Validate a city lookup. Blank or missing names are rejected before any
    /// upstream call is made.
    pub fn city(raw: Option<&str>) -> Result<Self, WeatherError> {
        match raw.map(str::trim) {
            Some(city) if !city.is_empty() => Ok(LocationQuery::City(city.to_string())),
            _ => Err(WeatherError::InvalidInput("City name is required".into())),
        }
    }

    pub fn coordinates(lat: Option<&str>, lon: Option<&str>) -> Result<Self, WeatherError> {
        Coordinates::parse(lat, lon).map(LocationQuery::Coordinates)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    /// Parse raw query parameters. Both must be present and non-empty, and both
    /// must parse as finite floats.
    pub fn parse(lat: Option<&str>, lon: Option<&str>) -> Result<Self, WeatherError> {
        let (Some(lat), Some(lon)) = (non_empty(lat), non_empty(lon)) else {
            return Err(WeatherError::InvalidInput(
                "Latitude and longitude are required".into(),
            ));
        };

        match (lat.parse::<f64>(), lon.parse::<f64>()) {
            (Ok(lat), Ok(lon)) if lat.is_finite() && lon.is_finite() => Ok(Self { lat, lon }),
            _ => Err(WeatherError::InvalidInput("Invalid coordinates".into())),
        }
    }
}

fn non_empty(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedLocation {
    #[serde(rename = "city")]
    pub name: String,
    pub country: String,
    /// Empty when the provider reports no subdivision.
    pub state: String,
    pub coordinates: Coordinates,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub temp: f64,
    pub feels_like: f64,
    pub description: String,
    pub icon: String,
    pub humidity: u8,
    /// km/h
    #[serde(rename = "wind")]
    pub wind_speed: f64,
    /// hPa
    pub pressure: u32,
    /// km
    pub visibility: f64,
    pub sunrise: String,
    pub sunset: String,
    pub observation_time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecastEntry {
    pub date: NaiveDate,
    pub day_name: String,
    pub temp_min: f64,
    pub temp_max: f64,
    pub main_condition: String,
    pub icon: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AqiLevel {
    Good,
    Fair,
    Moderate,
    Poor,
    #[serde(rename = "Very Poor")]
    VeryPoor,
    Unknown,
}

impl AqiLevel {
    /// Provider index 1..=5; anything else is `Unknown`.
    pub fn from_index(aqi: u32) -> Self {
        match aqi {
            1 => AqiLevel::Good,
            2 => AqiLevel::Fair,
            3 => AqiLevel::Moderate,
            4 => AqiLevel::Poor,
            5 => AqiLevel::VeryPoor,
            _ => AqiLevel::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirQuality {
    pub aqi: u32,
    pub level: AqiLevel,
    /// Pollutant name to concentration in μg/m³.
    pub components: BTreeMap<String, f64>,
}

/// Response root for the combined lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub current: CurrentConditions,
    pub forecast: Vec<DailyForecastEntry>,
    pub air_quality: Option<AirQuality>,
    pub location: ResolvedLocation,
    pub timestamp: DateTime<Utc>,
}

/// Round to one decimal place, the precision of every temperature and distance
/// we emit.
pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
