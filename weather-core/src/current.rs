use chrono::{DateTime, FixedOffset, Offset, Utc};

use crate::{
    error::ProviderError,
    model::{CurrentConditions, round1},
    provider::{WeatherProvider, openweather::OwCurrentResponse},
};

const MPS_TO_KMH: f64 = 3.6;

pub async fn fetch_current(
    provider: &dyn WeatherProvider,
    lat: f64,
    lon: f64,
) -> Result<CurrentConditions, ProviderError> {
    let raw = provider.current_weather(lat, lon).await?;
    Ok(reshape_current(&raw))
}

/// Convert the provider payload to metric report units. Clock times are
/// rendered in the location's own offset; the observation time in UTC.
pub fn reshape_current(raw: &OwCurrentResponse) -> CurrentConditions {
    let offset = location_offset(raw.timezone);
    let condition = raw.weather.first();

    CurrentConditions {
        temp: round1(raw.main.temp),
        feels_like: round1(raw.main.feels_like),
        description: condition
            .map(|w| capitalize(&w.description))
            .unwrap_or_else(|| "Unknown".to_string()),
        icon: condition.map(|w| w.icon.clone()).unwrap_or_default(),
        humidity: raw.main.humidity,
        wind_speed: round1(raw.wind.speed * MPS_TO_KMH),
        pressure: raw.main.pressure,
        visibility: round1(raw.visibility.unwrap_or(0.0) / 1000.0),
        sunrise: format_clock(raw.sys.sunrise, &offset, "%H:%M"),
        sunset: format_clock(raw.sys.sunset, &offset, "%H:%M"),
        observation_time: format_clock(raw.dt, &Utc, "%H:%M UTC"),
    }
}

/// Offset east of UTC in seconds, falling back to UTC when out of range.
pub(crate) fn location_offset(seconds: i32) -> FixedOffset {
    FixedOffset::east_opt(seconds).unwrap_or_else(|| Utc.fix())
}

fn format_clock<Tz>(timestamp: i64, tz: &Tz, fmt: &str) -> String
where
    Tz: chrono::TimeZone,
    Tz::Offset: std::fmt::Display,
{
    DateTime::<Utc>::from_timestamp(timestamp, 0)
        .map(|t| t.with_timezone(tz).format(fmt).to_string())
        .unwrap_or_default()
}

/// Upper-case the first letter and lower-case the rest.
fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::openweather::{OwCondition, OwMain, OwSys, OwWind};

    // 2024-06-01 04:00:00 UTC
    const SUNRISE: i64 = 1_717_214_400;
    // 2024-06-01 20:00:00 UTC
    const SUNSET: i64 = 1_717_272_000;
    // 2024-06-01 12:00:00 UTC
    const OBSERVED: i64 = 1_717_243_200;

    fn raw() -> OwCurrentResponse {
        OwCurrentResponse {
            dt: OBSERVED,
            main: OwMain {
                temp: 21.37,
                feels_like: 20.94,
                humidity: 40,
                pressure: 1016,
            },
            weather: vec![OwCondition {
                description: "few CLOUDS".into(),
                icon: "02d".into(),
            }],
            wind: OwWind { speed: 3.5 },
            visibility: Some(9_870.0),
            sys: OwSys {
                sunrise: SUNRISE,
                sunset: SUNSET,
            },
            timezone: 7_200,
        }
    }

    #[test]
    fn converts_units_and_rounds() {
        let current = reshape_current(&raw());

        assert_eq!(current.temp, 21.4);
        assert_eq!(current.feels_like, 20.9);
        assert_eq!(current.wind_speed, 12.6);
        assert_eq!(current.visibility, 9.9);
        assert_eq!(current.humidity, 40);
        assert_eq!(current.pressure, 1016);
    }

    #[test]
    fn description_is_capitalized() {
        let current = reshape_current(&raw());
        assert_eq!(current.description, "Few clouds");
        assert_eq!(current.icon, "02d");
    }

    #[test]
    fn sun_times_use_location_offset() {
        let current = reshape_current(&raw());

        assert_eq!(current.sunrise, "06:00");
        assert_eq!(current.sunset, "22:00");
        assert_eq!(current.observation_time, "12:00 UTC");
    }

    #[test]
    fn missing_optional_fields_default() {
        let mut raw = raw();
        raw.visibility = None;
        raw.weather.clear();
        raw.timezone = 0;

        let current = reshape_current(&raw);

        assert_eq!(current.visibility, 0.0);
        assert_eq!(current.description, "Unknown");
        assert_eq!(current.icon, "");
        assert_eq!(current.sunrise, "04:00");
    }

    #[test]
    fn capitalize_handles_edge_cases() {
        assert_eq!(capitalize(""), "");
        assert_eq!(capitalize("rain"), "Rain");
        assert_eq!(capitalize("LIGHT RAIN"), "Light rain");
    }
}
