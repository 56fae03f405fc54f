use crate::{
    model::{AirQuality, AqiLevel},
    provider::{WeatherProvider, openweather::OwAirPollutionResponse},
};

/// Air quality never fails a request: any error or empty payload is `None`.
pub async fn fetch_air_quality(
    provider: &dyn WeatherProvider,
    lat: f64,
    lon: f64,
) -> Option<AirQuality> {
    match provider.air_pollution(lat, lon).await {
        Ok(raw) => {
            let air = reshape_air_quality(raw);
            if air.is_none() {
                tracing::debug!(lat, lon, "air quality payload had no samples");
            }
            air
        }
        Err(err) => {
            tracing::warn!(lat, lon, error = %err, "air quality fetch failed");
            None
        }
    }
}

pub fn reshape_air_quality(raw: OwAirPollutionResponse) -> Option<AirQuality> {
    let sample = raw.list.into_iter().next()?;
    Some(AirQuality {
        aqi: sample.main.aqi,
        level: AqiLevel::from_index(sample.main.aqi),
        components: sample.components,
    })
}
