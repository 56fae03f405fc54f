//! Daily summaries from the provider's three-hour forecast slots.

use std::collections::HashMap;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

use crate::{
    current::location_offset,
    error::ProviderError,
    model::{DailyForecastEntry, round1},
    provider::{WeatherProvider, openweather::OwForecastEntry},
};

pub const MAX_FORECAST_DAYS: usize = 5;

pub async fn fetch_forecast(
    provider: &dyn WeatherProvider,
    lat: f64,
    lon: f64,
) -> Result<Vec<DailyForecastEntry>, ProviderError> {
    let raw = provider.forecast(lat, lon).await?;
    let offset = location_offset(raw.city.timezone);
    let today = Utc::now().with_timezone(&offset).date_naive();

    Ok(aggregate_daily(&raw.list, offset, today))
}

#[derive(Debug)]
struct DayBucket {
    date: NaiveDate,
    temp_min: f64,
    temp_max: f64,
    conditions: Vec<String>,
    icons: Vec<String>,
}

/// Bucket slots by calendar date in `offset`, drop `today`, and summarize at
/// most [`MAX_FORECAST_DAYS`] following days in date order.
pub fn aggregate_daily(
    entries: &[OwForecastEntry],
    offset: FixedOffset,
    today: NaiveDate,
) -> Vec<DailyForecastEntry> {
    let mut buckets: Vec<DayBucket> = Vec::new();
    let mut index: HashMap<NaiveDate, usize> = HashMap::new();

    for entry in entries {
        let Some(at) = DateTime::<Utc>::from_timestamp(entry.dt, 0) else {
            tracing::debug!(dt = entry.dt, "skipping forecast slot with invalid timestamp");
            continue;
        };
        let date = at.with_timezone(&offset).date_naive();

        let slot = *index.entry(date).or_insert_with(|| {
            buckets.push(DayBucket {
                date,
                temp_min: entry.main.temp_min,
                temp_max: entry.main.temp_max,
                conditions: Vec::new(),
                icons: Vec::new(),
            });
            buckets.len() - 1
        });

        let bucket = &mut buckets[slot];
        bucket.temp_min = bucket.temp_min.min(entry.main.temp_min);
        bucket.temp_max = bucket.temp_max.max(entry.main.temp_max);

        if let Some(condition) = entry.weather.first() {
            bucket.conditions.push(condition.description.clone());
            if !bucket.icons.contains(&condition.icon) {
                bucket.icons.push(condition.icon.clone());
            }
        }
    }

    buckets
        .into_iter()
        .filter(|bucket| bucket.date != today)
        .take(MAX_FORECAST_DAYS)
        .map(|bucket| DailyForecastEntry {
            date: bucket.date,
            day_name: bucket.date.format("%A").to_string(),
            temp_min: round1(bucket.temp_min),
            temp_max: round1(bucket.temp_max),
            main_condition: most_frequent(&bucket.conditions)
                .unwrap_or("Unknown")
                .to_string(),
            icon: bucket.icons.into_iter().next().unwrap_or_default(),
        })
        .collect()
}

/// The value whose count first reaches the highest count in a single pass.
fn most_frequent(values: &[String]) -> Option<&str> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut best: Option<(&str, usize)> = None;

    for value in values {
        let count = counts.entry(value.as_str()).or_insert(0);
        *count += 1;
        if best.is_none_or(|(_, top)| *count > top) {
            best = Some((value.as_str(), *count));
        }
    }

    best.map(|(value, _)| value)
}
