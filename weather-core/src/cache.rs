use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use parking_lot::Mutex;
use serde_json::Value;

/// In-memory TTL cache for successful provider responses.
///
/// Keys are built by [`cache_key`] so nearby coordinates and differently-cased
/// city names share an entry. Expired entries are dropped on access, and every
/// insert sweeps whatever else has expired so distinct keys cannot pile up.
#[derive(Debug)]
pub struct ResponseCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, CachedBody>>,
}

#[derive(Debug, Clone)]
struct CachedBody {
    stored_at: Instant,
    body: Value,
}

/// What an outbound call is about, used to derive its cache key.
#[derive(Debug, Clone, Copy)]
pub enum CacheTarget<'a> {
    City(&'a str),
    Coordinates { lat: f64, lon: f64 },
}

pub fn cache_key(endpoint: &str, target: CacheTarget<'_>) -> String {
    match target {
        CacheTarget::City(city) => format!("{endpoint}?q={}", city.trim().to_lowercase()),
        CacheTarget::Coordinates { lat, lon } => format!("{endpoint}?lat={lat:.2}&lon={lon:.2}"),
    }
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.get_at(key, Instant::now())
    }

    pub fn insert(&self, key: String, body: Value) {
        self.insert_at(key, body, Instant::now());
    }

    fn get_at(&self, key: &str, now: Instant) -> Option<Value> {
        let mut entries = self.entries.lock();
        let entry = entries.get(key)?;
        if now.saturating_duration_since(entry.stored_at) > self.ttl {
            entries.remove(key);
            return None;
        }
        Some(entry.body.clone())
    }

    fn insert_at(&self, key: String, body: Value, now: Instant) {
        let mut entries = self.entries.lock();
        entries.retain(|_, entry| now.saturating_duration_since(entry.stored_at) <= self.ttl);
        entries.insert(
            key,
            CachedBody {
                stored_at: now,
                body,
            },
        );
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.lock().len()
    }

    #[cfg(test)]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn coordinates_are_rounded_in_key() {
        let a = CacheTarget::Coordinates { lat: 51.50721, lon: -0.12758 };
        let b = CacheTarget::Coordinates { lat: 51.50702, lon: -0.12801 };
        let a = cache_key("/data/2.5/weather", a);
        let b = cache_key("/data/2.5/weather", b);
        assert_eq!(a, b);
        assert_eq!(a, "/data/2.5/weather?lat=51.51&lon=-0.13");
    }

    #[test]
    fn city_key_ignores_case_and_padding() {
        let a = cache_key("/geo/1.0/direct", CacheTarget::City(" Paris "));
        let b = cache_key("/geo/1.0/direct", CacheTarget::City("paris"));
        assert_eq!(a, b);
    }

    #[test]
    fn endpoint_is_part_of_key() {
        let target = CacheTarget::Coordinates { lat: 1.0, lon: 2.0 };
        assert_ne!(
            cache_key("/data/2.5/weather", target),
            cache_key("/data/2.5/forecast", target)
        );
    }

    #[test]
    fn fresh_entry_is_returned() {
        let cache = ResponseCache::new(Duration::from_secs(300));
        let now = Instant::now();
        cache.insert_at("k".into(), json!({"temp": 20}), now);

        let hit = cache.get_at("k", now + Duration::from_secs(299));
        assert_eq!(hit, Some(json!({"temp": 20})));
    }

    #[test]
    fn expired_entry_is_evicted() {
        let cache = ResponseCache::new(Duration::from_secs(300));
        let now = Instant::now();
        cache.insert_at("k".into(), json!([]), now);

        assert_eq!(cache.get_at("k", now + Duration::from_secs(301)), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn insert_sweeps_expired_keys() {
        let cache = ResponseCache::new(Duration::from_secs(300));
        let start = Instant::now();
        for i in 0..1_000 {
            let target = CacheTarget::Coordinates { lat: i as f64 / 100.0, lon: 0.0 };
            cache.insert_at(cache_key("/data/2.5/weather", target), json!(i), start);
        }
        assert_eq!(cache.len(), 1_000);

        let later = start + Duration::from_secs(3_600);
        cache.insert_at("fresh".into(), json!("new"), later);

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get_at("fresh", later), Some(json!("new")));
    }

    #[test]
    fn insert_keeps_entries_still_within_ttl() {
        let cache = ResponseCache::new(Duration::from_secs(300));
        let start = Instant::now();
        cache.insert_at("old".into(), json!(1), start);
        cache.insert_at("recent".into(), json!(2), start + Duration::from_secs(200));

        cache.insert_at("new".into(), json!(3), start + Duration::from_secs(400));

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get_at("old", start + Duration::from_secs(400)), None);
    }
}
