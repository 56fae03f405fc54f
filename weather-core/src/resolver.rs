//! Forward and reverse geocoding with their best-match policies.
//!
//! Both lookups are soft: an empty candidate list or a failed call yields
//! `None`, and the caller decides what that means.

use crate::{
    model::{Coordinates, ResolvedLocation},
    provider::{WeatherProvider, openweather::OwGeoCandidate},
};

/// Pick the first candidate whose name equals `query` ignoring case, falling
/// back to the first candidate in provider order.
pub fn select_forward<'a>(
    query: &str,
    candidates: &'a [OwGeoCandidate],
) -> Option<&'a OwGeoCandidate> {
    let wanted = query.trim().to_lowercase();
    candidates
        .iter()
        .find(|c| c.name.to_lowercase() == wanted)
        .or_else(|| candidates.first())
}

/// Pick the most important candidate that carries localized names, returning
/// it with its display name (English when available).
///
/// When no candidate has localized names, the first candidate in the
/// provider's original order wins, not the most important one.
pub fn select_reverse(candidates: &[OwGeoCandidate]) -> Option<(String, &OwGeoCandidate)> {
    let mut by_importance: Vec<&OwGeoCandidate> = candidates.iter().collect();
    // Stable, so equal importance keeps provider order.
    by_importance.sort_by(|a, b| b.importance.total_cmp(&a.importance));

    let localized = by_importance.into_iter().find_map(|c| {
        let names = c.local_names.as_ref().filter(|names| !names.is_empty())?;
        let name = names
            .get("en")
            .filter(|en| !en.is_empty())
            .cloned()
            .unwrap_or_else(|| c.name.clone());
        Some((name, c))
    });

    localized.or_else(|| candidates.first().map(|c| (c.name.clone(), c)))
}

/// Resolve a city name to coordinates.
pub async fn resolve_city(provider: &dyn WeatherProvider, city: &str) -> Option<ResolvedLocation> {
    let city = city.trim();
    let candidates = match provider.direct_geocode(city).await {
        Ok(candidates) => candidates,
        Err(err) => {
            tracing::warn!(%city, error = %err, "geocoding failed");
            return None;
        }
    };

    let Some(best) = select_forward(city, &candidates) else {
        tracing::info!(%city, "no geocoding results");
        return None;
    };

    let (Some(lat), Some(lon)) = (best.lat, best.lon) else {
        tracing::warn!(%city, name = %best.name, "geocoding match has no coordinates");
        return None;
    };

    let name = if best.name.is_empty() { city.to_string() } else { best.name.clone() };
    tracing::debug!(%city, %name, lat, lon, "geocoding selected");

    Some(ResolvedLocation {
        name,
        country: best.country.clone(),
        state: best.state.clone(),
        coordinates: Coordinates { lat, lon },
    })
}

/// Find a human-readable label for coordinates. The returned location always
/// carries the input coordinates unchanged.
pub async fn resolve_coordinates(
    provider: &dyn WeatherProvider,
    coordinates: Coordinates,
) -> Option<ResolvedLocation> {
    let Coordinates { lat, lon } = coordinates;
    let candidates = match provider.reverse_geocode(lat, lon).await {
        Ok(candidates) => candidates,
        Err(err) => {
            tracing::warn!(lat, lon, error = %err, "reverse geocoding failed");
            return None;
        }
    };

    let (name, best) = select_reverse(&candidates)?;
    tracing::debug!(%name, importance = best.importance, "reverse geocode selected");

    Some(ResolvedLocation {
        name,
        country: best.country.clone(),
        state: best.state.clone(),
        coordinates,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn candidate(name: &str) -> OwGeoCandidate {
        OwGeoCandidate {
            name: name.to_string(),
            lat: Some(1.0),
            lon: Some(2.0),
            ..OwGeoCandidate::default()
        }
    }

    fn ranked(name: &str, importance: f64, local: &[(&str, &str)]) -> OwGeoCandidate {
        OwGeoCandidate {
            importance,
            local_names: (!local.is_empty()).then(|| {
                local
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect::<BTreeMap<_, _>>()
            }),
            ..candidate(name)
        }
    }

    #[test]
    fn forward_prefers_first_case_insensitive_match() {
        let mut candidates = vec![candidate("Springfield"), candidate("springfield")];
        candidates[0].state = "Illinois".into();
        candidates[1].state = "Missouri".into();

        let best = select_forward("Springfield", &candidates).unwrap();
        assert_eq!(best.state, "Illinois");
    }

    #[test]
    fn forward_exact_match_wins_regardless_of_position() {
        let candidates = vec![candidate("Parisot"), candidate("Paris Hill"), candidate("PARIS")];

        let best = select_forward("paris", &candidates).unwrap();
        assert_eq!(best.name, "PARIS");
    }

    #[test]
    fn forward_falls_back_to_first_candidate() {
        let candidates = vec![candidate("Londonderry"), candidate("London Colney")];

        let best = select_forward("London", &candidates).unwrap();
        assert_eq!(best.name, "Londonderry");
    }

    #[test]
    fn forward_with_no_candidates_is_none() {
        assert!(select_forward("Atlantis", &[]).is_none());
    }

    #[test]
    fn reverse_skips_important_candidate_without_local_names() {
        let candidates = vec![
            ranked("Low", 0.3, &[]),
            ranked("High", 0.9, &[]),
            ranked("Mid", 0.5, &[("en", "Middleton")]),
        ];

        let (name, best) = select_reverse(&candidates).unwrap();
        assert_eq!(name, "Middleton");
        assert_eq!(best.importance, 0.5);
    }

    #[test]
    fn reverse_prefers_higher_importance_among_localized() {
        let candidates = vec![
            ranked("Low", 0.3, &[("en", "Lowton")]),
            ranked("Mid", 0.5, &[("de", "Mitte")]),
        ];

        let (name, best) = select_reverse(&candidates).unwrap();
        assert_eq!(best.importance, 0.5);
        // No English entry, so the default name is used.
        assert_eq!(name, "Mid");
    }

    #[test]
    fn reverse_without_local_names_uses_original_order() {
        let candidates = vec![ranked("First", 0.1, &[]), ranked("Important", 0.9, &[])];

        let (name, _) = select_reverse(&candidates).unwrap();
        assert_eq!(name, "First");
    }

    #[test]
    fn reverse_empty_local_names_count_as_missing() {
        let mut empty = ranked("Empty", 0.9, &[]);
        empty.local_names = Some(BTreeMap::new());
        let candidates = vec![empty, ranked("Named", 0.1, &[("en", "Named En")])];

        let (name, _) = select_reverse(&candidates).unwrap();
        assert_eq!(name, "Named En");
    }

    #[test]
    fn reverse_with_no_candidates_is_none() {
        assert!(select_reverse(&[]).is_none());
    }
}
