// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Wander contributors

use crate::geo::LatLng;
use crate::{Result, TripError};
use log::debug;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

pub const PLACEHOLDER_NO_ORIGIN: &str = "Where do you want to go?";
pub const PLACEHOLDER_HAS_ORIGIN: &str = "Where to next?";

pub fn placeholder_for(has_origin: bool) -> &'static str {
    if has_origin {
        PLACEHOLDER_HAS_ORIGIN
    } else {
        PLACEHOLDER_NO_ORIGIN
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceGeometry {
    pub coordinates: [f64; 2],
}

/// One geocoder search result, shaped like a Mapbox places feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodedPlace {
    /// Short label, e.g. "Coit Tower".
    pub text: String,
    /// Full label, e.g. "Coit Tower, 1 Telegraph Hill Blvd, San Francisco, ...".
    #[serde(default)]
    pub place_name: String,
    pub geometry: PlaceGeometry,
}

impl GeocodedPlace {
    pub fn coordinates(&self) -> [f64; 2] {
        self.geometry.coordinates
    }

    pub fn position(&self) -> LatLng {
        LatLng::from_lon_lat(self.geometry.coordinates)
    }
}

#[derive(Debug, Deserialize)]
struct PlacesResponse {
    #[serde(default)]
    features: Vec<GeocodedPlace>,
}

pub trait Geocoder: Send + Sync {
    /// Searches for places, optionally biased toward `proximity`.
    fn search(&self, query: &str, proximity: Option<LatLng>) -> Result<Vec<GeocodedPlace>>;
}

pub struct MapboxGeocoder {
    base: String,
    token: String,
    client: Client,
}

impl MapboxGeocoder {
    pub fn new(base: &str, token: Option<&str>, timeout: Duration) -> Result<Self> {
        let token = token
            .filter(|t| !t.trim().is_empty())
            .ok_or(TripError::MissingToken)?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base: base.trim_end_matches('/').to_string(),
            token: token.to_string(),
            client,
        })
    }

    pub fn from_config(config: &crate::WanderConfig) -> Result<Self> {
        Self::new(
            &config.geocoder_url,
            config.mapbox_token.as_deref(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn search_url(&self, query: &str, proximity: Option<LatLng>) -> Result<Url> {
        let mut url = Url::parse(&format!(
            "{}/{}.json",
            self.base,
            urlencoding::encode(query.trim())
        ))?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("access_token", &self.token);
            pairs.append_pair("autocomplete", "true");
            if let Some(p) = proximity {
                pairs.append_pair("proximity", &format!("{},{}", p.lng, p.lat));
            }
        }
        Ok(url)
    }
}

impl Geocoder for MapboxGeocoder {
    fn search(&self, query: &str, proximity: Option<LatLng>) -> Result<Vec<GeocodedPlace>> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }
        let url = self.search_url(query, proximity)?;
        let response: PlacesResponse = self.client.get(url).send()?.error_for_status()?.json()?;
        debug!(
            "Geocoder search — query={} results={}",
            query,
            response.features.len()
        );
        Ok(response.features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_copy() {
        assert_eq!(placeholder_for(false), "Where do you want to go?");
        assert_eq!(placeholder_for(true), "Where to next?");
    }

    #[test]
    fn test_missing_token_is_error() {
        let err = MapboxGeocoder::new("https://example.test", None, Duration::from_secs(1));
        assert!(matches!(err, Err(TripError::MissingToken)));
        let err = MapboxGeocoder::new("https://example.test", Some(" "), Duration::from_secs(1));
        assert!(matches!(err, Err(TripError::MissingToken)));
    }

    #[test]
    fn test_search_url_encodes_query_and_proximity() {
        let geocoder = MapboxGeocoder::new(
            "https://api.mapbox.com/geocoding/v5/mapbox.places/",
            Some("pk.test"),
            Duration::from_secs(1),
        )
        .unwrap();
        let url = geocoder
            .search_url("Coit Tower", Some(LatLng::new(37.7749, -122.4194)))
            .unwrap();
        assert_eq!(
            url.path(),
            "/geocoding/v5/mapbox.places/Coit%20Tower.json"
        );
        let query: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(query.contains(&("access_token".into(), "pk.test".into())));
        assert!(query.contains(&("proximity".into(), "-122.4194,37.7749".into())));
    }

    #[test]
    fn test_parse_places_feature() {
        let body = r#"{"features": [{"id": "poi.1", "text": "Coit Tower",
            "place_name": "Coit Tower, San Francisco, California",
            "center": [-122.4058, 37.8024],
            "geometry": {"type": "Point", "coordinates": [-122.4058, 37.8024]}}]}"#;
        let parsed: PlacesResponse = serde_json::from_str(body).unwrap();
        let place = &parsed.features[0];
        assert_eq!(place.text, "Coit Tower");
        assert_eq!(place.coordinates(), [-122.4058, 37.8024]);
        assert_eq!(place.position(), LatLng::new(37.8024, -122.4058));
    }
}
