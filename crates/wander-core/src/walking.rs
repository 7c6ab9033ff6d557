// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Wander contributors

//! Client-side walking directions between arbitrary places, independent of the
//! trip stored on the backend.

use crate::directions::{DirectionsResponse, RenderedRoute};
use crate::geo::LatLng;
use crate::{Result, TripError};
use log::{debug, info};
use reqwest::blocking::Client;
use std::time::Duration;
use url::Url;

pub struct MapboxDirections {
    base: String,
    token: String,
    client: Client,
}

impl MapboxDirections {
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
            &config.directions_url,
            config.mapbox_token.as_deref(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    /// `{base}/{lon,lat;lon,lat...}` with GeoJSON geometry and turn steps.
    pub fn route_url(&self, places: &[LatLng]) -> Result<Url> {
        if places.len() < 2 {
            return Err(TripError::TooFewPlaces(places.len()));
        }
        let path = places
            .iter()
            .map(|p| format!("{},{}", p.lng, p.lat))
            .collect::<Vec<_>>()
            .join(";");
        let mut url = Url::parse(&format!("{}/{}", self.base, path))?;
        url.query_pairs_mut()
            .append_pair("geometries", "geojson")
            .append_pair("steps", "true")
            .append_pair("access_token", &self.token);
        Ok(url)
    }

    pub fn fetch(&self, places: &[LatLng]) -> Result<DirectionsResponse> {
        let url = self.route_url(places)?;
        debug!("Walking directions request — places={}", places.len());
        Ok(self.client.get(url).send()?.error_for_status()?.json()?)
    }

    /// Walks through `places` in order and renders the best route.
    pub fn walk(&self, places: &[LatLng]) -> Result<RenderedRoute> {
        let rendered = RenderedRoute::from_response(&self.fetch(places)?)?;
        info!(
            "Walking route ready — duration={} steps={}",
            rendered.duration,
            rendered.steps.len()
        );
        Ok(rendered)
    }
}
