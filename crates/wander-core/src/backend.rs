// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Wander contributors

//! Client for the trip backend.
//!
//! Every endpoint the map page talks to is a method on [`Backend`]. The HTTP
//! implementation keeps the backend's session cookie in a cookie jar so that
//! consecutive calls land in the same trip session.

use crate::directions::{DirectionsResponse, OriginAndDestination};
use crate::features::{FeatureCollection, LayerKind};
use crate::route::{DestinationTarget, SaveOutcome, Waypoint};
use crate::{Result, TripError};
use log::{debug, info};
use reqwest::blocking::{Client, Response};
use reqwest::cookie::{CookieStore, Jar};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

pub trait Backend: Send + Sync {
    /// `GET /has_origin`
    fn has_origin(&self) -> Result<bool>;
    /// `GET /initial_landmarks.geojson` or `GET /landmarks.geojson`
    fn landmarks(&self, layer: LayerKind) -> Result<FeatureCollection>;
    /// `POST /save_destination`
    fn save_destination(&self, target: &DestinationTarget) -> Result<SaveOutcome>;
    /// `POST /add_destination`
    fn add_destination(&self, target: &DestinationTarget) -> Result<Waypoint>;
    /// `GET /return_all_waypoints`
    fn all_waypoints(&self) -> Result<Vec<Waypoint>>;
    /// `GET /origin_and_destination`
    fn origin_and_destination(&self) -> Result<OriginAndDestination>;
    /// `GET /route_directions`
    fn route_directions(&self) -> Result<DirectionsResponse>;
    /// `POST /clear`
    fn clear(&self) -> Result<()>;
    /// `POST /add_new_landmark`
    fn add_new_landmark(&self) -> Result<Waypoint>;
    /// `GET /debugger`
    fn debugger(&self) -> Result<serde_json::Value>;
}

impl<B: Backend + ?Sized> Backend for Arc<B> {
    fn has_origin(&self) -> Result<bool> {
        (**self).has_origin()
    }
    fn landmarks(&self, layer: LayerKind) -> Result<FeatureCollection> {
        (**self).landmarks(layer)
    }
    fn save_destination(&self, target: &DestinationTarget) -> Result<SaveOutcome> {
        (**self).save_destination(target)
    }
    fn add_destination(&self, target: &DestinationTarget) -> Result<Waypoint> {
        (**self).add_destination(target)
    }
    fn all_waypoints(&self) -> Result<Vec<Waypoint>> {
        (**self).all_waypoints()
    }
    fn origin_and_destination(&self) -> Result<OriginAndDestination> {
        (**self).origin_and_destination()
    }
    fn route_directions(&self) -> Result<DirectionsResponse> {
        (**self).route_directions()
    }
    fn clear(&self) -> Result<()> {
        (**self).clear()
    }
    fn add_new_landmark(&self) -> Result<Waypoint> {
        (**self).add_new_landmark()
    }
    fn debugger(&self) -> Result<serde_json::Value> {
        (**self).debugger()
    }
}

#[derive(Deserialize)]
struct HasOriginResponse {
    status: bool,
}

pub struct HttpBackend {
    base: Url,
    client: Client,
    jar: Arc<Jar>,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let mut base = Url::parse(base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let jar = Arc::new(Jar::default());
        let client = Client::builder()
            .timeout(timeout)
            .cookie_provider(Arc::clone(&jar))
            .user_agent(concat!("Wander/", env!("CARGO_PKG_VERSION")))
            .build()?;
        info!("Backend client ready — base_url={}", base);
        Ok(Self { base, client, jar })
    }

    pub fn from_config(config: &crate::WanderConfig) -> Result<Self> {
        Self::new(
            &config.backend_url,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Resolves an endpoint path under the base URL, keeping any path prefix.
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base.join(path.trim_start_matches('/'))?)
    }

    fn get(&self, path: &str) -> Result<Response> {
        let url = self.endpoint(path)?;
        debug!("GET {}", url);
        Ok(self.client.get(url).send()?.error_for_status()?)
    }

    fn post_form(&self, path: &str, fields: &[(&'static str, String)]) -> Result<Response> {
        let url = self.endpoint(path)?;
        debug!("POST {} — fields={}", url, fields.len());
        Ok(self.client.post(url).form(&fields).send()?.error_for_status()?)
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        decode_json(path, self.get(path)?)
    }

    /// The session cookie header for the backend origin, if one was issued.
    pub fn session_cookies(&self) -> Option<String> {
        self.jar
            .cookies(&self.base)
            .and_then(|v| v.to_str().ok().map(str::to_string))
    }

    /// Seeds the jar from a `name=value; name2=value2` header string.
    pub fn restore_cookies(&self, header: &str) {
        for pair in header.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            self.jar.add_cookie_str(pair, &self.base);
        }
    }

    pub fn load_cookies(&self, path: &Path) -> Result<bool> {
        if !path.exists() {
            return Ok(false);
        }
        let header = fs::read_to_string(path)?;
        self.restore_cookies(header.trim());
        debug!("Restored session cookies — path={}", path.display());
        Ok(true)
    }

    pub fn save_cookies(&self, path: &Path) -> Result<()> {
        match self.session_cookies() {
            Some(header) => {
                if let Some(parent) = path.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(path, header)?;
            }
            None => {
                if path.exists() {
                    fs::remove_file(path)?;
                }
            }
        }
        Ok(())
    }
}

fn decode_json<T: DeserializeOwned>(endpoint: &str, response: Response) -> Result<T> {
    let body = response.text()?;
    serde_json::from_str(&body).map_err(|e| TripError::UnexpectedResponse {
        endpoint: endpoint.to_string(),
        detail: e.to_string(),
    })
}

impl Backend for HttpBackend {
    fn has_origin(&self) -> Result<bool> {
        let r: HasOriginResponse = self.get_json("/has_origin")?;
        Ok(r.status)
    }

    fn landmarks(&self, layer: LayerKind) -> Result<FeatureCollection> {
        self.get_json(layer.endpoint())
    }

    fn save_destination(&self, target: &DestinationTarget) -> Result<SaveOutcome> {
        let body = self
            .post_form("/save_destination", &target.form_fields())?
            .text()?;
        Ok(SaveOutcome::from_response(&body))
    }

    fn add_destination(&self, target: &DestinationTarget) -> Result<Waypoint> {
        let response = self.post_form("/add_destination", &target.form_fields())?;
        decode_json("/add_destination", response)
    }

    fn all_waypoints(&self) -> Result<Vec<Waypoint>> {
        self.get_json("/return_all_waypoints")
    }

    fn origin_and_destination(&self) -> Result<OriginAndDestination> {
        self.get_json("/origin_and_destination")
    }

    fn route_directions(&self) -> Result<DirectionsResponse> {
        self.get_json("/route_directions")
    }

    fn clear(&self) -> Result<()> {
        self.post_form("/clear", &[])?;
        Ok(())
    }

    fn add_new_landmark(&self) -> Result<Waypoint> {
        let response = self.post_form("/add_new_landmark", &[])?;
        decode_json("/add_new_landmark", response)
    }

    fn debugger(&self) -> Result<serde_json::Value> {
        self.get_json("/debugger")
    }
}
