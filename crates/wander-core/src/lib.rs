// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Wander contributors

pub mod backend;
pub mod config;
pub mod debug;
pub mod directions;
pub mod features;
pub mod geo;
pub mod geocoder;
pub mod planner;
pub mod popup;
pub mod route;
pub mod session;
pub mod walking;

use std::path::PathBuf;
use thiserror::Error;

pub use backend::{Backend, HttpBackend};
pub use config::WanderConfig;
pub use geo::LatLng;
pub use session::TripSession;

#[derive(Error, Debug)]
pub enum TripError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unexpected response from {endpoint}: {detail}")]
    UnexpectedResponse { endpoint: String, detail: String },
    #[error("Directions response contained no route")]
    NoRoute,
    #[error("Mapbox access token is not configured")]
    MissingToken,
    #[error("Walking directions need at least two places, got {0}")]
    TooFewPlaces(usize),
}

pub type Result<T> = std::result::Result<T, TripError>;

/// Platform config directory, e.g. `~/.config/wander` on Linux.
/// Falls back to `.wander` in the working directory when no home is known.
pub fn get_config_root() -> PathBuf {
    directories::ProjectDirs::from("org", "wander", "Wander")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".wander"))
}
