// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Wander contributors

use crate::geo::MapSettings;
use crate::popup::PopupTrigger;
use anyhow::{ensure, Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:5000";
pub const DEFAULT_TILE_URL: &str = "https://tile.openstreetmap.org/{z}/{x}/{y}.png";
pub const DEFAULT_GEOCODER_URL: &str = "https://api.mapbox.com/geocoding/v5/mapbox.places";
pub const DEFAULT_DIRECTIONS_URL: &str = "https://api.mapbox.com/directions/v5/mapbox/walking";

pub const ENV_BACKEND_URL: &str = "WANDER_BACKEND_URL";
pub const ENV_MAPBOX_TOKEN: &str = "MAPBOX_ACCESS_TOKEN";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WanderConfig {
    pub backend_url: String,
    pub request_timeout_secs: u64,
    pub geocoder_url: String,
    pub directions_url: String,
    pub mapbox_token: Option<String>,
    pub tile_url: String,
    pub popup_trigger: PopupTrigger,
    pub map: MapSettings,
}

impl Default for WanderConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            request_timeout_secs: 30,
            geocoder_url: DEFAULT_GEOCODER_URL.to_string(),
            directions_url: DEFAULT_DIRECTIONS_URL.to_string(),
            mapbox_token: None,
            tile_url: DEFAULT_TILE_URL.to_string(),
            popup_trigger: PopupTrigger::Hover,
            map: MapSettings::default(),
        }
    }
}

impl WanderConfig {
    pub fn default_path() -> PathBuf {
        crate::get_config_root().join("config.json")
    }

    /// Loads `config.json` from the config directory and applies environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::default_path())?;
        config.apply_env();
        Ok(config)
    }

    /// Missing file means defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config file, using defaults — path={}", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        config
            .check_map()
            .with_context(|| format!("Invalid map settings in {}", path.display()))?;
        info!("Loaded config — path={}", path.display());
        Ok(config)
    }

    fn check_map(&self) -> Result<()> {
        let map = &self.map;
        ensure!(
            map.min_zoom.is_finite() && map.max_zoom.is_finite(),
            "zoom bounds must be finite numbers"
        );
        ensure!(
            map.min_zoom <= map.max_zoom,
            "min_zoom {} is greater than max_zoom {}",
            map.min_zoom,
            map.max_zoom
        );
        Ok(())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).context("Failed to create config directory")?;
            }
        }
        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
    }

    pub fn apply_env(&mut self) {
        self.apply_overrides(
            std::env::var(ENV_BACKEND_URL).ok(),
            std::env::var(ENV_MAPBOX_TOKEN).ok(),
        );
    }

    fn apply_overrides(&mut self, backend_url: Option<String>, token: Option<String>) {
        if let Some(url) = backend_url.filter(|u| !u.trim().is_empty()) {
            self.backend_url = url;
        }
        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            self.mapbox_token = Some(token);
        }
    }

    /// Tile URL for one slippy tile.
    pub fn tile_url_for(&self, z: u32, x: u32, y: u32) -> String {
        expand_tile_url(&self.tile_url, z, x, y)
    }
}

/// Fills `{z}`, `{x}` and `{y}` in a slippy tile URL template.
pub fn expand_tile_url(template: &str, z: u32, x: u32, y: u32) -> String {
    template
        .replace("{z}", &z.to_string())
        .replace("{x}", &x.to_string())
        .replace("{y}", &y.to_string())
}
