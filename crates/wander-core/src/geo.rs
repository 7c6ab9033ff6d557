// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Wander contributors

use serde::{Deserialize, Serialize};

/// A point in map order (latitude first).
///
/// Backend and directions payloads carry `[lon, lat]` pairs; convert them with
/// [`LatLng::from_lon_lat`] before handing them to the map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn from_lon_lat(pair: [f64; 2]) -> Self {
        Self {
            lat: pair[1],
            lng: pair[0],
        }
    }

    pub fn to_lon_lat(self) -> [f64; 2] {
        [self.lng, self.lat]
    }
}

// --- Slippy Map / Mercator Math ---
pub const TILE_SIZE: f64 = 256.0;
pub const MAX_MERCATOR_LAT: f64 = 85.0511;

pub fn lon_to_x(lon: f64, zoom: f64) -> f64 {
    ((lon + 180.0) / 360.0) * 2.0f64.powf(zoom) * TILE_SIZE
}

pub fn lat_to_y(lat: f64, zoom: f64) -> f64 {
    let lat_rad = lat.to_radians();
    (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / std::f64::consts::PI) / 2.0
        * 2.0f64.powf(zoom)
        * TILE_SIZE
}

pub fn x_to_lon(x: f64, zoom: f64) -> f64 {
    (x / (TILE_SIZE * 2.0f64.powf(zoom))) * 360.0 - 180.0
}

pub fn y_to_lat(y: f64, zoom: f64) -> f64 {
    let n = std::f64::consts::PI - 2.0 * std::f64::consts::PI * y / (TILE_SIZE * 2.0f64.powf(zoom));
    (0.5 * (n.exp() - (-n).exp())).atan().to_degrees()
}

/// Fixed bounds and starting position of the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapSettings {
    pub center: LatLng,
    pub zoom: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub interactive: bool,
    /// Zoom used when the user first drills into a landmark.
    pub focus_zoom: f64,
}

impl Default for MapSettings {
    fn default() -> Self {
        Self {
            center: LatLng::new(37.7749, -122.4194),
            zoom: 12.0,
            min_zoom: 9.0,
            max_zoom: 16.0,
            interactive: true,
            focus_zoom: 14.0,
        }
    }
}

impl MapSettings {
    /// `(min, max)` zoom, ordered. Non-finite bounds fall back to the defaults.
    pub fn zoom_bounds(&self) -> (f64, f64) {
        if !self.min_zoom.is_finite() || !self.max_zoom.is_finite() {
            let defaults = Self::default();
            return (defaults.min_zoom, defaults.max_zoom);
        }
        (
            self.min_zoom.min(self.max_zoom),
            self.min_zoom.max(self.max_zoom),
        )
    }
}

/// Current center/zoom of the single map instance. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct MapViewState {
    pub center: LatLng,
    pub zoom: f64,
    min_zoom: f64,
    max_zoom: f64,
    interactive: bool,
}

impl MapViewState {
    pub fn new(settings: &MapSettings) -> Self {
        let (min_zoom, max_zoom) = settings.zoom_bounds();
        let mut view = Self {
            center: settings.center,
            zoom: settings.zoom,
            min_zoom,
            max_zoom,
            interactive: settings.interactive,
        };
        view.zoom = view.clamp_zoom(settings.zoom);
        view
    }

    pub fn min_zoom(&self) -> f64 {
        self.min_zoom
    }

    pub fn max_zoom(&self) -> f64 {
        self.max_zoom
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    pub fn clamp_zoom(&self, zoom: f64) -> f64 {
        zoom.clamp(self.min_zoom, self.max_zoom)
    }

    pub fn set_view(&mut self, center: LatLng, zoom: f64) {
        self.center = clamp_center(center);
        self.zoom = self.clamp_zoom(zoom);
    }

    pub fn pan_to(&mut self, center: LatLng) {
        self.center = clamp_center(center);
    }

    pub fn zoom_by(&mut self, delta: f64) {
        self.zoom = self.clamp_zoom(self.zoom + delta);
    }
}

fn clamp_center(center: LatLng) -> LatLng {
    LatLng {
        lat: center.lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT),
        lng: center.lng.clamp(-180.0, 180.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inverted_zoom_bounds_do_not_panic() {
        let settings = MapSettings {
            min_zoom: 16.0,
            max_zoom: 9.0,
            ..MapSettings::default()
        };
        let mut view = MapViewState::new(&settings);
        assert_eq!((view.min_zoom(), view.max_zoom()), (9.0, 16.0));
        view.zoom_by(10.0);
        assert_eq!(view.zoom, 16.0);

        let broken = MapSettings {
            min_zoom: f64::NAN,
            ..MapSettings::default()
        };
        assert_eq!(broken.zoom_bounds(), (9.0, 16.0));
    }

    #[test]
    fn test_lon_lat_swap() {
        let p = LatLng::from_lon_lat([-122.4194, 37.7749]);
        assert_eq!(p.lat, 37.7749);
        assert_eq!(p.lng, -122.4194);
        assert_eq!(p.to_lon_lat(), [-122.4194, 37.7749]);
    }

    #[test]
    fn test_mercator_inverse() {
        let zoom = 12.0;
        let x = lon_to_x(-122.4194, zoom);
        let y = lat_to_y(37.7749, zoom);
        assert!((x_to_lon(x, zoom) + 122.4194).abs() < 1e-9);
        assert!((y_to_lat(y, zoom) - 37.7749).abs() < 1e-9);
    }

    #[test]
    fn test_view_zoom_bounds() {
        let mut view = MapViewState::new(&MapSettings::default());
        assert_eq!(view.zoom, 12.0);

        view.zoom_by(10.0);
        assert_eq!(view.zoom, 16.0);
        view.zoom_by(-20.0);
        assert_eq!(view.zoom, 9.0);

        view.set_view(LatLng::new(37.8, -122.4), 14.0);
        assert_eq!(view.zoom, 14.0);
        assert_eq!(view.center, LatLng::new(37.8, -122.4));
    }
}
