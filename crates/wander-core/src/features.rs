// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Wander contributors

use crate::geo::LatLng;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Feature identifiers come from the backend database and may be numeric or textual.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureId {
    Number(i64),
    Text(String),
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureId::Number(n) => write!(f, "{}", n),
            FeatureId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for FeatureId {
    fn from(n: i64) -> Self {
        FeatureId::Number(n)
    }
}

/// Numeric only when the text is the number's canonical form, so `"007"` stays textual.
impl From<&str> for FeatureId {
    fn from(s: &str) -> Self {
        match s.parse::<i64>() {
            Ok(n) if n.to_string() == s => FeatureId::Number(n),
            _ => FeatureId::Text(s.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointGeometry {
    #[serde(rename = "type", default = "point_type")]
    pub kind: String,
    pub coordinates: [f64; 2],
}

fn point_type() -> String {
    "Point".to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LandmarkProperties {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "marker-color", default, skip_serializing_if = "Option::is_none")]
    pub marker_color: Option<String>,
    #[serde(rename = "marker-symbol", default, skip_serializing_if = "Option::is_none")]
    pub marker_symbol: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub id: FeatureId,
    pub geometry: PointGeometry,
    #[serde(default)]
    pub properties: LandmarkProperties,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(default)]
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn from_json(text: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Which of the two landmark documents a marker came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayerKind {
    Initial,
    Full,
}

impl LayerKind {
    pub fn endpoint(self) -> &'static str {
        match self {
            LayerKind::Initial => "/initial_landmarks.geojson",
            LayerKind::Full => "/landmarks.geojson",
        }
    }
}

/// Read-only rendered copy of a backend landmark.
#[derive(Debug, Clone, PartialEq)]
pub struct Landmark {
    pub id: FeatureId,
    pub name: String,
    pub description: String,
    pub position: LatLng,
    pub marker_color: Option<String>,
    pub layer: LayerKind,
}

impl Landmark {
    pub fn from_feature(feature: Feature, layer: LayerKind) -> Self {
        Self {
            id: feature.id,
            name: feature.properties.name,
            description: feature.properties.description,
            position: LatLng::from_lon_lat(feature.geometry.coordinates),
            marker_color: feature.properties.marker_color,
            layer,
        }
    }

    pub fn detail_path(&self) -> String {
        format!("/landmarks/{}", self.id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerStage {
    /// Only the small initial set is on the map.
    Initial,
    /// The full set replaced the initial one. Never goes back.
    Full,
}

/// The two landmark layers and the one-shot switch between them.
#[derive(Debug, Clone)]
pub struct LandmarkLayers {
    initial: Vec<Landmark>,
    full: Vec<Landmark>,
    stage: LayerStage,
}

impl Default for LandmarkLayers {
    fn default() -> Self {
        Self::new()
    }
}

impl LandmarkLayers {
    pub fn new() -> Self {
        Self {
            initial: Vec::new(),
            full: Vec::new(),
            stage: LayerStage::Initial,
        }
    }

    pub fn load(&mut self, kind: LayerKind, collection: FeatureCollection) {
        let landmarks: Vec<Landmark> = collection
            .features
            .into_iter()
            .map(|f| Landmark::from_feature(f, kind))
            .collect();
        info!(
            "Loaded landmark layer — layer={:?} count={}",
            kind,
            landmarks.len()
        );
        match kind {
            LayerKind::Initial => self.initial = landmarks,
            LayerKind::Full => self.full = landmarks,
        }
    }

    pub fn stage(&self) -> LayerStage {
        self.stage
    }

    pub fn layer(&self, kind: LayerKind) -> &[Landmark] {
        match kind {
            LayerKind::Initial => &self.initial,
            LayerKind::Full => &self.full,
        }
    }

    /// Markers currently on the map.
    pub fn visible(&self) -> &[Landmark] {
        match self.stage {
            LayerStage::Initial => &self.initial,
            LayerStage::Full => &self.full,
        }
    }

    pub fn find_visible(&self, id: &FeatureId) -> Option<&Landmark> {
        self.visible().iter().find(|l| &l.id == id)
    }

    pub fn find(&self, id: &FeatureId) -> Option<&Landmark> {
        self.full
            .iter()
            .chain(self.initial.iter())
            .find(|l| &l.id == id)
    }

    /// Handles a click on an initial-layer marker.
    ///
    /// Returns the clicked position on the first click only; the caller
    /// re-centers the view there. Any later click returns `None`.
    pub fn click_initial(&mut self, id: &FeatureId) -> Option<LatLng> {
        if self.stage != LayerStage::Initial {
            return None;
        }
        let position = self.initial.iter().find(|l| &l.id == id)?.position;
        self.stage = LayerStage::Full;
        debug!("Switched to full landmark layer — clicked={}", id);
        Some(position)
    }
}
