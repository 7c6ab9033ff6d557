// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Wander contributors

use crate::features::FeatureId;
use crate::geo::LatLng;
use crate::popup::route_popup_html;
use serde::{Deserialize, Serialize};

/// A destination as the backend session stores it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    /// `[lon, lat]`
    pub coordinates: [f64; 2],
    pub place_name: String,
}

impl Waypoint {
    pub fn position(&self) -> LatLng {
        LatLng::from_lon_lat(self.coordinates)
    }
}

/// What a save/add request refers to.
#[derive(Debug, Clone, PartialEq)]
pub enum DestinationTarget {
    /// A free geocoded point.
    Place {
        coordinates: [f64; 2],
        place_name: String,
    },
    Landmark(FeatureId),
}

impl DestinationTarget {
    /// Form fields in the encoding the backend expects (`coordinates[]` repeated).
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        match self {
            DestinationTarget::Place {
                coordinates,
                place_name,
            } => vec![
                ("coordinates[]", coordinates[0].to_string()),
                ("coordinates[]", coordinates[1].to_string()),
                ("place_name", place_name.clone()),
            ],
            DestinationTarget::Landmark(id) => vec![("landmark_id", id.to_string())],
        }
    }

    pub fn label(&self) -> String {
        match self {
            DestinationTarget::Place { place_name, .. } => place_name.clone(),
            DestinationTarget::Landmark(id) => format!("landmark {}", id),
        }
    }
}

pub const ALREADY_SAVED_RESPONSE: &str = "Already saved.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    AlreadySaved,
    Saved,
}

impl SaveOutcome {
    /// Only the exact sentinel string means "duplicate"; anything else is a save.
    pub fn from_response(body: &str) -> Self {
        let trimmed = body.trim();
        let unquoted = serde_json::from_str::<String>(trimmed).unwrap_or_else(|_| trimmed.to_string());
        if unquoted == ALREADY_SAVED_RESPONSE {
            SaveOutcome::AlreadySaved
        } else {
            SaveOutcome::Saved
        }
    }

    pub fn alert(self) -> &'static str {
        match self {
            SaveOutcome::AlreadySaved => "Destination already saved.",
            SaveOutcome::Saved => "Destination saved.",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RouteMarker {
    pub position: LatLng,
    pub title: String,
    pub rise_on_hover: bool,
}

impl RouteMarker {
    pub fn popup_html(&self) -> String {
        route_popup_html(&self.title)
    }
}

/// Destination markers of the current trip.
#[derive(Debug, Clone, Default)]
pub struct RouteLayer {
    markers: Vec<RouteMarker>,
}

impl RouteLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_waypoint(&mut self, waypoint: &Waypoint) -> &RouteMarker {
        self.markers.push(RouteMarker {
            position: waypoint.position(),
            title: waypoint.place_name.clone(),
            rise_on_hover: true,
        });
        &self.markers[self.markers.len() - 1]
    }

    pub fn markers(&self) -> &[RouteMarker] {
        &self.markers
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

/// The drawn walking path.
#[derive(Debug, Clone, Default)]
pub struct Polyline {
    points: Vec<LatLng>,
}

impl Polyline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces every point, like `setLatLngs`.
    pub fn set_points(&mut self, points: Vec<LatLng>) {
        self.points = points;
    }

    pub fn points(&self) -> &[LatLng] {
        &self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_outcome_matches_literal_only() {
        assert_eq!(SaveOutcome::from_response("Already saved."), SaveOutcome::AlreadySaved);
        assert_eq!(SaveOutcome::from_response("\"Already saved.\"\n"), SaveOutcome::AlreadySaved);
        assert_eq!(SaveOutcome::from_response("already saved."), SaveOutcome::Saved);
        assert_eq!(SaveOutcome::from_response("Saved."), SaveOutcome::Saved);
        assert_eq!(SaveOutcome::from_response(""), SaveOutcome::Saved);
    }

    #[test]
    fn test_place_form_fields() {
        let target = DestinationTarget::Place {
            coordinates: [-122.3933, 37.7955],
            place_name: "Ferry Building".into(),
        };
        let fields = target.form_fields();
        assert_eq!(fields[0], ("coordinates[]", "-122.3933".to_string()));
        assert_eq!(fields[1], ("coordinates[]", "37.7955".to_string()));
        assert_eq!(fields[2], ("place_name", "Ferry Building".to_string()));

        let lm = DestinationTarget::Landmark(FeatureId::Number(3));
        assert_eq!(lm.form_fields(), vec![("landmark_id", "3".to_string())]);
    }

    #[test]
    fn test_route_layer_adds_marker_in_map_order() {
        let mut layer = RouteLayer::new();
        let marker = layer.add_waypoint(&Waypoint {
            coordinates: [-122.3933, 37.7955],
            place_name: "Ferry Building".into(),
        });
        assert_eq!(marker.position, LatLng::new(37.7955, -122.3933));
        assert_eq!(marker.title, "Ferry Building");
        assert_eq!(layer.len(), 1);
    }
}
