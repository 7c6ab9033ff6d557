// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Wander contributors

use crate::geo::LatLng;
use crate::{Result, TripError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedPlace {
    pub place_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OriginAndDestination {
    pub origin: NamedPlace,
    pub destination: NamedPlace,
}

impl OriginAndDestination {
    /// `"<origin> to <destination>: "` using the first comma-separated part of each name.
    pub fn summary_line(&self) -> String {
        format!(
            "{} to {}: ",
            short_label(&self.origin.place_name),
            short_label(&self.destination.place_name)
        )
    }
}

pub fn short_label(place_name: &str) -> &str {
    place_name.split(',').next().unwrap_or(place_name)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineGeometry {
    /// `[lon, lat]` pairs.
    pub coordinates: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Maneuver {
    pub instruction: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub distance: f64,
    pub maneuver: Maneuver,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leg {
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub geometry: LineGeometry,
    /// Seconds.
    pub duration: f64,
    #[serde(default)]
    pub legs: Vec<Leg>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectionsResponse {
    #[serde(default)]
    pub routes: Vec<Route>,
}

/// One rendered turn instruction.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedStep {
    pub instruction: String,
    pub distance: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedRoute {
    pub path: Vec<LatLng>,
    pub duration: String,
    pub steps: Vec<RenderedStep>,
}

impl RenderedRoute {
    /// Renders the first route; only its first leg contributes steps.
    pub fn from_response(response: &DirectionsResponse) -> Result<Self> {
        let route = response.routes.first().ok_or(TripError::NoRoute)?;
        let path = route
            .geometry
            .coordinates
            .iter()
            .map(|&pair| LatLng::from_lon_lat(pair))
            .collect();
        let steps = route
            .legs
            .first()
            .map(|leg| {
                leg.steps
                    .iter()
                    .map(|step| RenderedStep {
                        instruction: step.maneuver.instruction.clone(),
                        distance: format_meters(step.distance),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            path,
            duration: format_minutes(route.duration),
            steps,
        })
    }
}

/// Whole minutes, rounding halves up.
pub fn format_minutes(duration_secs: f64) -> String {
    format!("{} minutes", (duration_secs / 60.0).round() as i64)
}

/// One decimal place. Exact ties round away from zero.
pub fn format_meters(distance: f64) -> String {
    format!("{:.1} meters", round_tenths(distance))
}

// `{:.1}` breaks exact ties toward even. The only exactly representable tenths
// ties are odd multiples of 0.25.
fn round_tenths(value: f64) -> f64 {
    let quarters = value * 4.0;
    if quarters.fract() == 0.0 && quarters % 2.0 != 0.0 {
        (value * 10.0).round() / 10.0
    } else {
        value
    }
}

/// Identifies one press of "get directions".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DirectionsTicket(pub u64);

/// The text areas the directions results are appended to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DirectionsPanel {
    pub routes: Vec<String>,
    pub duration: Vec<String>,
    pub instructions: Vec<String>,
    pub distances: Vec<String>,
}

impl DirectionsPanel {
    pub fn append_summary(&mut self, od: &OriginAndDestination) {
        self.routes.push(od.summary_line());
    }

    pub fn append_route(&mut self, route: &RenderedRoute) {
        self.duration.push(route.duration.clone());
        for step in &route.steps {
            self.instructions.push(step.instruction.clone());
            self.distances.push(step.distance.clone());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
            && self.duration.is_empty()
            && self.instructions.is_empty()
            && self.distances.is_empty()
    }
}
