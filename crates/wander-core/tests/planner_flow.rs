// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Wander contributors

use std::collections::HashSet;
use std::sync::Mutex;
use wander_core::backend::Backend;
use wander_core::directions::{DirectionsResponse, NamedPlace, OriginAndDestination};
use wander_core::features::{FeatureCollection, FeatureId, LayerKind, LayerStage};
use wander_core::geocoder::GeocodedPlace;
use wander_core::planner::TripPlanner;
use wander_core::popup::{FormAction, PopupForm, PopupTrigger};
use wander_core::route::{DestinationTarget, SaveOutcome, Waypoint};
use wander_core::session::{Dialog, DialogChoice, MarkerRef, NoticeKind, OpenPopup};
use wander_core::{LatLng, Result, TripError, WanderConfig};

const INITIAL: &str = r#"{"type": "FeatureCollection", "features": [
    {"type": "Feature", "id": 1, "geometry": {"type": "Point", "coordinates": [-122.4058, 37.8024]},
     "properties": {"name": "Coit Tower", "description": "Tower on Telegraph Hill"}},
    {"type": "Feature", "id": 2, "geometry": {"type": "Point", "coordinates": [-122.3933, 37.7955]},
     "properties": {"name": "Ferry Building", "description": "Marketplace"}}
]}"#;

const FULL: &str = r#"{"type": "FeatureCollection", "features": [
    {"type": "Feature", "id": 1, "geometry": {"type": "Point", "coordinates": [-122.4058, 37.8024]},
     "properties": {"name": "Coit Tower", "description": "Tower on Telegraph Hill"}},
    {"type": "Feature", "id": 2, "geometry": {"type": "Point", "coordinates": [-122.3933, 37.7955]},
     "properties": {"name": "Ferry Building", "description": "Marketplace"}},
    {"type": "Feature", "id": 3, "geometry": {"type": "Point", "coordinates": [-122.4187, 37.8021]},
     "properties": {"name": "Lombard Street", "description": "Crooked street"}}
]}"#;

const DIRECTIONS: &str = r#"{"routes": [{
    "geometry": {"coordinates": [[-122.3933, 37.7955], [-122.4000, 37.7990], [-122.4058, 37.8024]]},
    "duration": 600,
    "legs": [{"steps": [
        {"distance": 123.45, "maneuver": {"instruction": "Head north"}},
        {"distance": 300, "maneuver": {"instruction": "Turn left"}}
    ]}]
}]}"#;

#[derive(Default)]
struct MockState {
    has_origin: bool,
    waypoints: Vec<Waypoint>,
    saved: HashSet<String>,
    fail_route: bool,
    empty_route: bool,
    fail_clear: bool,
    calls: Vec<&'static str>,
}

/// In-memory stand-in for the backend session.
#[derive(Default)]
struct MockBackend {
    state: Mutex<MockState>,
}

impl MockBackend {
    fn record(&self, call: &'static str) {
        self.state.lock().unwrap().calls.push(call);
    }

    fn landmark_waypoint(id: &FeatureId) -> Waypoint {
        let full = FeatureCollection::from_json(FULL).unwrap();
        let f = full.features.into_iter().find(|f| &f.id == id).unwrap();
        Waypoint {
            coordinates: f.geometry.coordinates,
            place_name: f.properties.name,
        }
    }

    fn resolve(target: &DestinationTarget) -> Waypoint {
        match target {
            DestinationTarget::Place {
                coordinates,
                place_name,
            } => Waypoint {
                coordinates: *coordinates,
                place_name: place_name.clone(),
            },
            DestinationTarget::Landmark(id) => Self::landmark_waypoint(id),
        }
    }
}

impl Backend for MockBackend {
    fn has_origin(&self) -> Result<bool> {
        self.record("has_origin");
        Ok(self.state.lock().unwrap().has_origin)
    }

    fn landmarks(&self, layer: LayerKind) -> Result<FeatureCollection> {
        self.record("landmarks");
        match layer {
            LayerKind::Initial => FeatureCollection::from_json(INITIAL),
            LayerKind::Full => FeatureCollection::from_json(FULL),
        }
    }

    fn save_destination(&self, target: &DestinationTarget) -> Result<SaveOutcome> {
        self.record("save_destination");
        let name = Self::resolve(target).place_name;
        let fresh = self.state.lock().unwrap().saved.insert(name);
        let body = if fresh { "Saved." } else { "Already saved." };
        Ok(SaveOutcome::from_response(body))
    }

    fn add_destination(&self, target: &DestinationTarget) -> Result<Waypoint> {
        self.record("add_destination");
        let waypoint = Self::resolve(target);
        let mut state = self.state.lock().unwrap();
        state.has_origin = true;
        state.waypoints.push(waypoint.clone());
        Ok(waypoint)
    }

    fn all_waypoints(&self) -> Result<Vec<Waypoint>> {
        self.record("all_waypoints");
        Ok(self.state.lock().unwrap().waypoints.clone())
    }

    fn origin_and_destination(&self) -> Result<OriginAndDestination> {
        self.record("origin_and_destination");
        let state = self.state.lock().unwrap();
        let name = |w: Option<&Waypoint>| NamedPlace {
            place_name: w.map(|w| w.place_name.clone()).unwrap_or_default(),
        };
        Ok(OriginAndDestination {
            origin: name(state.waypoints.first()),
            destination: name(state.waypoints.last()),
        })
    }

    fn route_directions(&self) -> Result<DirectionsResponse> {
        self.record("route_directions");
        if self.state.lock().unwrap().fail_route {
            return Err(TripError::UnexpectedResponse {
                endpoint: "/route_directions".into(),
                detail: "502 Bad Gateway".into(),
            });
        }
        if self.state.lock().unwrap().empty_route {
            return Ok(DirectionsResponse { routes: vec![] });
        }
        Ok(serde_json::from_str(DIRECTIONS)?)
    }

    fn clear(&self) -> Result<()> {
        self.record("clear");
        let mut state = self.state.lock().unwrap();
        if state.fail_clear {
            return Err(TripError::UnexpectedResponse {
                endpoint: "/clear".into(),
                detail: "500 Internal Server Error".into(),
            });
        }
        state.waypoints.clear();
        state.has_origin = false;
        Ok(())
    }

    fn add_new_landmark(&self) -> Result<Waypoint> {
        self.record("add_new_landmark");
        let waypoint = Waypoint {
            coordinates: [-122.4784, 37.8199],
            place_name: "Presidio Overlook".into(),
        };
        self.state.lock().unwrap().waypoints.push(waypoint.clone());
        Ok(waypoint)
    }

    fn debugger(&self) -> Result<serde_json::Value> {
        self.record("debugger");
        let state = self.state.lock().unwrap();
        Ok(serde_json::json!({ "waypoints": state.waypoints }))
    }
}

fn planner() -> TripPlanner<MockBackend> {
    let mut planner = TripPlanner::new(MockBackend::default(), &WanderConfig::default());
    planner.bootstrap().unwrap();
    planner
}

fn geocoded(name: &str, coordinates: [f64; 2]) -> GeocodedPlace {
    serde_json::from_value(serde_json::json!({
        "text": name,
        "place_name": format!("{}, San Francisco, California", name),
        "geometry": {"type": "Point", "coordinates": coordinates}
    }))
    .unwrap()
}

fn info_notices(planner: &TripPlanner<MockBackend>) -> Vec<String> {
    planner
        .session
        .notices()
        .iter()
        .filter(|n| n.kind == NoticeKind::Info)
        .map(|n| n.text.clone())
        .collect()
}

#[test]
fn test_bootstrap_sets_placeholder_and_layers() {
    let p = planner();
    assert_eq!(p.session.placeholder(), "Where do you want to go?");
    assert_eq!(p.session.landmarks().stage(), LayerStage::Initial);
    assert_eq!(p.session.landmarks().visible().len(), 2);
    assert_eq!(p.session.landmarks().layer(LayerKind::Full).len(), 3);
    assert!(p.session.route().is_empty());
}

#[test]
fn test_geocoder_selection_then_add() {
    let mut p = planner();
    p.session.select_place(&geocoded("Dolores Park", [-122.4276, 37.7596]));

    match p.session.dialog() {
        Some(Dialog::ConfirmDestination(c)) => assert_eq!(c.title, "Dolores Park"),
        other => panic!("expected confirmation dialog, got {:?}", other),
    }

    p.confirm(DialogChoice::Add).unwrap();
    assert!(p.session.dialog().is_none());
    assert_eq!(p.session.route().len(), 1);
    let marker = &p.session.route().markers()[0];
    assert_eq!(marker.title, "Dolores Park");
    assert_eq!(marker.position, LatLng::new(37.7596, -122.4276));
    assert_eq!(info_notices(&p), vec!["Destination added.".to_string()]);
}

#[test]
fn test_save_twice_reports_duplicate() {
    let mut p = planner();
    for _ in 0..2 {
        p.session.select_place(&geocoded("Dolores Park", [-122.4276, 37.7596]));
        p.confirm(DialogChoice::Save).unwrap();
    }
    assert_eq!(
        info_notices(&p),
        vec![
            "Destination saved.".to_string(),
            "Destination already saved.".to_string()
        ]
    );
    assert!(p.session.route().is_empty());
}

#[test]
fn test_initial_layer_switch_happens_once() {
    let mut p = planner();
    assert!(p.session.marker_click(&MarkerRef::Initial(FeatureId::Number(2))));
    assert_eq!(p.session.landmarks().stage(), LayerStage::Full);
    assert_eq!(p.session.landmarks().visible().len(), 3);
    assert_eq!(p.session.view.zoom, 14.0);
    assert_eq!(p.session.view.center, LatLng::new(37.7955, -122.3933));

    p.session.view.zoom_by(1.0);
    assert!(!p.session.marker_click(&MarkerRef::Initial(FeatureId::Number(1))));
    assert_eq!(p.session.view.zoom, 15.0);
    assert_eq!(p.session.landmarks().stage(), LayerStage::Full);
}

#[test]
fn test_hover_opens_popup_and_form_submits_by_id() {
    let mut p = planner();
    p.session.marker_click(&MarkerRef::Initial(FeatureId::Number(1)));

    p.session.marker_hover(&MarkerRef::Landmark(FeatureId::Number(3)));
    assert_eq!(
        p.session.popup(),
        Some(&OpenPopup::Landmark(FeatureId::Number(3)))
    );
    let popup = p.session.landmark_popup().unwrap();
    assert_eq!(popup.title, "Lombard Street");
    assert!(popup.to_html().contains("value=\"3\""));

    let [add, save] = popup.forms();
    p.submit_popup(&add).unwrap();
    p.submit_popup(&save).unwrap();
    p.submit_popup(&save).unwrap();

    assert_eq!(p.session.route().len(), 1);
    assert_eq!(p.session.route().markers()[0].title, "Lombard Street");
    assert_eq!(
        info_notices(&p),
        vec![
            "Destination added.".to_string(),
            "Destination saved.".to_string(),
            "Destination already saved.".to_string()
        ]
    );
}

#[test]
fn test_click_trigger_ignores_hover() {
    let mut config = WanderConfig::default();
    config.popup_trigger = PopupTrigger::Click;
    let mut p = TripPlanner::new(MockBackend::default(), &config);
    p.bootstrap().unwrap();
    p.session.marker_click(&MarkerRef::Initial(FeatureId::Number(1)));

    p.session.marker_hover(&MarkerRef::Landmark(FeatureId::Number(2)));
    assert!(p.session.popup().is_none());
    p.session.marker_click(&MarkerRef::Landmark(FeatureId::Number(2)));
    assert_eq!(
        p.session.popup(),
        Some(&OpenPopup::Landmark(FeatureId::Number(2)))
    );
}

#[test]
fn test_route_marker_popup_on_hover() {
    let mut p = planner();
    p.submit_popup(&PopupForm {
        action: FormAction::Add,
        landmark_id: FeatureId::Number(1),
    })
    .unwrap();
    p.session.marker_hover(&MarkerRef::Route(0));
    let marker = p.session.route_popup().unwrap();
    assert_eq!(
        marker.popup_html(),
        "<h2>Coit Tower</h2><p>Destination added</p>"
    );
}

#[test]
fn test_directions_render_into_panel() {
    let mut p = planner();
    p.session.select_place(&geocoded("Ferry Building", [-122.3933, 37.7955]));
    p.confirm(DialogChoice::Add).unwrap();
    p.session.select_place(&geocoded("Coit Tower", [-122.4058, 37.8024]));
    p.confirm(DialogChoice::Add).unwrap();

    p.get_directions().unwrap();
    let panel = p.session.panel();
    assert_eq!(panel.routes, vec!["Ferry Building to Coit Tower: ".to_string()]);
    assert_eq!(panel.duration, vec!["10 minutes".to_string()]);
    assert_eq!(panel.instructions, vec!["Head north", "Turn left"]);
    assert_eq!(panel.distances, vec!["123.5 meters", "300.0 meters"]);
    assert_eq!(p.session.polyline().points().len(), 3);
    assert_eq!(
        p.session.polyline().points()[0],
        LatLng::new(37.7955, -122.3933)
    );
}

#[test]
fn test_failed_route_does_not_block_summary() {
    let mut p = planner();
    p.backend().state.lock().unwrap().fail_route = true;
    assert!(p.get_directions().is_err());

    assert_eq!(p.session.panel().routes.len(), 1);
    assert!(p.session.panel().duration.is_empty());
    assert!(p.session.polyline().is_empty());
    let errors: Vec<_> = p
        .session
        .notices()
        .iter()
        .filter(|n| n.kind == NoticeKind::Error)
        .collect();
    assert_eq!(errors.len(), 1);
}

#[test]
fn test_response_without_route_is_an_error() {
    let mut p = planner();
    p.backend().state.lock().unwrap().empty_route = true;

    let err = p.get_directions().unwrap_err();
    assert!(matches!(err, TripError::NoRoute));
    assert_eq!(p.session.panel().routes.len(), 1);
    assert!(p.session.polyline().is_empty());
    let errors: Vec<_> = p
        .session
        .notices()
        .iter()
        .filter(|n| n.kind == NoticeKind::Error)
        .map(|n| n.text.clone())
        .collect();
    assert_eq!(
        errors,
        vec!["Could not route directions: Directions response contained no route".to_string()]
    );
}

#[test]
fn test_clear_empties_map_and_reloads() {
    let mut p = planner();
    p.session.select_place(&geocoded("Coit Tower", [-122.4058, 37.8024]));
    p.confirm(DialogChoice::Add).unwrap();
    p.get_directions().unwrap();
    assert!(!p.session.polyline().is_empty());
    p.session.marker_click(&MarkerRef::Initial(FeatureId::Number(1)));

    p.backend().state.lock().unwrap().calls.clear();
    p.clear().unwrap();

    assert!(p.session.route().is_empty());
    assert!(p.session.polyline().is_empty());
    assert!(p.session.panel().is_empty());
    // reload starts over from the initial layer
    assert_eq!(p.session.landmarks().stage(), LayerStage::Initial);
    assert_eq!(p.session.placeholder(), "Where do you want to go?");
    assert!(info_notices(&p).contains(&"Cleared!".to_string()));

    let calls = p.backend().state.lock().unwrap().calls.clone();
    assert_eq!(
        calls,
        vec!["clear", "has_origin", "landmarks", "landmarks", "all_waypoints"]
    );
}

#[test]
fn test_failed_clear_leaves_route() {
    let mut p = planner();
    p.session.select_place(&geocoded("Coit Tower", [-122.4058, 37.8024]));
    p.confirm(DialogChoice::Add).unwrap();
    p.backend().state.lock().unwrap().fail_clear = true;

    assert!(p.clear().is_err());
    assert_eq!(p.session.route().len(), 1);
    assert!(!info_notices(&p).contains(&"Cleared!".to_string()));
}

#[test]
fn test_bootstrap_restores_saved_waypoints() {
    let backend = MockBackend::default();
    backend.state.lock().unwrap().waypoints.push(Waypoint {
        coordinates: [-122.3933, 37.7955],
        place_name: "Ferry Building".into(),
    });
    backend.state.lock().unwrap().has_origin = true;

    let mut p = TripPlanner::new(backend, &WanderConfig::default());
    p.bootstrap().unwrap();
    assert_eq!(p.session.placeholder(), "Where to next?");
    assert_eq!(p.session.route().len(), 1);
    assert!(p.session.notices().is_empty());
}

#[test]
fn test_add_new_landmark_and_debug() {
    let mut p = planner();
    p.add_new_landmark().unwrap();
    assert_eq!(p.session.route().markers()[0].title, "Presidio Overlook");

    p.debug().unwrap();
    match p.session.dialog() {
        Some(Dialog::Session { title, text, .. }) => {
            assert_eq!(title, "Session");
            assert!(text.contains("\n    \"waypoints\": ["));
            assert!(text.contains("Presidio Overlook"));
        }
        other => panic!("expected session dialog, got {:?}", other),
    }
}
