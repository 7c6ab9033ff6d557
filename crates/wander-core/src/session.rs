// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Wander contributors

//! UI state of one planning session.
//!
//! `TripSession` owns everything the map page mutates: view, landmark layers,
//! route layer, polyline, directions panel, the open dialog and popup, and the
//! alert queue. Front ends call the backend themselves and feed results back
//! through the `apply_*` methods, so the same state machine serves both the
//! synchronous CLI and the task-based GUI.

use crate::config::WanderConfig;
use crate::debug::{pretty_session, session_markup};
use crate::directions::{
    DirectionsPanel, DirectionsResponse, DirectionsTicket, OriginAndDestination, RenderedRoute,
};
use crate::features::{FeatureCollection, FeatureId, LandmarkLayers, LayerKind, LayerStage};
use crate::geo::{MapSettings, MapViewState};
use crate::geocoder::{placeholder_for, GeocodedPlace, PLACEHOLDER_NO_ORIGIN};
use crate::popup::{FormAction, LandmarkPopup, PopupForm, PopupTrigger};
use crate::route::{DestinationTarget, Polyline, RouteLayer, RouteMarker, SaveOutcome, Waypoint};
use log::{debug, info, warn};
use std::fmt;

pub const CONFIRM_MESSAGE: &str = "Add this destination to your trip?";
pub const ADDED_ALERT: &str = "Destination added.";
pub const CLEARED_ALERT: &str = "Cleared!";
pub const SESSION_DIALOG_TITLE: &str = "Session";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogChoice {
    Save,
    Cancel,
    Add,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogButton {
    pub choice: DialogChoice,
    pub label: &'static str,
    pub class_name: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmDialog {
    pub title: String,
    pub message: &'static str,
    pub coordinates: [f64; 2],
}

impl ConfirmDialog {
    pub fn buttons(&self) -> [DialogButton; 3] {
        [
            DialogButton {
                choice: DialogChoice::Save,
                label: "Save to Favorites",
                class_name: "btn-save",
            },
            DialogButton {
                choice: DialogChoice::Cancel,
                label: "Cancel",
                class_name: "btn-cancel",
            },
            DialogButton {
                choice: DialogChoice::Add,
                label: "Add destination",
                class_name: "btn-add",
            },
        ]
    }

    fn target(&self) -> DestinationTarget {
        DestinationTarget::Place {
            coordinates: self.coordinates,
            place_name: self.title.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Dialog {
    ConfirmDestination(ConfirmDialog),
    Session { title: String, text: String, markup: String },
}

/// A save or add call waiting to be sent.
#[derive(Debug, Clone, PartialEq)]
pub struct DestinationRequest {
    pub action: FormAction,
    pub target: DestinationTarget,
}

/// A marker the pointer interacted with.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MarkerRef {
    Initial(FeatureId),
    Landmark(FeatureId),
    Route(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenPopup {
    Landmark(FeatureId),
    Route(usize),
}

pub struct TripSession {
    settings: MapSettings,
    trigger: PopupTrigger,
    pub view: MapViewState,
    placeholder: String,
    landmarks: LandmarkLayers,
    route: RouteLayer,
    polyline: Polyline,
    panel: DirectionsPanel,
    dialog: Option<Dialog>,
    popup: Option<OpenPopup>,
    notices: Vec<Notice>,
    next_ticket: u64,
    latest_ticket: Option<DirectionsTicket>,
    reload_requested: bool,
}

impl TripSession {
    pub fn new(config: &WanderConfig) -> Self {
        Self::with_settings(config.map.clone(), config.popup_trigger)
    }

    pub fn with_settings(settings: MapSettings, trigger: PopupTrigger) -> Self {
        Self {
            view: MapViewState::new(&settings),
            settings,
            trigger,
            placeholder: PLACEHOLDER_NO_ORIGIN.to_string(),
            landmarks: LandmarkLayers::new(),
            route: RouteLayer::new(),
            polyline: Polyline::new(),
            panel: DirectionsPanel::default(),
            dialog: None,
            popup: None,
            notices: Vec::new(),
            next_ticket: 0,
            latest_ticket: None,
            reload_requested: false,
        }
    }

    // --- accessors ---

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    pub fn landmarks(&self) -> &LandmarkLayers {
        &self.landmarks
    }

    pub fn route(&self) -> &RouteLayer {
        &self.route
    }

    pub fn polyline(&self) -> &Polyline {
        &self.polyline
    }

    pub fn panel(&self) -> &DirectionsPanel {
        &self.panel
    }

    pub fn dialog(&self) -> Option<&Dialog> {
        self.dialog.as_ref()
    }

    pub fn popup(&self) -> Option<&OpenPopup> {
        self.popup.as_ref()
    }

    pub fn trigger(&self) -> PopupTrigger {
        self.trigger
    }

    pub fn set_trigger(&mut self, trigger: PopupTrigger) {
        self.trigger = trigger;
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    // --- geocoder ---

    pub fn apply_has_origin(&mut self, has_origin: bool) {
        self.placeholder = placeholder_for(has_origin).to_string();
    }

    pub fn select_place(&mut self, place: &GeocodedPlace) {
        self.open_confirm(place.coordinates(), &place.text);
    }

    // --- confirmation dialog ---

    /// Opens the save/add/cancel dialog, replacing any open dialog.
    pub fn open_confirm(&mut self, coordinates: [f64; 2], place_name: &str) {
        debug!("Confirm destination — place_name={}", place_name);
        self.dialog = Some(Dialog::ConfirmDestination(ConfirmDialog {
            title: place_name.to_string(),
            message: CONFIRM_MESSAGE,
            coordinates,
        }));
    }

    pub fn dismiss_dialog(&mut self) {
        self.dialog = None;
    }

    /// Closes the confirmation dialog and returns the request the choice implies.
    pub fn choose(&mut self, choice: DialogChoice) -> Option<DestinationRequest> {
        let confirm = match self.dialog.take() {
            Some(Dialog::ConfirmDestination(c)) => c,
            other => {
                self.dialog = other;
                return None;
            }
        };
        let action = match choice {
            DialogChoice::Cancel => return None,
            DialogChoice::Save => FormAction::Save,
            DialogChoice::Add => FormAction::Add,
        };
        Some(DestinationRequest {
            action,
            target: confirm.target(),
        })
    }

    // --- landmark layers and popups ---

    pub fn load_landmarks(&mut self, kind: LayerKind, collection: FeatureCollection) {
        self.landmarks.load(kind, collection);
    }

    pub fn marker_hover(&mut self, marker: &MarkerRef) {
        if self.trigger == PopupTrigger::Hover {
            self.open_marker_popup(marker);
        }
    }

    /// Returns `true` when the click switched the initial layer to the full one.
    pub fn marker_click(&mut self, marker: &MarkerRef) -> bool {
        if let MarkerRef::Initial(id) = marker {
            return match self.landmarks.click_initial(id) {
                Some(position) => {
                    self.view.set_view(position, self.settings.focus_zoom);
                    self.view.pan_to(position);
                    info!("Showing full landmark layer — center={:?}", position);
                    true
                }
                None => false,
            };
        }
        if self.trigger == PopupTrigger::Click {
            self.open_marker_popup(marker);
        }
        false
    }

    fn open_marker_popup(&mut self, marker: &MarkerRef) {
        match marker {
            MarkerRef::Initial(_) => {}
            MarkerRef::Landmark(id) => {
                if self.landmarks.stage() == LayerStage::Full
                    && self.landmarks.find_visible(id).is_some()
                {
                    self.popup = Some(OpenPopup::Landmark(id.clone()));
                }
            }
            MarkerRef::Route(index) => {
                if *index < self.route.len() {
                    self.popup = Some(OpenPopup::Route(*index));
                }
            }
        }
    }

    pub fn close_popup(&mut self) {
        self.popup = None;
    }

    pub fn landmark_popup(&self) -> Option<LandmarkPopup> {
        match &self.popup {
            Some(OpenPopup::Landmark(id)) => {
                self.landmarks.find(id).map(LandmarkPopup::for_landmark)
            }
            _ => None,
        }
    }

    pub fn route_popup(&self) -> Option<&RouteMarker> {
        match self.popup {
            Some(OpenPopup::Route(index)) => self.route.markers().get(index),
            _ => None,
        }
    }

    /// Single entry point for both popup forms, keyed by landmark id.
    pub fn submit_form(&mut self, form: &PopupForm) -> DestinationRequest {
        debug!(
            "Popup form submitted — action={:?} landmark_id={}",
            form.action, form.landmark_id
        );
        DestinationRequest {
            action: form.action,
            target: form.target(),
        }
    }

    // --- response handlers ---

    pub fn apply_saved(&mut self, outcome: SaveOutcome) {
        self.alert(outcome.alert());
    }

    pub fn apply_added(&mut self, waypoint: &Waypoint) {
        self.route.add_waypoint(waypoint);
        self.alert(ADDED_ALERT);
    }

    /// Route markers for destinations already in the backend session. No alerts.
    pub fn apply_waypoints(&mut self, waypoints: &[Waypoint]) {
        for waypoint in waypoints {
            self.route.add_waypoint(waypoint);
        }
    }

    // --- directions ---

    pub fn begin_directions(&mut self) -> DirectionsTicket {
        self.next_ticket += 1;
        let ticket = DirectionsTicket(self.next_ticket);
        self.latest_ticket = Some(ticket);
        ticket
    }

    fn is_current(&self, ticket: DirectionsTicket) -> bool {
        if self.latest_ticket == Some(ticket) {
            true
        } else {
            debug!("Dropping superseded directions response — ticket={:?}", ticket);
            false
        }
    }

    pub fn apply_origin_destination(
        &mut self,
        ticket: DirectionsTicket,
        od: &OriginAndDestination,
    ) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.panel.append_summary(od);
        true
    }

    /// `Ok(false)` when the ticket was superseded. A response without a route
    /// leaves the polyline and panel untouched.
    pub fn apply_route(
        &mut self,
        ticket: DirectionsTicket,
        response: &DirectionsResponse,
    ) -> crate::Result<bool> {
        if !self.is_current(ticket) {
            return Ok(false);
        }
        let rendered = RenderedRoute::from_response(response)?;
        self.polyline.set_points(rendered.path.clone());
        self.panel.append_route(&rendered);
        Ok(true)
    }

    // --- clear / reset / reload ---

    /// Replaces the route layer and polyline with empty ones.
    pub fn reset(&mut self) {
        self.route = RouteLayer::new();
        self.polyline = Polyline::new();
        if matches!(self.popup, Some(OpenPopup::Route(_))) {
            self.popup = None;
        }
    }

    pub fn apply_cleared(&mut self) {
        self.reset();
        self.reload_requested = true;
        self.alert(CLEARED_ALERT);
    }

    pub fn take_reload_request(&mut self) -> bool {
        std::mem::take(&mut self.reload_requested)
    }

    /// Rebuilds everything a page reload would. Pending alerts survive.
    pub fn reload(&mut self) {
        let notices = std::mem::take(&mut self.notices);
        let next_ticket = self.next_ticket;
        *self = Self::with_settings(self.settings.clone(), self.trigger);
        self.notices = notices;
        self.next_ticket = next_ticket;
    }

    // --- debug panel ---

    pub fn show_debug(&mut self, state: &serde_json::Value) -> crate::Result<()> {
        let text = pretty_session(state)?;
        let markup = session_markup(&text);
        self.dialog = Some(Dialog::Session {
            title: SESSION_DIALOG_TITLE.to_string(),
            text,
            markup,
        });
        Ok(())
    }

    // --- notices ---

    pub fn alert(&mut self, text: &str) {
        self.notices.push(Notice {
            kind: NoticeKind::Info,
            text: text.to_string(),
        });
    }

    /// Uniform handling for any failed backend call: log it and queue an error notice.
    pub fn report_failure(&mut self, action: &str, error: &dyn fmt::Display) {
        warn!("Backend call failed — action={} error={}", action, error);
        self.notices.push(Notice {
            kind: NoticeKind::Error,
            text: format!("Could not {}: {}", action, error),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> TripSession {
        TripSession::new(&WanderConfig::default())
    }

    fn place(name: &str) -> GeocodedPlace {
        GeocodedPlace {
            text: name.to_string(),
            place_name: format!("{}, San Francisco", name),
            geometry: crate::geocoder::PlaceGeometry {
                coordinates: [-122.4058, 37.8024],
            },
        }
    }

    #[test]
    fn test_select_place_opens_one_dialog() {
        let mut s = session();
        s.select_place(&place("Coit Tower"));
        s.select_place(&place("Ferry Building"));
        match s.dialog() {
            Some(Dialog::ConfirmDestination(c)) => {
                assert_eq!(c.title, "Ferry Building");
                assert_eq!(c.message, CONFIRM_MESSAGE);
                let labels: Vec<_> = c.buttons().iter().map(|b| b.label).collect();
                assert_eq!(labels, ["Save to Favorites", "Cancel", "Add destination"]);
            }
            other => panic!("unexpected dialog {:?}", other),
        }
    }

    #[test]
    fn test_cancel_has_no_request() {
        let mut s = session();
        s.select_place(&place("Coit Tower"));
        assert_eq!(s.choose(DialogChoice::Cancel), None);
        assert!(s.dialog().is_none());
        assert!(s.notices().is_empty());
    }

    #[test]
    fn test_choose_without_dialog_is_noop() {
        let mut s = session();
        assert_eq!(s.choose(DialogChoice::Add), None);
    }

    #[test]
    fn test_add_choice_carries_place() {
        let mut s = session();
        s.select_place(&place("Coit Tower"));
        let req = s.choose(DialogChoice::Add).unwrap();
        assert_eq!(req.action, FormAction::Add);
        assert_eq!(
            req.target,
            DestinationTarget::Place {
                coordinates: [-122.4058, 37.8024],
                place_name: "Coit Tower".into()
            }
        );
    }

    #[test]
    fn test_stale_directions_ticket_dropped() {
        let mut s = session();
        let first = s.begin_directions();
        let second = s.begin_directions();
        let od = OriginAndDestination {
            origin: crate::directions::NamedPlace {
                place_name: "A, SF".into(),
            },
            destination: crate::directions::NamedPlace {
                place_name: "B, SF".into(),
            },
        };
        assert!(!s.apply_origin_destination(first, &od));
        assert!(s.apply_origin_destination(second, &od));
        assert_eq!(s.panel().routes, vec!["A to B: ".to_string()]);
    }

    #[test]
    fn test_empty_route_is_error() {
        let mut s = session();
        let t = s.begin_directions();
        let result = s.apply_route(t, &DirectionsResponse { routes: vec![] });
        assert!(matches!(result, Err(crate::TripError::NoRoute)));
        assert!(s.polyline().is_empty());
        assert!(s.panel().is_empty());

        let stale = s.begin_directions();
        s.begin_directions();
        assert!(!s.apply_route(stale, &DirectionsResponse { routes: vec![] }).unwrap());
    }

    #[test]
    fn test_reload_keeps_notices_and_settings() {
        let mut s = TripSession::with_settings(MapSettings::default(), PopupTrigger::Click);
        s.apply_has_origin(true);
        s.apply_cleared();
        assert!(s.take_reload_request());
        assert!(!s.take_reload_request());
        s.reload();
        assert_eq!(s.trigger(), PopupTrigger::Click);
        assert_eq!(s.placeholder(), PLACEHOLDER_NO_ORIGIN);
        assert_eq!(s.notices()[0].text, CLEARED_ALERT);
    }

    #[test]
    fn test_debug_dialog() {
        let mut s = session();
        s.show_debug(&serde_json::json!({"origin": null})).unwrap();
        match s.dialog() {
            Some(Dialog::Session { title, text, markup }) => {
                assert_eq!(title, "Session");
                assert_eq!(text, "{\n    \"origin\": null\n}");
                assert!(markup.starts_with("<pre>"));
            }
            other => panic!("unexpected dialog {:?}", other),
        }
    }
}
