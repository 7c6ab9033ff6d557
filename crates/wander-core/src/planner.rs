// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Wander contributors

use crate::backend::Backend;
use crate::features::LayerKind;
use crate::popup::{FormAction, PopupForm};
use crate::session::{DestinationRequest, DialogChoice, TripSession};
use crate::{Result, WanderConfig};
use log::info;

/// Drives a [`TripSession`] against a backend synchronously.
///
/// Each call mirrors one user action. Failures go through
/// [`TripSession::report_failure`] and are also returned to the caller.
pub struct TripPlanner<B: Backend> {
    backend: B,
    pub session: TripSession,
}

impl<B: Backend> TripPlanner<B> {
    pub fn new(backend: B, config: &WanderConfig) -> Self {
        Self {
            backend,
            session: TripSession::new(config),
        }
    }

    pub fn with_session(backend: B, session: TripSession) -> Self {
        Self { backend, session }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The "map ready" work: placeholder, both landmark layers, saved waypoints.
    /// Every request runs even if an earlier one failed; the first error is returned.
    pub fn bootstrap(&mut self) -> Result<()> {
        let mut first_err = None;

        match self.backend.has_origin() {
            Ok(has_origin) => self.session.apply_has_origin(has_origin),
            Err(e) => self.fail("check origin", e, &mut first_err),
        }
        for kind in [LayerKind::Initial, LayerKind::Full] {
            match self.backend.landmarks(kind) {
                Ok(fc) => self.session.load_landmarks(kind, fc),
                Err(e) => self.fail("load landmarks", e, &mut first_err),
            }
        }
        match self.backend.all_waypoints() {
            Ok(waypoints) => self.session.apply_waypoints(&waypoints),
            Err(e) => self.fail("load waypoints", e, &mut first_err),
        }

        first_err.map_or(Ok(()), Err)
    }

    fn fail(&mut self, action: &str, error: crate::TripError, slot: &mut Option<crate::TripError>) {
        self.session.report_failure(action, &error);
        if slot.is_none() {
            *slot = Some(error);
        }
    }

    fn reported<T>(&mut self, action: &str, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            self.session.report_failure(action, e);
        }
        result
    }

    pub fn execute(&mut self, request: &DestinationRequest) -> Result<()> {
        match request.action {
            FormAction::Save => {
                let result = self.backend.save_destination(&request.target);
                let outcome = self.reported("save destination", result)?;
                self.session.apply_saved(outcome);
            }
            FormAction::Add => {
                let result = self.backend.add_destination(&request.target);
                let waypoint = self.reported("add destination", result)?;
                info!("Destination added — place_name={}", waypoint.place_name);
                self.session.apply_added(&waypoint);
            }
        }
        Ok(())
    }

    /// Answers the open confirmation dialog.
    pub fn confirm(&mut self, choice: DialogChoice) -> Result<()> {
        match self.session.choose(choice) {
            Some(request) => self.execute(&request),
            None => Ok(()),
        }
    }

    pub fn submit_popup(&mut self, form: &PopupForm) -> Result<()> {
        let request = self.session.submit_form(form);
        self.execute(&request)
    }

    /// Issues both directions requests; one failing does not stop the other.
    pub fn get_directions(&mut self) -> Result<()> {
        let ticket = self.session.begin_directions();
        let mut first_err = None;

        match self.backend.origin_and_destination() {
            Ok(od) => {
                self.session.apply_origin_destination(ticket, &od);
            }
            Err(e) => self.fail("load origin and destination", e, &mut first_err),
        }
        match self.backend.route_directions() {
            Ok(response) => {
                if let Err(e) = self.session.apply_route(ticket, &response) {
                    self.fail("route directions", e, &mut first_err);
                }
            }
            Err(e) => self.fail("load route directions", e, &mut first_err),
        }

        first_err.map_or(Ok(()), Err)
    }

    /// Clears the trip, then reloads like a fresh page.
    pub fn clear(&mut self) -> Result<()> {
        let result = self.backend.clear();
        self.reported("clear trip", result)?;
        self.session.apply_cleared();
        if self.session.take_reload_request() {
            self.session.reload();
            self.bootstrap()?;
        }
        Ok(())
    }

    pub fn add_new_landmark(&mut self) -> Result<()> {
        let result = self.backend.add_new_landmark();
        let waypoint = self.reported("add new landmark", result)?;
        self.session.apply_added(&waypoint);
        Ok(())
    }

    pub fn debug(&mut self) -> Result<()> {
        let result = self.backend.debugger();
        let state = self.reported("load session state", result)?;
        self.session.show_debug(&state)
    }
}
