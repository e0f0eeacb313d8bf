//! Ride session state machine
//!
//! ```text
//!            select_destination             confirm_route
//!   Idle ─────────────────────────▶ Previewing ─────────────▶ Active
//!    ▲                                  │                        │
//!    └──────────── cancel ◀─────────────┴────────────────────────┘
//! ```
//!
//! The session owns the [`RouteEngine`]. Transitions that need a route hand
//! back a [`RouteRequest`] for the caller to execute; the response comes back
//! through [`RideSession::on_route_response`].

use serde::{Serialize, Deserialize};

use crate::coords::LatLng;
use crate::error::{LookupError, SessionError};
use crate::position::Position;
use crate::route::{Route, RouteEngine, RouteLookup, RouteOutcome, RouteRequest};
use crate::sequence::Seq;

/// Lifecycle state of a ride
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RideState {
    /// No destination
    Idle,
    /// Destination chosen, route not yet confirmed
    Previewing,
    /// Route confirmed; position ticks keep refreshing it
    Active,
}

/// The user-confirmed routing target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Destination {
    pub coords: LatLng,
    pub label: String,
}

impl Destination {
    pub fn new(coords: LatLng, label: impl Into<String>) -> Self {
        Self {
            coords,
            label: label.into(),
        }
    }
}

/// A map tap waiting for explicit confirmation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClickedLocation {
    pub coords: LatLng,
    /// Reverse-geocoded label, once it arrives
    pub label: Option<String>,
}

impl ClickedLocation {
    /// Label to show, falling back to the coordinates
    pub fn display_label(&self) -> String {
        self.label.clone().unwrap_or_else(|| self.coords.to_string())
    }
}

/// Destination selection, route confirmation and cancellation
#[derive(Debug)]
pub struct RideSession {
    state: RideState,
    destination: Option<Destination>,
    position: Option<Position>,
    pending_click: Option<ClickedLocation>,
    routes: RouteEngine,
}

impl Default for RideSession {
    fn default() -> Self {
        Self::new()
    }
}

impl RideSession {
    /// Create an idle session
    pub fn new() -> Self {
        Self {
            state: RideState::Idle,
            destination: None,
            position: None,
            pending_click: None,
            routes: RouteEngine::new(),
        }
    }

    /// Choose a destination
    ///
    /// From Idle or Previewing this enters Previewing. During an active ride
    /// the ride stays Active and is immediately re-routed to the new target.
    /// Any displayed route is dropped either way.
    pub fn select_destination(&mut self, destination: Destination) -> Option<RouteRequest> {
        tracing::debug!("Destination selected: {} ({})", destination.label, destination.coords);
        self.destination = Some(destination);
        self.routes.clear();

        match self.state {
            RideState::Idle | RideState::Previewing => {
                self.state = RideState::Previewing;
                None
            }
            RideState::Active => self.request_route(),
        }
    }

    /// Confirm the previewed destination and start the ride
    ///
    /// Without a known position the ride still starts; the first position
    /// tick issues the request. While already Active this re-issues the
    /// request as an explicit retry.
    pub fn confirm_route(&mut self) -> Result<Option<RouteRequest>, SessionError> {
        match self.state {
            RideState::Idle => Err(SessionError::InvalidTransition {
                state: self.state,
                action: "confirm a route",
            }),
            RideState::Previewing => {
                self.state = RideState::Active;
                Ok(self.request_route())
            }
            RideState::Active if self.destination.is_none() => Err(SessionError::NoDestination),
            RideState::Active => Ok(self.request_route()),
        }
    }

    /// Record a new position; while Active this refreshes the route
    pub fn on_position_tick(&mut self, position: Position) -> Option<RouteRequest> {
        self.position = Some(position);

        match self.state {
            RideState::Active => self.request_route(),
            RideState::Idle | RideState::Previewing => None,
        }
    }

    /// End the ride; returns `false` when already Idle
    pub fn cancel(&mut self) -> bool {
        if self.state == RideState::Idle {
            return false;
        }

        self.state = RideState::Idle;
        self.destination = None;
        self.routes.clear();
        true
    }

    /// "Current location" picked as the destination
    ///
    /// Clears the destination like `cancel` but an active ride stays Active
    /// with route requests suppressed until a new destination is chosen.
    /// Returns whether anything changed.
    pub fn select_current_location(&mut self) -> bool {
        match self.state {
            RideState::Idle => false,
            RideState::Previewing => self.cancel(),
            RideState::Active => {
                if self.destination.take().is_none() {
                    return false;
                }
                self.routes.clear();
                true
            }
        }
    }

    /// Remember a map tap without touching the ride
    pub fn set_from_map_click(&mut self, coords: LatLng, label: Option<String>) {
        self.pending_click = Some(ClickedLocation { coords, label });
    }

    /// Attach a reverse-geocoded label to the pending click
    pub fn label_pending_click(&mut self, label: String) -> bool {
        match self.pending_click.as_mut() {
            Some(click) => {
                click.label = Some(label);
                true
            }
            None => false,
        }
    }

    /// Promote the pending click to the destination
    pub fn confirm_map_click(&mut self) -> Result<Option<RouteRequest>, SessionError> {
        let click = self.pending_click.take().ok_or(SessionError::NoPendingClick)?;
        let label = click.display_label();
        Ok(self.select_destination(Destination::new(click.coords, label)))
    }

    /// Feed a routing response back to the engine
    pub fn on_route_response(&mut self, seq: Seq, result: Result<RouteLookup, LookupError>) -> RouteOutcome {
        self.routes.complete(seq, result)
    }

    fn request_route(&mut self) -> Option<RouteRequest> {
        let origin = self.position.as_ref()?.coords;
        let destination = self.destination.as_ref()?.coords;
        Some(self.routes.request(origin, destination))
    }

    pub fn state(&self) -> RideState {
        self.state
    }

    pub fn destination(&self) -> Option<&Destination> {
        self.destination.as_ref()
    }

    pub fn position(&self) -> Option<&Position> {
        self.position.as_ref()
    }

    pub fn pending_click(&self) -> Option<&ClickedLocation> {
        self.pending_click.as_ref()
    }

    pub fn route(&self) -> Option<&Route> {
        self.routes.current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paris() -> Destination {
        Destination::new(LatLng::new(48.85, 2.35), "Paris")
    }

    fn tick(lat: f64, lon: f64) -> Position {
        Position::now(LatLng::new(lat, lon))
    }

    fn lookup(distance_m: f64) -> RouteLookup {
        RouteLookup {
            polyline: vec![LatLng::new(10.0, 20.0), LatLng::new(48.85, 2.35)],
            distance_m,
            duration_s: 300.0,
        }
    }

    fn active_session() -> RideSession {
        let mut session = RideSession::new();
        session.on_position_tick(tick(10.0, 20.0));
        session.select_destination(paris());
        session.confirm_route().unwrap();
        session
    }

    #[test]
    fn test_select_then_confirm() {
        let mut session = RideSession::new();
        session.on_position_tick(tick(10.0, 20.0));

        assert!(session.select_destination(paris()).is_none());
        assert_eq!(session.state(), RideState::Previewing);
        assert_eq!(session.destination().unwrap().label, "Paris");

        let request = session.confirm_route().unwrap().unwrap();
        assert_eq!(session.state(), RideState::Active);
        assert_eq!(request.origin, LatLng::new(10.0, 20.0));
        assert_eq!(request.destination, LatLng::new(48.85, 2.35));
    }

    #[test]
    fn test_ticks_only_route_while_active() {
        let mut session = RideSession::new();
        assert!(session.on_position_tick(tick(10.0, 20.0)).is_none());

        session.select_destination(paris());
        assert!(session.on_position_tick(tick(10.0, 20.0)).is_none());

        session.confirm_route().unwrap();
        let request = session.on_position_tick(tick(10.001, 20.001)).unwrap();
        assert_eq!(request.origin, LatLng::new(10.001, 20.001));
        assert_eq!(session.state(), RideState::Active);
    }

    #[test]
    fn test_out_of_order_ticks_show_latest_distance() {
        let mut session = RideSession::new();
        session.select_destination(paris());
        session.confirm_route().unwrap();

        let first = session.on_position_tick(tick(10.0, 20.0)).unwrap();
        let second = session.on_position_tick(tick(10.001, 20.001)).unwrap();

        assert_eq!(session.on_route_response(first.seq, Ok(lookup(5_000.0))), RouteOutcome::Stale);
        assert_eq!(session.on_route_response(second.seq, Ok(lookup(4_980.0))), RouteOutcome::Applied);
        assert_eq!(session.route().unwrap().summary().distance_km, 4.98);
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let mut session = active_session();

        assert!(session.cancel());
        assert_eq!(session.state(), RideState::Idle);
        assert!(session.destination().is_none());
        assert!(session.route().is_none());

        assert!(!session.cancel());
        assert_eq!(session.state(), RideState::Idle);
    }

    #[test]
    fn test_cancel_makes_in_flight_route_inert() {
        let mut session = active_session();
        let request = session.on_position_tick(tick(10.0, 20.0)).unwrap();
        session.cancel();

        assert_eq!(session.on_route_response(request.seq, Ok(lookup(1.0))), RouteOutcome::Stale);
        assert!(session.route().is_none());
    }

    #[test]
    fn test_current_location_while_active() {
        let mut session = active_session();

        assert!(session.select_current_location());
        assert_eq!(session.state(), RideState::Active);
        assert!(session.destination().is_none());
        assert!(session.on_position_tick(tick(10.1, 20.1)).is_none());
        assert_eq!(session.confirm_route(), Err(SessionError::NoDestination));

        let request = session.select_destination(paris());
        assert!(request.is_some());
        assert_eq!(session.state(), RideState::Active);
    }

    #[test]
    fn test_current_location_while_previewing_goes_idle() {
        let mut session = RideSession::new();
        session.select_destination(paris());

        assert!(session.select_current_location());
        assert_eq!(session.state(), RideState::Idle);
        assert!(!session.select_current_location());
    }

    #[test]
    fn test_confirm_from_idle_rejected() {
        let mut session = RideSession::new();
        assert!(matches!(
            session.confirm_route(),
            Err(SessionError::InvalidTransition { state: RideState::Idle, .. })
        ));
    }

    #[test]
    fn test_confirm_without_position_defers_request() {
        let mut session = RideSession::new();
        session.select_destination(paris());

        assert_eq!(session.confirm_route(), Ok(None));
        assert_eq!(session.state(), RideState::Active);
        assert!(session.on_position_tick(tick(10.0, 20.0)).is_some());
    }

    #[test]
    fn test_map_click_needs_confirmation() {
        let mut session = active_session();
        session.set_from_map_click(LatLng::new(48.86, 2.29), None);

        assert_eq!(session.destination().unwrap().label, "Paris");
        assert_eq!(session.state(), RideState::Active);

        assert!(session.label_pending_click("Tour Eiffel".to_string()));
        let request = session.confirm_map_click().unwrap();

        assert!(request.is_some());
        assert_eq!(session.destination().unwrap().label, "Tour Eiffel");
        assert!(session.pending_click().is_none());
        assert_eq!(session.confirm_map_click(), Err(SessionError::NoPendingClick));
    }

    #[test]
    fn test_unlabelled_click_uses_coordinates() {
        let mut session = RideSession::new();
        session.set_from_map_click(LatLng::new(48.858_37, 2.294_48), None);
        session.confirm_map_click().unwrap();

        assert_eq!(session.state(), RideState::Previewing);
        assert_eq!(session.destination().unwrap().label, "48.85837, 2.29448");
    }
}
