//! Single owner of all navigation state
//!
//! Every input reaches the [`Navigator`] as a [`NavEvent`]: user actions,
//! position ticks, lookup completions. Timer expiry arrives through
//! [`Navigator::on_deadline`]. Nothing else mutates state. Work that has to
//! leave the loop (network lookups) is returned as [`Effect`]s, and their
//! results come back as events tagged with the sequence number they were
//! issued under.

use std::sync::Arc;
use std::time::Instant;

use crate::config::NavigatorConfig;
use crate::control::{ControlAffordance, ControlVisibility, DragHandle};
use crate::coords::LatLng;
use crate::error::{LookupError, PositionError, SessionError};
use crate::events::events::{PositionUnavailable, RideStateChanged, RouteFailed, RouteUpdated, SearchFailed};
use crate::events::EventBus;
use crate::position::Position;
use crate::ride::{Destination, RideSession};
use crate::route::{RouteLookup, RouteOutcome, RouteRequest};
use crate::search::{SearchOutcome, SearchRequest, SuggestionSearch, Suggestion};
use crate::sequence::{Seq, SequenceCounter};
use crate::state::{MapSnapshot, MapStyle};
use crate::view::ViewCommandEmitter;

/// Everything that can happen to the navigator
#[derive(Debug, Clone)]
pub enum NavEvent {
    /// New reading from the position stream
    PositionUpdated(Position),
    /// The position source reported an error
    PositionFailed(PositionError),
    /// Destination input text changed
    Query(String),
    /// A suggestion (list click or dropdown pick) was chosen by id
    SelectSuggestion(String),
    /// A destination was chosen directly
    SelectDestination(Destination),
    /// "Current location" was picked as the destination
    SelectCurrentLocation,
    /// "Show route"
    ConfirmRoute,
    /// "Cancel ride"
    Cancel,
    /// The map surface was clicked
    MapClick(LatLng),
    /// "Set as destination" on the clicked marker
    ConfirmMapClick,
    /// Drag-start or zoom-start on the map surface
    Interaction,
    /// The floating recenter control was activated
    ActivateControl,
    DragStart,
    DragMove { dx: f32, dy: f32 },
    DragEnd,
    SetMapStyle(MapStyle),
    /// A suggestion lookup finished
    SuggestionsResolved {
        seq: Seq,
        result: Result<Vec<Suggestion>, LookupError>,
    },
    /// A route lookup finished
    RouteResolved {
        seq: Seq,
        result: Result<RouteLookup, LookupError>,
    },
    /// A reverse-geocode lookup finished
    ReverseGeocoded {
        seq: Seq,
        result: Result<String, LookupError>,
    },
}

impl NavEvent {
    /// Coordinates supplied from outside the core, if the event carries any
    fn coordinates(&self) -> Option<LatLng> {
        match self {
            NavEvent::PositionUpdated(position) => Some(position.coords),
            NavEvent::SelectDestination(destination) => Some(destination.coords),
            NavEvent::MapClick(coords) => Some(*coords),
            _ => None,
        }
    }
}

/// Work the runtime must perform outside the navigator
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Search(SearchRequest),
    Route(RouteRequest),
    ReverseGeocode { seq: Seq, coords: LatLng },
}

/// The navigation core
pub struct Navigator {
    ride: RideSession,
    search: SuggestionSearch,
    reverse: SequenceCounter,
    visibility: ControlVisibility,
    drag: DragHandle,
    map_style: MapStyle,
    view: ViewCommandEmitter,
    bus: Arc<EventBus>,
}

impl Navigator {
    /// Create a navigator with its own event bus
    pub fn new(config: NavigatorConfig) -> Self {
        Self::with_bus(config, Arc::new(EventBus::new()))
    }

    /// Create a navigator publishing notices on a shared bus
    pub fn with_bus(config: NavigatorConfig, bus: Arc<EventBus>) -> Self {
        let (x, y) = config.control.initial_offset;

        Self {
            ride: RideSession::new(),
            search: SuggestionSearch::new(config.search.debounce(), config.search.limit),
            reverse: SequenceCounter::new(),
            visibility: ControlVisibility::new(config.control.hide_after()),
            drag: DragHandle::new(x, y),
            map_style: config.map_style,
            view: ViewCommandEmitter::new(config.camera),
            bus,
        }
    }

    /// Start the one-shot hide timer of the recenter control
    pub fn mount(&mut self, now: Instant) {
        self.visibility.mount(now);
    }

    /// Apply one event
    pub fn handle(&mut self, event: NavEvent, now: Instant) -> Vec<Effect> {
        if let Some(coords) = event.coordinates().filter(|c| !c.is_valid()) {
            tracing::warn!("Dropping {:?}: coordinates out of range ({:?})", event, coords);
            return Vec::new();
        }

        let before = self.ride.state();
        let mut effects = Vec::new();

        match event {
            NavEvent::PositionUpdated(position) => {
                effects.extend(self.on_position(position).map(Effect::Route));
            }
            NavEvent::PositionFailed(error) => self.on_position_error(error),
            NavEvent::Query(text) => {
                self.search.query(&text, now);
            }
            NavEvent::SelectSuggestion(id) => {
                let result = self.select_suggestion(&id);
                effects.extend(self.accept(result, "select suggestion"));
            }
            NavEvent::SelectDestination(destination) => {
                effects.extend(self.select_destination(destination).map(Effect::Route));
            }
            NavEvent::SelectCurrentLocation => {
                if self.ride.select_current_location() {
                    tracing::debug!("Current location picked; destination cleared");
                }
            }
            NavEvent::ConfirmRoute => {
                let result = self.ride.confirm_route();
                effects.extend(self.accept(result, "confirm route"));
            }
            NavEvent::Cancel => {
                self.cancel();
            }
            NavEvent::MapClick(coords) => effects.push(self.on_map_click(coords)),
            NavEvent::ConfirmMapClick => {
                let result = self.confirm_map_click();
                effects.extend(self.accept(result, "confirm map click"));
            }
            NavEvent::Interaction => self.visibility.on_interaction(now),
            NavEvent::ActivateControl => self.activate_control(),
            NavEvent::DragStart => self.drag.drag_start(),
            NavEvent::DragMove { dx, dy } => {
                self.drag.drag_move(dx, dy);
            }
            NavEvent::DragEnd => self.drag.drag_end(),
            NavEvent::SetMapStyle(style) => self.map_style = style,
            NavEvent::SuggestionsResolved { seq, result } => self.on_suggestions(seq, result),
            NavEvent::RouteResolved { seq, result } => self.on_route(seq, result),
            NavEvent::ReverseGeocoded { seq, result } => self.on_reverse_geocoded(seq, result),
        }

        let after = self.ride.state();
        if before != after {
            tracing::info!("Ride state {:?} -> {:?}", before, after);
            self.bus.publish(RideStateChanged { from: before, to: after });
        }

        effects
    }

    /// Fire whichever deadlines have passed
    pub fn on_deadline(&mut self, now: Instant) -> Vec<Effect> {
        let mut effects = Vec::new();

        if let Some(request) = self.search.poll(now) {
            effects.push(Effect::Search(request));
        }
        if self.visibility.expire(now) {
            tracing::debug!("Recenter control hidden");
        }

        effects
    }

    /// Earliest pending deadline across the debounce and hide timers
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.search.next_deadline(), self.visibility.hide_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    fn accept(&self, result: Result<Option<RouteRequest>, SessionError>, action: &str) -> Option<Effect> {
        match result {
            Ok(request) => request.map(Effect::Route),
            Err(e) => {
                tracing::warn!("Ignoring {}: {}", action, e);
                None
            }
        }
    }

    /// Record a position tick; while a ride is active this refreshes the route
    pub fn on_position(&mut self, position: Position) -> Option<RouteRequest> {
        self.view.position_fix(&position);
        self.ride.on_position_tick(position)
    }

    fn on_position_error(&mut self, error: PositionError) {
        let last_known = self.ride.position().cloned();
        tracing::warn!("Position unavailable: {} (holding last known fix: {})", error, last_known.is_some());
        self.bus.publish(PositionUnavailable { error, last_known });
    }

    /// Choose a destination directly
    pub fn select_destination(&mut self, destination: Destination) -> Option<RouteRequest> {
        self.view.destination_selected(&destination);
        self.ride.select_destination(destination)
    }

    /// Choose one of the current suggestions
    pub fn select_suggestion(&mut self, id: &str) -> Result<Option<RouteRequest>, SessionError> {
        let suggestion = self.search
            .find(id)
            .cloned()
            .ok_or_else(|| SessionError::UnknownSuggestion(id.to_string()))?;

        self.search.accept(&suggestion.label);
        Ok(self.select_destination(Destination::new(suggestion.coords, suggestion.label)))
    }

    /// End the ride and clear the destination input; returns `false` when already idle
    pub fn cancel(&mut self) -> bool {
        if !self.ride.cancel() {
            return false;
        }
        self.search.reset();
        true
    }

    fn on_map_click(&mut self, coords: LatLng) -> Effect {
        self.ride.set_from_map_click(coords, None);
        let seq = self.reverse.issue();
        Effect::ReverseGeocode { seq, coords }
    }

    /// Promote the clicked marker to the destination
    pub fn confirm_map_click(&mut self) -> Result<Option<RouteRequest>, SessionError> {
        let click = self.ride.pending_click().cloned().ok_or(SessionError::NoPendingClick)?;
        // A label still in flight belongs to a marker that no longer exists
        self.reverse.invalidate();
        self.view.destination_selected(&Destination::new(click.coords, click.display_label()));
        self.ride.confirm_map_click()
    }

    fn activate_control(&mut self) {
        self.visibility.dismiss();
        if let Some(position) = self.ride.position() {
            self.view.recenter(position);
        }
    }

    fn on_suggestions(&mut self, seq: Seq, result: Result<Vec<Suggestion>, LookupError>) {
        match self.search.complete(seq, result) {
            SearchOutcome::Updated(count) => {
                tracing::debug!("{} suggestions for '{}'", count, self.search.text());
            }
            SearchOutcome::Stale => {}
            SearchOutcome::Failed(error) => {
                tracing::warn!("Suggestion lookup failed: {}", error);
                self.bus.publish(SearchFailed {
                    query: self.search.text().to_string(),
                    error,
                });
            }
        }
    }

    fn on_route(&mut self, seq: Seq, result: Result<RouteLookup, LookupError>) {
        match self.ride.on_route_response(seq, result) {
            RouteOutcome::Applied => {
                if let Some(route) = self.ride.route() {
                    let summary = route.summary();
                    tracing::info!("Route {}: {:.2} km, {} min", seq, summary.distance_km, summary.duration_min);
                    self.view.route_applied(route);
                    self.bus.publish(RouteUpdated { summary });
                }
            }
            RouteOutcome::Stale => {}
            RouteOutcome::Failed(error) => {
                let keeping_previous = self.ride.route().is_some();
                tracing::warn!("Route lookup {} failed: {}", seq, error);
                self.bus.publish(RouteFailed { error, keeping_previous });
            }
        }
    }

    fn on_reverse_geocoded(&mut self, seq: Seq, result: Result<String, LookupError>) {
        if !self.reverse.is_current(seq) {
            tracing::trace!("Discarding stale reverse geocode {}", seq);
            return;
        }
        match result {
            Ok(label) => {
                self.ride.label_pending_click(label);
            }
            Err(e) => tracing::warn!("Reverse geocoding failed: {}", e),
        }
    }

    /// Current renderable state
    pub fn snapshot(&self) -> MapSnapshot {
        let route = self.ride.route();

        MapSnapshot {
            ride_state: self.ride.state(),
            position: self.ride.position().cloned(),
            destination: self.ride.destination().cloned(),
            route: route.map(|r| r.polyline.clone()).unwrap_or_default(),
            route_summary: route.map(|r| r.summary()),
            clicked: self.ride.pending_click().cloned(),
            query: self.search.text().to_string(),
            suggestions: self.search.suggestions().to_vec(),
            control: ControlAffordance::compose(&self.visibility, &self.drag),
            map_style: self.map_style,
        }
    }

    pub fn ride(&self) -> &RideSession {
        &self.ride
    }

    pub fn view(&self) -> &ViewCommandEmitter {
        &self.view
    }
}
