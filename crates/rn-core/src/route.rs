//! Route computation with stale-response suppression

use serde::{Serialize, Deserialize};

use crate::coords::{Bounds, LatLng};
use crate::error::LookupError;
use crate::sequence::{Seq, SequenceCounter};

/// Raw answer from the routing lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteLookup {
    pub polyline: Vec<LatLng>,
    pub distance_m: f64,
    pub duration_s: f64,
}

/// The route currently on display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub polyline: Vec<LatLng>,
    pub distance_m: f64,
    pub duration_s: f64,
    pub seq: Seq,
}

impl Route {
    /// Display form of distance and duration
    pub fn summary(&self) -> RouteSummary {
        RouteSummary::from_raw(self.distance_m, self.duration_s)
    }

    /// Box covering the whole polyline
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(&self.polyline)
    }
}

/// Distance and duration as shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteSummary {
    /// Kilometers, rounded to two decimals
    pub distance_km: f64,
    /// Whole minutes, rounded up
    pub duration_min: u64,
}

impl RouteSummary {
    pub fn from_raw(distance_m: f64, duration_s: f64) -> Self {
        Self {
            distance_km: (distance_m / 10.0).round() / 100.0,
            duration_min: (duration_s.max(0.0) / 60.0).ceil() as u64,
        }
    }
}

/// A routing lookup the owner should perform
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRequest {
    pub seq: Seq,
    pub origin: LatLng,
    pub destination: LatLng,
}

/// Result of feeding a routing response back in
#[derive(Debug, Clone, PartialEq)]
pub enum RouteOutcome {
    /// The response became the displayed route
    Applied,
    /// A newer request was issued; the response was ignored
    Stale,
    /// The lookup failed; the previous route stays
    Failed(LookupError),
}

/// Owns the displayed route and the request counter
#[derive(Debug, Default)]
pub struct RouteEngine {
    requests: SequenceCounter,
    current: Option<Route>,
}

impl RouteEngine {
    /// Create an engine with no route
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a routing request with the next sequence number
    pub fn request(&mut self, origin: LatLng, destination: LatLng) -> RouteRequest {
        let seq = self.requests.issue();
        tracing::debug!("Requesting route {} from {} to {}", seq, origin, destination);
        RouteRequest { seq, origin, destination }
    }

    /// Apply a routing response
    ///
    /// Only the newest issued request may replace the displayed route.
    /// Failures leave the previous route visible and schedule nothing.
    pub fn complete(&mut self, seq: Seq, result: Result<RouteLookup, LookupError>) -> RouteOutcome {
        if !self.requests.is_current(seq) {
            tracing::trace!("Discarding stale route response {}", seq);
            return RouteOutcome::Stale;
        }

        match result {
            Ok(lookup) if lookup.polyline.is_empty() => RouteOutcome::Failed(LookupError::NoRoute),
            Ok(lookup) => {
                self.current = Some(Route {
                    polyline: lookup.polyline,
                    distance_m: lookup.distance_m,
                    duration_s: lookup.duration_s,
                    seq,
                });
                RouteOutcome::Applied
            }
            Err(e) => RouteOutcome::Failed(e),
        }
    }

    /// Drop the displayed route and make every in-flight request stale
    pub fn clear(&mut self) {
        self.current = None;
        self.requests.invalidate();
    }

    /// The displayed route, if any
    pub fn current(&self) -> Option<&Route> {
        self.current.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(distance_m: f64) -> RouteLookup {
        RouteLookup {
            polyline: vec![LatLng::new(10.0, 20.0), LatLng::new(10.05, 20.04)],
            distance_m,
            duration_s: 600.0,
        }
    }

    #[test]
    fn test_newest_request_wins_in_every_completion_order() {
        let orders: [[usize; 3]; 6] = [
            [0, 1, 2], [0, 2, 1], [1, 0, 2],
            [1, 2, 0], [2, 0, 1], [2, 1, 0],
        ];

        for order in orders {
            let mut engine = RouteEngine::new();
            let a = LatLng::new(10.0, 20.0);
            let b = LatLng::new(10.1, 20.1);
            let requests: Vec<_> = (0..3).map(|_| engine.request(a, b)).collect();

            for &i in &order {
                engine.complete(requests[i].seq, Ok(lookup(1000.0 * (i + 1) as f64)));
            }

            let route = engine.current().unwrap();
            assert_eq!(route.seq, requests[2].seq, "order {:?}", order);
            assert_eq!(route.distance_m, 3000.0);
        }
    }

    #[test]
    fn test_failure_keeps_previous_route() {
        let mut engine = RouteEngine::new();
        let a = LatLng::new(10.0, 20.0);
        let b = LatLng::new(10.1, 20.1);

        let first = engine.request(a, b);
        assert_eq!(engine.complete(first.seq, Ok(lookup(5000.0))), RouteOutcome::Applied);

        let second = engine.request(a, b);
        let outcome = engine.complete(second.seq, Err(LookupError::Network("timeout".into())));

        assert!(matches!(outcome, RouteOutcome::Failed(_)));
        assert_eq!(engine.current().unwrap().seq, first.seq);
    }

    #[test]
    fn test_clear_stales_in_flight() {
        let mut engine = RouteEngine::new();
        let request = engine.request(LatLng::new(0.0, 0.0), LatLng::new(1.0, 1.0));
        engine.clear();

        assert_eq!(engine.complete(request.seq, Ok(lookup(1.0))), RouteOutcome::Stale);
        assert!(engine.current().is_none());
    }

    #[test]
    fn test_empty_polyline_is_no_route() {
        let mut engine = RouteEngine::new();
        let request = engine.request(LatLng::new(0.0, 0.0), LatLng::new(1.0, 1.0));
        let outcome = engine.complete(request.seq, Ok(RouteLookup {
            polyline: vec![],
            distance_m: 0.0,
            duration_s: 0.0,
        }));

        assert_eq!(outcome, RouteOutcome::Failed(LookupError::NoRoute));
    }

    #[test]
    fn test_summary_rounding() {
        let summary = RouteSummary::from_raw(4_981.7, 601.0);
        assert_eq!(summary.distance_km, 4.98);
        assert_eq!(summary.duration_min, 11);

        let exact = RouteSummary::from_raw(5_000.0, 600.0);
        assert_eq!(exact.distance_km, 5.0);
        assert_eq!(exact.duration_min, 10);
    }
}
