//! Scripted demo ride

use std::sync::Arc;
use std::time::Duration;
use anyhow::Result;
use tokio::sync::watch;
use tracing::{info, warn};

use rn_core::events::events::{PositionUnavailable, RideStateChanged, RouteFailed, RouteUpdated, SearchFailed};
use rn_core::{
    typed_handler, Destination, EventBus, MapSnapshot, Navigator, ViewCommand, ViewSubscriber,
};
use rn_data::{NominatimGeocoder, OsrmRouter, PositionStream, ScriptedPositionSource};
use rn_runtime::NavigatorRuntime;

use crate::config::AppConfig;

/// Stands in for a map renderer by logging what it would draw
struct LoggingView;

impl ViewSubscriber for LoggingView {
    fn on_view_command(&self, command: &ViewCommand) {
        match command {
            ViewCommand::FlyTo { center, zoom, duration_ms } => {
                info!("[map] fly to {} at zoom {} over {} ms", center, zoom, duration_ms);
            }
            ViewCommand::FitBounds(bounds) => {
                info!("[map] fit bounds {} .. {}", bounds.south_west, bounds.north_east);
            }
        }
    }

    fn on_snapshot(&self, snapshot: &MapSnapshot) {
        tracing::debug!(
            "[map] {:?}: {} route points, {} suggestions, control visible: {}",
            snapshot.ride_state,
            snapshot.route.len(),
            snapshot.suggestions.len(),
            snapshot.control.visible
        );
    }
}

fn log_notices(bus: &EventBus) {
    bus.subscribe::<RideStateChanged>(typed_handler(|e: &RideStateChanged| {
        info!("Ride {:?} -> {:?}", e.from, e.to);
    }));
    bus.subscribe::<RouteUpdated>(typed_handler(|e: &RouteUpdated| {
        info!("Route: {:.2} km, {} min", e.summary.distance_km, e.summary.duration_min);
    }));
    bus.subscribe::<RouteFailed>(typed_handler(|e: &RouteFailed| {
        warn!("Route unavailable ({}), keeping previous: {}", e.error, e.keeping_previous);
    }));
    bus.subscribe::<SearchFailed>(typed_handler(|e: &SearchFailed| {
        warn!("Search for '{}' failed: {}", e.query, e.error);
    }));
    bus.subscribe::<PositionUnavailable>(typed_handler(|e: &PositionUnavailable| {
        warn!("Position unavailable: {}", e.error);
    }));
}

async fn wait_until<F>(snapshots: &mut watch::Receiver<MapSnapshot>, wait: Duration, condition: F) -> Option<MapSnapshot>
where
    F: FnMut(&MapSnapshot) -> bool,
{
    match tokio::time::timeout(wait, snapshots.wait_for(condition)).await {
        Ok(Ok(snapshot)) => Some(snapshot.clone()),
        _ => None,
    }
}

/// Play the configured ride end to end
pub async fn run(config: AppConfig) -> Result<()> {
    let geocoder = Arc::new(NominatimGeocoder::new(&config.endpoints)?);
    let router = Arc::new(OsrmRouter::new(&config.endpoints)?);

    let bus = Arc::new(EventBus::new());
    log_notices(&bus);

    let navigator = Navigator::with_bus(config.navigator.clone(), bus);
    let view = Arc::new(LoggingView);
    navigator.view().add_subscriber(view.clone());

    let (runtime, handle) = NavigatorRuntime::new(navigator, geocoder, router);
    let runtime = tokio::spawn(runtime.run());
    let mut snapshots = handle.subscribe();

    let tick = Duration::from_millis(config.demo.tick_ms);
    let wait = Duration::from_millis(config.demo.lookup_wait_ms);
    let source = ScriptedPositionSource::along(&config.demo.path, tick);
    let stream = PositionStream::new(Arc::new(source), config.navigator.position);
    let sink = handle.clone();
    stream.start(move |event| {
        let _ = sink.send(event);
    });

    info!("Searching for '{}'", config.demo.query);
    handle.query(config.demo.query.as_str())?;

    match wait_until(&mut snapshots, wait, |s| !s.suggestions.is_empty()).await {
        Some(snapshot) => {
            for suggestion in &snapshot.suggestions {
                info!("  suggestion {}: {}", suggestion.id, suggestion.label);
            }
            handle.select_suggestion(snapshot.suggestions[0].id.clone())?;
        }
        None => {
            let fallback = config.demo.path.last().copied()
                .ok_or_else(|| anyhow::anyhow!("No suggestions for '{}' and an empty demo path", config.demo.query))?;
            warn!("No suggestions for '{}'; heading to {}", config.demo.query, fallback);
            handle.select_destination(Destination::new(fallback, config.demo.query.clone()))?;
        }
    }

    handle.confirm_route()?;
    if wait_until(&mut snapshots, wait, |s| s.route_summary.is_some()).await.is_none() {
        warn!("No route after {:?}", wait);
    }

    if let Some(last) = config.demo.path.last() {
        handle.map_click(*last)?;
        if let Some(snapshot) = wait_until(&mut snapshots, wait, |s| {
            s.clicked.as_ref().map_or(false, |c| c.label.is_some())
        }).await {
            if let Some(clicked) = snapshot.clicked {
                info!("Clicked location: {}", clicked.display_label());
            }
        }
    }

    // Let the rest of the script play out
    tokio::time::sleep(tick * config.demo.path.len() as u32).await;

    let final_state = handle.snapshot();
    info!(
        "Ride ending in {:?} at {}",
        final_state.ride_state,
        final_state.position.map(|p| p.coords.to_string()).unwrap_or_else(|| "unknown position".to_string())
    );

    stream.stop();
    handle.cancel()?;
    handle.shutdown()?;
    runtime.await?;

    info!("Demo finished");
    Ok(())
}
