//! Renderer-facing view of the navigation state

use serde::{Serialize, Deserialize};

use crate::control::ControlAffordance;
use crate::coords::LatLng;
use crate::position::Position;
use crate::ride::{ClickedLocation, Destination, RideState};
use crate::route::RouteSummary;
use crate::search::Suggestion;

/// Tile style the renderer should draw
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MapStyle {
    #[default]
    Osm,
    Satellite,
    Terrain,
}

impl MapStyle {
    /// Tile URL template for the style
    pub fn tile_url(&self) -> &'static str {
        match self {
            MapStyle::Osm => "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png",
            MapStyle::Satellite => "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}",
            MapStyle::Terrain => "https://{s}.tile.opentopomap.org/{z}/{x}/{y}.png",
        }
    }

    /// Attribution text required by the tile provider
    pub fn attribution(&self) -> &'static str {
        match self {
            MapStyle::Osm => "© OpenStreetMap contributors",
            MapStyle::Satellite => "Tiles © Esri",
            MapStyle::Terrain => "© OpenTopoMap contributors",
        }
    }
}

/// Everything the renderer needs to draw one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapSnapshot {
    pub ride_state: RideState,

    /// Latest known position (kept through source errors)
    pub position: Option<Position>,

    pub destination: Option<Destination>,

    /// Route polyline, empty when no route is displayed
    pub route: Vec<LatLng>,

    pub route_summary: Option<RouteSummary>,

    /// Pending map-click marker
    pub clicked: Option<ClickedLocation>,

    /// Current text in the destination input
    pub query: String,

    pub suggestions: Vec<Suggestion>,

    /// The floating recenter control
    pub control: ControlAffordance,

    pub map_style: MapStyle,
}
