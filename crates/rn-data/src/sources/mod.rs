pub mod nominatim;
pub mod osrm;
pub mod scripted_position;

pub use nominatim::NominatimGeocoder;
pub use osrm::OsrmRouter;
pub use scripted_position::{ScriptStep, ScriptedPositionSource};
