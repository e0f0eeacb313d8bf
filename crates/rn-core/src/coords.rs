//! Geographic coordinate types

use std::fmt;
use geo::{BoundingRect, Coord, LineString};
use serde::{Serialize, Deserialize};

/// A WGS-84 coordinate in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lon: f64,
}

impl LatLng {
    /// Create a new coordinate
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Whether both components are finite and inside the WGS-84 range
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}

impl From<LatLng> for Coord<f64> {
    fn from(p: LatLng) -> Self {
        // geo works in (x, y) = (lon, lat)
        Coord { x: p.lon, y: p.lat }
    }
}

impl fmt::Display for LatLng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5}, {:.5}", self.lat, self.lon)
    }
}

/// Axis-aligned box in lat/lon space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl Bounds {
    /// Smallest box covering every point, `None` for an empty slice
    pub fn from_points(points: &[LatLng]) -> Option<Self> {
        let line: LineString<f64> = points.iter().copied().map(Coord::from).collect();
        let rect = line.bounding_rect()?;

        Some(Self {
            south_west: LatLng::new(rect.min().y, rect.min().x),
            north_east: LatLng::new(rect.max().y, rect.max().x),
        })
    }

    /// Whether `point` lies inside the box (edges inclusive)
    pub fn contains(&self, point: LatLng) -> bool {
        point.lat >= self.south_west.lat
            && point.lat <= self.north_east.lat
            && point.lon >= self.south_west.lon
            && point.lon <= self.north_east.lon
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_cover_polyline() {
        let line = vec![
            LatLng::new(48.85, 2.35),
            LatLng::new(48.90, 2.30),
            LatLng::new(48.80, 2.40),
        ];
        let bounds = Bounds::from_points(&line).unwrap();

        assert_eq!(bounds.south_west, LatLng::new(48.80, 2.30));
        assert_eq!(bounds.north_east, LatLng::new(48.90, 2.40));
        assert!(line.iter().all(|p| bounds.contains(*p)));
    }

    #[test]
    fn test_bounds_empty() {
        assert!(Bounds::from_points(&[]).is_none());
    }

    #[test]
    fn test_display_five_decimals() {
        assert_eq!(LatLng::new(48.8566123, 2.3522219).to_string(), "48.85661, 2.35222");
    }

    #[test]
    fn test_validity() {
        assert!(LatLng::new(10.0, 20.0).is_valid());
        assert!(!LatLng::new(91.0, 0.0).is_valid());
        assert!(!LatLng::new(f64::NAN, 0.0).is_valid());
    }
}
