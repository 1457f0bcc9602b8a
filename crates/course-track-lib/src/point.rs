//! Core value types shared by the parsers, converters and geometry math
//!
//! All coordinates are WGS84 degrees. Note that `geo` types use `x = longitude`
//! and `y = latitude`, while [`TrackPoint`] names the fields explicitly.

use geo::{Coord, LineString, Point, Rect};
use serde::{Deserialize, Serialize};

/// A single coordinate sample of a course path
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackPoint {
    /// Latitude in degrees, within [-90, 90]
    pub lat: f64,
    /// Longitude in degrees, within [-180, 180]
    pub lng: f64,
    /// Elevation in meters, if the source carried one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation: Option<f64>,
}

/// Ordered points of a path, in path order
pub type TrackSequence = Vec<TrackPoint>;

/// Axis-aligned box in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

/// Arithmetic mean of a sequence's coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Centroid {
    pub lat: f64,
    pub lng: f64,
}

impl TrackPoint {
    /// Create a point without elevation
    #[inline]
    pub fn new(lat: f64, lng: f64) -> Self {
        Self {
            lat,
            lng,
            elevation: None,
        }
    }

    /// Create a point with an elevation in meters
    #[inline]
    pub fn with_elevation(lat: f64, lng: f64, elevation: f64) -> Self {
        Self {
            lat,
            lng,
            elevation: Some(elevation),
        }
    }

    /// Check if the coordinates are finite and within WGS84 range
    #[inline]
    pub fn is_valid(&self) -> bool {
        check_coordinates(self.lat, self.lng).is_ok()
    }

    /// Convert to a `geo::Point` (x = longitude, y = latitude)
    #[inline]
    pub fn to_point(&self) -> Point<f64> {
        Point::new(self.lng, self.lat)
    }
}

impl From<TrackPoint> for Coord<f64> {
    fn from(p: TrackPoint) -> Self {
        Coord { x: p.lng, y: p.lat }
    }
}

impl From<Point<f64>> for TrackPoint {
    fn from(p: Point<f64>) -> Self {
        TrackPoint::new(p.y(), p.x())
    }
}

impl From<&gpx::Waypoint> for TrackPoint {
    fn from(waypoint: &gpx::Waypoint) -> Self {
        let point = waypoint.point();
        TrackPoint {
            lat: point.y(),
            lng: point.x(),
            elevation: waypoint.elevation,
        }
    }
}

/// Build a `geo::LineString` from a sequence, dropping elevation
pub fn to_line_string(points: &[TrackPoint]) -> LineString<f64> {
    points.iter().map(|&p| Coord::from(p)).collect()
}

impl From<BoundingBox> for Rect<f64> {
    fn from(b: BoundingBox) -> Self {
        Rect::new(
            Coord {
                x: b.min_lng,
                y: b.min_lat,
            },
            Coord {
                x: b.max_lng,
                y: b.max_lat,
            },
        )
    }
}

impl BoundingBox {
    /// Check if a point lies inside the box (edges included)
    #[inline]
    pub fn contains(&self, point: &TrackPoint) -> bool {
        point.lat >= self.min_lat
            && point.lat <= self.max_lat
            && point.lng >= self.min_lng
            && point.lng <= self.max_lng
    }

    /// Center of the box; differs from [`Centroid`] of the points in general
    #[inline]
    pub fn midpoint(&self) -> Centroid {
        Centroid {
            lat: (self.min_lat + self.max_lat) / 2.0,
            lng: (self.min_lng + self.max_lng) / 2.0,
        }
    }
}

/// Validate a latitude/longitude pair, returning a human readable reason on failure
pub(crate) fn check_coordinates(lat: f64, lng: f64) -> Result<(), String> {
    if !lat.is_finite() || !lng.is_finite() {
        return Err(format!("non-finite coordinate ({lat}, {lng})"));
    }
    if !(-90.0..=90.0).contains(&lat) {
        return Err(format!("latitude {lat} out of range [-90, 90]"));
    }
    if !(-180.0..=180.0).contains(&lng) {
        return Err(format!("longitude {lng} out of range [-180, 180]"));
    }
    Ok(())
}
