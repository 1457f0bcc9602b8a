//! Bounds, center and path length of a track
//!
//! These are planar approximations in degrees except for the distance, which is
//! great-circle. Good enough at city scale; the center is wrong for tracks crossing
//! the antimeridian and degrades near the poles.

use crate::{BoundingBox, Centroid, TrackPoint};
use serde::{Deserialize, Serialize};

/// Mean Earth radius used by every distance computation, in kilometers
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Decimal places of the canonical display distance
pub const DISTANCE_DISPLAY_DECIMALS: i32 = 2;

/// Axis-aligned bounding box of the points, or `None` for an empty sequence
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn calculate_bounds(points: &[TrackPoint]) -> Option<BoundingBox> {
    let first = points.first()?;
    let mut bounds = BoundingBox {
        min_lat: first.lat,
        max_lat: first.lat,
        min_lng: first.lng,
        max_lng: first.lng,
    };

    for point in &points[1..] {
        bounds.min_lat = bounds.min_lat.min(point.lat);
        bounds.max_lat = bounds.max_lat.max(point.lat);
        bounds.min_lng = bounds.min_lng.min(point.lng);
        bounds.max_lng = bounds.max_lng.max(point.lng);
    }

    Some(bounds)
}

/// Arithmetic mean of latitudes and longitudes, or `None` for an empty sequence
///
/// This is neither the bounding box center nor a geodesic centroid.
pub fn calculate_center(points: &[TrackPoint]) -> Option<Centroid> {
    if points.is_empty() {
        return None;
    }

    let (lat_sum, lng_sum) = points
        .iter()
        .fold((0.0, 0.0), |(lat, lng), p| (lat + p.lat, lng + p.lng));
    let count = points.len() as f64;

    Some(Centroid {
        lat: lat_sum / count,
        lng: lng_sum / count,
    })
}

/// Great-circle distance between two points in kilometers (haversine, [`EARTH_RADIUS_KM`])
#[inline]
pub fn haversine_km(p1: &TrackPoint, p2: &TrackPoint) -> f64 {
    let lat1 = p1.lat.to_radians();
    let lat2 = p2.lat.to_radians();
    let delta_lat = (p2.lat - p1.lat).to_radians();
    let delta_lng = (p2.lng - p1.lng).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lng / 2.0).sin().powi(2);
    // Rounding can push `a` just past 1.0 for antipodal pairs.
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Total path length in kilometers; `0.0` for fewer than two points
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn calculate_distance(points: &[TrackPoint]) -> f64 {
    points
        .windows(2)
        .map(|pair| haversine_km(&pair[0], &pair[1]))
        .sum()
}

/// Round a distance to [`DISTANCE_DISPLAY_DECIMALS`] places for display
#[inline]
pub fn round_distance_km(km: f64) -> f64 {
    let factor = 10f64.powi(DISTANCE_DISPLAY_DECIMALS);
    (km * factor).round() / factor
}

/// Everything the course pages show about a track, computed in one call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackSummary {
    pub point_count: usize,
    pub bounds: Option<BoundingBox>,
    pub center: Option<Centroid>,
    /// Unrounded path length in kilometers
    pub distance_km: f64,
    /// Path length rounded with [`round_distance_km`]
    pub distance_km_display: f64,
}

/// Summarize a track
pub fn summarize(points: &[TrackPoint]) -> TrackSummary {
    let distance_km = calculate_distance(points);
    TrackSummary {
        point_count: points.len(),
        bounds: calculate_bounds(points),
        center: calculate_center(points),
        distance_km,
        distance_km_display: round_distance_km(distance_km),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(lat: f64, lng: f64) -> TrackPoint {
        TrackPoint::new(lat, lng)
    }

    #[test]
    fn test_bounds() {
        let bounds = calculate_bounds(&[p(1.0, 1.0), p(3.0, 5.0)]).unwrap();
        assert_eq!(
            bounds,
            BoundingBox {
                min_lat: 1.0,
                max_lat: 3.0,
                min_lng: 1.0,
                max_lng: 5.0,
            }
        );
    }

    #[test]
    fn test_bounds_are_independent_per_axis() {
        let bounds = calculate_bounds(&[p(5.0, -1.0), p(-2.0, 7.0), p(0.0, 3.0)]).unwrap();
        assert_eq!(bounds.min_lat, -2.0);
        assert_eq!(bounds.max_lat, 5.0);
        assert_eq!(bounds.min_lng, -1.0);
        assert_eq!(bounds.max_lng, 7.0);
    }

    #[test]
    fn test_single_point_bounds() {
        let bounds = calculate_bounds(&[p(2.0, 3.0)]).unwrap();
        assert_eq!(bounds.min_lat, bounds.max_lat);
        assert_eq!(bounds.min_lng, bounds.max_lng);
    }

    #[test]
    fn test_center() {
        assert_eq!(
            calculate_center(&[p(0.0, 0.0), p(2.0, 4.0)]),
            Some(Centroid { lat: 1.0, lng: 2.0 })
        );
    }

    #[test]
    fn test_center_is_mean_not_box_midpoint() {
        let points = [p(0.0, 0.0), p(0.0, 0.0), p(3.0, 3.0)];
        let center = calculate_center(&points).unwrap();
        assert_eq!(center, Centroid { lat: 1.0, lng: 1.0 });
        let midpoint = calculate_bounds(&points).unwrap().midpoint();
        assert_eq!(midpoint, Centroid { lat: 1.5, lng: 1.5 });
    }

    #[test]
    fn test_empty_sequences() {
        assert_eq!(calculate_bounds(&[]), None);
        assert_eq!(calculate_center(&[]), None);
        assert_eq!(calculate_distance(&[]), 0.0);
        assert_eq!(calculate_distance(&[p(37.5, 127.0)]), 0.0);
    }

    #[test]
    fn test_one_degree_of_longitude_at_equator() {
        let distance = calculate_distance(&[p(0.0, 0.0), p(0.0, 1.0)]);
        let expected = 111.19;
        assert!(
            (distance - expected).abs() / expected < 0.005,
            "distance {distance}"
        );
        assert_eq!(round_distance_km(distance), 111.19);
    }

    #[test]
    fn test_distance_sums_consecutive_legs() {
        let a = p(37.5283, 126.9326);
        let b = p(37.5290, 126.9340);
        let c = p(37.5301, 126.9355);
        let total = calculate_distance(&[a, b, c]);
        let legs = haversine_km(&a, &b) + haversine_km(&b, &c);
        assert!((total - legs).abs() < 1e-12);
        assert!(total > 0.0 && total < 1.0);
    }

    #[test]
    fn test_haversine_is_symmetric() {
        let a = p(37.5665, 126.978);
        let b = p(35.1796, 129.0756);
        assert!((haversine_km(&a, &b) - haversine_km(&b, &a)).abs() < 1e-9);
        // Seoul to Busan is roughly 325 km as the crow flies
        assert!((haversine_km(&a, &b) - 325.0).abs() < 5.0);
    }

    #[test]
    fn test_antipodal_distance_is_half_circumference() {
        let half = std::f64::consts::PI * EARTH_RADIUS_KM;
        for step in 0..=9000 {
            let lat = f64::from(step) / 100.0;
            let distance = calculate_distance(&[p(lat, 0.0), p(-lat, 180.0)]);
            assert!(
                (distance - half).abs() < 1e-3,
                "lat {lat}: got {distance}, expected {half}"
            );
        }
        assert!((haversine_km(&p(0.08, 0.0), &p(-0.08, 180.0)) - 20015.09).abs() < 0.01);
    }

    #[test]
    fn test_round_distance() {
        assert_eq!(round_distance_km(5.004), 5.0);
        assert_eq!(round_distance_km(5.005_1), 5.01);
        assert_eq!(round_distance_km(0.0), 0.0);
    }

    #[test]
    fn test_summary() {
        let summary = summarize(&[p(0.0, 0.0), p(0.0, 1.0)]);
        assert_eq!(summary.point_count, 2);
        assert_eq!(summary.center, Some(Centroid { lat: 0.0, lng: 0.5 }));
        assert_eq!(summary.distance_km_display, 111.19);

        let empty = summarize(&[]);
        assert_eq!(empty.point_count, 0);
        assert_eq!(empty.bounds, None);
        assert_eq!(empty.distance_km, 0.0);
    }
}
