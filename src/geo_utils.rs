//! Geographic utilities: distances, degree/metre conversion, polygon measures.

use geo::orient::{Direction, Orient};
use geo::{Centroid, Coord, Distance, GeodesicArea, Haversine, LineString, Point, Polygon};

use crate::GeoPoint;

/// Meters per degree of latitude under the equirectangular approximation
/// used for circle sampling.
pub const METERS_PER_DEGREE: f64 = 111_320.0;

/// Great-circle distance between two points in meters.
pub fn haversine_distance(p1: &GeoPoint, p2: &GeoPoint) -> f64 {
    let point1 = Point::new(p1.longitude, p1.latitude);
    let point2 = Point::new(p2.longitude, p2.latitude);
    Haversine::distance(point1, point2)
}

/// Convert a distance in meters to degrees of latitude.
pub fn meters_to_lat_degrees(meters: f64) -> f64 {
    meters / METERS_PER_DEGREE
}

/// Convert a distance in meters to degrees of longitude at the given latitude.
///
/// Grows without bound towards the poles (cos(lat) → 0).
pub fn meters_to_lng_degrees(meters: f64, latitude: f64) -> f64 {
    meters / (METERS_PER_DEGREE * latitude.to_radians().cos())
}

/// Build an (implicitly closed) geo polygon from lat/lng vertices.
fn to_geo_polygon(points: &[GeoPoint]) -> Polygon<f64> {
    let coords: Vec<Coord> = points
        .iter()
        .map(|p| Coord {
            x: p.longitude,
            y: p.latitude,
        })
        .collect();
    Polygon::new(LineString::new(coords), vec![])
}

/// Area-weighted centroid of a polygon. Returns `None` for degenerate input.
pub fn polygon_centroid(points: &[GeoPoint]) -> Option<GeoPoint> {
    if points.is_empty() {
        return None;
    }
    to_geo_polygon(points)
        .centroid()
        .map(|c| GeoPoint::new(c.y(), c.x()))
}

/// Geodesic area of a polygon in square meters (0 for fewer than 3 points).
///
/// The ring is oriented counter-clockwise first; a clockwise exterior would
/// otherwise measure the rest of the globe.
pub fn polygon_area_m2(points: &[GeoPoint]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    to_geo_polygon(points)
        .orient(Direction::Default)
        .geodesic_area_unsigned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_known_distance() {
        let london = GeoPoint::new(51.5074, -0.1278);
        let paris = GeoPoint::new(48.8566, 2.3522);
        let d = haversine_distance(&london, &paris);
        // ~343.5 km
        assert!((d - 343_500.0).abs() < 2_000.0, "got {}", d);
    }

    #[test]
    fn test_lng_degrees_widen_with_latitude() {
        let at_equator = meters_to_lng_degrees(1000.0, 0.0);
        let at_sixty = meters_to_lng_degrees(1000.0, 60.0);
        assert!((at_equator - meters_to_lat_degrees(1000.0)).abs() < 1e-12);
        assert!((at_sixty - 2.0 * at_equator).abs() < 1e-9);
    }

    #[test]
    fn test_square_area_and_centroid() {
        // ~1.1 km square near the equator
        let square = vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 0.01),
            GeoPoint::new(0.01, 0.01),
            GeoPoint::new(0.01, 0.0),
        ];
        let area = polygon_area_m2(&square);
        assert!((area - 1_236_000.0).abs() < 10_000.0, "got {}", area);

        let c = polygon_centroid(&square).unwrap();
        assert!((c.latitude - 0.005).abs() < 1e-9);
        assert!((c.longitude - 0.005).abs() < 1e-9);
    }

    #[test]
    fn test_clockwise_ring_has_same_area() {
        let mut square = vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 0.01),
            GeoPoint::new(0.01, 0.01),
            GeoPoint::new(0.01, 0.0),
        ];
        let ccw = polygon_area_m2(&square);
        square.reverse();
        let cw = polygon_area_m2(&square);
        assert!((ccw - cw).abs() < 1e-6, "ccw {} cw {}", ccw, cw);
        assert!(cw < 2_000_000.0);
    }

    #[test]
    fn test_degenerate_polygon() {
        assert_eq!(polygon_area_m2(&[GeoPoint::new(1.0, 1.0)]), 0.0);
        assert!(polygon_centroid(&[]).is_none());
    }
}
