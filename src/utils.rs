//! Utility functions for coordinate conversions and spatial operations

use geo::{Coord, Point, Rect};

/// Web Mercator bounds in meters (EPSG:3857)
pub const EARTH_MERCATOR_MAX: f64 = 20037508.34;
pub const EARTH_MERCATOR_MIN: f64 = -20037508.34;

/// Maximum latitude that can be represented in Web Mercator
pub const MAX_LATITUDE: f64 = 85.05112878;

/// Mean Earth radius in meters, used for great-circle distances
pub const EARTH_RADIUS_M: f64 = 6371000.0;

/// Precomputed constant: EARTH_MERCATOR_MAX / 180.0
const LON_TO_X_FACTOR: f64 = EARTH_MERCATOR_MAX / 180.0;

/// Precomputed constant: EARTH_MERCATOR_MAX / PI
const Y_FACTOR: f64 = EARTH_MERCATOR_MAX / std::f64::consts::PI;

/// Precomputed constant: 180.0 / EARTH_MERCATOR_MAX
const X_TO_LON_FACTOR: f64 = 180.0 / EARTH_MERCATOR_MAX;

/// Precomputed constant: PI / EARTH_MERCATOR_MAX
const Y_TO_LAT_FACTOR: f64 = std::f64::consts::PI / EARTH_MERCATOR_MAX;

/// Convert WGS84 (lat, lon) to Web Mercator (x, y) in meters
///
/// Latitude is clamped to the valid Web Mercator range before projecting.
#[inline(always)]
pub fn wgs84_to_mercator(lat: f64, lon: f64) -> Point<f64> {
    let lat = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE);

    let x = lon * LON_TO_X_FACTOR;

    let lat_rad = lat.to_radians();
    let y = (lat_rad.tan() + (1.0 / lat_rad.cos())).ln() * Y_FACTOR;

    Point::new(x, y)
}

/// Convert Web Mercator (x, y) in meters to WGS84 (lat, lon) in degrees
#[inline(always)]
pub fn mercator_to_wgs84(x: f64, y: f64) -> (f64, f64) {
    let lon = x * X_TO_LON_FACTOR;
    let lat =
        (std::f64::consts::PI / 2.0 - 2.0 * ((-y * Y_TO_LAT_FACTOR).exp()).atan()).to_degrees();
    (lat, lon)
}

/// Projected units per ground meter at the given latitude
///
/// Web Mercator stretches distances by 1/cos(lat), so one real meter covers
/// more projected units the further from the equator it is. The latitude is
/// clamped to the valid Mercator range to keep the factor finite.
#[inline(always)]
pub fn units_per_meter(lat: f64) -> f64 {
    let lat = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE);
    1.0 / lat.to_radians().cos()
}

/// The full valid Web Mercator rectangle
#[inline]
pub fn world_extent() -> Rect<f64> {
    Rect::new(
        Coord {
            x: EARTH_MERCATOR_MIN,
            y: EARTH_MERCATOR_MIN,
        },
        Coord {
            x: EARTH_MERCATOR_MAX,
            y: EARTH_MERCATOR_MAX,
        },
    )
}

/// Check if a point is within Web Mercator bounds
#[inline(always)]
pub fn is_valid_mercator(point: &Point<f64>) -> bool {
    let x = point.x();
    let y = point.y();
    x >= EARTH_MERCATOR_MIN
        && x <= EARTH_MERCATOR_MAX
        && y >= EARTH_MERCATOR_MIN
        && y <= EARTH_MERCATOR_MAX
}

/// Calculate the Haversine distance between two WGS84 coordinates in meters
#[inline]
pub fn haversine_meters(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// Ground distance in meters between two Web Mercator points
///
/// Both points are unprojected back to WGS84 and measured with the Haversine
/// formula, so the result is a real distance rather than a planar one that
/// would be inflated away from the equator.
#[inline]
pub fn mercator_meters_between(a: Point<f64>, b: Point<f64>) -> f64 {
    let (lat1, lon1) = mercator_to_wgs84(a.x(), a.y());
    let (lat2, lon2) = mercator_to_wgs84(b.x(), b.y());
    haversine_meters(lat1, lon1, lat2, lon2)
}

// Axis-aligned rect helpers. `geo`'s `Contains`/`Intersects` use interior
// semantics in places, which rejects the degenerate zero-area point-rects the
// path math relies on, so containment and overlap are inclusive here.

/// Smallest rectangle covering both input rectangles
#[inline]
pub fn rect_union(a: &Rect<f64>, b: &Rect<f64>) -> Rect<f64> {
    Rect::new(
        Coord {
            x: a.min().x.min(b.min().x),
            y: a.min().y.min(b.min().y),
        },
        Coord {
            x: a.max().x.max(b.max().x),
            y: a.max().y.max(b.max().y),
        },
    )
}

/// Inclusive containment test: does `outer` fully contain `inner`?
#[inline]
pub fn rect_contains(outer: &Rect<f64>, inner: &Rect<f64>) -> bool {
    outer.min().x <= inner.min().x
        && outer.min().y <= inner.min().y
        && outer.max().x >= inner.max().x
        && outer.max().y >= inner.max().y
}

/// Inclusive overlap test: do the rectangles share at least an edge or corner?
#[inline]
pub fn rects_overlap(a: &Rect<f64>, b: &Rect<f64>) -> bool {
    a.min().x <= b.max().x
        && b.min().x <= a.max().x
        && a.min().y <= b.max().y
        && b.min().y <= a.max().y
}

/// Degenerate rectangle covering exactly the two given points
#[inline]
pub fn point_pair_rect(a: Point<f64>, b: Point<f64>) -> Rect<f64> {
    Rect::new(
        Coord { x: a.x(), y: a.y() },
        Coord { x: b.x(), y: b.y() },
    )
}

/// Grow a rectangle outward by `delta` on every side
#[inline]
pub fn outset(rect: &Rect<f64>, delta: f64) -> Rect<f64> {
    debug_assert!(delta >= 0.0, "outset delta must be non-negative");
    Rect::new(
        Coord {
            x: rect.min().x - delta,
            y: rect.min().y - delta,
        },
        Coord {
            x: rect.max().x + delta,
            y: rect.max().y + delta,
        },
    )
}

/// Clamp a rectangle to the valid Web Mercator extent
#[inline]
pub fn clip_to_world(rect: Rect<f64>) -> Rect<f64> {
    Rect::new(
        Coord {
            x: rect.min().x.clamp(EARTH_MERCATOR_MIN, EARTH_MERCATOR_MAX),
            y: rect.min().y.clamp(EARTH_MERCATOR_MIN, EARTH_MERCATOR_MAX),
        },
        Coord {
            x: rect.max().x.clamp(EARTH_MERCATOR_MIN, EARTH_MERCATOR_MAX),
            y: rect.max().y.clamp(EARTH_MERCATOR_MIN, EARTH_MERCATOR_MAX),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wgs84_to_mercator_origin() {
        let point = wgs84_to_mercator(0.0, 0.0);
        assert!((point.x() - 0.0).abs() < 0.01);
        assert!((point.y() - 0.0).abs() < 0.01);
    }

    #[test]
    fn test_wgs84_to_mercator_bounds() {
        let west = wgs84_to_mercator(0.0, -180.0);
        assert!((west.x() - EARTH_MERCATOR_MIN).abs() < 1.0);

        let east = wgs84_to_mercator(0.0, 180.0);
        assert!((east.x() - EARTH_MERCATOR_MAX).abs() < 1.0);
    }

    #[test]
    fn test_mercator_to_wgs84_roundtrip() {
        let lat = 51.5074;
        let lon = -0.1278;

        let mercator = wgs84_to_mercator(lat, lon);
        let (lat2, lon2) = mercator_to_wgs84(mercator.x(), mercator.y());

        assert!((lat - lat2).abs() < 0.0001);
        assert!((lon - lon2).abs() < 0.0001);
    }

    #[test]
    fn test_units_per_meter() {
        // Equator: one projected unit is one meter
        assert!((units_per_meter(0.0) - 1.0).abs() < 1e-12);
        // 60 degrees north: 1/cos(60) = 2
        assert!((units_per_meter(60.0) - 2.0).abs() < 1e-9);
        // Stays finite past the Mercator latitude limit
        assert!(units_per_meter(89.999).is_finite());
    }

    #[test]
    fn test_haversine_one_degree_latitude() {
        let meters = haversine_meters(0.0, 0.0, 1.0, 0.0);
        // One degree of latitude is about 111.19 km on the mean sphere
        assert!((meters - 111_194.9).abs() < 1.0);
    }

    #[test]
    fn test_mercator_meters_between_matches_ground_distance() {
        // 100 real meters north of 60N spans ~200 projected units, but the
        // ground distance must still come out as 100 m.
        let a = wgs84_to_mercator(60.0, 10.0);
        let b = wgs84_to_mercator(60.0 + 100.0 / 111_194.93, 10.0);
        assert!((b.y() - a.y()).abs() > 150.0);
        assert!((mercator_meters_between(a, b) - 100.0).abs() < 0.1);
    }

    #[test]
    fn test_is_valid_mercator() {
        assert!(is_valid_mercator(&Point::new(0.0, 0.0)));
        assert!(is_valid_mercator(&Point::new(
            EARTH_MERCATOR_MAX,
            EARTH_MERCATOR_MAX
        )));
        assert!(!is_valid_mercator(&Point::new(
            EARTH_MERCATOR_MAX + 1.0,
            0.0
        )));
    }

    #[test]
    fn test_rect_union() {
        let a = Rect::new(Coord { x: 0.0, y: 0.0 }, Coord { x: 1.0, y: 1.0 });
        let b = Rect::new(Coord { x: 2.0, y: -1.0 }, Coord { x: 3.0, y: 0.5 });
        let u = rect_union(&a, &b);
        assert_eq!(u.min(), Coord { x: 0.0, y: -1.0 });
        assert_eq!(u.max(), Coord { x: 3.0, y: 1.0 });
    }

    #[test]
    fn test_rect_contains_is_inclusive() {
        let outer = Rect::new(Coord { x: 0.0, y: 0.0 }, Coord { x: 10.0, y: 10.0 });
        // A degenerate point-rect on the boundary still counts as contained
        let edge = Rect::new(Coord { x: 10.0, y: 5.0 }, Coord { x: 10.0, y: 5.0 });
        assert!(rect_contains(&outer, &edge));

        let outside = Rect::new(Coord { x: 10.0, y: 5.0 }, Coord { x: 10.1, y: 5.0 });
        assert!(!rect_contains(&outer, &outside));
    }

    #[test]
    fn test_rects_overlap_is_inclusive() {
        let a = Rect::new(Coord { x: 0.0, y: 0.0 }, Coord { x: 10.0, y: 10.0 });
        // Shared corner only
        let b = Rect::new(Coord { x: 10.0, y: 10.0 }, Coord { x: 20.0, y: 20.0 });
        assert!(rects_overlap(&a, &b));

        let c = Rect::new(Coord { x: 10.1, y: 0.0 }, Coord { x: 20.0, y: 10.0 });
        assert!(!rects_overlap(&a, &c));
    }

    #[test]
    fn test_point_pair_rect_orders_corners() {
        let r = point_pair_rect(Point::new(5.0, -2.0), Point::new(1.0, 3.0));
        assert_eq!(r.min(), Coord { x: 1.0, y: -2.0 });
        assert_eq!(r.max(), Coord { x: 5.0, y: 3.0 });
    }

    #[test]
    fn test_outset() {
        let r = Rect::new(Coord { x: 0.0, y: 0.0 }, Coord { x: 1.0, y: 1.0 });
        let o = outset(&r, 2.0);
        assert_eq!(o.min(), Coord { x: -2.0, y: -2.0 });
        assert_eq!(o.max(), Coord { x: 3.0, y: 3.0 });
    }

    #[test]
    fn test_clip_to_world() {
        let r = Rect::new(
            Coord {
                x: EARTH_MERCATOR_MIN - 1e7,
                y: 0.0,
            },
            Coord {
                x: EARTH_MERCATOR_MAX + 1e7,
                y: 1.0,
            },
        );
        let clipped = clip_to_world(r);
        assert_eq!(clipped.min().x, EARTH_MERCATOR_MIN);
        assert_eq!(clipped.max().x, EARTH_MERCATOR_MAX);
        assert_eq!(clipped.min().y, 0.0);
        assert_eq!(clipped.max().y, 1.0);
    }
}
