//! Core data structures for geographic information.
//!
//! This module defines the fundamental types used throughout the library:
//!
//! - [`RingPoint`] - A fixed-point coordinate pair, the unit of all contour math
//! - [`Contour`] - A closed boundary ring with its derived bounding box
//! - [`Location`] - Simple floating-point coordinate pair with distance calculations
//! - [`SyntheticId`] - Deterministic identifier derived from a rounded coordinate

use serde::{Deserialize, Serialize};

/// Fixed-point scale: one degree is stored as 100,000 integer units.
///
/// One unit is roughly 1.1 mm, far below GPS accuracy, so repeated integer
/// comparisons never drift the way floating-point comparisons can.
pub const COORD_SCALE: f64 = 100_000.0;

/// Maximum number of vertices a compacted country outline may carry.
pub const MAX_OUTLINE_VERTICES: usize = 16;

/// Side extent, in fixed-point units (0.1°), of the synthetic boundary placed
/// around degenerate 1-2 point geometries so compaction always has a polygon
/// to work with.
pub const MIN_REGION_EXTENT: i32 = 10_000;

/// Maximum distance, in kilometers, at which a city is still reported as
/// "the city at" a coordinate.
pub const CITY_SEARCH_RADIUS_KM: f64 = 20.0;

/// Distance within which two coordinates plausibly share similar elevation.
pub const PLATEAU_RADIUS_KM: f64 = 30.0;

/// Hard cap on bounding-box matches collected per country query; no more
/// than 20 country boxes physically overlap any point.
pub const MAX_BOX_MATCHES: usize = 20;

/// A single vertex of a country outline: latitude and longitude in
/// fixed-point units ([`COORD_SCALE`] per degree).
///
/// Equality is exact integer equality; there is no negative-zero ambiguity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, bincode::Encode, bincode::Decode)]
pub struct RingPoint {
    /// Latitude in fixed-point units (degrees * 100,000)
    pub lat: i32,
    /// Longitude in fixed-point units (degrees * 100,000)
    pub lon: i32,
}

impl RingPoint {
    /// Converts decimal degrees to a fixed-point vertex, rounding to the
    /// nearest unit.
    pub fn from_degrees(lat: f64, lon: f64) -> Self {
        Self {
            lat: (lat * COORD_SCALE).round() as i32,
            lon: (lon * COORD_SCALE).round() as i32,
        }
    }

    /// Latitude in decimal degrees.
    pub fn lat_degrees(&self) -> f64 {
        self.lat as f64 / COORD_SCALE
    }

    /// Longitude in decimal degrees.
    pub fn lon_degrees(&self) -> f64 {
        self.lon as f64 / COORD_SCALE
    }
}

/// A closed, ordered boundary ring in fixed-point coordinates, together with
/// its axis-aligned bounding box.
///
/// The first and last points are implicitly connected. After compaction a
/// contour carries at most [`MAX_OUTLINE_VERTICES`] points. The bounding box
/// is always derived from the points at construction time; it is never
/// mutated independently, so box containment is guaranteed to be a superset
/// of exact containment.
#[derive(Debug, Clone, PartialEq)]
pub struct Contour {
    points: Vec<RingPoint>,
    min_lat: i32,
    max_lat: i32,
    min_lon: i32,
    max_lon: i32,
}

impl Contour {
    /// Builds a contour from its vertices, computing the bounding box.
    ///
    /// An empty point list yields an empty contour whose box contains nothing.
    pub fn new(points: Vec<RingPoint>) -> Self {
        let mut min_lat = i32::MAX;
        let mut max_lat = i32::MIN;
        let mut min_lon = i32::MAX;
        let mut max_lon = i32::MIN;
        for p in &points {
            min_lat = min_lat.min(p.lat);
            max_lat = max_lat.max(p.lat);
            min_lon = min_lon.min(p.lon);
            max_lon = max_lon.max(p.lon);
        }
        Self {
            points,
            min_lat,
            max_lat,
            min_lon,
            max_lon,
        }
    }

    /// The ordered ring vertices.
    pub fn points(&self) -> &[RingPoint] {
        &self.points
    }

    /// Bounding box as `(min_lat, max_lat, min_lon, max_lon)` in fixed-point units.
    pub fn bounding_box(&self) -> (i32, i32, i32, i32) {
        (self.min_lat, self.max_lat, self.min_lon, self.max_lon)
    }

    /// Whether the bounding box contains the given fixed-point coordinate.
    ///
    /// Integer comparisons only; used as the cheap prefilter before exact
    /// containment.
    pub fn contains_box(&self, p: RingPoint) -> bool {
        !self.points.is_empty()
            && p.lat >= self.min_lat
            && p.lat <= self.max_lat
            && p.lon >= self.min_lon
            && p.lon <= self.max_lon
    }

    /// Whether this contour's bounding box fully encloses `other`'s box.
    ///
    /// Boxes that coincide exactly do not count as enclosing each other, so
    /// nesting between two identical outlines never resolves either way.
    pub fn box_encloses(&self, other: &Contour) -> bool {
        if other.points.is_empty() || self.points.is_empty() {
            return false;
        }
        let same = self.min_lat == other.min_lat
            && self.max_lat == other.max_lat
            && self.min_lon == other.min_lon
            && self.max_lon == other.max_lon;
        !same
            && self.min_lat <= other.min_lat
            && self.max_lat >= other.max_lat
            && self.min_lon <= other.min_lon
            && self.max_lon >= other.max_lon
    }

    /// Exact point-in-polygon test using the odd-even ray-casting rule.
    ///
    /// Runs over the compacted ring, so the edge count is bounded by
    /// [`MAX_OUTLINE_VERTICES`].
    pub fn contains(&self, p: RingPoint) -> bool {
        let n = self.points.len();
        if n < 3 {
            return false;
        }
        let (x, y) = (p.lon as f64, p.lat as f64);
        let mut inside = false;
        let mut j = n - 1;
        for i in 0..n {
            let xi = self.points[i].lon as f64;
            let yi = self.points[i].lat as f64;
            let xj = self.points[j].lon as f64;
            let yj = self.points[j].lat as f64;
            if ((yi > y) != (yj > y)) && (x < (xj - xi) * (y - yi) / (yj - yi) + xi) {
                inside = !inside;
            }
            j = i;
        }
        inside
    }

    /// Minimum distance from the point to any contour edge, in fixed-point
    /// units.
    ///
    /// Per edge this is the perpendicular point-to-line distance
    /// `|cross| / |edge|`; zero-length edges fall back to the plain point
    /// distance. Used to rank candidates when box containment alone cannot
    /// decide, and for the nearest-border fallback over open water.
    pub fn min_distance_to_borders(&self, p: RingPoint) -> f64 {
        let n = self.points.len();
        if n == 0 {
            return f64::INFINITY;
        }
        if n == 1 {
            let a = self.points[0];
            return ((p.lon - a.lon) as f64).hypot((p.lat - a.lat) as f64);
        }
        let (px, py) = (p.lon as f64, p.lat as f64);
        let mut best = f64::INFINITY;
        let mut j = n - 1;
        for i in 0..n {
            let (ax, ay) = (self.points[j].lon as f64, self.points[j].lat as f64);
            let (bx, by) = (self.points[i].lon as f64, self.points[i].lat as f64);
            let (ex, ey) = (bx - ax, by - ay);
            let len = ex.hypot(ey);
            let dist = if len == 0.0 {
                (px - ax).hypot(py - ay)
            } else {
                ((px - ax) * ey - (py - ay) * ex).abs() / len
            };
            best = best.min(dist);
            j = i;
        }
        best
    }

    /// Absolute shoelace area of the ring in squared fixed-point units.
    pub fn area(&self) -> f64 {
        let n = self.points.len();
        if n < 3 {
            return 0.0;
        }
        let mut area = 0.0;
        let mut j = n - 1;
        for i in 0..n {
            let pi = self.points[i];
            let pj = self.points[j];
            area += (pj.lon as f64 - pi.lon as f64) * (pj.lat as f64 + pi.lat as f64);
            j = i;
        }
        (area / 2.0).abs()
    }
}

/// A coordinate pair with distance calculation capabilities.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    /// Latitude in decimal degrees (-90 to 90)
    pub latitude: f64,
    /// Longitude in decimal degrees (-180 to 180)
    pub longitude: f64,
}

impl Location {
    /// Constructs a new Location from coordinates.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Calculates the great-circle distance to another location using the
    /// haversine formula.
    ///
    /// Returns the distance in kilometers, assuming a spherical Earth with
    /// radius 6371 km, which is accurate within 0.5% for most distances.
    pub fn distance_to(&self, other: &Location) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let delta_lat = (other.latitude - self.latitude).to_radians();
        let delta_lon = (other.longitude - self.longitude).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        6371.0 * c
    }
}

/// A deterministic 63-bit identifier derived from a rounded coordinate.
///
/// The fixed-point latitude (biased to be non-negative) occupies the high 32
/// bits and the biased longitude the low 32 bits; the packed value is then
/// negated so synthetic identifiers never collide with the non-negative row
/// ids handed out by a persisted database elsewhere in an application.
///
/// Two coordinates that round to the same fixed-point pair produce the same
/// identifier. That collision is deliberate deduplication: same place, same
/// id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SyntheticId(i64);

impl SyntheticId {
    /// Derives the identifier for a coordinate given in decimal degrees.
    pub fn from_degrees(lat: f64, lon: f64) -> Self {
        Self::from_point(RingPoint::from_degrees(lat, lon))
    }

    /// Derives the identifier from an already-rounded fixed-point vertex.
    pub fn from_point(p: RingPoint) -> Self {
        let lat_biased = (p.lat as i64) + 9_000_000;
        let lon_biased = (p.lon as i64) + 18_000_000;
        SyntheticId(-((lat_biased << 32) | lon_biased))
    }

    /// The raw signed identifier value (always ≤ 0).
    pub fn value(&self) -> i64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ring_point_rounds_to_nearest_unit() {
        let p = RingPoint::from_degrees(48.856613, 2.352222);
        assert_eq!(p.lat, 4_885_661);
        assert_eq!(p.lon, 235_222);
        assert!((p.lat_degrees() - 48.85661).abs() < 1e-9);
    }

    #[test]
    fn contour_box_derived_from_points() {
        let c = Contour::new(vec![
            RingPoint { lat: -100, lon: 50 },
            RingPoint { lat: 300, lon: -20 },
            RingPoint { lat: 200, lon: 400 },
        ]);
        assert_eq!(c.bounding_box(), (-100, 300, -20, 400));
    }

    #[test]
    fn exact_containment_implies_box_containment() {
        let square = Contour::new(vec![
            RingPoint { lat: -1000, lon: -1000 },
            RingPoint { lat: -1000, lon: 1000 },
            RingPoint { lat: 1000, lon: 1000 },
            RingPoint { lat: 1000, lon: -1000 },
        ]);
        for &(lat, lon) in &[(0, 0), (999, 999), (-999, 500), (500, -999), (2000, 0), (0, 2000)] {
            let p = RingPoint { lat, lon };
            if square.contains(p) {
                assert!(square.contains_box(p));
            }
        }
        assert!(square.contains(RingPoint { lat: 0, lon: 0 }));
        assert!(!square.contains(RingPoint { lat: 2000, lon: 0 }));
    }

    #[test]
    fn identical_boxes_do_not_enclose_each_other() {
        let ring = vec![
            RingPoint { lat: 0, lon: 0 },
            RingPoint { lat: 0, lon: 100 },
            RingPoint { lat: 100, lon: 100 },
            RingPoint { lat: 100, lon: 0 },
        ];
        let a = Contour::new(ring.clone());
        let b = Contour::new(ring);
        assert!(!a.box_encloses(&b));
        assert!(!b.box_encloses(&a));
    }

    #[test]
    fn nested_box_enclosure_is_directional() {
        let outer = Contour::new(vec![
            RingPoint { lat: -500, lon: -500 },
            RingPoint { lat: -500, lon: 500 },
            RingPoint { lat: 500, lon: 500 },
            RingPoint { lat: 500, lon: -500 },
        ]);
        let inner = Contour::new(vec![
            RingPoint { lat: -100, lon: -100 },
            RingPoint { lat: -100, lon: 100 },
            RingPoint { lat: 100, lon: 100 },
            RingPoint { lat: 100, lon: -100 },
        ]);
        assert!(outer.box_encloses(&inner));
        assert!(!inner.box_encloses(&outer));
    }

    #[test]
    fn border_distance_is_zero_adjacent_on_edge() {
        let square = Contour::new(vec![
            RingPoint { lat: 0, lon: 0 },
            RingPoint { lat: 0, lon: 1000 },
            RingPoint { lat: 1000, lon: 1000 },
            RingPoint { lat: 1000, lon: 0 },
        ]);
        // Centered point sits 500 units from every edge.
        let d = square.min_distance_to_borders(RingPoint { lat: 500, lon: 500 });
        assert!((d - 500.0).abs() < 1e-9);
        let on_edge = square.min_distance_to_borders(RingPoint { lat: 0, lon: 500 });
        assert!(on_edge.abs() < 1e-9);
    }

    #[test]
    fn haversine_distance_nyc_la() {
        let nyc = Location::new(40.7128, -74.0060);
        let la = Location::new(34.0522, -118.2437);
        let distance = nyc.distance_to(&la);
        assert!(distance > 3900.0 && distance < 4000.0);
    }

    #[test]
    fn synthetic_id_collides_for_equal_rounding_only() {
        let a = SyntheticId::from_degrees(52.520008, 13.404954);
        let b = SyntheticId::from_degrees(52.520008, 13.404954);
        let c = SyntheticId::from_degrees(52.520008, 13.404964);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.value() <= 0);
    }

    #[test]
    fn synthetic_id_distinct_across_hemispheres() {
        let north = SyntheticId::from_degrees(10.0, 10.0);
        let south = SyntheticId::from_degrees(-10.0, 10.0);
        let west = SyntheticId::from_degrees(10.0, -10.0);
        assert_ne!(north, south);
        assert_ne!(north, west);
    }
}
