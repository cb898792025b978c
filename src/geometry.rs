//! Planar geometry primitives over raw coordinate arrays.
//!
//! Points are `[x, y]` pairs in decimal degrees with `x` = longitude and
//! `y` = latitude, the order raw geometry sources deliver them in. All
//! functions are pure and allocation-light so the normalizer and compactor
//! stay easy to test in isolation.

/// Signed shoelace area of a ring (positive = counterclockwise).
pub fn ring_signed_area(ring: &[[f64; 2]]) -> f64 {
    let n = ring.len();
    if n < 3 {
        return 0.0;
    }
    let mut area = 0.0;
    let mut j = n - 1;
    for i in 0..n {
        area += (ring[j][0] - ring[i][0]) * (ring[j][1] + ring[i][1]);
        j = i;
    }
    area / 2.0
}

/// Axis-aligned bounding box as `(min_x, min_y, max_x, max_y)`.
pub fn ring_bbox(ring: &[[f64; 2]]) -> (f64, f64, f64, f64) {
    let mut min_x = f64::MAX;
    let mut min_y = f64::MAX;
    let mut max_x = f64::MIN;
    let mut max_y = f64::MIN;
    for p in ring {
        min_x = min_x.min(p[0]);
        max_x = max_x.max(p[0]);
        min_y = min_y.min(p[1]);
        max_y = max_y.max(p[1]);
    }
    (min_x, min_y, max_x, max_y)
}

/// Euclidean gap between two bounding boxes; zero when they touch or overlap.
pub fn box_gap(a: (f64, f64, f64, f64), b: (f64, f64, f64, f64)) -> f64 {
    let dx = (a.0 - b.2).max(b.0 - a.2).max(0.0);
    let dy = (a.1 - b.3).max(b.1 - a.3).max(0.0);
    dx.hypot(dy)
}

/// Squared Euclidean distance between two points.
pub fn squared_distance(a: [f64; 2], b: [f64; 2]) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    dx * dx + dy * dy
}

/// Arithmetic mean of the ring's vertices.
///
/// The sweep in the compactor only needs a stable interior anchor, not the
/// true polygon centroid, so the vertex mean is enough.
pub fn centroid(ring: &[[f64; 2]]) -> [f64; 2] {
    if ring.is_empty() {
        return [0.0, 0.0];
    }
    let mut x = 0.0;
    let mut y = 0.0;
    for p in ring {
        x += p[0];
        y += p[1];
    }
    [x / ring.len() as f64, y / ring.len() as f64]
}

/// Indices `(i, j)` of the closest pair of vertices with `i` in `a` and
/// `j` in `b`, or `None` when either ring is empty.
pub fn closest_pair(a: &[[f64; 2]], b: &[[f64; 2]]) -> Option<(usize, usize)> {
    let mut best: Option<(usize, usize, f64)> = None;
    for (i, pa) in a.iter().enumerate() {
        for (j, pb) in b.iter().enumerate() {
            let d = squared_distance(*pa, *pb);
            if best.map_or(true, |(_, _, bd)| d < bd) {
                best = Some((i, j, d));
            }
        }
    }
    best.map(|(i, j, _)| (i, j))
}

fn cross(o: [f64; 2], a: [f64; 2], b: [f64; 2]) -> f64 {
    (a[0] - o[0]) * (b[1] - o[1]) - (a[1] - o[1]) * (b[0] - o[0])
}

/// Convex hull of a point set via the monotone chain, returned
/// counterclockwise without a repeated closing vertex.
///
/// Collinear interior points are dropped. Inputs with fewer than three
/// distinct points come back as-is (deduplicated, sorted).
pub fn convex_hull(points: &[[f64; 2]]) -> Vec<[f64; 2]> {
    let mut pts: Vec<[f64; 2]> = points.to_vec();
    pts.sort_by(|a, b| a[0].total_cmp(&b[0]).then(a[1].total_cmp(&b[1])));
    pts.dedup();
    let n = pts.len();
    if n < 3 {
        return pts;
    }

    let mut hull: Vec<[f64; 2]> = Vec::with_capacity(n + 1);
    for &p in &pts {
        while hull.len() >= 2 && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0 {
            hull.pop();
        }
        hull.push(p);
    }
    let lower_len = hull.len() + 1;
    for &p in pts.iter().rev().skip(1) {
        while hull.len() >= lower_len && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0
        {
            hull.pop();
        }
        hull.push(p);
    }
    hull.pop();
    hull
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shoelace_area_of_unit_square() {
        let square = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
        assert!((ring_signed_area(&square).abs() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn bbox_gap_zero_when_overlapping() {
        let a = (0.0, 0.0, 2.0, 2.0);
        let b = (1.0, 1.0, 3.0, 3.0);
        assert_eq!(box_gap(a, b), 0.0);
        let c = (5.0, 0.0, 6.0, 2.0);
        assert!((box_gap(a, c) - 3.0).abs() < 1e-12);
        // Diagonal separation combines both axes.
        let d = (5.0, 6.0, 7.0, 8.0);
        assert!((box_gap(a, d) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn hull_drops_interior_and_collinear_points() {
        let pts = [
            [0.0, 0.0],
            [2.0, 0.0],
            [2.0, 2.0],
            [0.0, 2.0],
            [1.0, 1.0], // interior
            [1.0, 0.0], // collinear on the bottom edge
        ];
        let hull = convex_hull(&pts);
        assert_eq!(hull.len(), 4);
        assert!(hull.contains(&[0.0, 0.0]));
        assert!(hull.contains(&[2.0, 2.0]));
        assert!(!hull.contains(&[1.0, 1.0]));
        assert!(ring_signed_area(&hull) > 0.0);
    }

    #[test]
    fn hull_of_two_points_passes_through() {
        let pts = [[1.0, 1.0], [0.0, 0.0], [1.0, 1.0]];
        let hull = convex_hull(&pts);
        assert_eq!(hull.len(), 2);
    }

    #[test]
    fn closest_pair_finds_the_touching_corners() {
        let a = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
        let b = [[3.0, 0.9], [1.2, 1.1], [3.0, 3.0]];
        let (i, j) = closest_pair(&a, &b).unwrap();
        assert_eq!(a[i], [1.0, 1.0]);
        assert_eq!(b[j], [1.2, 1.1]);
        assert!(closest_pair(&a, &[]).is_none());
    }

    #[test]
    fn centroid_of_square_is_center() {
        let square = [[0.0, 0.0], [2.0, 0.0], [2.0, 2.0], [0.0, 2.0]];
        assert_eq!(centroid(&square), [1.0, 1.0]);
    }
}
