//! Geometry normalization ahead of compaction.
//!
//! Raw country geometry arrives as a bag of multi-polygon fragments: a
//! mainland, islands, exclaves. Before the vertex compactor can reduce a
//! country to one small outline, nearby fragments are merged into a single
//! ring (a zero-width "isthmus" join at their closest vertices) and each
//! surviving ring is reduced to its convex hull.
//!
//! Merging is best-effort. A fragment pair that cannot be joined is logged
//! and left separate; one bad pair never aborts a country, let alone the
//! whole batch.

use crate::geometry;
use log::warn;

/// Closes an open ring by appending its first vertex. Idempotent.
pub fn close(ring: &mut Vec<[f64; 2]>) {
    if ring.len() >= 2 && ring.first() != ring.last() {
        let first = ring[0];
        ring.push(first);
    }
}

/// Merges fragments of one logical entity whose bounding boxes are within
/// `proximity` degrees of each other, then reduces every surviving ring to
/// its convex hull.
///
/// Fragments are processed largest-area first, so a mainland absorbs its
/// islands rather than the other way around. Absorption is tracked with a
/// tombstone flag per slot; slots are never removed mid-iteration, keeping
/// indices stable. Degenerate fragments (two points or fewer) cannot be
/// merged meaningfully and are returned untouched.
pub fn merge(fragments: Vec<Vec<[f64; 2]>>, proximity: f64) -> Vec<Vec<[f64; 2]>> {
    let mut degenerate = Vec::new();
    let mut arena: Vec<Vec<[f64; 2]>> = Vec::new();
    for fragment in fragments {
        if fragment.len() <= 2 {
            degenerate.push(fragment);
        } else {
            arena.push(fragment);
        }
    }

    arena.sort_by(|a, b| {
        geometry::ring_signed_area(b)
            .abs()
            .total_cmp(&geometry::ring_signed_area(a).abs())
    });

    let mut absorbed = vec![false; arena.len()];
    for i in 0..arena.len() {
        if absorbed[i] {
            continue;
        }
        let mut own_box = geometry::ring_bbox(&arena[i]);
        for j in 0..arena.len() {
            if j == i || absorbed[j] {
                continue;
            }
            if geometry::box_gap(own_box, geometry::ring_bbox(&arena[j])) > proximity {
                continue;
            }
            match splice(&arena[i], &arena[j]) {
                Some(joined) => {
                    arena[i] = joined;
                    absorbed[j] = true;
                    own_box = geometry::ring_bbox(&arena[i]);
                }
                None => {
                    warn!(
                        "could not splice fragment pair ({}, {}); keeping them separate",
                        i, j
                    );
                }
            }
        }
    }

    let mut survivors: Vec<Vec<[f64; 2]>> = arena
        .into_iter()
        .zip(absorbed)
        .filter(|(_, gone)| !gone)
        .map(|(ring, _)| geometry::convex_hull(&ring))
        .collect();
    survivors.extend(degenerate);
    survivors
}

/// Joins two rings at their closest pair of vertices: walk `a` up to its
/// near point, jump across to `b`'s near point, traverse all of `b`, and
/// return. The jump forms a zero-width corridor, which the hull reduction
/// afterwards absorbs.
fn splice(a: &[[f64; 2]], b: &[[f64; 2]]) -> Option<Vec<[f64; 2]>> {
    let (pi, pj) = geometry::closest_pair(a, b)?;
    let mut joined = Vec::with_capacity(a.len() + b.len() + 2);
    joined.extend_from_slice(&a[..=pi]);
    joined.extend_from_slice(&b[pj..]);
    joined.extend_from_slice(&b[..=pj]);
    joined.extend_from_slice(&a[pi..]);
    Some(joined)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x: f64, y: f64, side: f64) -> Vec<[f64; 2]> {
        vec![[x, y], [x + side, y], [x + side, y + side], [x, y + side]]
    }

    #[test]
    fn close_appends_first_point_once() {
        let mut ring = square(0.0, 0.0, 1.0);
        close(&mut ring);
        assert_eq!(ring.len(), 5);
        assert_eq!(ring.first(), ring.last());
        close(&mut ring);
        assert_eq!(ring.len(), 5);
    }

    #[test]
    fn close_leaves_tiny_rings_alone() {
        let mut ring = vec![[1.0, 1.0]];
        close(&mut ring);
        assert_eq!(ring.len(), 1);
    }

    #[test]
    fn nearby_fragments_merge_into_one_hull() {
        // Two unit squares separated by a 0.2 degree channel.
        let fragments = vec![square(0.0, 0.0, 1.0), square(1.2, 0.0, 1.0)];
        let merged = merge(fragments, 0.5);
        assert_eq!(merged.len(), 1);
        let area = geometry::ring_signed_area(&merged[0]).abs();
        // The hull spans the channel, so it covers more than both squares.
        assert!(area > 2.0);
    }

    #[test]
    fn distant_fragments_stay_separate() {
        let fragments = vec![square(0.0, 0.0, 1.0), square(10.0, 0.0, 1.0)];
        let merged = merge(fragments, 0.5);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn largest_fragment_absorbs_chain_of_islands() {
        let fragments = vec![
            square(3.1, 0.0, 0.5), // island near the second island
            square(0.0, 0.0, 3.0), // mainland
            square(3.8, 0.0, 0.5), // island near the first island
        ];
        let merged = merge(fragments, 0.3);
        assert_eq!(merged.len(), 1);
        let (min_x, _, max_x, _) = geometry::ring_bbox(&merged[0]);
        assert!(min_x <= 0.0 && max_x >= 4.3);
    }

    #[test]
    fn degenerate_fragments_pass_through_unmerged() {
        let fragments = vec![square(0.0, 0.0, 1.0), vec![[0.5, 0.5], [0.6, 0.6]]];
        let merged = merge(fragments, 5.0);
        assert_eq!(merged.len(), 2);
        assert!(merged.iter().any(|f| f.len() == 2));
    }
}
