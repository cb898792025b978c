//! Vertex compaction: reduce an arbitrarily detailed boundary ring to at
//! most K representative vertices.
//!
//! The full circle around the ring's centroid is partitioned into K equal
//! angular sectors. Each sector keeps the input vertex farthest from the
//! centroid, so the result tracks the true extremal boundary in every
//! direction. The sweep selects vertices, it never interpolates new ones.

use crate::geometry;
use crate::types::{RingPoint, COORD_SCALE, MIN_REGION_EXTENT};
use std::f64::consts::TAU;

/// Reduces `ring` to at most `budget` vertices chosen by an angular sweep
/// around `anchor`, returning them in sector order as fixed-point
/// coordinates.
///
/// Inputs too small to yield two vertices fall back to a synthetic diamond
/// of extent [`MIN_REGION_EXTENT`] around the available points, guaranteeing
/// a usable polygon for any non-empty input. An empty ring yields an empty
/// result; the caller decides whether that is worth logging.
pub fn compact(ring: &[[f64; 2]], anchor: [f64; 2], budget: usize) -> Vec<RingPoint> {
    let mut chosen = sweep(ring, anchor, budget);
    if chosen.len() < 2 && !ring.is_empty() {
        let seeds: Vec<[f64; 2]> = if chosen.is_empty() {
            ring.iter().take(2).copied().collect()
        } else {
            chosen
        };
        let synthetic = synthetic_boundary(&seeds);
        chosen = sweep(&synthetic, geometry::centroid(&synthetic), budget);
    }

    let mut out: Vec<RingPoint> = chosen
        .iter()
        .map(|p| RingPoint::from_degrees(p[1], p[0]))
        .collect();
    out.dedup();
    if out.len() > 1 && out.first() == out.last() {
        out.pop();
    }
    out
}

/// One angular sweep: K equal sectors starting at angle 0, keeping the
/// squared-distance-farthest vertex per non-empty sector.
fn sweep(ring: &[[f64; 2]], anchor: [f64; 2], budget: usize) -> Vec<[f64; 2]> {
    let mut best: Vec<Option<(f64, [f64; 2])>> = vec![None; budget];
    let sector_width = TAU / budget as f64;

    for &p in ring {
        let dx = p[0] - anchor[0];
        let dy = p[1] - anchor[1];
        let mut angle = dy.atan2(dx);
        if angle < 0.0 {
            angle += TAU;
        }
        let sector = ((angle / sector_width) as usize).min(budget - 1);
        let dist = dx * dx + dy * dy;
        if best[sector].map_or(true, |(d, _)| dist > d) {
            best[sector] = Some((dist, p));
        }
    }

    best.into_iter().flatten().map(|(_, p)| p).collect()
}

/// Diamond of extent [`MIN_REGION_EXTENT`] around each seed point.
fn synthetic_boundary(seeds: &[[f64; 2]]) -> Vec<[f64; 2]> {
    let extent = MIN_REGION_EXTENT as f64 / COORD_SCALE;
    let mut boundary = Vec::with_capacity(seeds.len() * 4);
    for p in seeds {
        boundary.push([p[0] + extent, p[1]]);
        boundary.push([p[0], p[1] + extent]);
        boundary.push([p[0] - extent, p[1]]);
        boundary.push([p[0], p[1] - extent]);
    }
    boundary
}
