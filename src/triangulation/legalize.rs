use std::collections::BTreeSet;

use slotmap::SlotMap;
use tracing::trace;

use super::triangle::{Edge, Triangle};
use super::{TriangleId, TriangulationParams};
use crate::cancel::CancelToken;
use crate::error::Result;
use crate::math::MapPoint;

/// Restores the empty-circumcircle property by edge flipping.
///
/// The first pass visits every triangle. Later passes only revisit the
/// triangles touched by the previous pass: a coarse phase runs while a large
/// share of triangles keeps flipping, then a fine phase runs until nothing
/// flips. Both phases are capped by the iteration limits in `params`.
///
/// Returns the number of flips performed.
pub(super) fn legalize(
    points: &[MapPoint],
    triangles: &mut SlotMap<TriangleId, Triangle>,
    params: &TriangulationParams,
    cancel: &CancelToken,
) -> Result<usize> {
    let all: BTreeSet<TriangleId> = triangles.keys().collect();
    let coarse_threshold = flip_budget(params.coarse_flip_fraction, all.len());

    let (mut dirty, mut touched) = flip_pass(points, triangles, &all);
    let mut total = touched / 2;

    let mut iterations = 0;
    while touched > coarse_threshold && iterations < params.coarse_iterations {
        cancel.check()?;
        (dirty, touched) = flip_pass(points, triangles, &dirty);
        total += touched / 2;
        iterations += 1;
    }

    iterations = 0;
    while touched > 0 && iterations < params.fine_iterations {
        cancel.check()?;
        (dirty, touched) = flip_pass(points, triangles, &dirty);
        total += touched / 2;
        iterations += 1;
    }

    trace!(flips = total, "legalization finished");
    Ok(total)
}

/// Number of touched triangles above which the coarse phase keeps going.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn flip_budget(fraction: f64, triangles: usize) -> usize {
    (fraction * triangles as f64) as usize
}

/// Tries one flip on every triangle of `batch`.
///
/// Returns the triangles changed and twice the number of flips.
fn flip_pass(
    points: &[MapPoint],
    triangles: &mut SlotMap<TriangleId, Triangle>,
    batch: &BTreeSet<TriangleId>,
) -> (BTreeSet<TriangleId>, usize) {
    let mut changed = BTreeSet::new();
    let mut touched = 0;
    for &id in batch {
        if let Some(other) = flip(points, triangles, id) {
            touched += 2;
            changed.insert(id);
            changed.insert(other);
        }
    }
    (changed, touched)
}

/// Flips the first illegal edge of triangle `id`, testing `bc`, `ab`, `ac`
/// in that order. Returns the neighbour that took part in the flip.
fn flip(
    points: &[MapPoint],
    triangles: &mut SlotMap<TriangleId, Triangle>,
    id: TriangleId,
) -> Option<TriangleId> {
    let t = *triangles.get(id)?;
    for edge in [Edge::Bc, Edge::Ab, Edge::Ac] {
        let Some(other_id) = t.neighbour(edge) else {
            continue;
        };
        let Some(other) = triangles.get(other_id) else {
            continue;
        };
        let pivot = if edge == Edge::Bc { t.b } else { t.a };
        let Some((opposite, near, far)) = other.opposite(pivot, id) else {
            continue;
        };
        if !t.circumcircle_contains(&points[opposite.0].to_point2()) {
            continue;
        }

        // `apex` keeps its place; the shared edge `first-second` becomes `apex-opposite`.
        let (apex, first, second, keep_first, keep_second) = match edge {
            Edge::Bc => (t.a, t.b, t.c, t.ab, t.ac),
            Edge::Ab => (t.c, t.a, t.b, t.ac, t.bc),
            Edge::Ac => (t.b, t.a, t.c, t.ab, t.bc),
        };
        if same_neighbour(keep_first, near) || same_neighbour(keep_second, far) {
            continue;
        }

        triangles[id] = Triangle::linked(
            points,
            [apex, first, opposite],
            [keep_first, near, Some(other_id)],
        );
        triangles[other_id] = Triangle::linked(
            points,
            [apex, second, opposite],
            [keep_second, far, Some(id)],
        );
        if let Some(moved) = near.and_then(|n| triangles.get_mut(n)) {
            moved.replace_neighbour(other_id, id);
        }
        if let Some(moved) = keep_second.and_then(|n| triangles.get_mut(n)) {
            moved.replace_neighbour(id, other_id);
        }
        return Some(other_id);
    }
    None
}

/// Returns `true` if both links point at the same triangle.
fn same_neighbour(a: Option<TriangleId>, b: Option<TriangleId>) -> bool {
    a.is_some() && a == b
}
