use slotmap::SlotMap;

use super::triangle::Triangle;
use super::TriangleId;
use crate::building::Polygon;
use crate::math::intersect_2d::{segment_enters_bounds, segments_intersect};
use crate::math::polygon_2d::point_in_polygon_xy;
use crate::math::{MapPoint, Point2};

fn corner_points(points: &[MapPoint], t: &Triangle) -> [MapPoint; 3] {
    t.vertices().map(|v| points[v.index()])
}

/// Removes triangles spanned entirely by corners of one barrier.
pub(super) fn drop_barrier_fill(
    points: &[MapPoint],
    triangles: &mut SlotMap<TriangleId, Triangle>,
    barriers: &[Polygon],
) {
    triangles.retain(|_, t| {
        let corners = corner_points(points, t);
        !barriers.iter().any(|barrier| {
            corners
                .iter()
                .all(|v| barrier.corners().iter().any(|c| c.same_xy(*v)))
        })
    });
}

/// Removes triangles with an edge that properly crosses a barrier edge.
/// Edges sharing an endpoint with the barrier edge are not crossings.
pub(super) fn drop_barrier_crossings(
    points: &[MapPoint],
    triangles: &mut SlotMap<TriangleId, Triangle>,
    barriers: &[Polygon],
) {
    triangles.retain(|_, t| {
        let [a, b, c] = corner_points(points, t);
        let edges = [(a, b), (b, c), (c, a)];
        !barriers.iter().any(|barrier| {
            let outline = barrier.corners();
            let n = outline.len();
            (0..n).any(|j| {
                let (from, to) = (outline[j], outline[(j + 1) % n]);
                edges.iter().any(|&(p, q)| {
                    segments_intersect(p, q, from, to)
                        && !p.same_xy(from)
                        && !q.same_xy(to)
                        && !q.same_xy(from)
                        && !p.same_xy(to)
                })
            })
        })
    });
}

/// Removes triangles with an edge through the interior of a barrier's
/// bounding box. An edge ending inside another barrier touches none of its
/// edges properly and is only caught here.
pub(super) fn drop_barrier_overlaps(
    points: &[MapPoint],
    triangles: &mut SlotMap<TriangleId, Triangle>,
    barriers: &[Polygon],
) {
    triangles.retain(|_, t| {
        let [a, b, c] = corner_points(points, t);
        !barriers.iter().any(|barrier| {
            [(a, b), (b, c), (c, a)]
                .iter()
                .any(|&(p, q)| segment_enters_bounds(p, q, &barrier.bounds()))
        })
    });
}

/// Removes triangles whose centroid lies outside `boundary`.
pub(super) fn clip_to_boundary(
    points: &[MapPoint],
    triangles: &mut SlotMap<TriangleId, Triangle>,
    boundary: &Polygon,
) {
    triangles.retain(|_, t| {
        let [a, b, c] = corner_points(points, t);
        let centroid = Point2::new(
            (f64::from(a.x) + f64::from(b.x) + f64::from(c.x)) / 3.0,
            (f64::from(a.y) + f64::from(b.y) + f64::from(c.y)) / 3.0,
        );
        point_in_polygon_xy(boundary.corners(), &centroid)
    });
}

/// Clears links to triangles that were pruned.
pub(super) fn unlink_removed(triangles: &mut SlotMap<TriangleId, Triangle>) {
    let alive: std::collections::HashSet<TriangleId> = triangles.keys().collect();
    for t in triangles.values_mut() {
        t.retain_neighbours(|id| alive.contains(&id));
    }
}
