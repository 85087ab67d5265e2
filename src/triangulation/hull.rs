use slotmap::SlotMap;
use tracing::trace;

use super::triangle::{Circumcircle, Triangle, VertexId};
use super::TriangleId;
use crate::cancel::CancelToken;
use crate::error::{GeometryError, Result};
use crate::math::MapPoint;

/// A hull vertex and the triangle owning the hull edge that starts at it.
#[derive(Debug, Clone, Copy)]
struct HullPoint {
    vertex: VertexId,
    triangle: TriangleId,
}

/// The current convex hull in sweep order.
struct Hull<'a> {
    points: &'a [MapPoint],
    ring: Vec<HullPoint>,
}

impl Hull<'_> {
    fn len(&self) -> usize {
        self.ring.len()
    }

    /// Returns `true` if the hull edge starting at `index` faces `p`.
    fn edge_visible_from(&self, index: usize, p: MapPoint) -> bool {
        let start = self.points[self.ring[index].vertex.0];
        let end = self.points[self.ring[(index + 1) % self.ring.len()].vertex.0];
        let (ex, ey) = (
            i64::from(end.x) - i64::from(start.x),
            i64::from(end.y) - i64::from(start.y),
        );
        let (dx, dy) = (
            i64::from(p.x) - i64::from(start.x),
            i64::from(p.y) - i64::from(start.y),
        );
        dx * ey - dy * ex < 0
    }
}

/// Builds the convex triangulation of `points` by radial sweep.
///
/// Points are sorted by distance from the first point and the seed triangle
/// is the one with the smallest circumcircle. The remaining points are added
/// in order of distance from the seed circumcenter, each joined to every
/// hull edge it can see. Duplicated plan positions are ignored. The result
/// is not yet legalized.
///
/// # Errors
///
/// Returns [`GeometryError::InsufficientPoints`] for fewer than three
/// distinct points, [`GeometryError::Degenerate`] when all points are
/// collinear, and [`FloorpathError::Cancelled`](crate::error::FloorpathError::Cancelled)
/// if `cancel` fires.
pub(super) fn sweep(
    points: &[MapPoint],
    cancel: &CancelToken,
) -> Result<SlotMap<TriangleId, Triangle>> {
    let Some(&origin) = points.first() else {
        return Err(GeometryError::InsufficientPoints { found: 0 }.into());
    };

    // Step 1: radial order from the first point, duplicates removed.
    let mut order: Vec<usize> = (0..points.len()).collect();
    order.sort_by_key(|&k| (points[k].distance_sq(origin), points[k].x, points[k].y));
    order.dedup_by(|later, earlier| points[*later].same_xy(points[*earlier]));
    if order.len() < 3 {
        return Err(GeometryError::InsufficientPoints { found: order.len() }.into());
    }

    // Step 2: seed triangle with the smallest circumcircle.
    let (first, second) = (order[0], order[1]);
    let (pa, pb) = (points[first].to_point2(), points[second].to_point2());
    let mut seed: Option<(usize, Circumcircle)> = None;
    for (k, &candidate) in order.iter().enumerate().skip(2) {
        let best = seed.as_ref().map(|(_, circle)| circle.radius_sq);
        match Circumcircle::through(&pa, &pb, &points[candidate].to_point2()) {
            Some(circle) if !best.is_some_and(|r| circle.radius_sq >= r) => {
                seed = Some((k, circle));
            }
            _ => {
                if best.is_some_and(|r| beyond_seed(r, points[candidate].distance_sq(origin))) {
                    break;
                }
            }
        }
    }
    let Some((seed_index, seed_circle)) = seed else {
        return Err(GeometryError::Degenerate("all points are collinear".into()).into());
    };
    let third = order.remove(seed_index);
    order.insert(2, third);

    let mut triangles = SlotMap::with_key();
    let mut first_triangle =
        Triangle::new(points, VertexId(first), VertexId(second), VertexId(third));
    first_triangle.orient(points);
    let seed_id = triangles.insert(first_triangle);
    let mut hull = Hull {
        points,
        ring: first_triangle
            .vertices()
            .map(|vertex| HullPoint {
                vertex,
                triangle: seed_id,
            })
            .to_vec(),
    };

    // Step 3: remaining points by distance from the seed circumcenter.
    let centre = seed_circle.center;
    let mut rest = order[3..].to_vec();
    rest.sort_by(|&i, &j| {
        let di = (points[i].to_point2() - centre).norm_squared();
        let dj = (points[j].to_point2() - centre).norm_squared();
        di.total_cmp(&dj)
    });

    for k in rest {
        cancel.check()?;
        insert_point(&mut hull, &mut triangles, VertexId(k), seed_id);
    }

    trace!(triangles = triangles.len(), hull = hull.len(), "sweep finished");
    Ok(triangles)
}

/// Seed search stops once candidates are further than the seed diameter.
#[allow(clippy::cast_precision_loss)]
fn beyond_seed(radius_sq: f64, distance_sq: i64) -> bool {
    radius_sq * 4.0 < distance_sq as f64
}

/// Adds one point outside the hull, creating one triangle per visible edge.
fn insert_point(
    hull: &mut Hull<'_>,
    triangles: &mut SlotMap<TriangleId, Triangle>,
    vertex: VertexId,
    placeholder: TriangleId,
) {
    let points = hull.points;
    let p = points[vertex.0];
    let fresh = HullPoint {
        vertex,
        triangle: placeholder,
    };

    // Fan of hull vertices seen from `p`, and the triangles owning the edges between them.
    let mut fan: Vec<VertexId> = Vec::new();
    let mut owners: Vec<TriangleId> = Vec::new();
    let slot;

    if hull.edge_visible_from(0, p) {
        let last = hull.len() - 1;
        if hull.edge_visible_from(last, p) {
            // The visible chain wraps around the start of the ring.
            slot = 0;
            fan.push(hull.ring[last].vertex);
            owners.push(hull.ring[last].triangle);
            while hull.len() > 1 {
                fan.push(hull.ring[0].vertex);
                owners.push(hull.ring[0].triangle);
                if hull.edge_visible_from(0, p) {
                    hull.ring.remove(0);
                } else {
                    hull.ring.insert(0, fresh);
                    break;
                }
            }
            let mut h = hull.len().saturating_sub(2);
            while h > 0 {
                if !hull.edge_visible_from(h, p) {
                    break;
                }
                fan.insert(0, hull.ring[h].vertex);
                owners.insert(0, hull.ring[h].triangle);
                hull.ring.remove(h + 1);
                h -= 1;
            }
        } else {
            slot = 1;
            fan.push(hull.ring[0].vertex);
            owners.push(hull.ring[0].triangle);
            while hull.len() > 1 {
                fan.push(hull.ring[1].vertex);
                owners.push(hull.ring[1].triangle);
                if hull.edge_visible_from(1, p) {
                    hull.ring.remove(1);
                } else {
                    hull.ring.insert(1, fresh);
                    break;
                }
            }
        }
    } else {
        let n = hull.len();
        let mut first_seen = None;
        let mut end = n;
        for h in 1..n {
            if hull.edge_visible_from(h, p) {
                first_seen.get_or_insert(h);
            } else if first_seen.is_some() {
                end = h;
                break;
            }
        }
        let Some(begin) = first_seen else {
            trace!(point = %p, "point sees no hull edge, skipped");
            return;
        };
        if end < n {
            for h in begin..=end {
                fan.push(hull.ring[h].vertex);
                owners.push(hull.ring[h].triangle);
            }
        } else {
            for h in begin..end {
                fan.push(hull.ring[h].vertex);
                owners.push(hull.ring[h].triangle);
            }
            fan.push(hull.ring[0].vertex);
        }
        if begin + 1 < end {
            hull.ring.drain(begin + 1..end);
        }
        hull.ring.insert(begin + 1, fresh);
        slot = begin + 1;
    }

    if fan.len() < 2 {
        return;
    }

    // One new triangle per visible edge, chained through their `ab`/`ac` links.
    let created: Vec<TriangleId> = fan
        .windows(2)
        .map(|pair| triangles.insert(Triangle::new(points, vertex, pair[0], pair[1])))
        .collect();
    for (q, &id) in created.iter().enumerate() {
        let outer = owners[q];
        if let Some(t) = triangles.get_mut(id) {
            t.bc = Some(outer);
            t.ab = q.checked_sub(1).map(|prev| created[prev]);
            t.ac = created.get(q + 1).copied();
        }
        if let Some(neighbour) = triangles.get_mut(outer) {
            neighbour.link_edge(fan[q], fan[q + 1], id);
        }
    }

    let (Some(&first), Some(&last)) = (created.first(), created.last()) else {
        return;
    };
    hull.ring[slot].triangle = last;
    let before = if slot > 0 { slot - 1 } else { hull.len() - 1 };
    hull.ring[before].triangle = first;
}
