mod hull;
mod legalize;
mod prune;
pub mod triangle;

use std::collections::HashMap;

use slotmap::SlotMap;
use tracing::debug;

use crate::building::Polygon;
use crate::cancel::CancelToken;
use crate::error::Result;
use crate::math::MapPoint;

pub use triangle::{Circumcircle, Triangle, VertexId};

slotmap::new_key_type! {
    /// Unique identifier for a triangle in a [`Triangulation`].
    pub struct TriangleId;
}

/// Parameters controlling edge-flip legalization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangulationParams {
    /// Share of triangles that must keep flipping for the coarse phase to continue.
    pub coarse_flip_fraction: f64,
    /// Maximum number of coarse passes.
    pub coarse_iterations: usize,
    /// Maximum number of fine passes.
    pub fine_iterations: usize,
}

impl Default for TriangulationParams {
    fn default() -> Self {
        Self {
            coarse_flip_fraction: 0.3,
            coarse_iterations: 1000,
            fine_iterations: 2000,
        }
    }
}

/// Delaunay triangulation of a point set with obstacle triangles removed.
#[derive(Debug, Clone, Default)]
pub struct Triangulation {
    points: Vec<MapPoint>,
    triangles: SlotMap<TriangleId, Triangle>,
}

impl Triangulation {
    /// Input points; [`VertexId::index`] indexes into this slice.
    #[must_use]
    pub fn points(&self) -> &[MapPoint] {
        &self.points
    }

    /// Number of triangles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    /// Returns `true` if every triangle was pruned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Iterates triangles with their ids.
    pub fn triangles(&self) -> impl Iterator<Item = (TriangleId, &Triangle)> {
        self.triangles.iter()
    }

    /// Looks up a triangle.
    #[must_use]
    pub fn triangle(&self, id: TriangleId) -> Option<&Triangle> {
        self.triangles.get(id)
    }

    /// Looks up a vertex position.
    #[must_use]
    pub fn vertex(&self, id: VertexId) -> Option<MapPoint> {
        self.points.get(id.index()).copied()
    }

    /// Corner positions of a triangle.
    #[must_use]
    pub fn corners(&self, id: TriangleId) -> Option<[MapPoint; 3]> {
        let t = self.triangles.get(id)?;
        let [a, b, c] = t.vertices();
        Some([self.vertex(a)?, self.vertex(b)?, self.vertex(c)?])
    }

    /// Corner positions of every triangle, for drawing.
    #[must_use]
    pub fn outlines(&self) -> Vec<[MapPoint; 3]> {
        self.triangles
            .keys()
            .filter_map(|id| self.corners(id))
            .collect()
    }

    /// Vertex adjacency: each vertex maps to the other corners of every
    /// triangle containing it, in first-seen order.
    #[must_use]
    pub fn vertex_neighbours(&self) -> HashMap<MapPoint, Vec<MapPoint>> {
        let mut adjacency: HashMap<MapPoint, Vec<MapPoint>> = HashMap::new();
        for id in self.triangles.keys() {
            let Some(corners) = self.corners(id) else {
                continue;
            };
            for (i, &vertex) in corners.iter().enumerate() {
                let list = adjacency.entry(vertex).or_default();
                for &other in corners.iter().skip(i + 1).chain(corners.iter().take(i)) {
                    if !list.contains(&other) {
                        list.push(other);
                    }
                }
            }
        }
        adjacency
    }
}

/// Builds a [`Triangulation`] of a point set, removing triangles that lie
/// in or cut through barriers.
pub struct Triangulate {
    points: Vec<MapPoint>,
    barriers: Vec<Polygon>,
    boundary: Option<Polygon>,
    params: TriangulationParams,
}

impl Triangulate {
    /// Creates a triangulation of `points` with no barriers.
    #[must_use]
    pub fn new(points: Vec<MapPoint>) -> Self {
        Self {
            points,
            barriers: Vec::new(),
            boundary: None,
            params: TriangulationParams::default(),
        }
    }

    /// Sets the barrier outlines whose interiors must stay untriangulated.
    /// No triangle edge may run through a barrier's bounding box.
    #[must_use]
    pub fn with_barriers(mut self, barriers: Vec<Polygon>) -> Self {
        self.barriers = barriers;
        self
    }

    /// Drops triangles whose centroid falls outside `boundary`.
    #[must_use]
    pub fn with_boundary(mut self, boundary: Polygon) -> Self {
        self.boundary = Some(boundary);
        self
    }

    /// Overrides legalization parameters.
    #[must_use]
    pub fn with_params(mut self, params: TriangulationParams) -> Self {
        self.params = params;
        self
    }

    /// Executes the triangulation.
    ///
    /// # Errors
    ///
    /// Returns a [`GeometryError`](crate::error::GeometryError) when fewer
    /// than three distinct or only collinear points are given, and
    /// [`FloorpathError::Cancelled`](crate::error::FloorpathError::Cancelled)
    /// if `cancel` fires.
    pub fn execute(self, cancel: &CancelToken) -> Result<Triangulation> {
        let Self {
            points,
            barriers,
            boundary,
            params,
        } = self;

        // Step 1: convex triangulation by radial sweep.
        let mut triangles = hull::sweep(&points, cancel)?;

        // Step 2: edge flips until Delaunay.
        let flips = legalize::legalize(&points, &mut triangles, &params, cancel)?;

        // Step 3: obstacle pruning.
        let swept = triangles.len();
        prune::drop_barrier_fill(&points, &mut triangles, &barriers);
        prune::drop_barrier_crossings(&points, &mut triangles, &barriers);
        prune::drop_barrier_overlaps(&points, &mut triangles, &barriers);
        if let Some(boundary) = &boundary {
            prune::clip_to_boundary(&points, &mut triangles, boundary);
        }
        prune::unlink_removed(&mut triangles);

        debug!(
            points = points.len(),
            flips,
            swept,
            kept = triangles.len(),
            "triangulation built"
        );
        Ok(Triangulation { points, triangles })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::{FloorpathError, GeometryError};
    use crate::math::intersect_2d::{segment_enters_bounds, segments_intersect};
    use spade::{DelaunayTriangulation, Point2 as SpadePoint2, Triangulation as _};

    fn p(x: i32, y: i32) -> MapPoint {
        MapPoint::new(x, y, 0)
    }

    fn rect(x0: i32, y0: i32, x1: i32, y1: i32) -> Polygon {
        Polygon::new(vec![p(x0, y0), p(x1, y0), p(x1, y1), p(x0, y1)]).unwrap()
    }

    /// Deterministic scattered points from a linear congruential generator.
    fn scattered(n: usize, seed: u64) -> Vec<MapPoint> {
        let mut state = seed;
        let mut next = move || {
            state = state
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            i32::try_from((state >> 33) % 1000).unwrap()
        };
        (0..n).map(|_| p(next(), next())).collect()
    }

    fn build(points: Vec<MapPoint>) -> Triangulation {
        Triangulate::new(points).execute(&CancelToken::new()).unwrap()
    }

    fn assert_neighbours_share_edges(tri: &Triangulation) {
        for (id, t) in tri.triangles() {
            let [a, b, c] = t.vertices();
            for (link, edge) in t.neighbours().into_iter().zip([[a, b], [b, c], [a, c]]) {
                let Some(other) = link else { continue };
                let o = tri.triangle(other).unwrap();
                let shared = o.vertices().iter().filter(|v| edge.contains(v)).count();
                assert_eq!(shared, 2, "neighbour does not share the edge");
                assert!(o.neighbours().contains(&Some(id)), "link is not mutual");
            }
        }
    }

    fn assert_empty_circumcircles(tri: &Triangulation) {
        for (_, t) in tri.triangles() {
            let Some(circle) = t.circumcircle() else { continue };
            for (k, q) in tri.points().iter().enumerate() {
                if t.vertices().iter().any(|v| v.index() == k) {
                    continue;
                }
                let d = (circle.center - q.to_point2()).norm_squared();
                // Cocircular integer points may land a rounding error inside.
                assert!(
                    d >= circle.radius_sq * (1.0 - 1e-9),
                    "point {q} inside a circumcircle"
                );
            }
        }
    }

    #[test]
    fn square_gives_two_triangles() {
        let tri = build(vec![p(0, 0), p(10, 0), p(10, 10), p(0, 10)]);
        assert_eq!(tri.len(), 2);
        assert_neighbours_share_edges(&tri);
    }

    #[test]
    fn scattered_points_are_delaunay() {
        let points = scattered(60, 17);
        let tri = build(points.clone());
        assert_neighbours_share_edges(&tri);
        assert_empty_circumcircles(&tri);

        let mut reference: DelaunayTriangulation<SpadePoint2<f64>> = DelaunayTriangulation::new();
        for q in &points {
            reference
                .insert(SpadePoint2::new(f64::from(q.x), f64::from(q.y)))
                .unwrap();
        }
        assert_eq!(tri.len(), reference.num_inner_faces());
    }

    #[test]
    fn room_with_start_and_goal_on_the_diagonal() {
        let tri = build(vec![
            p(0, 0),
            p(100, 0),
            p(100, 100),
            p(0, 100),
            p(10, 10),
            p(90, 90),
        ]);
        assert_eq!(tri.len(), 6);
        assert_neighbours_share_edges(&tri);
        assert_empty_circumcircles(&tri);
        assert!(tri.vertex_neighbours()[&p(10, 10)].contains(&p(90, 90)));
    }

    #[test]
    fn duplicates_are_ignored() {
        let tri = build(vec![p(0, 0), p(5, 0), p(5, 0), p(0, 5), p(0, 0)]);
        assert_eq!(tri.len(), 1);
    }

    #[test]
    fn too_few_points() {
        let err = Triangulate::new(vec![p(0, 0), p(1, 1), p(1, 1)])
            .execute(&CancelToken::new())
            .unwrap_err();
        assert!(matches!(
            err,
            FloorpathError::Geometry(GeometryError::InsufficientPoints { found: 2 })
        ));
    }

    #[test]
    fn collinear_points_are_degenerate() {
        let err = Triangulate::new(vec![p(0, 0), p(1, 1), p(2, 2), p(5, 5)])
            .execute(&CancelToken::new())
            .unwrap_err();
        assert!(matches!(
            err,
            FloorpathError::Geometry(GeometryError::Degenerate(_))
        ));
    }

    #[test]
    fn barrier_interior_is_not_triangulated() {
        let barrier = rect(8, 8, 12, 12).enlarged();
        let mut points = vec![p(0, 0), p(20, 0), p(20, 20), p(0, 20), p(2, 10), p(18, 10)];
        points.extend_from_slice(barrier.corners());
        let tri = Triangulate::new(points)
            .with_barriers(vec![barrier.clone()])
            .execute(&CancelToken::new())
            .unwrap();

        assert!(!tri.is_empty());
        assert_neighbours_share_edges(&tri);
        for corners in tri.outlines() {
            let [a, b, c] = corners;
            let cx = (a.x + b.x + c.x) / 3;
            let cy = (a.y + b.y + c.y) / 3;
            assert!(!barrier.contains(p(cx, cy)), "triangle inside the barrier");
            for (u, v) in [(a, b), (b, c), (c, a)] {
                let n = barrier.corners().len();
                for j in 0..n {
                    let (s, e) = (barrier.corners()[j], barrier.corners()[(j + 1) % n]);
                    let shares = [s, e].contains(&u) || [s, e].contains(&v);
                    assert!(shares || !segments_intersect(u, v, s, e));
                }
            }
        }
        // No direct edge across the barrier.
        assert!(!tri.vertex_neighbours()[&p(2, 10)].contains(&p(18, 10)));
    }

    #[test]
    fn corner_inside_a_neighbouring_barrier_is_cut_off() {
        // One unit apart: the enlarged corner (23, 12) lies inside the other box.
        let barriers = [rect(22, 7, 28, 12), rect(18, 13, 22, 22)].map(|b| b.enlarged());
        assert!(barriers[0].contains(p(23, 12)));
        let mut points = vec![p(0, 0), p(40, 0), p(40, 40), p(0, 40), p(31, 1), p(24, 39)];
        points.extend(barriers.iter().flat_map(|b| b.corners().iter().copied()));
        let tri = Triangulate::new(points)
            .with_barriers(barriers.to_vec())
            .execute(&CancelToken::new())
            .unwrap();

        assert!(!tri.is_empty());
        for [a, b, c] in tri.outlines() {
            for (u, v) in [(a, b), (b, c), (c, a)] {
                for barrier in &barriers {
                    assert!(
                        !segment_enters_bounds(u, v, &barrier.bounds()),
                        "edge {u} -> {v} runs through a barrier"
                    );
                }
            }
        }
        let neighbours = tri.vertex_neighbours();
        assert!(!neighbours.get(&p(21, 6)).is_some_and(|n| n.contains(&p(23, 12))));
    }

    #[test]
    fn boundary_clips_concave_notch() {
        let outline = vec![p(0, 0), p(20, 0), p(20, 10), p(10, 10), p(10, 20), p(0, 20)];
        let room = Polygon::new(outline.clone()).unwrap();
        let tri = Triangulate::new(outline)
            .with_boundary(room.clone())
            .execute(&CancelToken::new())
            .unwrap();
        assert_eq!(tri.len(), 4);
        for [a, b, c] in tri.outlines() {
            let mid = p((a.x + b.x + c.x) / 3, (a.y + b.y + c.y) / 3);
            assert!(room.covers(mid));
        }
    }

    #[test]
    fn cancelled_token_stops_triangulation() {
        let token = CancelToken::new();
        token.cancel();
        let result = Triangulate::new(scattered(20, 3)).execute(&token);
        assert!(matches!(result, Err(FloorpathError::Cancelled)));
    }
}
