use super::TriangleId;
use crate::math::{MapPoint, Point2};

/// Index of a vertex in the point array of a [`Triangulation`](super::Triangulation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexId(pub(super) usize);

impl VertexId {
    /// Position in [`Triangulation::points`](super::Triangulation::points).
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Circle through the three vertices of a triangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circumcircle {
    pub center: Point2,
    pub radius_sq: f64,
}

impl Circumcircle {
    /// Relative radius limit above which a circle is considered degenerate.
    const MAX_RADIUS_RATIO: f64 = 1e10;

    /// Computes the circle through `a`, `b` and `c`.
    ///
    /// Returns `None` for collinear points and for nearly collinear points
    /// whose radius dwarfs the `a-b` edge.
    #[must_use]
    pub fn through(a: &Point2, b: &Point2, c: &Point2) -> Option<Self> {
        let ba = b - a;
        let ca = c - a;
        let ba_len = ba.norm_squared();
        let ca_len = ca.norm_squared();

        let det = ba.x * ca.y - ba.y * ca.x;
        if det == 0.0 {
            return None;
        }

        let half_inv = 0.5 / det;
        let offset_x = (ca.y * ba_len - ba.y * ca_len) * half_inv;
        let offset_y = (ba.x * ca_len - ca.x * ba_len) * half_inv;
        let radius_sq = offset_x * offset_x + offset_y * offset_y;
        if radius_sq > Self::MAX_RADIUS_RATIO * ba_len {
            return None;
        }

        Some(Self {
            center: Point2::new(a.x + offset_x, a.y + offset_y),
            radius_sq,
        })
    }

    /// Strict inside test.
    #[must_use]
    pub fn contains(&self, p: &Point2) -> bool {
        (self.center - p).norm_squared() < self.radius_sq
    }
}

/// Which edge of a triangle a neighbour link refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Edge {
    Ab,
    Bc,
    Ac,
}

/// A triangle of the triangulation.
///
/// `ab`, `bc` and `ac` are the triangles across the respective edges, or
/// `None` on the outer boundary.
#[derive(Debug, Clone, Copy)]
pub struct Triangle {
    pub(super) a: VertexId,
    pub(super) b: VertexId,
    pub(super) c: VertexId,
    pub(super) ab: Option<TriangleId>,
    pub(super) bc: Option<TriangleId>,
    pub(super) ac: Option<TriangleId>,
    circle: Option<Circumcircle>,
}

impl Triangle {
    /// Creates an unlinked triangle and caches its circumcircle.
    pub(super) fn new(points: &[MapPoint], a: VertexId, b: VertexId, c: VertexId) -> Self {
        Self::linked(points, [a, b, c], [None, None, None])
    }

    /// Creates a triangle with neighbour links `[ab, bc, ac]`.
    pub(super) fn linked(
        points: &[MapPoint],
        [a, b, c]: [VertexId; 3],
        [ab, bc, ac]: [Option<TriangleId>; 3],
    ) -> Self {
        let circle = Circumcircle::through(
            &points[a.0].to_point2(),
            &points[b.0].to_point2(),
            &points[c.0].to_point2(),
        );
        Self {
            a,
            b,
            c,
            ab,
            bc,
            ac,
            circle,
        }
    }

    /// Vertex ids in `a, b, c` order.
    #[must_use]
    pub fn vertices(&self) -> [VertexId; 3] {
        [self.a, self.b, self.c]
    }

    /// Neighbours across `ab`, `bc` and `ac`.
    #[must_use]
    pub fn neighbours(&self) -> [Option<TriangleId>; 3] {
        [self.ab, self.bc, self.ac]
    }

    /// Cached circumcircle, `None` when the triangle is degenerate.
    #[must_use]
    pub fn circumcircle(&self) -> Option<&Circumcircle> {
        self.circle.as_ref()
    }

    /// Returns `true` if `p` is strictly inside the circumcircle.
    /// A degenerate triangle contains nothing.
    #[must_use]
    pub fn circumcircle_contains(&self, p: &Point2) -> bool {
        self.circle.as_ref().is_some_and(|c| c.contains(p))
    }

    pub(super) fn neighbour(&self, edge: Edge) -> Option<TriangleId> {
        match edge {
            Edge::Ab => self.ab,
            Edge::Bc => self.bc,
            Edge::Ac => self.ac,
        }
    }

    /// Makes the vertex order clockwise in plan, swapping `b` and `c` (and
    /// their edge links) when the triangle winds counter-clockwise.
    pub(super) fn orient(&mut self, points: &[MapPoint]) {
        let [pa, pb, pc] = [points[self.a.0], points[self.b.0], points[self.c.0]];
        let cx = (f64::from(pa.x) + f64::from(pb.x) + f64::from(pc.x)) / 3.0;
        let cy = (f64::from(pa.y) + f64::from(pb.y) + f64::from(pc.y)) / 3.0;
        let (rx, ry) = (f64::from(pa.x) - cx, f64::from(pa.y) - cy);
        let (dx, dy) = (f64::from(pb.x - pa.x), f64::from(pb.y - pa.y));
        if ry * -dx + dy * rx > 0.0 {
            std::mem::swap(&mut self.b, &mut self.c);
            std::mem::swap(&mut self.ab, &mut self.ac);
        }
    }

    /// Looks at the edge shared with `neighbour`, which must contain `pivot`.
    ///
    /// Returns the vertex opposite that edge, the triangle across the edge
    /// joining `pivot` and the opposite vertex, and the triangle across the
    /// remaining edge.
    pub(super) fn opposite(
        &self,
        pivot: VertexId,
        neighbour: TriangleId,
    ) -> Option<(VertexId, Option<TriangleId>, Option<TriangleId>)> {
        if self.ab == Some(neighbour) {
            Some(if pivot == self.a {
                (self.c, self.ac, self.bc)
            } else {
                (self.c, self.bc, self.ac)
            })
        } else if self.ac == Some(neighbour) {
            Some(if pivot == self.a {
                (self.b, self.ab, self.bc)
            } else {
                (self.b, self.bc, self.ab)
            })
        } else if self.bc == Some(neighbour) {
            Some(if pivot == self.b {
                (self.a, self.ab, self.ac)
            } else {
                (self.a, self.ac, self.ab)
            })
        } else {
            None
        }
    }

    /// Redirects the link pointing at `old` to `new`.
    pub(super) fn replace_neighbour(&mut self, old: TriangleId, new: TriangleId) {
        if self.ab == Some(old) {
            self.ab = Some(new);
        } else if self.bc == Some(old) {
            self.bc = Some(new);
        } else if self.ac == Some(old) {
            self.ac = Some(new);
        }
    }

    /// Links `neighbour` across the edge `u-v`, if this triangle has it.
    pub(super) fn link_edge(&mut self, u: VertexId, v: VertexId, neighbour: TriangleId) {
        let is = |p: VertexId, q: VertexId| (u == p && v == q) || (u == q && v == p);
        if is(self.a, self.b) {
            self.ab = Some(neighbour);
        } else if is(self.a, self.c) {
            self.ac = Some(neighbour);
        } else if is(self.b, self.c) {
            self.bc = Some(neighbour);
        }
    }

    /// Drops links for which `keep` returns `false`.
    pub(super) fn retain_neighbours(&mut self, keep: impl Fn(TriangleId) -> bool) {
        for link in [&mut self.ab, &mut self.bc, &mut self.ac] {
            if link.is_some_and(|id| !keep(id)) {
                *link = None;
            }
        }
    }
}
