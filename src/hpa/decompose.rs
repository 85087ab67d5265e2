use tracing::debug;

use super::HpaEdge;
use crate::building::Room;
use crate::cancel::CancelToken;
use crate::error::{OperationError, Result};
use crate::math::{Bounds, MapPoint};
use crate::search::{GridSearch, WalkableArea};

/// Longest boundary run collapsed into a single inter-edge.
const SHORT_RUN: i32 = 3;

/// Builds the abstract graph of one room for a leg from `start` to `goal`.
///
/// The room's bounding box is cut into square clusters of
/// `cluster_size + 1` cells. Walkable runs along the right and lower
/// boundary of each cluster become [`HpaEdgeKind::Inter`] edges. Every
/// pair of entry points inside a cluster is then joined by a
/// [`GridSearch`], producing [`HpaEdgeKind::Intra`] edges.
///
/// [`HpaEdgeKind::Inter`]: super::HpaEdgeKind::Inter
/// [`HpaEdgeKind::Intra`]: super::HpaEdgeKind::Intra
pub struct DecomposeRoom<'a> {
    room: &'a Room,
    start: MapPoint,
    goal: MapPoint,
    cluster_size: u32,
}

/// Entry points collected per cluster, row-major.
struct Clusters {
    origin: MapPoint,
    stride: i32,
    size: i32,
    columns: usize,
    rows: usize,
    points: Vec<Vec<MapPoint>>,
}

impl Clusters {
    fn new(bounds: Bounds, z: i32, size: i32) -> Result<Self> {
        let stride = size + 1;
        let count = |span: i32| {
            usize::try_from(span / stride + 1)
                .map_err(|_| OperationError::InvalidInput(format!("negative room span {span}")))
        };
        let columns = count(bounds.max_x - bounds.min_x)?;
        let rows = count(bounds.max_y - bounds.min_y)?;
        Ok(Self {
            origin: MapPoint::new(bounds.min_x, bounds.min_y, z),
            stride,
            size,
            columns,
            rows,
            points: vec![Vec::new(); columns * rows],
        })
    }

    fn corner(&self, row: usize, column: usize) -> MapPoint {
        let step = |i: usize| i32::try_from(i).unwrap_or(i32::MAX).saturating_mul(self.stride);
        self.origin.offset(step(column), step(row))
    }

    fn contains(&self, row: usize, column: usize, point: MapPoint) -> bool {
        let corner = self.corner(row, column);
        point.z == corner.z
            && (corner.x..=corner.x + self.size).contains(&point.x)
            && (corner.y..=corner.y + self.size).contains(&point.y)
    }

    fn add(&mut self, row: usize, column: usize, point: MapPoint) {
        if row < self.rows && column < self.columns {
            let list = &mut self.points[row * self.columns + column];
            if !list.contains(&point) {
                list.push(point);
            }
        }
    }
}

impl<'a> DecomposeRoom<'a> {
    #[must_use]
    pub fn new(room: &'a Room, start: MapPoint, goal: MapPoint, cluster_size: u32) -> Self {
        Self {
            room,
            start,
            goal,
            cluster_size,
        }
    }

    /// Builds the inter- and intra-cluster edges.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidInput`] for a zero cluster size and
    /// [`FloorpathError::Cancelled`](crate::FloorpathError::Cancelled) if
    /// `cancel` fires.
    pub fn execute(&self, cancel: &CancelToken) -> Result<Vec<HpaEdge>> {
        let size = i32::try_from(self.cluster_size)
            .ok()
            .filter(|&s| s > 0)
            .ok_or_else(|| {
                OperationError::InvalidInput(format!("cluster size {}", self.cluster_size))
            })?;

        let area = WalkableArea::for_leg(self.room, self.start, self.goal);
        let mut clusters = Clusters::new(self.room.shape.bounds(), self.room.z(), size)?;
        let mut edges = Vec::new();

        for row in 0..clusters.rows {
            for column in 0..clusters.columns {
                let corner = clusters.corner(row, column);
                let right = scan_boundary(&area, corner.offset(size, 0), (0, 1), (1, 0), size);
                for (near, far) in right {
                    clusters.add(row, column, near);
                    clusters.add(row, column + 1, far);
                    edges.push(HpaEdge::inter(near, far));
                }
                let below = scan_boundary(&area, corner.offset(0, size), (1, 0), (0, 1), size);
                for (near, far) in below {
                    clusters.add(row, column, near);
                    clusters.add(row + 1, column, far);
                    edges.push(HpaEdge::inter(near, far));
                }
                self.add_local_points(&area, &mut clusters, row, column);
            }
        }
        let inter = edges.len();

        let local = area.releasing(self.start).releasing(self.goal);
        for points in &clusters.points {
            cancel.check()?;
            for (k, &from) in points.iter().enumerate() {
                for &to in &points[k + 1..] {
                    if let Some(trace) = GridSearch::new(&local, from, to).execute(cancel)? {
                        edges.push(HpaEdge::intra(from, to, trace));
                    }
                }
            }
        }

        debug!(
            room = %self.room.name,
            clusters = clusters.points.len(),
            inter,
            intra = edges.len() - inter,
            "room decomposed"
        );
        Ok(edges)
    }

    /// Active transit corners and middles, plus the leg endpoints.
    fn add_local_points(
        &self,
        area: &WalkableArea<'_>,
        clusters: &mut Clusters,
        row: usize,
        column: usize,
    ) {
        let active = self
            .room
            .transits
            .iter()
            .filter(|t| [self.start, self.goal].contains(&t.shape.middle()));
        for transit in active {
            let corners = transit.shape.corners().iter().copied();
            for point in corners.filter(|&c| area.is_walkable(c)) {
                if clusters.contains(row, column, point) {
                    clusters.add(row, column, point);
                }
            }
            let middle = transit.shape.middle();
            if clusters.contains(row, column, middle) {
                clusters.add(row, column, middle);
            }
        }
        for point in [self.start, self.goal] {
            if clusters.contains(row, column, point) {
                clusters.add(row, column, point);
            }
        }
    }
}

/// Walks `size + 1` cells from `first` along `step` and pairs each cell
/// with its neighbour across the boundary (`across`). Returns one crossing
/// per short run and two (its ends) per longer run.
fn scan_boundary(
    area: &WalkableArea<'_>,
    first: MapPoint,
    step: (i32, i32),
    across: (i32, i32),
    size: i32,
) -> Vec<(MapPoint, MapPoint)> {
    let cell = |i: i32| first.offset(step.0 * i, step.1 * i);
    let open = |i: i32| {
        let near = cell(i);
        area.is_walkable(near) && area.is_walkable(near.offset(across.0, across.1))
    };
    let crossing = |i: i32| {
        let near = cell(i);
        (near, near.offset(across.0, across.1))
    };

    let mut crossings = Vec::new();
    let mut run_start = None;
    for i in 0..=size + 1 {
        match (run_start, i <= size && open(i)) {
            (None, true) => run_start = Some(i),
            (Some(begin), false) => {
                let len = i - begin;
                if len <= SHORT_RUN {
                    crossings.push(crossing(begin + len / 2));
                } else {
                    crossings.push(crossing(begin));
                    crossings.push(crossing(i - 1));
                }
                run_start = None;
            }
            _ => {}
        }
    }
    crossings
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::building::{Polygon, Transit, TransitKind};
    use crate::hpa::HpaEdgeKind;

    fn p(x: i32, y: i32) -> MapPoint {
        MapPoint::new(x, y, 0)
    }

    fn rect(x0: i32, y0: i32, x1: i32, y1: i32) -> Polygon {
        Polygon::new(vec![p(x0, y0), p(x1, y0), p(x1, y1), p(x0, y1)]).unwrap()
    }

    fn inter(edges: &[HpaEdge]) -> Vec<(MapPoint, MapPoint)> {
        edges
            .iter()
            .filter(|e| e.kind == HpaEdgeKind::Inter)
            .map(|e| (e.a, e.b))
            .collect()
    }

    #[test]
    fn two_clusters_joined_by_run_ends() {
        let room = Room::new("strip", rect(0, 0, 41, 20));
        let edges = DecomposeRoom::new(&room, p(5, 10), p(35, 10), 20)
            .execute(&CancelToken::new())
            .unwrap();
        assert_eq!(
            inter(&edges),
            vec![(p(20, 1), p(21, 1)), (p(20, 20), p(21, 20))]
        );
        // Three local points per cluster: two boundary cells and an endpoint.
        assert_eq!(edges.len(), 2 + 3 + 3);
        for edge in &edges {
            if let HpaEdgeKind::Intra { trace, .. } = &edge.kind {
                assert_eq!(trace.first(), Some(&edge.a));
                assert_eq!(trace.last(), Some(&edge.b));
            }
        }
    }

    #[test]
    fn short_gap_collapses_to_its_middle() {
        let area_room = Room::new("gap", rect(0, 0, 41, 20))
            .with_barrier(rect(19, 0, 22, 8))
            .with_barrier(rect(19, 12, 22, 20));
        let area = WalkableArea::for_leg(&area_room, p(1, 1), p(2, 2));
        let crossings = scan_boundary(&area, p(20, 0), (0, 1), (1, 0), 20);
        assert_eq!(crossings, vec![(p(20, 10), p(21, 10))]);
    }

    #[test]
    fn active_transit_middle_is_a_local_point() {
        let room = Room::new("a", rect(0, 0, 50, 20)).with_transit(Transit::new(
            rect(48, 8, 50, 12),
            "d1",
            TransitKind::Door,
            0,
        ));
        let edges = DecomposeRoom::new(&room, p(10, 10), p(49, 10), 20)
            .execute(&CancelToken::new())
            .unwrap();
        assert!(edges.iter().any(|e| e.a == p(49, 10) || e.b == p(49, 10)));
    }

    #[test]
    fn zero_cluster_size_is_rejected() {
        let room = Room::new("strip", rect(0, 0, 10, 10));
        let err = DecomposeRoom::new(&room, p(1, 1), p(9, 9), 0)
            .execute(&CancelToken::new())
            .unwrap_err();
        assert!(matches!(
            err,
            crate::FloorpathError::Operation(OperationError::InvalidInput(_))
        ));
    }
}
