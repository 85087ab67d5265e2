use tracing::{debug, warn};

use super::{Algorithm, RouteParams, Visualization};
use crate::building::{Obstacle, Polygon, Room, Transit};
use crate::cancel::CancelToken;
use crate::error::{FloorpathError, Result};
use crate::hpa::{DecomposeRoom, OnLineSearch};
use crate::math::MapPoint;
use crate::search::{GridSearch, NavmeshSearch, TraceOptimization, WalkableArea};
use crate::triangulation::Triangulate;

/// Outcome of one room-local search.
#[derive(Debug, Default)]
pub(crate) struct LegOutcome {
    pub trace: Option<Vec<MapPoint>>,
    pub visualization: Option<Visualization>,
}

/// A walk between two points of one room.
///
/// Transits whose middle is one of the endpoints are active: the walk may
/// enter them and they never count as obstacles.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RoomLeg<'a> {
    room: &'a Room,
    from: MapPoint,
    to: MapPoint,
}

impl<'a> RoomLeg<'a> {
    pub fn new(room: &'a Room, from: MapPoint, to: MapPoint) -> Self {
        Self { room, from, to }
    }

    fn is_active(&self, transit: &Transit) -> bool {
        let middle = transit.shape.middle();
        middle == self.from || middle == self.to
    }

    /// Barriers and non-door transits other than the active ones.
    fn obstacles(&self) -> impl Iterator<Item = &'a Polygon> + '_ {
        self.room
            .obstacles_except_doors()
            .filter(|o| !matches!(o, Obstacle::Transit(t) if self.is_active(t)))
            .map(Obstacle::into_outline)
    }

    /// Solves the leg with the pipeline selected in `params`.
    pub fn solve(&self, params: &RouteParams, cancel: &CancelToken) -> Result<LegOutcome> {
        cancel.check()?;
        debug!(room = %self.room.name, from = %self.from, to = %self.to, "solving room leg");
        match params.algorithm {
            Algorithm::Triangulation => self.navmesh(params, cancel),
            Algorithm::GridHierarchical => self.hierarchical(params, cancel),
        }
    }

    /// Triangulates the free space of the room and walks its vertices.
    pub fn navmesh(&self, params: &RouteParams, cancel: &CancelToken) -> Result<LegOutcome> {
        let enlarged: Vec<Polygon> = self.obstacles().map(Polygon::enlarged).collect();
        let mut points = self.room.shape.corners().to_vec();
        points.extend(enlarged.iter().flat_map(|o| o.corners().iter().copied()));
        points.extend([self.from, self.to]);

        let triangulation = match Triangulate::new(points)
            .with_barriers(enlarged)
            .with_boundary(self.room.shape.clone())
            .with_params(params.triangulation)
            .execute(cancel)
        {
            Ok(triangulation) => triangulation,
            Err(FloorpathError::Geometry(err)) => {
                warn!(room = %self.room.name, error = %err, "room triangulation skipped");
                return Ok(LegOutcome::default());
            }
            Err(err) => return Err(err),
        };

        let path = NavmeshSearch::new(&triangulation).execute(self.from, self.to, cancel)?;
        let trace = path.map(|path| TraceOptimization::new(self.obstacles()).execute(path.points));
        Ok(LegOutcome {
            trace,
            visualization: params
                .collect_visualization
                .then(|| Visualization::Triangles(triangulation.outlines())),
        })
    }

    /// Decomposes the room into clusters and walks the abstract graph.
    pub fn hierarchical(&self, params: &RouteParams, cancel: &CancelToken) -> Result<LegOutcome> {
        let edges = DecomposeRoom::new(self.room, self.from, self.to, params.cluster_size)
            .execute(cancel)?;
        let obstacles = self.obstacles().map(|o| o.enlarged().reduced()).collect();
        let trace = OnLineSearch::new(&edges)
            .with_obstacles(obstacles)
            .execute(self.from, self.to, cancel)?;
        Ok(LegOutcome {
            trace,
            visualization: params
                .collect_visualization
                .then(|| Visualization::HpaEdges(edges)),
        })
    }

    /// Plain grid search over the whole room, without string pulling.
    pub fn grid(&self, cancel: &CancelToken) -> Result<LegOutcome> {
        let area = WalkableArea::for_leg(self.room, self.from, self.to);
        let trace = GridSearch::new(&area, self.from, self.to).execute(cancel)?;
        Ok(LegOutcome {
            trace,
            visualization: None,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::building::TransitKind;
    use crate::math::intersect_2d::segment_enters_bounds;

    fn p(x: i32, y: i32) -> MapPoint {
        MapPoint::new(x, y, 0)
    }

    fn rect(x0: i32, y0: i32, x1: i32, y1: i32) -> Polygon {
        Polygon::new(vec![p(x0, y0), p(x1, y0), p(x1, y1), p(x0, y1)]).unwrap()
    }

    fn office() -> Room {
        Room::new("office", rect(0, 0, 60, 40))
            .with_barrier(rect(25, 0, 30, 30))
            .with_transit(Transit::new(rect(58, 18, 60, 22), "d1", TransitKind::Door, 0))
            .with_transit(Transit::new(rect(2, 30, 6, 34), "s1", TransitKind::Stairs, 3))
    }

    #[test]
    fn active_transits_are_not_obstacles() {
        let room = office();
        let leg = RoomLeg::new(&room, p(10, 10), p(4, 32));
        assert_eq!(leg.obstacles().count(), 1);
        let other = RoomLeg::new(&room, p(10, 10), p(50, 10));
        assert_eq!(other.obstacles().count(), 2);
    }

    #[test]
    fn navmesh_leg_goes_around_the_wall() {
        let room = office();
        let params = RouteParams::new(Algorithm::Triangulation).with_visualization(true);
        let leg = RoomLeg::new(&room, p(10, 10), p(50, 10));
        let outcome = leg.navmesh(&params, &CancelToken::new()).unwrap();
        let trace = outcome.trace.unwrap();
        assert_eq!(trace.first(), Some(&p(10, 10)));
        assert_eq!(trace.last(), Some(&p(50, 10)));
        for w in trace.windows(2) {
            assert!(!room.barriers[0].blocks_segment(w[0], w[1]));
        }
        assert!(matches!(outcome.visualization, Some(Visualization::Triangles(t)) if !t.is_empty()));
    }

    #[test]
    fn navmesh_leg_keeps_out_of_close_barriers() {
        let room = Room::new("ward", rect(0, 0, 40, 40))
            .with_barrier(rect(22, 7, 28, 12))
            .with_barrier(rect(18, 13, 22, 22));
        let params = RouteParams::new(Algorithm::Triangulation);
        let trace = RoomLeg::new(&room, p(31, 1), p(24, 39))
            .navmesh(&params, &CancelToken::new())
            .unwrap()
            .trace
            .unwrap();
        assert_eq!(trace.first(), Some(&p(31, 1)));
        assert_eq!(trace.last(), Some(&p(24, 39)));
        for w in trace.windows(2) {
            for barrier in &room.barriers {
                assert!(!segment_enters_bounds(w[0], w[1], &barrier.bounds()));
            }
        }
    }

    #[test]
    fn hierarchical_leg_goes_around_the_wall() {
        let room = office();
        let params = RouteParams::default().with_cluster_size(10);
        let leg = RoomLeg::new(&room, p(10, 10), p(50, 10));
        let outcome = leg.hierarchical(&params, &CancelToken::new()).unwrap();
        let trace = outcome.trace.unwrap();
        assert_eq!(trace.first(), Some(&p(10, 10)));
        assert_eq!(trace.last(), Some(&p(50, 10)));
        assert!(trace.iter().any(|q| q.y > 30));
        assert!(outcome.visualization.is_none());
    }

    #[test]
    fn grid_leg_reaches_an_active_door() {
        let room = office();
        let outcome = RoomLeg::new(&room, p(40, 20), p(59, 20))
            .grid(&CancelToken::new())
            .unwrap();
        assert_eq!(outcome.trace.unwrap().last(), Some(&p(59, 20)));
    }
}
