use tracing::info;

use super::graph::BuildTransitGraph;
use super::local::RoomLeg;
use super::{Algorithm, RouteOutcome, RouteParams, RouteResult};
use crate::building::Map;
use crate::cancel::CancelToken;
use crate::error::{FloorpathError, Result};

/// Finds a walking route from `map.start` to `map.goal`.
///
/// When both points lie in one room that room is solved directly. In
/// triangulation mode this is a navmesh search, in hierarchical mode a
/// plain grid search. Otherwise a [`TransitGraph`](super::TransitGraph)
/// is assembled and searched.
///
/// # Examples
///
/// ```
/// use floorpath::building::{Floor, Map, Polygon, Room};
/// use floorpath::math::MapPoint;
/// use floorpath::route::{Algorithm, FindRoute, RouteOutcome, RouteParams};
/// use floorpath::CancelToken;
///
/// let corners = [(0, 0), (100, 0), (100, 100), (0, 100)]
///     .map(|(x, y)| MapPoint::new(x, y, 0))
///     .to_vec();
/// let hall = Room::new("hall", Polygon::new(corners)?);
/// let map = Map::new(MapPoint::new(10, 10, 0), MapPoint::new(90, 90, 0))
///     .with_floor(Floor::new(0).with_room(hall));
///
/// let outcome = FindRoute::new(RouteParams::new(Algorithm::Triangulation))
///     .execute(&map, &CancelToken::new())?;
/// let RouteOutcome::Found(route) = outcome else { unreachable!() };
/// assert_eq!(route.waypoints, [map.start, map.goal]);
/// # Ok::<(), floorpath::FloorpathError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct FindRoute {
    params: RouteParams,
}

impl FindRoute {
    #[must_use]
    pub fn new(params: RouteParams) -> Self {
        Self { params }
    }

    /// Runs the search.
    ///
    /// An unreachable goal yields [`RouteOutcome::Found`] with no
    /// waypoints; a fired `cancel` token yields [`RouteOutcome::Cancelled`].
    ///
    /// # Errors
    ///
    /// Returns an error if the parameters or the map are invalid.
    pub fn execute(&self, map: &Map, cancel: &CancelToken) -> Result<RouteOutcome> {
        self.params.validate()?;
        map.validate()?;
        info!(
            algorithm = ?self.params.algorithm,
            start = %map.start,
            goal = %map.goal,
            "route search started"
        );

        match self.search(map, cancel) {
            Ok(result) => {
                info!(waypoints = result.waypoints.len(), "route search finished");
                Ok(RouteOutcome::Found(result))
            }
            Err(FloorpathError::Cancelled) => {
                info!("route search cancelled");
                Ok(RouteOutcome::Cancelled)
            }
            Err(err) => Err(err),
        }
    }

    fn search(&self, map: &Map, cancel: &CancelToken) -> Result<RouteResult> {
        cancel.check()?;

        let shared = map
            .rooms()
            .find(|(_, room)| room.is_walkable(map.start) && room.is_walkable(map.goal));
        if let Some((_, room)) = shared {
            let leg = RoomLeg::new(room, map.start, map.goal);
            let outcome = match self.params.algorithm {
                Algorithm::Triangulation => leg.navmesh(&self.params, cancel)?,
                Algorithm::GridHierarchical => leg.grid(cancel)?,
            };
            return Ok(RouteResult {
                waypoints: outcome.trace.unwrap_or_default(),
                visualization: outcome.visualization,
            });
        }

        let mut graph = BuildTransitGraph::new(map, &self.params).execute(cancel)?;
        info!(routes = graph.routes().len(), "transit graph built");
        let waypoints = graph.shortest_route(cancel)?;
        Ok(RouteResult {
            waypoints,
            visualization: graph.take_visualization(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::building::{Floor, Polygon, Room, Transit, TransitKind};
    use crate::math::MapPoint;
    use crate::route::{TransitNode, Visualization};
    use approx::assert_relative_eq;

    fn p(x: i32, y: i32, z: i32) -> MapPoint {
        MapPoint::new(x, y, z)
    }

    fn rect(x0: i32, y0: i32, x1: i32, y1: i32, z: i32) -> Polygon {
        Polygon::new(vec![p(x0, y0, z), p(x1, y0, z), p(x1, y1, z), p(x0, y1, z)]).unwrap()
    }

    fn run(map: &Map, params: RouteParams) -> RouteResult {
        match FindRoute::new(params).execute(map, &CancelToken::new()).unwrap() {
            RouteOutcome::Found(result) => result,
            RouteOutcome::Cancelled => panic!("search was cancelled"),
        }
    }

    fn both_modes() -> [RouteParams; 2] {
        [
            RouteParams::new(Algorithm::Triangulation),
            RouteParams::new(Algorithm::GridHierarchical),
        ]
    }

    fn hall() -> Map {
        Map::new(p(10, 10, 0), p(90, 90, 0))
            .with_floor(Floor::new(0).with_room(Room::new("hall", rect(0, 0, 100, 100, 0))))
    }

    fn door(x0: i32, x1: i32) -> Transit {
        Transit::new(rect(x0, 8, x1, 12, 0), "d1", TransitKind::Door, 0)
    }

    /// Two rooms side by side joined by door `d1`.
    fn two_rooms() -> Map {
        Map::new(p(10, 10, 0), p(90, 10, 0)).with_floor(
            Floor::new(0)
                .with_room(Room::new("a", rect(0, 0, 50, 20, 0)).with_transit(door(48, 50)))
                .with_room(Room::new("b", rect(50, 0, 100, 20, 0)).with_transit(door(50, 52))),
        )
    }

    /// Elevator `e1` stops on floors 0 and 2; floor 1 has no stop.
    fn tower() -> Map {
        let lift = |z| Transit::new(rect(30, 30, 34, 34, z), "e1", TransitKind::Elevator, 5);
        let storey = |z: i32, with_lift: bool| {
            let room = Room::new(format!("floor {z}"), rect(0, 0, 40, 40, z));
            let room = if with_lift { room.with_transit(lift(z)) } else { room };
            Floor::new(z).with_room(room)
        };
        Map::new(p(5, 5, 0), p(10, 35, 2))
            .with_floor(storey(0, true))
            .with_floor(storey(1, false))
            .with_floor(storey(2, true))
    }

    #[test]
    fn open_hall_navmesh_is_direct() {
        let route = run(&hall(), RouteParams::new(Algorithm::Triangulation));
        assert_eq!(route.waypoints, vec![p(10, 10, 0), p(90, 90, 0)]);
        assert!(route.visualization.is_none());
    }

    #[test]
    fn open_hall_grid_walks_the_diagonal() {
        let route = run(&hall(), RouteParams::new(Algorithm::GridHierarchical));
        assert_eq!(route.waypoints.len(), 81);
        assert_relative_eq!(route.length(), 80.0 * 2f64.sqrt(), epsilon = 1e-9);
    }

    #[test]
    fn door_joins_two_rooms() {
        for params in both_modes() {
            let route = run(&two_rooms(), params);
            assert_eq!(
                route.waypoints,
                vec![p(10, 10, 0), p(49, 10, 0), p(51, 10, 0), p(90, 10, 0)],
                "{:?}",
                params.algorithm
            );
        }
    }

    #[test]
    fn door_drawn_once_on_the_shared_wall() {
        let door = || {
            let line = Polygon::new(vec![p(50, 0, 0), p(50, 2, 0)]).unwrap();
            Transit::new(line, "d1", TransitKind::Door, 0)
        };
        let map = Map::new(p(10, 10, 0), p(90, 10, 0)).with_floor(
            Floor::new(0)
                .with_room(Room::new("a", rect(0, 0, 50, 20, 0)).with_transit(door()))
                .with_room(Room::new("b", rect(50, 0, 100, 20, 0)).with_transit(door())),
        );
        for params in both_modes() {
            let graph = BuildTransitGraph::new(&map, &params)
                .execute(&CancelToken::new())
                .unwrap();
            assert_eq!(graph.routes().len(), 3, "{:?}", params.algorithm);
            assert_eq!(graph.routes().iter().filter(|r| r.is_link()).count(), 1);

            let route = run(&map, params);
            assert_eq!(
                route.waypoints,
                vec![p(10, 10, 0), p(50, 1, 0), p(90, 10, 0)],
                "{:?}",
                params.algorithm
            );
        }
    }

    /// Stairs `s` and elevator `e` both lead from the ground floor to the
    /// mezzanine; connector `x` lifts from there to the roof.
    fn two_connectors(stairs_delay: u32, elevator_delay: u32) -> Map {
        let storey = |z: i32, name: &str, ids: &[&str]| {
            let mut room = Room::new(name, rect(0, 0, 40, 40, z));
            for &id in ids {
                let (shape, delay) = match id {
                    "s" => (rect(18, 2, 22, 6, z), stairs_delay),
                    "e" => (rect(18, 34, 22, 38, z), elevator_delay),
                    _ => (rect(34, 18, 38, 22, z), 1),
                };
                room = room.with_transit(Transit::new(shape, id, TransitKind::Stairs, delay));
            }
            Floor::new(z).with_room(room)
        };
        Map::new(p(5, 20, 0), p(5, 20, 2))
            .with_floor(storey(0, "ground", &["s", "e"]))
            .with_floor(storey(1, "mezzanine", &["s", "e", "x"]))
            .with_floor(storey(2, "roof", &["x"]))
    }

    #[test]
    fn delay_picks_the_connector() {
        let via_stairs = run(&two_connectors(1, 100), RouteParams::new(Algorithm::Triangulation));
        assert_eq!(
            via_stairs.waypoints,
            vec![
                p(5, 20, 0),
                p(20, 4, 0),
                p(20, 4, 1),
                p(36, 20, 1),
                p(36, 20, 2),
                p(5, 20, 2)
            ]
        );

        for params in both_modes() {
            let cheap_stairs = run(&two_connectors(1, 100), params);
            assert!(cheap_stairs.waypoints.contains(&p(20, 4, 1)), "{:?}", params.algorithm);
            assert!(!cheap_stairs.waypoints.contains(&p(20, 36, 1)));

            let cheap_elevator = run(&two_connectors(100, 1), params);
            assert!(cheap_elevator.waypoints.contains(&p(20, 36, 1)), "{:?}", params.algorithm);
            assert!(!cheap_elevator.waypoints.contains(&p(20, 4, 1)));
        }
    }

    #[test]
    fn elevator_skips_the_middle_floor() {
        for params in both_modes() {
            let route = run(&tower(), params);
            assert_eq!(
                route.waypoints,
                vec![p(5, 5, 0), p(32, 32, 0), p(32, 32, 2), p(10, 35, 2)],
                "{:?}",
                params.algorithm
            );
            assert!(route.waypoints.iter().all(|w| w.z != 1));
        }
    }

    #[test]
    fn separating_barrier_gives_no_route() {
        let room = Room::new("split", rect(0, 0, 40, 20, 0)).with_barrier(rect(18, -1, 22, 21, 0));
        let map = Map::new(p(5, 10, 0), p(35, 10, 0)).with_floor(Floor::new(0).with_room(room));
        for params in both_modes() {
            assert!(run(&map, params).is_empty(), "{:?}", params.algorithm);
        }
    }

    #[test]
    fn cancelled_token_yields_cancelled_outcome() {
        let cancel = CancelToken::new();
        cancel.cancel();
        let outcome = FindRoute::default().execute(&two_rooms(), &cancel).unwrap();
        assert_eq!(outcome, RouteOutcome::Cancelled);
        assert!(outcome.route().is_none());
    }

    #[test]
    fn invalid_map_is_an_error() {
        let room = Room::new("a", rect(0, 0, 10, 10, 0)).with_barrier(rect(2, 2, 4, 4, 1));
        let map = Map::new(p(1, 1, 0), p(8, 8, 0)).with_floor(Floor::new(0).with_room(room));
        let err = FindRoute::default().execute(&map, &CancelToken::new()).unwrap_err();
        assert!(matches!(err, FloorpathError::Topology(_)));
    }

    #[test]
    fn visualization_is_collected_on_request() {
        let params = RouteParams::new(Algorithm::Triangulation).with_visualization(true);
        let route = run(&two_rooms(), params);
        assert!(matches!(route.visualization, Some(Visualization::Triangles(t)) if !t.is_empty()));

        let params = RouteParams::default().with_visualization(true);
        let route = run(&two_rooms(), params);
        assert!(matches!(route.visualization, Some(Visualization::HpaEdges(e)) if !e.is_empty()));
    }

    #[test]
    fn graph_links_door_faces_and_drops_dead_ends() {
        let mut map = two_rooms();
        // Two single-door closets opening only into each other.
        let closet = |x0, x1, face: (i32, i32), name: &str| {
            Room::new(name, rect(x0, 30, x1, 50, 0)).with_transit(Transit::new(
                rect(face.0, 38, face.1, 42, 0),
                "c1",
                TransitKind::Door,
                0,
            ))
        };
        map.floors[0].rooms.push(closet(0, 20, (18, 20), "c"));
        map.floors[0].rooms.push(closet(20, 40, (20, 22), "d"));

        let params = RouteParams::new(Algorithm::Triangulation);
        let graph = BuildTransitGraph::new(&map, &params)
            .execute(&CancelToken::new())
            .unwrap();
        assert_eq!(graph.nodes().len(), 6);
        assert_eq!(graph.routes().len(), 3);
        assert_eq!(graph.routes().iter().filter(|r| r.is_link()).count(), 1);
        assert!(graph.routes().iter().all(|r| {
            [r.from, r.to].iter().all(|&node| {
                !matches!(graph.node(node), Some(TransitNode::Transit { id, .. }) if id == "c1")
            })
        }));
    }
}
