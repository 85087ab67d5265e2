use std::collections::{HashMap, HashSet};

use rayon::prelude::*;
use slotmap::{new_key_type, SlotMap};
use tracing::{debug, trace};

use super::local::RoomLeg;
use super::{RouteParams, Visualization};
use crate::building::{Map, Room, RoomLocation, Transit};
use crate::cancel::CancelToken;
use crate::error::Result;
use crate::math::MapPoint;
use crate::search::append_leg;
use crate::search::open_set::OpenSet;

new_key_type! {
    /// Handle of a node in a [`TransitGraph`].
    pub struct TransitId;
}

/// Node of the transit graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitNode {
    /// The requested start point.
    Start(MapPoint),
    /// The requested goal point.
    Goal(MapPoint),
    /// A transit face of the map.
    Transit {
        location: RoomLocation,
        /// Index into the room's transits.
        index: usize,
        id: String,
        middle: MapPoint,
        delay: u32,
    },
}

impl TransitNode {
    /// Point a route enters and leaves the node at.
    #[must_use]
    pub fn point(&self) -> MapPoint {
        match self {
            Self::Start(point) | Self::Goal(point) => *point,
            Self::Transit { middle, .. } => *middle,
        }
    }

    /// Cost of passing through the node to a sibling face.
    #[must_use]
    pub fn delay(&self) -> u32 {
        match self {
            Self::Transit { delay, .. } => *delay,
            Self::Start(_) | Self::Goal(_) => 0,
        }
    }
}

/// Edge of the transit graph.
///
/// A walk inside one room carries its trace from `from` to `to`. A link
/// between two faces of one connector has an empty trace and costs the
/// delay of the face it leaves from.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitRoute {
    pub from: TransitId,
    pub to: TransitId,
    pub trace: Vec<MapPoint>,
    pub length: f64,
}

impl TransitRoute {
    /// Returns `true` for links between faces of one connector.
    #[must_use]
    pub fn is_link(&self) -> bool {
        self.trace.is_empty()
    }

    /// The other end of the route, if `node` is one of its ends.
    #[must_use]
    pub fn other_end(&self, node: TransitId) -> Option<TransitId> {
        if node == self.from {
            Some(self.to)
        } else if node == self.to {
            Some(self.from)
        } else {
            None
        }
    }
}

/// Start, goal and every transit of a map, joined by room-local routes.
#[derive(Debug, Clone)]
pub struct TransitGraph {
    nodes: SlotMap<TransitId, TransitNode>,
    routes: Vec<TransitRoute>,
    start: TransitId,
    goal: TransitId,
    visualization: Option<Visualization>,
}

impl TransitGraph {
    #[must_use]
    pub fn nodes(&self) -> &SlotMap<TransitId, TransitNode> {
        &self.nodes
    }

    #[must_use]
    pub fn node(&self, id: TransitId) -> Option<&TransitNode> {
        self.nodes.get(id)
    }

    #[must_use]
    pub fn routes(&self) -> &[TransitRoute] {
        &self.routes
    }

    #[must_use]
    pub fn start(&self) -> TransitId {
        self.start
    }

    #[must_use]
    pub fn goal(&self) -> TransitId {
        self.goal
    }

    /// Structures built by the room-local searches, if collected.
    #[must_use]
    pub fn visualization(&self) -> Option<&Visualization> {
        self.visualization.as_ref()
    }

    pub(crate) fn take_visualization(&mut self) -> Option<Visualization> {
        self.visualization.take()
    }

    fn cost(&self, route: &TransitRoute, leaving: TransitId) -> f64 {
        if route.is_link() {
            self.nodes.get(leaving).map_or(0.0, |n| f64::from(n.delay()))
        } else {
            route.length
        }
    }

    fn heuristic(&self, id: TransitId) -> i64 {
        let goal = self.nodes.get(self.goal).map(TransitNode::point);
        match (self.nodes.get(id), goal) {
            (Some(node), Some(goal)) => node.point().distance_sq(goal),
            _ => i64::MAX,
        }
    }

    /// Searches the graph from start to goal and returns the waypoints.
    ///
    /// Nodes leave the open list by squared distance to the goal; a node's
    /// parent is replaced whenever a cheaper way to it is found before it is
    /// expanded. Returns an empty list when the goal is unreachable.
    ///
    /// # Errors
    ///
    /// Returns [`FloorpathError::Cancelled`](crate::FloorpathError::Cancelled)
    /// if `cancel` fires.
    pub fn shortest_route(&self, cancel: &CancelToken) -> Result<Vec<MapPoint>> {
        let mut incident: HashMap<TransitId, Vec<usize>> = HashMap::new();
        for (index, route) in self.routes.iter().enumerate() {
            incident.entry(route.from).or_default().push(index);
            incident.entry(route.to).or_default().push(index);
        }

        let mut open = OpenSet::new();
        let mut closed = HashSet::new();
        let mut best: HashMap<TransitId, (f64, Option<(TransitId, usize)>)> =
            HashMap::from([(self.start, (0.0, None))]);
        open.push(self.start, self.heuristic(self.start));

        while let Some(current) = open.pop() {
            cancel.check()?;
            if current == self.goal {
                trace!(expanded = closed.len(), "transit search reached goal");
                return Ok(self.reconstruct(&best));
            }
            if !closed.insert(current) {
                continue;
            }
            let walked = best.get(&current).map_or(0.0, |(g, _)| *g);
            for &index in incident.get(&current).into_iter().flatten() {
                let route = &self.routes[index];
                let Some(next) = route.other_end(current) else {
                    continue;
                };
                if closed.contains(&next) {
                    continue;
                }
                let candidate = walked + self.cost(route, current);
                let improves = match best.get(&next) {
                    Some((g, _)) => candidate < *g,
                    None => true,
                };
                if improves {
                    best.insert(next, (candidate, Some((current, index))));
                    open.push(next, self.heuristic(next));
                }
            }
        }

        trace!(expanded = closed.len(), "transit search exhausted");
        Ok(Vec::new())
    }

    fn reconstruct(&self, best: &HashMap<TransitId, (f64, Option<(TransitId, usize)>)>) -> Vec<MapPoint> {
        let mut hops = Vec::new();
        let mut current = self.goal;
        while let Some(&(_, Some((parent, index)))) = best.get(&current) {
            hops.push((parent, current, index));
            current = parent;
        }

        let mut waypoints = Vec::new();
        for (from, to, index) in hops.into_iter().rev() {
            let route = &self.routes[index];
            if route.is_link() {
                let ends = [from, to].map(|id| self.nodes.get(id).map(TransitNode::point));
                append_leg(&mut waypoints, ends.into_iter().flatten());
            } else if route.from == from {
                append_leg(&mut waypoints, route.trace.iter().copied());
            } else {
                append_leg(&mut waypoints, route.trace.iter().rev().copied());
            }
        }
        waypoints
    }
}

/// Builds the [`TransitGraph`] of a map.
///
/// Every room computes routes between its relevant transits (and the start
/// or goal if it holds them) with the room-local pipeline of the chosen
/// algorithm. Rooms are processed in parallel. Transits that cannot lead
/// anywhere are left out: a transit is only kept when one of its sibling
/// faces lies in a room with further transits or in the room holding the
/// start or the goal.
pub struct BuildTransitGraph<'a> {
    map: &'a Map,
    params: &'a RouteParams,
}

/// Routes found in one room, before merging.
struct RoomRoutes {
    routes: Vec<TransitRoute>,
    visualization: Option<Visualization>,
}

impl<'a> BuildTransitGraph<'a> {
    #[must_use]
    pub fn new(map: &'a Map, params: &'a RouteParams) -> Self {
        Self { map, params }
    }

    /// # Errors
    ///
    /// Returns [`FloorpathError::Cancelled`](crate::FloorpathError::Cancelled)
    /// if `cancel` fires, or the error of a failing room-local search.
    pub fn execute(&self, cancel: &CancelToken) -> Result<TransitGraph> {
        let mut nodes = SlotMap::with_key();
        let start = nodes.insert(TransitNode::Start(self.map.start));
        let goal = nodes.insert(TransitNode::Goal(self.map.goal));
        let mut faces: HashMap<(RoomLocation, usize), TransitId> = HashMap::new();
        for (location, room) in self.map.rooms() {
            for (index, transit) in room.transits.iter().enumerate() {
                let id = nodes.insert(TransitNode::Transit {
                    location,
                    index,
                    id: transit.id.clone(),
                    middle: transit.shape.middle(),
                    delay: transit.delay,
                });
                faces.insert((location, index), id);
            }
        }

        let start_room = self.map.locate(self.map.start);
        let goal_room = self.map.locate(self.map.goal);
        let endpoints = Endpoints {
            start: (start, self.map.start, start_room),
            goal: (goal, self.map.goal, goal_room),
        };

        let rooms: Vec<(RoomLocation, &Room)> = self.map.rooms().collect();
        let per_room: Vec<RoomRoutes> = rooms
            .par_iter()
            .map(|&(location, room)| self.room_routes(location, room, &faces, &endpoints, cancel))
            .collect::<Result<_>>()?;

        let mut routes = Vec::new();
        let mut visualization: Option<Visualization> = None;
        for room in per_room {
            routes.extend(room.routes);
            Visualization::collect_into(&mut visualization, room.visualization);
        }

        let walks = routes.len();
        self.link_siblings(&faces, &endpoints, &nodes, &mut routes);
        debug!(
            nodes = nodes.len(),
            walks,
            links = routes.len() - walks,
            "transit graph assembled"
        );

        Ok(TransitGraph {
            nodes,
            routes,
            start,
            goal,
            visualization,
        })
    }

    /// Returns `true` if the face `index` of the room at `face` can lead
    /// somewhere beyond its own room.
    ///
    /// Siblings are the other faces carrying the same id, whatever their
    /// corners: a door drawn once on a shared wall appears with identical
    /// outlines in both rooms.
    fn is_relevant(
        &self,
        face: (RoomLocation, usize),
        transit: &Transit,
        endpoints: &Endpoints,
    ) -> bool {
        self.map.rooms().any(|(location, room)| {
            let has_sibling = room
                .transits
                .iter()
                .enumerate()
                .any(|(index, t)| t.id == transit.id && (location, index) != face);
            has_sibling && (room.transits.len() > 1 || endpoints.holds(location))
        })
    }

    fn room_routes(
        &self,
        location: RoomLocation,
        room: &Room,
        faces: &HashMap<(RoomLocation, usize), TransitId>,
        endpoints: &Endpoints,
        cancel: &CancelToken,
    ) -> Result<RoomRoutes> {
        cancel.check()?;
        // (node, point, relevant); start and goal always count as relevant.
        let mut stops: Vec<(TransitId, MapPoint, bool)> = Vec::new();
        for (node, point, held_in) in [endpoints.start, endpoints.goal] {
            if held_in == Some(location) {
                stops.push((node, point, true));
            }
        }
        let endpoint_count = stops.len();
        for (index, transit) in room.transits.iter().enumerate() {
            if let Some(&node) = faces.get(&(location, index)) {
                let relevant = self.is_relevant((location, index), transit, endpoints);
                stops.push((node, transit.shape.middle(), relevant));
            }
        }

        let mut routes = Vec::new();
        let mut visualization: Option<Visualization> = None;
        for (k, &(from, a, a_relevant)) in stops.iter().enumerate() {
            for (l, &(to, b, b_relevant)) in stops.iter().enumerate().skip(k + 1) {
                let touches_endpoint = k < endpoint_count || l < endpoint_count;
                if a == b || !(touches_endpoint || (a_relevant && b_relevant)) {
                    continue;
                }
                let outcome = RoomLeg::new(room, a, b).solve(self.params, cancel)?;
                Visualization::collect_into(&mut visualization, outcome.visualization);
                match outcome.trace {
                    Some(trace) if !trace.is_empty() => {
                        let length = crate::search::trace_length(&trace);
                        routes.push(TransitRoute {
                            from,
                            to,
                            trace,
                            length,
                        });
                    }
                    _ => debug!(room = %room.name, from = %a, to = %b, "no room-local route"),
                }
            }
        }
        debug!(room = %room.name, stops = stops.len(), routes = routes.len(), "room routed");
        Ok(RoomRoutes {
            routes,
            visualization,
        })
    }

    /// Adds a link between every pair of relevant faces sharing an id.
    fn link_siblings(
        &self,
        faces: &HashMap<(RoomLocation, usize), TransitId>,
        endpoints: &Endpoints,
        nodes: &SlotMap<TransitId, TransitNode>,
        routes: &mut Vec<TransitRoute>,
    ) {
        let relevant: Vec<(TransitId, &Transit)> = self
            .map
            .rooms()
            .flat_map(|(location, room)| {
                room.transits
                    .iter()
                    .enumerate()
                    .map(move |(index, transit)| ((location, index), transit))
            })
            .filter(|&(key, transit)| self.is_relevant(key, transit, endpoints))
            .filter_map(|(key, transit)| faces.get(&key).map(|&id| (id, transit)))
            .collect();

        for (k, &(from, a)) in relevant.iter().enumerate() {
            for &(to, b) in &relevant[k + 1..] {
                if a.id == b.id {
                    let length = nodes.get(from).map_or(0.0, |n| f64::from(n.delay()));
                    routes.push(TransitRoute {
                        from,
                        to,
                        trace: Vec::new(),
                        length,
                    });
                }
            }
        }
    }
}

/// Start and goal nodes with their points and the rooms holding them.
struct Endpoints {
    start: (TransitId, MapPoint, Option<RoomLocation>),
    goal: (TransitId, MapPoint, Option<RoomLocation>),
}

impl Endpoints {
    fn holds(&self, location: RoomLocation) -> bool {
        self.start.2 == Some(location) || self.goal.2 == Some(location)
    }
}
