use std::collections::{HashMap, HashSet};

use tracing::trace;

use super::HpaEdge;
use crate::building::Polygon;
use crate::cancel::CancelToken;
use crate::error::Result;
use crate::math::MapPoint;
use crate::search::open_set::OpenSet;
use crate::search::{append_leg, TraceOptimization};

/// A* over the abstract graph produced by
/// [`DecomposeRoom`](super::DecomposeRoom).
///
/// Neighbours of a point are the opposite ends of every edge touching it.
/// The route is the concatenation of the traversed edges' traces, oriented
/// in travel direction and string-pulled against `obstacles`.
pub struct OnLineSearch<'a> {
    edges: &'a [HpaEdge],
    adjacency: HashMap<MapPoint, Vec<usize>>,
    obstacles: Vec<Polygon>,
}

impl<'a> OnLineSearch<'a> {
    #[must_use]
    pub fn new(edges: &'a [HpaEdge]) -> Self {
        let mut adjacency: HashMap<MapPoint, Vec<usize>> = HashMap::new();
        for (index, edge) in edges.iter().enumerate() {
            adjacency.entry(edge.a).or_default().push(index);
            adjacency.entry(edge.b).or_default().push(index);
        }
        Self {
            edges,
            adjacency,
            obstacles: Vec::new(),
        }
    }

    /// Outlines the final route must not cut through.
    #[must_use]
    pub fn with_obstacles(mut self, obstacles: Vec<Polygon>) -> Self {
        self.obstacles = obstacles;
        self
    }

    /// Searches from `start` to `goal`.
    ///
    /// # Errors
    ///
    /// Returns [`FloorpathError::Cancelled`](crate::FloorpathError::Cancelled)
    /// if `cancel` fires during the search.
    pub fn execute(
        &self,
        start: MapPoint,
        goal: MapPoint,
        cancel: &CancelToken,
    ) -> Result<Option<Vec<MapPoint>>> {
        let mut open = OpenSet::new();
        let mut closed = HashSet::new();
        let mut came_from: HashMap<MapPoint, (MapPoint, Option<usize>)> =
            HashMap::from([(start, (start, None))]);
        open.push(start, start.distance_sq(goal));

        while let Some(current) = open.pop() {
            cancel.check()?;
            if current == goal {
                trace!(expanded = closed.len(), "abstract search reached goal");
                let route = self.reconstruct(&came_from, start, goal);
                return Ok(Some(
                    TraceOptimization::new(&self.obstacles).execute(route),
                ));
            }
            if !closed.insert(current) {
                continue;
            }
            for &index in self.adjacency.get(&current).into_iter().flatten() {
                let Some(next) = self.edges[index].other_end(current) else {
                    continue;
                };
                if closed.contains(&next) || came_from.contains_key(&next) {
                    continue;
                }
                came_from.insert(next, (current, Some(index)));
                open.push(next, next.distance_sq(goal));
            }
        }

        trace!(expanded = closed.len(), "abstract search exhausted");
        Ok(None)
    }

    fn reconstruct(
        &self,
        came_from: &HashMap<MapPoint, (MapPoint, Option<usize>)>,
        start: MapPoint,
        goal: MapPoint,
    ) -> Vec<MapPoint> {
        let mut hops = Vec::new();
        let mut current = goal;
        while current != start {
            let Some(&(parent, Some(index))) = came_from.get(&current) else {
                break;
            };
            hops.push((parent, index));
            current = parent;
        }

        let mut route = vec![start];
        for (from, index) in hops.into_iter().rev() {
            append_leg(&mut route, self.edges[index].trace_from(from));
        }
        route
    }
}
