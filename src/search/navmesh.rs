use std::collections::{HashMap, HashSet};

use tracing::trace;

use super::grid::reconstruct;
use super::open_set::OpenSet;
use crate::cancel::CancelToken;
use crate::error::Result;
use crate::math::MapPoint;
use crate::triangulation::Triangulation;

/// A* over the vertices of a triangulation.
///
/// Two vertices are adjacent when they share a triangle. Nodes are taken
/// from the open list by squared distance to the goal; the accumulated
/// cost is the Euclidean length walked so far and is only reported, never
/// used for ordering.
pub struct NavmeshSearch {
    adjacency: HashMap<MapPoint, Vec<MapPoint>>,
}

/// Vertex path found by [`NavmeshSearch`].
#[derive(Debug, Clone, PartialEq)]
pub struct NavmeshPath {
    pub points: Vec<MapPoint>,
    pub length: f64,
}

impl NavmeshSearch {
    #[must_use]
    pub fn new(triangulation: &Triangulation) -> Self {
        Self {
            adjacency: triangulation.vertex_neighbours(),
        }
    }

    /// Searches from `start` to `goal`. Both must be triangulation vertices.
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
    ) -> Result<Option<NavmeshPath>> {
        if !self.adjacency.contains_key(&start) && start != goal {
            return Ok(None);
        }

        let mut open = OpenSet::new();
        let mut closed = HashSet::new();
        let mut came_from = HashMap::from([(start, start)]);
        let mut walked = HashMap::from([(start, 0.0)]);
        open.push(start, start.distance_sq(goal));

        while let Some(current) = open.pop() {
            cancel.check()?;
            if current == goal {
                trace!(expanded = closed.len(), "navmesh search reached goal");
                return Ok(Some(NavmeshPath {
                    points: reconstruct(&came_from, start, goal),
                    length: walked.get(&goal).copied().unwrap_or_default(),
                }));
            }
            if !closed.insert(current) {
                continue;
            }
            let base = walked.get(&current).copied().unwrap_or_default();
            for &next in self.adjacency.get(&current).into_iter().flatten() {
                if closed.contains(&next) || came_from.contains_key(&next) {
                    continue;
                }
                came_from.insert(next, current);
                walked.insert(next, base + current.distance(next));
                open.push(next, next.distance_sq(goal));
            }
        }

        trace!(expanded = closed.len(), "navmesh search exhausted");
        Ok(None)
    }
}
