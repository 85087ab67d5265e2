use std::collections::{HashMap, HashSet};

use tracing::trace;

use super::open_set::OpenSet;
use super::WalkableArea;
use crate::cancel::CancelToken;
use crate::error::Result;
use crate::math::MapPoint;

/// Expansion order of the eight grid neighbours.
const NEIGHBOURS: [(i32, i32); 8] = [
    (1, 0),
    (1, 1),
    (1, -1),
    (-1, 0),
    (-1, 1),
    (-1, -1),
    (0, 1),
    (0, -1),
];

/// A* over the unit grid of one room.
///
/// The open list is ordered by squared distance to the goal only, and each
/// cell keeps the parent that first discovered it. The returned trace is
/// a staircase of unit steps; straighten it with
/// [`TraceOptimization`](super::TraceOptimization) if needed.
#[derive(Debug, Clone, Copy)]
pub struct GridSearch<'a> {
    area: &'a WalkableArea<'a>,
    start: MapPoint,
    goal: MapPoint,
}

impl<'a> GridSearch<'a> {
    #[must_use]
    pub fn new(area: &'a WalkableArea<'a>, start: MapPoint, goal: MapPoint) -> Self {
        Self { area, start, goal }
    }

    fn accepts(&self, cell: MapPoint) -> bool {
        cell == self.start || cell == self.goal || self.area.is_walkable(cell)
    }

    /// Runs the search.
    ///
    /// Returns the cells from start to goal inclusive, or `None` when the
    /// goal cannot be reached.
    ///
    /// # Errors
    ///
    /// Returns [`FloorpathError::Cancelled`](crate::FloorpathError::Cancelled)
    /// if `cancel` fires during the search.
    pub fn execute(&self, cancel: &CancelToken) -> Result<Option<Vec<MapPoint>>> {
        if self.start.z != self.goal.z {
            return Ok(None);
        }

        let mut open = OpenSet::new();
        let mut closed = HashSet::new();
        let mut came_from: HashMap<MapPoint, MapPoint> = HashMap::new();
        open.push(self.start, self.start.distance_sq(self.goal));
        came_from.insert(self.start, self.start);

        while let Some(current) = open.pop() {
            cancel.check()?;
            if current == self.goal {
                trace!(expanded = closed.len(), "grid search reached goal");
                return Ok(Some(reconstruct(&came_from, self.start, self.goal)));
            }
            if !closed.insert(current) {
                continue;
            }
            for (dx, dy) in NEIGHBOURS {
                let next = current.offset(dx, dy);
                if closed.contains(&next) || came_from.contains_key(&next) || !self.accepts(next) {
                    continue;
                }
                came_from.insert(next, current);
                open.push(next, next.distance_sq(self.goal));
            }
        }

        trace!(expanded = closed.len(), "grid search exhausted");
        Ok(None)
    }
}

/// Follows parent links back from `goal` and returns the start-to-goal path.
pub(crate) fn reconstruct(
    came_from: &HashMap<MapPoint, MapPoint>,
    start: MapPoint,
    goal: MapPoint,
) -> Vec<MapPoint> {
    let mut path = vec![goal];
    let mut current = goal;
    while current != start {
        match came_from.get(&current) {
            Some(&parent) => {
                path.push(parent);
                current = parent;
            }
            None => break,
        }
    }
    path.reverse();
    path
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::building::{Polygon, Room, Transit, TransitKind};
    use crate::search::trace_length;
    use approx::assert_relative_eq;

    fn p(x: i32, y: i32) -> MapPoint {
        MapPoint::new(x, y, 0)
    }

    fn rect(x0: i32, y0: i32, x1: i32, y1: i32) -> Polygon {
        Polygon::new(vec![p(x0, y0), p(x1, y0), p(x1, y1), p(x0, y1)]).unwrap()
    }

    fn run(room: &Room, start: MapPoint, goal: MapPoint) -> Option<Vec<MapPoint>> {
        let area = WalkableArea::for_leg(room, start, goal);
        GridSearch::new(&area, start, goal)
            .execute(&CancelToken::new())
            .unwrap()
    }

    #[test]
    fn empty_room_walks_the_diagonal() {
        let room = Room::new("hall", rect(0, 0, 100, 100));
        let path = run(&room, p(10, 10), p(90, 90)).unwrap();
        assert_eq!(path.len(), 81);
        assert_eq!(path.first(), Some(&p(10, 10)));
        assert_eq!(path.last(), Some(&p(90, 90)));
        assert_relative_eq!(trace_length(&path), 80.0 * 2f64.sqrt(), epsilon = 1e-9);
    }

    #[test]
    fn steps_are_unit_moves() {
        let room = Room::new("hall", rect(0, 0, 40, 40)).with_barrier(rect(15, 5, 20, 35));
        let path = run(&room, p(5, 20), p(35, 20)).unwrap();
        for w in path.windows(2) {
            assert!((w[0].x - w[1].x).abs() <= 1 && (w[0].y - w[1].y).abs() <= 1);
        }
        assert!(path.iter().all(|c| !(15..=20).contains(&c.x) || !(5..=35).contains(&c.y)));
    }

    #[test]
    fn separating_barrier_means_no_path() {
        let room = Room::new("split", rect(0, 0, 40, 20)).with_barrier(rect(18, -1, 22, 21));
        assert!(run(&room, p(5, 10), p(35, 10)).is_none());
    }

    #[test]
    fn goal_inside_active_transit_is_reached() {
        let room = Room::new("a", rect(0, 0, 50, 20)).with_transit(Transit::new(
            rect(48, 8, 50, 12),
            "d1",
            TransitKind::Door,
            0,
        ));
        let path = run(&room, p(10, 10), p(49, 10)).unwrap();
        assert_eq!(path.last(), Some(&p(49, 10)));
    }

    #[test]
    fn start_equals_goal() {
        let room = Room::new("hall", rect(0, 0, 10, 10));
        assert_eq!(run(&room, p(3, 3), p(3, 3)), Some(vec![p(3, 3)]));
    }

    #[test]
    fn cancelled_search_reports_cancellation() {
        let room = Room::new("hall", rect(0, 0, 10, 10));
        let area = WalkableArea::for_leg(&room, p(1, 1), p(9, 9));
        let cancel = CancelToken::new();
        cancel.cancel();
        let err = GridSearch::new(&area, p(1, 1), p(9, 9))
            .execute(&cancel)
            .unwrap_err();
        assert!(matches!(err, crate::FloorpathError::Cancelled));
    }
}
