use crate::building::{GeometryObstacle, Polygon, Room};
use crate::math::MapPoint;

/// Cells of one room a walker may enter during a grid search.
///
/// A cell is walkable when it lies inside the room outline and outside the
/// bounding box of every blocking obstacle. Cells inside an active transit
/// (one whose middle is the start or the goal of the current leg) are
/// always walkable.
#[derive(Debug, Clone)]
pub struct WalkableArea<'a> {
    room: &'a Room,
    blocking: Vec<&'a Polygon>,
    passable: Vec<&'a Polygon>,
}

impl<'a> WalkableArea<'a> {
    /// Area of `room` for a leg between `start` and `goal`.
    #[must_use]
    pub fn for_leg(room: &'a Room, start: MapPoint, goal: MapPoint) -> Self {
        let mut blocking = Vec::new();
        let mut passable = Vec::new();
        for obstacle in room.obstacles() {
            let active = obstacle.transit().is_some()
                && [start, goal].contains(&obstacle.outline().middle());
            if active {
                passable.push(obstacle.into_outline());
            } else {
                blocking.push(obstacle.into_outline());
            }
        }
        Self {
            room,
            blocking,
            passable,
        }
    }

    /// Stops treating obstacles whose bounding box holds `point` as blocking.
    #[must_use]
    pub fn releasing(mut self, point: MapPoint) -> Self {
        self.blocking.retain(|outline| !outline.bounds_contain(point));
        self
    }

    /// Outlines that still block movement.
    #[must_use]
    pub fn blocking(&self) -> &[&'a Polygon] {
        &self.blocking
    }

    /// Returns `true` if `point` lies inside an active transit.
    #[must_use]
    pub fn in_active_transit(&self, point: MapPoint) -> bool {
        self.passable.iter().any(|t| t.contains(point))
    }

    /// Returns `true` if a walker may stand on `point`.
    #[must_use]
    pub fn is_walkable(&self, point: MapPoint) -> bool {
        if point.z != self.room.z() {
            return false;
        }
        self.in_active_transit(point)
            || (self.room.shape.contains(point)
                && !self.blocking.iter().any(|o| o.bounds_contain(point)))
    }
}
