use super::{Obstacle, Polygon, Transit};
use crate::math::MapPoint;

/// A room: an outline with the barriers and transit faces inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub name: String,
    pub shape: Polygon,
    pub barriers: Vec<Polygon>,
    pub transits: Vec<Transit>,
}

impl Room {
    /// Creates an empty room.
    #[must_use]
    pub fn new(name: impl Into<String>, shape: Polygon) -> Self {
        Self {
            name: name.into(),
            shape,
            barriers: Vec::new(),
            transits: Vec::new(),
        }
    }

    /// Adds a barrier.
    #[must_use]
    pub fn with_barrier(mut self, barrier: Polygon) -> Self {
        self.barriers.push(barrier);
        self
    }

    /// Adds a transit face.
    #[must_use]
    pub fn with_transit(mut self, transit: Transit) -> Self {
        self.transits.push(transit);
        self
    }

    /// Floor of the room.
    #[must_use]
    pub fn z(&self) -> i32 {
        self.shape.z()
    }

    /// Every obstacle of the room: barriers first, then transit faces.
    pub fn obstacles(&self) -> impl Iterator<Item = Obstacle<'_>> {
        self.barriers
            .iter()
            .map(Obstacle::Barrier)
            .chain(self.transits.iter().map(Obstacle::Transit))
    }

    /// Obstacles without door faces.
    pub fn obstacles_except_doors(&self) -> impl Iterator<Item = Obstacle<'_>> {
        self.barriers
            .iter()
            .map(Obstacle::Barrier)
            .chain(self.transits_except_doors().map(Obstacle::Transit))
    }

    /// Stairs, elevators and untyped transit faces.
    pub fn transits_except_doors(&self) -> impl Iterator<Item = &Transit> {
        self.transits.iter().filter(|t| !t.is_door())
    }

    /// Returns `true` if a walker may stand on `point`: inside the room
    /// outline, outside every barrier's bounding box and outside every
    /// transit face.
    #[must_use]
    pub fn is_walkable(&self, point: MapPoint) -> bool {
        self.shape.covers(point)
            && !self.barriers.iter().any(|b| b.bounds_contain(point))
            && !self.transits.iter().any(|t| t.shape.contains(point))
    }

    /// The transit face covering `point`, if any.
    #[must_use]
    pub fn overlapping_transit(&self, point: MapPoint) -> Option<&Transit> {
        self.transits.iter().find(|t| t.shape.covers(point))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::building::{GeometryObstacle, TransitKind};

    fn p(x: i32, y: i32) -> MapPoint {
        MapPoint::new(x, y, 0)
    }

    fn rect(x0: i32, y0: i32, x1: i32, y1: i32) -> Polygon {
        Polygon::new(vec![p(x0, y0), p(x1, y0), p(x1, y1), p(x0, y1)]).unwrap()
    }

    fn office() -> Room {
        Room::new("office", rect(0, 0, 20, 20))
            .with_barrier(rect(5, 5, 8, 8))
            .with_transit(Transit::new(rect(18, 9, 20, 11), "d1", TransitKind::Door, 0))
            .with_transit(Transit::new(rect(1, 15, 3, 17), "s1", TransitKind::Stairs, 4))
    }

    #[test]
    fn walkable_excludes_barrier_box_and_transits() {
        let room = office();
        assert!(room.is_walkable(p(2, 2)));
        assert!(room.is_walkable(p(0, 10)));
        assert!(!room.is_walkable(p(5, 6)));
        assert!(!room.is_walkable(p(19, 10)));
        assert!(!room.is_walkable(p(21, 10)));
        assert!(!room.is_walkable(MapPoint::new(2, 2, 1)));
    }

    #[test]
    fn obstacle_listings() {
        let room = office();
        assert_eq!(room.obstacles().count(), 3);
        let without_doors: Vec<_> = room.obstacles_except_doors().collect();
        assert_eq!(without_doors.len(), 2);
        assert!(without_doors.iter().all(|o| !o.is_door()));
        let ids: Vec<_> = room.transits_except_doors().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["s1"]);
    }

    #[test]
    fn overlapping_transit_lookup() {
        let room = office();
        assert_eq!(room.overlapping_transit(p(2, 16)).map(|t| t.id.as_str()), Some("s1"));
        assert!(room.overlapping_transit(p(10, 10)).is_none());
    }
}
