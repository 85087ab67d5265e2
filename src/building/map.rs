use std::collections::HashSet;

use super::{GeometryObstacle, Polygon, Room, Transit};
use crate::error::{Result, TopologyError};
use crate::math::{Bounds, MapPoint};

/// One storey of the building.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Floor {
    pub level: i32,
    pub rooms: Vec<Room>,
}

impl Floor {
    /// Creates an empty floor.
    #[must_use]
    pub fn new(level: i32) -> Self {
        Self {
            level,
            rooms: Vec::new(),
        }
    }

    /// Adds a room.
    #[must_use]
    pub fn with_room(mut self, room: Room) -> Self {
        self.rooms.push(room);
        self
    }
}

/// Position of a room inside a [`Map`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoomLocation {
    /// Index into [`Map::floors`].
    pub floor: usize,
    /// Index into [`Floor::rooms`].
    pub room: usize,
}

/// The building: floors plus the requested start and goal points.
///
/// A search only reads the map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Map {
    pub floors: Vec<Floor>,
    pub start: MapPoint,
    pub goal: MapPoint,
}

impl Map {
    /// Creates a map without floors.
    #[must_use]
    pub fn new(start: MapPoint, goal: MapPoint) -> Self {
        Self {
            floors: Vec::new(),
            start,
            goal,
        }
    }

    /// Adds a floor.
    #[must_use]
    pub fn with_floor(mut self, floor: Floor) -> Self {
        self.floors.push(floor);
        self
    }

    /// Checks that the map can be searched.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::InvalidTopology`] for duplicate floor levels
    /// and rooms with fewer than three corners, and
    /// [`TopologyError::MixedFloors`] when a room, barrier or transit lies
    /// on a different floor than its owner.
    pub fn validate(&self) -> Result<()> {
        let mut levels = HashSet::new();
        for floor in &self.floors {
            if !levels.insert(floor.level) {
                return Err(TopologyError::InvalidTopology(format!(
                    "floor {} is defined twice",
                    floor.level
                ))
                .into());
            }
            for room in &floor.rooms {
                if room.shape.corners().len() < 3 {
                    return Err(TopologyError::InvalidTopology(format!(
                        "room '{}' has {} corners",
                        room.name,
                        room.shape.corners().len()
                    ))
                    .into());
                }
                check_floor(&format!("room '{}'", room.name), floor.level, &room.shape)?;
                for barrier in &room.barriers {
                    check_floor(&format!("barrier in room '{}'", room.name), room.z(), barrier)?;
                }
                for transit in &room.transits {
                    check_floor(&format!("transit '{}'", transit.id), room.z(), &transit.shape)?;
                }
            }
        }
        Ok(())
    }

    /// Looks up a room by location.
    #[must_use]
    pub fn room(&self, location: RoomLocation) -> Option<&Room> {
        self.floors.get(location.floor)?.rooms.get(location.room)
    }

    /// Iterates every room with its location.
    pub fn rooms(&self) -> impl Iterator<Item = (RoomLocation, &Room)> {
        self.floors.iter().enumerate().flat_map(|(f, floor)| {
            floor
                .rooms
                .iter()
                .enumerate()
                .map(move |(r, room)| (RoomLocation { floor: f, room: r }, room))
        })
    }

    /// Iterates every transit face with the room holding it.
    pub fn transits(&self) -> impl Iterator<Item = (RoomLocation, &Transit)> {
        self.rooms()
            .flat_map(|(loc, room)| room.transits.iter().map(move |t| (loc, t)))
    }

    /// Iterates every plain barrier with the room holding it.
    pub fn barriers(&self) -> impl Iterator<Item = (RoomLocation, &Polygon)> {
        self.rooms()
            .flat_map(|(loc, room)| room.barriers.iter().map(move |b| (loc, b)))
    }

    /// Every face of the connector named `id`.
    pub fn sibling_transits<'a>(
        &'a self,
        id: &'a str,
    ) -> impl Iterator<Item = (RoomLocation, &'a Transit)> + 'a {
        self.transits().filter(move |(_, t)| t.id == id)
    }

    /// The floor with the given level.
    #[must_use]
    pub fn floor(&self, level: i32) -> Option<&Floor> {
        self.floors.iter().find(|f| f.level == level)
    }

    /// The first room in which `point` is walkable.
    #[must_use]
    pub fn locate(&self, point: MapPoint) -> Option<RoomLocation> {
        self.rooms()
            .find(|(_, room)| room.is_walkable(point))
            .map(|(loc, _)| loc)
    }

    /// Returns `true` if both points are walkable in one room.
    #[must_use]
    pub fn in_same_room(&self, a: MapPoint, b: MapPoint) -> bool {
        self.rooms()
            .any(|(_, room)| room.is_walkable(a) && room.is_walkable(b))
    }

    /// Returns `true` if `point` is a valid place for the start or the goal:
    /// walkable in some room and at least one unit away from every barrier
    /// and transit of its floor.
    #[must_use]
    pub fn can_place(&self, point: MapPoint) -> bool {
        let Some(floor) = self.floor(point.z) else {
            return false;
        };
        let clear = floor.rooms.iter().all(|room| {
            room.obstacles()
                .all(|o| !o.outline().enlarged().bounds_contain(point))
        });
        clear && floor.rooms.iter().any(|room| room.is_walkable(point))
    }

    /// Limit coordinates of a floor: the bounding box of its rooms.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::FloorNotFound`] if no floor has that level
    /// or the floor holds no rooms.
    pub fn floor_bounds(&self, level: i32) -> Result<Bounds> {
        self.floor(level)
            .and_then(|floor| {
                floor
                    .rooms
                    .iter()
                    .map(|room| room.shape.bounds())
                    .reduce(|acc, b| acc.union(&b))
            })
            .ok_or_else(|| TopologyError::FloorNotFound(level).into())
    }
}

fn check_floor(object: &str, expected: i32, polygon: &Polygon) -> Result<()> {
    if polygon.z() == expected {
        Ok(())
    } else {
        Err(TopologyError::MixedFloors {
            object: object.to_string(),
            expected,
            found: polygon.z(),
        }
        .into())
    }
}
