use std::fmt;

use super::Point2;

/// A grid point inside the building.
///
/// `x` and `y` are integer plan coordinates; `z` is the floor level.
/// Points are plain values: equality is exact on all three coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct MapPoint {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl MapPoint {
    /// Creates a new point.
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Squared 2D Euclidean distance, ignoring floors.
    ///
    /// Exact for every `i32` input, which makes it usable as an ordering key.
    #[must_use]
    pub fn distance_sq(self, other: Self) -> i64 {
        let dx = i64::from(self.x) - i64::from(other.x);
        let dy = i64::from(self.y) - i64::from(other.y);
        dx * dx + dy * dy
    }

    /// Euclidean 3D distance, counting floor difference as one unit per level.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        let dx = f64::from(self.x) - f64::from(other.x);
        let dy = f64::from(self.y) - f64::from(other.y);
        let dz = f64::from(self.z) - f64::from(other.z);
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Returns `true` if both points share plan coordinates, whatever the floor.
    #[must_use]
    pub fn same_xy(self, other: Self) -> bool {
        self.x == other.x && self.y == other.y
    }

    /// Returns a new point shifted in plan by `(dx, dy)`.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z)
    }

    /// Projects the point onto the floor plane.
    #[must_use]
    pub fn to_point2(self) -> Point2 {
        Point2::new(f64::from(self.x), f64::from(self.y))
    }
}

impl fmt::Display for MapPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

impl From<(i32, i32, i32)> for MapPoint {
    fn from((x, y, z): (i32, i32, i32)) -> Self {
        Self::new(x, y, z)
    }
}
