use crate::error::TopologyError;
use crate::math::intersect_2d::segment_crosses_outline;
use crate::math::polygon_2d::{centroid, on_outline, point_in_polygon, point_in_polygon_xy};
use crate::math::{Bounds, MapPoint, Point2};

/// An immutable outline on one floor.
///
/// Rooms, barriers and transits are all described by a `Polygon`. The
/// bounding rectangle and the middle point are computed once at
/// construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Polygon {
    corners: Vec<MapPoint>,
    bounds: Bounds,
    middle: MapPoint,
}

impl Polygon {
    /// Creates a polygon from its corners.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::EmptyPolygon`] if `corners` is empty and
    /// [`TopologyError::MixedFloors`] if the corners are not all on the
    /// floor of the first one.
    pub fn new(corners: Vec<MapPoint>) -> Result<Self, TopologyError> {
        let (Some(bounds), Some(middle)) = (Bounds::from_points(&corners), centroid(&corners))
        else {
            return Err(TopologyError::EmptyPolygon);
        };
        if let Some(stray) = corners.iter().find(|c| c.z != middle.z) {
            return Err(TopologyError::MixedFloors {
                object: format!("corner {stray}"),
                expected: middle.z,
                found: stray.z,
            });
        }
        Ok(Self {
            corners,
            bounds,
            middle,
        })
    }

    /// Builds the rectangle covering `bounds` on floor `z`.
    #[must_use]
    pub fn from_bounds(bounds: Bounds, z: i32) -> Self {
        let corners = bounds.corners(z).to_vec();
        let middle = MapPoint::new(
            half_way(bounds.min_x, bounds.max_x),
            half_way(bounds.min_y, bounds.max_y),
            z,
        );
        Self {
            corners,
            bounds,
            middle,
        }
    }

    /// Ordered corner list.
    #[must_use]
    pub fn corners(&self) -> &[MapPoint] {
        &self.corners
    }

    /// Floor of the polygon.
    #[must_use]
    pub fn z(&self) -> i32 {
        self.middle.z
    }

    /// Bounding rectangle of the corners.
    #[must_use]
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Integer average of the corners.
    #[must_use]
    pub fn middle(&self) -> MapPoint {
        self.middle
    }

    /// Ray-casting membership test. Boundary points may fall either way.
    #[must_use]
    pub fn contains(&self, point: MapPoint) -> bool {
        point_in_polygon(&self.corners, point)
    }

    /// Membership test that also accepts every point on the outline.
    #[must_use]
    pub fn covers(&self, point: MapPoint) -> bool {
        point.z == self.z() && (on_outline(&self.corners, point) || self.contains(point))
    }

    /// Inclusive bounding-rectangle test on the polygon's floor.
    #[must_use]
    pub fn bounds_contain(&self, point: MapPoint) -> bool {
        point.z == self.z() && self.bounds.contains_xy(point.x, point.y)
    }

    /// Bounding rectangle grown by one unit on every side.
    ///
    /// Clearance for a point-sized walker so routes keep off the outline.
    #[must_use]
    pub fn enlarged(&self) -> Self {
        Self::from_bounds(self.bounds.grow(1), self.z())
    }

    /// Bounding rectangle shrunk by one unit on every side.
    #[must_use]
    pub fn reduced(&self) -> Self {
        Self::from_bounds(self.bounds.grow(-1), self.z())
    }

    /// Returns `true` if the straight segment `a-b` passes through the polygon:
    /// it properly crosses an edge, or its midpoint lies inside.
    #[must_use]
    pub fn blocks_segment(&self, a: MapPoint, b: MapPoint) -> bool {
        if segment_crosses_outline(a, b, &self.corners) {
            return true;
        }
        let mid = Point2::new(
            (f64::from(a.x) + f64::from(b.x)) / 2.0,
            (f64::from(a.y) + f64::from(b.y)) / 2.0,
        );
        point_in_polygon_xy(&self.corners, &mid)
    }
}

/// Truncating average, equal to [`centroid`] of a rectangle's four corners.
#[allow(clippy::cast_possible_truncation)]
fn half_way(a: i32, b: i32) -> i32 {
    ((i64::from(a) + i64::from(b)) / 2) as i32
}
