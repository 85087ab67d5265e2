use super::{MapPoint, Point2};

/// Axis-aligned integer bounding rectangle in the floor plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bounds {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl Bounds {
    /// Computes the bounding rectangle of a point set, or `None` if empty.
    #[must_use]
    pub fn from_points(points: &[MapPoint]) -> Option<Self> {
        let first = points.first()?;
        let mut bounds = Self {
            min_x: first.x,
            min_y: first.y,
            max_x: first.x,
            max_y: first.y,
        };
        for p in &points[1..] {
            bounds.min_x = bounds.min_x.min(p.x);
            bounds.min_y = bounds.min_y.min(p.y);
            bounds.max_x = bounds.max_x.max(p.x);
            bounds.max_y = bounds.max_y.max(p.y);
        }
        Some(bounds)
    }

    /// Inclusive containment test on plan coordinates.
    #[must_use]
    pub fn contains_xy(&self, x: i32, y: i32) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    /// Returns the union of two rectangles.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Grows (or shrinks, for negative `by`) the rectangle on every side.
    #[must_use]
    pub fn grow(&self, by: i32) -> Self {
        Self {
            min_x: self.min_x - by,
            min_y: self.min_y - by,
            max_x: self.max_x + by,
            max_y: self.max_y + by,
        }
    }

    /// The four corners on floor `z`, starting at the minimum corner and
    /// walking up the minimum-x side first.
    #[must_use]
    pub fn corners(&self, z: i32) -> [MapPoint; 4] {
        [
            MapPoint::new(self.min_x, self.min_y, z),
            MapPoint::new(self.min_x, self.max_y, z),
            MapPoint::new(self.max_x, self.max_y, z),
            MapPoint::new(self.max_x, self.min_y, z),
        ]
    }
}

/// Ray-casting point-in-polygon test.
///
/// Only defined on the polygon's floor: a point on another `z` is outside.
/// Edges parallel to the ray never toggle the result. The crossing test is
/// evaluated exactly so membership does not depend on corner order.
#[must_use]
pub fn point_in_polygon(corners: &[MapPoint], point: MapPoint) -> bool {
    let Some(first) = corners.first() else {
        return false;
    };
    if first.z != point.z {
        return false;
    }

    let (px, py) = (i64::from(point.x), i64::from(point.y));
    let mut inside = false;
    let mut j = corners.len() - 1;
    for k in 0..corners.len() {
        let (xk, yk) = (i64::from(corners[k].x), i64::from(corners[k].y));
        let (xj, yj) = (i64::from(corners[j].x), i64::from(corners[j].y));
        let spans = (yk < py && yj >= py) || (yj < py && yk >= py);
        if spans && (xk <= px || xj <= px) {
            let dy = yj - yk;
            if dy != 0 {
                // x-coordinate of the edge at `py` compared with `px`, scaled by `dy`.
                let lhs = xk * dy + (py - yk) * (xj - xk);
                let rhs = px * dy;
                let crosses = if dy > 0 { lhs < rhs } else { lhs > rhs };
                if crosses {
                    inside = !inside;
                }
            }
        }
        j = k;
    }
    inside
}

/// Floating-point variant of [`point_in_polygon`] for sample points that do
/// not fall on the integer grid (triangle centroids, segment midpoints).
#[must_use]
pub fn point_in_polygon_xy(corners: &[MapPoint], point: &Point2) -> bool {
    if corners.is_empty() {
        return false;
    }
    let mut inside = false;
    let mut j = corners.len() - 1;
    for k in 0..corners.len() {
        let (xk, yk) = (f64::from(corners[k].x), f64::from(corners[k].y));
        let (xj, yj) = (f64::from(corners[j].x), f64::from(corners[j].y));
        let spans = (yk < point.y && yj >= point.y) || (yj < point.y && yk >= point.y);
        if spans && (xk <= point.x || xj <= point.x) {
            let dy = yj - yk;
            if dy != 0.0 && xk + (point.y - yk) / dy * (xj - xk) < point.x {
                inside = !inside;
            }
        }
        j = k;
    }
    inside
}

/// Returns `true` if `p` lies on the closed segment `a-b` in plan.
#[must_use]
pub fn on_segment(a: MapPoint, b: MapPoint, p: MapPoint) -> bool {
    let cross = (i64::from(b.x) - i64::from(a.x)) * (i64::from(p.y) - i64::from(a.y))
        - (i64::from(b.y) - i64::from(a.y)) * (i64::from(p.x) - i64::from(a.x));
    cross == 0
        && p.x >= a.x.min(b.x)
        && p.x <= a.x.max(b.x)
        && p.y >= a.y.min(b.y)
        && p.y <= a.y.max(b.y)
}

/// Returns `true` if `p` lies on any edge of the closed outline.
#[must_use]
pub fn on_outline(corners: &[MapPoint], p: MapPoint) -> bool {
    let n = corners.len();
    (0..n).any(|j| on_segment(corners[j], corners[(j + 1) % n], p))
}

/// Integer average of the corners, on the floor of the first corner.
///
/// Returns `None` for an empty corner list.
#[must_use]
pub fn centroid(corners: &[MapPoint]) -> Option<MapPoint> {
    let first = corners.first()?;
    let n = i64::try_from(corners.len()).ok()?;
    let sx: i64 = corners.iter().map(|c| i64::from(c.x)).sum();
    let sy: i64 = corners.iter().map(|c| i64::from(c.y)).sum();
    Some(MapPoint::new(
        i32::try_from(sx / n).ok()?,
        i32::try_from(sy / n).ok()?,
        first.z,
    ))
}
