use super::{Bounds, MapPoint};

/// Parametric segment-segment intersection test in the XY plane.
///
/// Segments `a-b` and `c-d` intersect when both interpolation parameters lie
/// strictly inside `(0, 1)`. Touching at an endpoint does not count.
/// Parallel segments intersect only when they are collinear.
///
/// All arithmetic is exact in `i64`.
#[must_use]
pub fn segments_intersect(a: MapPoint, b: MapPoint, c: MapPoint, d: MapPoint) -> bool {
    let (ax, ay) = (i64::from(a.x), i64::from(a.y));
    let (bx, by) = (i64::from(b.x), i64::from(b.y));
    let (cx, cy) = (i64::from(c.x), i64::from(c.y));
    let (dx, dy) = (i64::from(d.x), i64::from(d.y));

    let denominator = (bx - ax) * (dy - cy) - (by - ay) * (dx - cx);
    let numerator1 = (ay - cy) * (dx - cx) - (ax - cx) * (dy - cy);
    let numerator2 = (ay - cy) * (bx - ax) - (ax - cx) * (by - ay);

    if denominator == 0 {
        return numerator1 == 0 && numerator2 == 0;
    }

    strictly_between_zero_and(numerator1, denominator)
        && strictly_between_zero_and(numerator2, denominator)
}

/// `0 < numerator / denominator < 1` without dividing.
fn strictly_between_zero_and(numerator: i64, denominator: i64) -> bool {
    if denominator > 0 {
        numerator > 0 && numerator < denominator
    } else {
        numerator < 0 && numerator > denominator
    }
}

/// Returns `true` if segment `a-b` properly crosses any edge of the closed
/// polygon described by `corners`.
#[must_use]
pub fn segment_crosses_outline(a: MapPoint, b: MapPoint, corners: &[MapPoint]) -> bool {
    let n = corners.len();
    (0..n).any(|j| segments_intersect(a, b, corners[j], corners[(j + 1) % n]))
}

/// Returns `true` if segment `a-b` runs through the open interior of
/// `bounds`. Segments along a side or touching a corner stay outside.
#[must_use]
pub fn segment_enters_bounds(a: MapPoint, b: MapPoint, bounds: &Bounds) -> bool {
    let mut enter = 0.0_f64;
    let mut leave = 1.0_f64;
    for (from, to, min, max) in [
        (a.x, b.x, bounds.min_x, bounds.max_x),
        (a.y, b.y, bounds.min_y, bounds.max_y),
    ] {
        if from == to {
            if from <= min || from >= max {
                return false;
            }
            continue;
        }
        let delta = f64::from(to) - f64::from(from);
        let t0 = (f64::from(min) - f64::from(from)) / delta;
        let t1 = (f64::from(max) - f64::from(from)) / delta;
        enter = enter.max(t0.min(t1));
        leave = leave.min(t0.max(t1));
    }
    enter < leave
}
