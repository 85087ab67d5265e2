use crate::building::Polygon;
use crate::math::MapPoint;

/// Greedy string pulling over a polyline.
///
/// Each pass walks the trace and drops the point between `p[i]` and
/// `p[i + 2]` whenever the direct segment is not blocked by any obstacle.
/// Passes repeat until one removes nothing. The first and last points are
/// never removed.
#[derive(Debug, Clone)]
pub struct TraceOptimization<'a> {
    obstacles: Vec<&'a Polygon>,
}

impl<'a> TraceOptimization<'a> {
    #[must_use]
    pub fn new(obstacles: impl IntoIterator<Item = &'a Polygon>) -> Self {
        Self {
            obstacles: obstacles.into_iter().collect(),
        }
    }

    /// Returns `true` if no obstacle blocks the segment `a-b`.
    #[must_use]
    pub fn is_clear(&self, a: MapPoint, b: MapPoint) -> bool {
        !self.obstacles.iter().any(|o| o.blocks_segment(a, b))
    }

    #[must_use]
    pub fn execute(&self, mut trace: Vec<MapPoint>) -> Vec<MapPoint> {
        loop {
            let mut pulled = Vec::with_capacity(trace.len());
            let mut changed = false;
            let mut i = 0;
            while i + 2 < trace.len() {
                pulled.push(trace[i]);
                if self.is_clear(trace[i], trace[i + 2]) {
                    i += 1;
                    changed = true;
                }
                i += 1;
            }
            pulled.extend_from_slice(&trace[i..]);
            trace = pulled;
            if !changed {
                return trace;
            }
        }
    }
}

/// Sum of the 3D Euclidean lengths of consecutive segments.
#[must_use]
pub fn trace_length(trace: &[MapPoint]) -> f64 {
    trace.windows(2).map(|w| w[0].distance(w[1])).sum()
}

/// Appends `leg` to `route`, skipping points equal to the last one kept.
pub fn append_leg(route: &mut Vec<MapPoint>, leg: impl IntoIterator<Item = MapPoint>) {
    for point in leg {
        if route.last() != Some(&point) {
            route.push(point);
        }
    }
}
