mod decompose;
mod online;

pub use decompose::DecomposeRoom;
pub use online::OnLineSearch;

use crate::math::MapPoint;

/// Kind of abstract edge.
#[derive(Debug, Clone, PartialEq)]
pub enum HpaEdgeKind {
    /// Unit step across a cluster boundary.
    Inter,
    /// Grid route between two points of the same cluster.
    Intra { trace: Vec<MapPoint>, length: f64 },
}

/// Edge of the abstract graph that [`DecomposeRoom`] builds over a room
/// and [`OnLineSearch`] walks.
#[derive(Debug, Clone, PartialEq)]
pub struct HpaEdge {
    pub a: MapPoint,
    pub b: MapPoint,
    pub kind: HpaEdgeKind,
}

impl HpaEdge {
    #[must_use]
    pub fn inter(a: MapPoint, b: MapPoint) -> Self {
        Self {
            a,
            b,
            kind: HpaEdgeKind::Inter,
        }
    }

    /// Intra-cluster edge carrying the grid route from `a` to `b`.
    #[must_use]
    pub fn intra(a: MapPoint, b: MapPoint, trace: Vec<MapPoint>) -> Self {
        let length = crate::search::trace_length(&trace);
        Self {
            a,
            b,
            kind: HpaEdgeKind::Intra { trace, length },
        }
    }

    /// Walking length of the edge.
    #[must_use]
    pub fn length(&self) -> f64 {
        match &self.kind {
            HpaEdgeKind::Inter => self.a.distance(self.b),
            HpaEdgeKind::Intra { length, .. } => *length,
        }
    }

    /// The endpoint opposite `point`, if `point` is an endpoint.
    #[must_use]
    pub fn other_end(&self, point: MapPoint) -> Option<MapPoint> {
        if point == self.a {
            Some(self.b)
        } else if point == self.b {
            Some(self.a)
        } else {
            None
        }
    }

    /// Points walked when traversing the edge starting at `from`.
    #[must_use]
    pub fn trace_from(&self, from: MapPoint) -> Vec<MapPoint> {
        let to = self.other_end(from).unwrap_or(self.b);
        match &self.kind {
            HpaEdgeKind::Inter => vec![from, to],
            HpaEdgeKind::Intra { trace, .. } => {
                if trace.first() == Some(&from) {
                    trace.clone()
                } else {
                    trace.iter().rev().copied().collect()
                }
            }
        }
    }
}
