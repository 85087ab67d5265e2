mod find;
mod graph;
mod local;

pub use find::FindRoute;
pub use graph::{BuildTransitGraph, TransitGraph, TransitId, TransitNode, TransitRoute};

use crate::error::{OperationError, Result};
use crate::hpa::HpaEdge;
use crate::math::MapPoint;
use crate::triangulation::TriangulationParams;

/// Room-local pathfinding pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Algorithm {
    /// Cluster decomposition plus grid A*.
    #[default]
    GridHierarchical,
    /// Delaunay navmesh plus vertex A*.
    Triangulation,
}

/// Parameters of a [`FindRoute`] request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteParams {
    pub algorithm: Algorithm,
    /// Side length of a cluster in grid units. Used by
    /// [`Algorithm::GridHierarchical`] only.
    pub cluster_size: u32,
    /// Return the triangulation or abstract edges built along the way.
    pub collect_visualization: bool,
    pub triangulation: TriangulationParams,
}

impl Default for RouteParams {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::GridHierarchical,
            cluster_size: 20,
            collect_visualization: false,
            triangulation: TriangulationParams::default(),
        }
    }
}

impl RouteParams {
    /// Creates default parameters for `algorithm`.
    #[must_use]
    pub fn new(algorithm: Algorithm) -> Self {
        Self {
            algorithm,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_cluster_size(mut self, cluster_size: u32) -> Self {
        self.cluster_size = cluster_size;
        self
    }

    #[must_use]
    pub fn with_visualization(mut self, collect: bool) -> Self {
        self.collect_visualization = collect;
        self
    }

    /// Checks the parameters.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::InvalidInput`] if the cluster size is zero.
    pub fn validate(&self) -> Result<()> {
        if self.cluster_size == 0 {
            return Err(OperationError::InvalidInput("cluster size must be positive".into()).into());
        }
        Ok(())
    }
}

/// Intermediate structures kept for drawing.
#[derive(Debug, Clone, PartialEq)]
pub enum Visualization {
    Triangles(Vec<[MapPoint; 3]>),
    HpaEdges(Vec<HpaEdge>),
}

impl Visualization {
    /// Appends the structures of `other` if both are of the same kind.
    pub(crate) fn merge(&mut self, other: Self) {
        match (self, other) {
            (Self::Triangles(all), Self::Triangles(more)) => all.extend(more),
            (Self::HpaEdges(all), Self::HpaEdges(more)) => all.extend(more),
            _ => {}
        }
    }

    pub(crate) fn collect_into(slot: &mut Option<Self>, more: Option<Self>) {
        let Some(more) = more else {
            return;
        };
        if let Some(all) = slot.as_mut() {
            all.merge(more);
        } else {
            *slot = Some(more);
        }
    }
}

/// A found (possibly empty) route.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RouteResult {
    /// Waypoints from start to goal. Empty when no route exists.
    pub waypoints: Vec<MapPoint>,
    pub visualization: Option<Visualization>,
}

impl RouteResult {
    /// Returns `true` if no route was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Walking length of the route.
    #[must_use]
    pub fn length(&self) -> f64 {
        crate::search::trace_length(&self.waypoints)
    }
}

/// Result of [`FindRoute::execute`].
#[derive(Debug, Clone, PartialEq)]
pub enum RouteOutcome {
    Found(RouteResult),
    /// The cancel token fired before the search finished.
    Cancelled,
}

impl RouteOutcome {
    /// The route, if the search ran to completion.
    #[must_use]
    pub fn route(&self) -> Option<&RouteResult> {
        match self {
            Self::Found(result) => Some(result),
            Self::Cancelled => None,
        }
    }
}
