use thiserror::Error;

/// Top-level error type for the floorpath routing engine.
#[derive(Debug, Error)]
pub enum FloorpathError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Operation(#[from] OperationError),

    /// The search observed a cancelled [`CancelToken`](crate::cancel::CancelToken).
    ///
    /// Only used to unwind nested searches; [`FindRoute`](crate::route::FindRoute)
    /// reports it as [`RouteOutcome::Cancelled`](crate::route::RouteOutcome::Cancelled).
    #[error("search cancelled")]
    Cancelled,
}

/// Errors raised by geometric computations on a point set.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("triangulation needs at least 3 distinct points, found {found}")]
    InsufficientPoints { found: usize },
}

/// Errors describing a map that cannot be searched.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("polygon has no corners")]
    EmptyPolygon,

    #[error("{object} lies on floor {found}, expected floor {expected}")]
    MixedFloors {
        object: String,
        expected: i32,
        found: i32,
    },

    #[error("floor not found: {0}")]
    FloorNotFound(i32),

    #[error("invalid map topology: {0}")]
    InvalidTopology(String),
}

/// Errors related to operation inputs and configuration.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Convenience type alias for results using [`FloorpathError`].
pub type Result<T> = std::result::Result<T, FloorpathError>;
