mod grid;
mod navmesh;
pub(crate) mod open_set;
mod trace;
mod walkable;

pub use grid::GridSearch;
pub use navmesh::{NavmeshPath, NavmeshSearch};
pub use trace::{append_leg, trace_length, TraceOptimization};
pub use walkable::WalkableArea;
