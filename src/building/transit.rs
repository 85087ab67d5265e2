use std::fmt;

use super::Polygon;

/// Kind of physical connector a [`Transit`] stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TransitKind {
    #[default]
    Unset,
    Door,
    Stairs,
    Elevator,
}

impl fmt::Display for TransitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unset => "unset",
            Self::Door => "door",
            Self::Stairs => "stairs",
            Self::Elevator => "elevator",
        };
        f.write_str(name)
    }
}

/// One face of a connector between rooms or floors.
///
/// Faces of the same physical connector share `id`: both sides of a door,
/// or every floor an elevator stops at. `delay` is the cost of passing
/// through to another face.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transit {
    pub shape: Polygon,
    pub id: String,
    pub kind: TransitKind,
    pub delay: u32,
}

impl Transit {
    /// Creates a transit face.
    #[must_use]
    pub fn new(shape: Polygon, id: impl Into<String>, kind: TransitKind, delay: u32) -> Self {
        Self {
            shape,
            id: id.into(),
            kind,
            delay,
        }
    }

    /// Returns `true` for door faces, which never act as obstacles during
    /// navmesh search.
    #[must_use]
    pub fn is_door(&self) -> bool {
        self.kind == TransitKind::Door
    }
}
