use super::{Polygon, Transit};

/// Anything a route must go around.
///
/// Plain barriers only expose their outline. Transits also expose their
/// connector data, so callers can group faces by identifier or skip doors
/// without inspecting concrete types.
pub trait GeometryObstacle {
    /// Outline of the obstacle.
    fn outline(&self) -> &Polygon;

    /// Connector data, if the obstacle is a transit face.
    fn transit(&self) -> Option<&Transit> {
        None
    }

    /// Returns `true` if the obstacle is a door face.
    fn is_door(&self) -> bool {
        self.transit().is_some_and(Transit::is_door)
    }
}

impl GeometryObstacle for Polygon {
    fn outline(&self) -> &Polygon {
        self
    }
}

impl GeometryObstacle for Transit {
    fn outline(&self) -> &Polygon {
        &self.shape
    }

    fn transit(&self) -> Option<&Transit> {
        Some(self)
    }
}

/// Borrowed obstacle of a room: either a plain barrier or a transit face.
#[derive(Debug, Clone, Copy)]
pub enum Obstacle<'a> {
    Barrier(&'a Polygon),
    Transit(&'a Transit),
}

impl<'a> Obstacle<'a> {
    /// Outline borrowed for the lifetime of the room.
    #[must_use]
    pub fn into_outline(self) -> &'a Polygon {
        match self {
            Self::Barrier(polygon) => polygon,
            Self::Transit(transit) => &transit.shape,
        }
    }
}

impl GeometryObstacle for Obstacle<'_> {
    fn outline(&self) -> &Polygon {
        match self {
            Self::Barrier(polygon) => polygon,
            Self::Transit(transit) => &transit.shape,
        }
    }

    fn transit(&self) -> Option<&Transit> {
        match self {
            Self::Barrier(_) => None,
            Self::Transit(transit) => Some(transit),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::building::TransitKind;
    use crate::math::MapPoint;

    fn unit_square() -> Polygon {
        Polygon::new(vec![
            MapPoint::new(0, 0, 0),
            MapPoint::new(1, 0, 0),
            MapPoint::new(1, 1, 0),
            MapPoint::new(0, 1, 0),
        ])
        .unwrap()
    }

    #[test]
    fn barrier_has_no_transit_data() {
        let barrier = unit_square();
        let obstacle = Obstacle::Barrier(&barrier);
        assert!(obstacle.transit().is_none());
        assert!(!obstacle.is_door());
        assert_eq!(obstacle.outline(), &barrier);
    }

    #[test]
    fn door_transit_reports_door() {
        let door = Transit::new(unit_square(), "d1", TransitKind::Door, 0);
        let lift = Transit::new(unit_square(), "e1", TransitKind::Elevator, 5);
        assert!(Obstacle::Transit(&door).is_door());
        assert!(!Obstacle::Transit(&lift).is_door());
        assert_eq!(Obstacle::Transit(&lift).transit().map(|t| t.delay), Some(5));
    }
}
