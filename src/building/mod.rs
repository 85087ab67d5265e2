pub mod map;
pub mod obstacle;
pub mod polygon;
pub mod room;
pub mod transit;

pub use map::{Floor, Map, RoomLocation};
pub use obstacle::{GeometryObstacle, Obstacle};
pub use polygon::Polygon;
pub use room::Room;
pub use transit::{Transit, TransitKind};
