pub mod intersect_2d;
pub mod point;
pub mod polygon_2d;

pub use point::MapPoint;
pub use polygon_2d::Bounds;

/// 2D point type used for circumcircles and centroids.
pub type Point2 = nalgebra::Point2<f64>;
