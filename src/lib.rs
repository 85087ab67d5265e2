pub mod building;
pub mod cancel;
pub mod error;
pub mod hpa;
pub mod math;
pub mod route;
pub mod search;
pub mod triangulation;

pub use cancel::CancelToken;
pub use error::{FloorpathError, Result};
