//! Core data models for the geography layer.

pub mod coordinate;
pub mod region;
pub mod transport;

pub use coordinate::{BoundingBox, Coordinate};
pub use region::Region;
pub use transport::{PointKind, Road, TransportPoint};
