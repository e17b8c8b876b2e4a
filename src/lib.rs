//! somgeo - geographic primitives for Somali location data
//!
//! Open Location Code encoding, great-circle distance, point-in-polygon
//! region lookup, and radius search. Shared by the `server` and `cleanup`
//! binaries.

pub mod config;
pub mod dataset;
pub mod distance;
pub mod error;
pub mod models;
pub mod olc;
pub mod pip;
pub mod search;

pub use error::{GeoError, Result};
pub use models::{BoundingBox, Coordinate, PointKind, Region, Road, TransportPoint};
