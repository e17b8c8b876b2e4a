//! Point-in-Polygon (PIP) region lookup.
//!
//! Ray-casting containment over region polygons, an R-tree over region
//! bounding boxes for fast candidate selection, and the batch cleanup pass
//! that labels transport points with their region.

mod cleanup;
mod index;
mod resolver;
mod ring;

pub use cleanup::{
    default_excluded_codes, CleanupConfig, CleanupPass, CleanupReport, RemovalReason,
    RemovedPoint, MAX_DEDUPE_DECIMALS, NEIGHBOUR_AIRPORT_CODES,
};
pub use index::RegionIndex;
pub use resolver::{resolve, RegionResolver};
pub use ring::{close_ring, contains, contains_any, ring_contains};
