//! Nearby and nearest-neighbour search over points and road polylines.
//!
//! Polyline distance is the distance to the closest vertex, not to the
//! closest point on a segment. Long straight segments can therefore be
//! reported further away than they are; callers surface this as an
//! approximate result.

mod nearby;

pub use nearby::{
    nearest, nearest_polylines, polyline_distance_km, within_radius, within_radius_polylines,
    Hit,
};
