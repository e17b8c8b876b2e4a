//! GeoJSON snapshots of regions, roads, and transport points.
//!
//! Snapshots are read once per server start or cleanup run; nothing here
//! holds on to them afterwards.

mod geojson;

pub use self::geojson::{
    load_points, load_regions, load_roads, parse_points, parse_regions, parse_roads,
    point_feature, points_to_collection, write_points,
};
