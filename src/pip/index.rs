//! Spatial index for fast region lookups.

use rstar::{RTree, RTreeObject, AABB};
use std::sync::Arc;
use tracing::{debug, info};

use super::ring::contains_any;
use crate::models::{Coordinate, Region};

/// Wrapper for R-tree indexing of regions
#[derive(Clone)]
struct IndexedRegion {
    /// Position in load order, the tie-break for overlapping regions
    order: usize,
    region: Arc<Region>,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for IndexedRegion {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

impl IndexedRegion {
    fn new(order: usize, region: Arc<Region>) -> Option<Self> {
        let (min_x, min_y, max_x, max_y) = region.bbox()?;
        Some(Self {
            order,
            region,
            envelope: AABB::from_corners([min_x, min_y], [max_x, max_y]),
        })
    }
}

/// Spatial index for region polygons using an R-tree.
///
/// The tree only narrows candidates by bounding box; ray casting is the
/// authoritative test. Lookups return the same region a linear scan in load
/// order would.
pub struct RegionIndex {
    tree: RTree<IndexedRegion>,
    /// All regions in load order, including ones without geometry
    regions: Vec<Arc<Region>>,
}

impl RegionIndex {
    /// Build spatial index from regions, keeping their order
    pub fn build(regions: Vec<Region>) -> Self {
        info!("Building spatial index for {} regions...", regions.len());

        let regions: Vec<Arc<Region>> = regions.into_iter().map(Arc::new).collect();

        let indexed: Vec<IndexedRegion> = regions
            .iter()
            .enumerate()
            .filter_map(|(order, region)| IndexedRegion::new(order, Arc::clone(region)))
            .collect();

        let skipped = regions.len() - indexed.len();
        if skipped > 0 {
            info!("Skipped {} regions with empty geometry", skipped);
        }

        let tree = RTree::bulk_load(indexed);
        info!("Spatial index built with {} entries", tree.size());

        Self { tree, regions }
    }

    /// Regions whose envelope holds the point and whose polygons contain it
    fn candidates(&self, coord: &Coordinate) -> Vec<&IndexedRegion> {
        let query_envelope = AABB::from_point([coord.lon(), coord.lat()]);

        // Use R-tree to get candidates via envelope intersection, then filter with exact containment
        self.tree
            .locate_in_envelope_intersecting(&query_envelope)
            .filter(|ir| contains_any(coord, &ir.region.geometry))
            .collect()
    }

    /// First region in load order containing the point
    pub fn lookup(&self, coord: &Coordinate) -> Option<&Region> {
        let found = self
            .candidates(coord)
            .into_iter()
            .min_by_key(|ir| ir.order)
            .map(|ir| ir.region.as_ref());

        debug!(
            "Region lookup at {}: {}",
            coord,
            found.map(|r| r.name.as_str()).unwrap_or("none")
        );

        found
    }

    /// Every region containing the point, in load order.
    ///
    /// More than one result means the region data overlaps.
    pub fn lookup_all(&self, coord: &Coordinate) -> Vec<&Region> {
        let mut hits = self.candidates(coord);
        hits.sort_by_key(|ir| ir.order);
        hits.into_iter().map(|ir| ir.region.as_ref()).collect()
    }

    /// Get total number of regions
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}
