//! Region assignment for arbitrary points.

use tracing::debug;

use super::ring::contains_any;
use super::RegionIndex;
use crate::models::{Coordinate, Region};

/// First region, in the given order, whose polygons contain the point.
///
/// Overlapping regions are a data defect; when they occur the earliest
/// loaded region wins.
pub fn resolve<'a>(coord: &Coordinate, regions: &'a [Region]) -> Option<&'a Region> {
    regions
        .iter()
        .find(|region| contains_any(coord, &region.geometry))
}

/// Region lookup service backed by a spatial index
pub struct RegionResolver {
    index: RegionIndex,
}

impl RegionResolver {
    /// Create a new resolver from a spatial index
    pub fn new(index: RegionIndex) -> Self {
        Self { index }
    }

    pub fn from_regions(regions: Vec<Region>) -> Self {
        Self::new(RegionIndex::build(regions))
    }

    /// Region containing the point, first in load order
    pub fn resolve(&self, coord: &Coordinate) -> Option<&Region> {
        self.index.lookup(coord)
    }

    /// Name of the region containing the point
    pub fn resolve_name(&self, coord: &Coordinate) -> Option<&str> {
        self.resolve(coord).map(|r| r.name.as_str())
    }

    /// Like [`Self::resolve`], but logs when more than one region matches
    pub fn resolve_reporting_overlaps(&self, coord: &Coordinate) -> Option<&Region> {
        let all = self.index.lookup_all(coord);
        if all.len() > 1 {
            debug!(
                "Point {} lies in {} overlapping regions, using '{}'",
                coord,
                all.len(),
                all[0].name
            );
        }
        all.into_iter().next()
    }

    /// Get the spatial index (for stats/debugging)
    pub fn index(&self) -> &RegionIndex {
        &self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{LineString, MultiPolygon, Polygon};

    fn rect(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> MultiPolygon<f64> {
        MultiPolygon::new(vec![Polygon::new(
            LineString::from(vec![
                (min_lon, min_lat),
                (max_lon, min_lat),
                (max_lon, max_lat),
                (min_lon, max_lat),
                (min_lon, min_lat),
            ]),
            vec![],
        )])
    }

    fn regions() -> Vec<Region> {
        vec![
            Region::new("Banadir", rect(45.0, 1.8, 45.6, 2.2)).with_code("SOM-BNR"),
            Region::new("Shabeellaha Hoose", rect(43.5, 0.5, 45.5, 2.5)).with_code("SOM-SH"),
            Region::new("Bari", rect(48.0, 9.0, 51.0, 12.0)).with_code("SOM-BR"),
        ]
    }

    #[test]
    fn test_empty_resolver() {
        let resolver = RegionResolver::from_regions(vec![]);
        assert!(resolver.resolve(&Coordinate::new(8.5, 47.4).unwrap()).is_none());
    }

    #[test]
    fn test_linear_resolve_first_match() {
        let regions = regions();
        let mogadishu = Coordinate::new(2.0469, 45.3182).unwrap();
        // Inside both Banadir and the overlapping neighbour
        assert_eq!(resolve(&mogadishu, &regions).unwrap().name, "Banadir");

        let merca = Coordinate::new(1.7159, 44.7717).unwrap();
        assert_eq!(resolve(&merca, &regions).unwrap().name, "Shabeellaha Hoose");

        let nairobi = Coordinate::new(-1.2921, 36.8219).unwrap();
        assert!(resolve(&nairobi, &regions).is_none());
    }

    #[test]
    fn test_indexed_matches_linear() {
        let regions = regions();
        let resolver = RegionResolver::from_regions(regions.clone());

        let mut lat = -1.0;
        while lat < 13.0 {
            let mut lon = 40.0;
            while lon < 52.0 {
                let coord = Coordinate::new(lat, lon).unwrap();
                assert_eq!(
                    resolver.resolve_name(&coord),
                    resolve(&coord, &regions).map(|r| r.name.as_str()),
                    "mismatch at {}",
                    coord
                );
                lon += 0.17;
            }
            lat += 0.13;
        }
    }

    #[test]
    fn test_overlap_reporting_agrees() {
        let resolver = RegionResolver::from_regions(regions());
        let mogadishu = Coordinate::new(2.0469, 45.3182).unwrap();
        assert_eq!(
            resolver.resolve_reporting_overlaps(&mogadishu).unwrap().name,
            resolver.resolve(&mogadishu).unwrap().name
        );
    }
}
