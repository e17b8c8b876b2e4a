//! Administrative region with its boundary geometry.

use geo::{BoundingRect, MultiPolygon};

/// A named region polygon set, as loaded from the region snapshot.
///
/// The resolver only reads regions; the order in which they were loaded is
/// the tie-break order for overlapping boundaries.
#[derive(Debug, Clone)]
pub struct Region {
    pub name: String,
    /// Region code such as "SOM-BNR"
    pub code: Option<String>,
    pub geometry: MultiPolygon<f64>,
}

impl Region {
    pub fn new(name: impl Into<String>, geometry: MultiPolygon<f64>) -> Self {
        Self {
            name: name.into(),
            code: None,
            geometry,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Get the bounding box of this region as (min_lon, min_lat, max_lon, max_lat)
    pub fn bbox(&self) -> Option<(f64, f64, f64, f64)> {
        self.geometry
            .bounding_rect()
            .map(|rect| (rect.min().x, rect.min().y, rect.max().x, rect.max().y))
    }
}
