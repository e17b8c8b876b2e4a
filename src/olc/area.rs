use crate::models::coordinate::{Coordinate, MAX_LAT, MAX_LON};

/// Slack applied to the inclusive bounds check. Encoding rounds to
/// micro-units of the final grid before flooring, so a point may sit a few
/// ulps outside the cell it was assigned to.
const CONTAINS_TOLERANCE: f64 = 1e-10;

/// The rectangle of latitude/longitude a code stands for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CodeArea {
    pub lat_lo: f64,
    pub lon_lo: f64,
    pub lat_hi: f64,
    pub lon_hi: f64,
    /// Number of significant digits in the decoded code
    pub code_length: usize,
}

impl CodeArea {
    pub fn lat_center(&self) -> f64 {
        (self.lat_lo + (self.lat_hi - self.lat_lo) / 2.0).min(MAX_LAT)
    }

    pub fn lon_center(&self) -> f64 {
        (self.lon_lo + (self.lon_hi - self.lon_lo) / 2.0).min(MAX_LON)
    }

    pub fn center(&self) -> Coordinate {
        Coordinate::clamped(self.lat_center(), self.lon_center())
    }

    pub fn contains(&self, coord: &Coordinate) -> bool {
        coord.lat() >= self.lat_lo - CONTAINS_TOLERANCE
            && coord.lat() <= self.lat_hi + CONTAINS_TOLERANCE
            && coord.lon() >= self.lon_lo - CONTAINS_TOLERANCE
            && coord.lon() <= self.lon_hi + CONTAINS_TOLERANCE
    }
}
