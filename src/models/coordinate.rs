//! Coordinate and bounding box value types.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{GeoError, Result};

/// Valid latitude range
pub const MIN_LAT: f64 = -90.0;
pub const MAX_LAT: f64 = 90.0;

/// Valid longitude range
pub const MIN_LON: f64 = -180.0;
pub const MAX_LON: f64 = 180.0;

/// A validated WGS84 position in degrees.
///
/// Construction goes through [`Coordinate::new`], so every value in
/// circulation is in range and never NaN.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    lat: f64,
    lon: f64,
}

impl Coordinate {
    /// Create a coordinate, rejecting out-of-range or NaN values
    pub fn new(lat: f64, lon: f64) -> Result<Self> {
        let lat_ok = (MIN_LAT..=MAX_LAT).contains(&lat);
        let lon_ok = (MIN_LON..=MAX_LON).contains(&lon);
        if !lat_ok || !lon_ok {
            return Err(GeoError::InvalidCoordinate { lat, lon });
        }
        Ok(Self { lat, lon })
    }

    /// Create a coordinate by clamping each axis into range.
    ///
    /// NaN inputs collapse to 0.
    pub fn clamped(lat: f64, lon: f64) -> Self {
        let lat = if lat.is_nan() { 0.0 } else { lat.clamp(MIN_LAT, MAX_LAT) };
        let lon = if lon.is_nan() { 0.0 } else { lon.clamp(MIN_LON, MAX_LON) };
        Self { lat, lon }
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lon(&self) -> f64 {
        self.lon
    }

    /// Convert from a geo coordinate (x = lon, y = lat)
    pub fn from_geo(coord: geo::Coord<f64>) -> Result<Self> {
        Self::new(coord.y, coord.x)
    }
}

impl<'de> Deserialize<'de> for Coordinate {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            lat: f64,
            lon: f64,
        }

        let raw = Raw::deserialize(deserializer)?;
        Coordinate::new(raw.lat, raw.lon).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}

/// Axis-aligned box in degrees, inclusive on every edge.
///
/// Used as a cheap pre-filter ahead of exact geometric tests.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    pub fn new(min_lat: f64, max_lat: f64, min_lon: f64, max_lon: f64) -> Self {
        Self {
            min_lat,
            max_lat,
            min_lon,
            max_lon,
        }
    }

    /// Coarse box around Somalia used by the cleanup pass
    pub fn somalia() -> Self {
        Self::new(-1.646, 12.0, 40.993, 51.417)
    }

    pub fn contains(&self, coord: &Coordinate) -> bool {
        (self.min_lat..=self.max_lat).contains(&coord.lat())
            && (self.min_lon..=self.max_lon).contains(&coord.lon())
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::somalia()
    }
}
