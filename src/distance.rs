//! Great-circle distance and bearing on a spherical Earth.

use crate::error::Result;
use crate::models::{BoundingBox, Coordinate};

/// Earth's mean radius in kilometres (IUGG)
pub const EARTH_RADIUS_KM: f64 = 6_371.0088;

/// Kilometres per degree of latitude on the mean sphere
const KM_PER_DEGREE: f64 = EARTH_RADIUS_KM * std::f64::consts::PI / 180.0;

/// Great-circle distance in kilometres using the Haversine formula.
///
/// Symmetric in its arguments and exactly 0 for identical coordinates.
pub fn haversine_km(a: &Coordinate, b: &Coordinate) -> f64 {
    let lat1 = a.lat().to_radians();
    let lat2 = b.lat().to_radians();
    let delta_lat = (b.lat() - a.lat()).to_radians();
    let delta_lon = (b.lon() - a.lon()).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
    // Rounding can push h a hair above 1 for antipodal points
    let c = 2.0 * h.sqrt().min(1.0).asin();

    EARTH_RADIUS_KM * c
}

/// Haversine distance on raw degrees, validating both points
pub fn haversine_checked(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> Result<f64> {
    let a = Coordinate::new(lat1, lon1)?;
    let b = Coordinate::new(lat2, lon2)?;
    Ok(haversine_km(&a, &b))
}

/// Initial bearing (forward azimuth) from `a` to `b` in degrees, [0, 360)
pub fn initial_bearing_deg(a: &Coordinate, b: &Coordinate) -> f64 {
    let lat1 = a.lat().to_radians();
    let lat2 = b.lat().to_radians();
    let delta_lon = (b.lon() - a.lon()).to_radians();

    let y = delta_lon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * delta_lon.cos();

    y.atan2(x).to_degrees().rem_euclid(360.0)
}

/// Degree box that encloses every point within `radius_km` of `center`.
///
/// Returns `None` when the circle reaches a pole or wraps the antimeridian,
/// where a single lat/lon box cannot bound it; callers skip pruning then.
pub fn destination_bbox(center: &Coordinate, radius_km: f64) -> Option<BoundingBox> {
    let lat_delta = radius_km / KM_PER_DEGREE;
    let min_lat = center.lat() - lat_delta;
    let max_lat = center.lat() + lat_delta;
    if min_lat <= -90.0 || max_lat >= 90.0 {
        return None;
    }

    // Widest longitude span occurs at the latitude furthest from the equator
    let widest_lat = min_lat.abs().max(max_lat.abs()).to_radians();
    let lon_delta = lat_delta / widest_lat.cos();
    let min_lon = center.lon() - lon_delta;
    let max_lon = center.lon() + lon_delta;
    if min_lon < -180.0 || max_lon > 180.0 {
        return None;
    }

    Some(BoundingBox::new(min_lat, max_lat, min_lon, max_lon))
}
