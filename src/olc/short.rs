//! Shortening codes relative to a nearby reference location and recovering
//! them again.

use super::validate::{check, check_full};
use super::{
    decode, encode, DEFAULT_CODE_LENGTH, ENCODING_BASE, MIN_TRIMMABLE_CODE_LEN, PADDING,
    PAIR_RESOLUTIONS, SEPARATOR_POSITION,
};
use crate::error::{GeoError, Result};
use crate::models::coordinate::{Coordinate, MAX_LAT, MIN_LAT};

/// Remove as many leading digits from a full code as the reference location
/// allows.
///
/// A pair is dropped only while the reference lies within 30% of that pair's
/// resolution from the code center, so the short code can be recovered
/// unambiguously by [`recover_nearest`].
pub fn shorten(code: &str, reference: Coordinate) -> Result<String> {
    let canonical = check_full(code)?;
    if canonical.contains(PADDING) {
        return Err(GeoError::malformed(code, "padded codes cannot be shortened"));
    }

    let area = decode(&canonical)?;
    if area.code_length < MIN_TRIMMABLE_CODE_LEN {
        return Err(GeoError::malformed(
            code,
            format!("codes need at least {} digits to be shortened", MIN_TRIMMABLE_CODE_LEN),
        ));
    }

    let range = (area.lat_center() - reference.lat())
        .abs()
        .max((area.lon_center() - reference.lon()).abs());

    for i in (1..PAIR_RESOLUTIONS.len() - 1).rev() {
        if range < PAIR_RESOLUTIONS[i] * 0.3 {
            return Ok(canonical[(i + 1) * 2..].to_string());
        }
    }

    Ok(canonical)
}

/// Recover the full code closest to `reference` that ends with `short_code`.
///
/// Full codes are returned unchanged (upper-cased).
pub fn recover_nearest(short_code: &str, reference: Coordinate) -> Result<String> {
    let sep = check(short_code)?;
    if sep == SEPARATOR_POSITION {
        return check_full(short_code);
    }

    let canonical = short_code.to_ascii_uppercase();
    let padding_length = SEPARATOR_POSITION - sep;

    // Size of the area the missing digits would cover
    let resolution = (ENCODING_BASE as f64).powi(2 - (padding_length / 2) as i32);
    let half_resolution = resolution / 2.0;

    let prefix = encode(reference, DEFAULT_CODE_LENGTH)?;
    let candidate = format!("{}{}", &prefix[..padding_length], canonical);
    let area = decode(&candidate)?;

    let mut lat = area.lat_center();
    let mut lon = area.lon_center();

    // Move one resolution step toward the reference if that lands closer,
    // without crossing a pole
    if reference.lat() + half_resolution < lat && lat - resolution >= MIN_LAT {
        lat -= resolution;
    } else if reference.lat() - half_resolution > lat && lat + resolution <= MAX_LAT {
        lat += resolution;
    }

    if reference.lon() + half_resolution < lon {
        lon -= resolution;
    } else if reference.lon() - half_resolution > lon {
        lon += resolution;
    }

    let recovered = Coordinate::new(lat, normalize_longitude(lon))?;
    encode(recovered, area.code_length)
}

fn normalize_longitude(mut lon: f64) -> f64 {
    while lon < -180.0 {
        lon += 360.0;
    }
    while lon >= 180.0 {
        lon -= 360.0;
    }
    lon
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon).unwrap()
    }

    #[test]
    fn test_shorten_relative_to_reference() {
        let code = "6HJ728W9+Q7";
        assert_eq!(shorten(code, at(2.0469, 45.3182)).unwrap(), "+Q7");
        assert_eq!(shorten(code, at(2.05, 45.33)).unwrap(), "W9+Q7");
        assert_eq!(shorten(code, at(2.2, 45.5)).unwrap(), "28W9+Q7");
        assert_eq!(shorten(code, at(3.0, 46.0)).unwrap(), code);
        // Hargeisa is far away
        assert_eq!(shorten(code, at(9.56, 44.06)).unwrap(), code);
    }

    #[test]
    fn test_shorten_rejects_padded_and_short() {
        let reference = at(2.0, 45.3);
        assert!(shorten("6HJ72800+", reference).is_err());
        assert!(shorten("28W9+Q7", reference).is_err());
    }

    #[test]
    fn test_recover_nearest() {
        assert_eq!(
            recover_nearest("+Q7", at(2.0469, 45.3182)).unwrap(),
            "6HJ728W9+Q7"
        );
        assert_eq!(
            recover_nearest("W9+Q7", at(2.05, 45.33)).unwrap(),
            "6HJ728W9+Q7"
        );
        assert_eq!(
            recover_nearest("28w9+q7", at(2.2, 45.5)).unwrap(),
            "6HJ728W9+Q7"
        );
        assert_eq!(
            recover_nearest("CJ+2VX", at(51.3708675, -1.217765625)).unwrap(),
            "9C3W9QCJ+2VX"
        );
    }

    #[test]
    fn test_recover_does_not_cross_the_pole() {
        assert_eq!(
            recover_nearest("2222+22", at(89.6, 0.0)).unwrap(),
            "CFX22222+22"
        );
    }

    #[test]
    fn test_recover_full_code_is_passthrough() {
        assert_eq!(
            recover_nearest("6hj728w9+q7", at(0.0, 0.0)).unwrap(),
            "6HJ728W9+Q7"
        );
    }

    #[test]
    fn test_recover_rejects_invalid() {
        assert!(recover_nearest("W9+Q", at(2.0, 45.0)).is_err());
        assert!(recover_nearest("W9Q7", at(2.0, 45.0)).is_err());
    }

    #[test]
    fn test_shorten_then_recover() {
        let reference = at(2.0392, 45.3418);
        let full = encode(at(2.0469, 45.3182), 11).unwrap();
        let short = shorten(&full, reference).unwrap();
        assert!(short.len() < full.len());
        assert_eq!(recover_nearest(&short, reference).unwrap(), full);
    }
}
