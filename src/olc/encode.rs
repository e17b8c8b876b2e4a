use super::{
    is_valid_length, ALPHABET, ENCODING_BASE, FINAL_LAT_PRECISION, FINAL_LON_PRECISION,
    GRID_COLUMNS, GRID_ROWS, MAX_CODE_LENGTH, PADDING, PAIR_CODE_LENGTH, SEPARATOR,
    SEPARATOR_POSITION,
};
use crate::error::{GeoError, Result};
use crate::models::Coordinate;

/// Encode a coordinate into a code of `code_length` significant digits.
///
/// Fails with [`GeoError::InvalidPrecision`] unless the length is one of
/// 2, 4, 6, 8 or 10..=15.
pub fn encode(coord: Coordinate, code_length: usize) -> Result<String> {
    if !is_valid_length(code_length) {
        return Err(GeoError::InvalidPrecision(code_length));
    }

    let (mut lat_val, mut lon_val) = to_integers(&coord);

    let mut digits = ['2'; MAX_CODE_LENGTH];

    // Grid stage: 5 rows by 4 columns per digit, least significant first
    if code_length > PAIR_CODE_LENGTH {
        for slot in digits[PAIR_CODE_LENGTH..].iter_mut().rev() {
            let lat_digit = lat_val % GRID_ROWS;
            let lon_digit = lon_val % GRID_COLUMNS;
            *slot = ALPHABET[(lat_digit * GRID_COLUMNS + lon_digit) as usize] as char;
            lat_val /= GRID_ROWS;
            lon_val /= GRID_COLUMNS;
        }
    } else {
        lat_val /= GRID_ROWS.pow(5);
        lon_val /= GRID_COLUMNS.pow(5);
    }

    // Pair stage: 20×20 per pair, latitude digit first
    for pair in digits[..PAIR_CODE_LENGTH].chunks_mut(2).rev() {
        pair[0] = ALPHABET[(lat_val % ENCODING_BASE) as usize] as char;
        pair[1] = ALPHABET[(lon_val % ENCODING_BASE) as usize] as char;
        lat_val /= ENCODING_BASE;
        lon_val /= ENCODING_BASE;
    }

    let mut code = String::with_capacity(MAX_CODE_LENGTH + 1);
    if code_length >= SEPARATOR_POSITION {
        code.extend(&digits[..SEPARATOR_POSITION]);
        code.push(SEPARATOR);
        code.extend(&digits[SEPARATOR_POSITION..code_length]);
    } else {
        code.extend(&digits[..code_length]);
        code.extend(std::iter::repeat(PADDING).take(SEPARATOR_POSITION - code_length));
        code.push(SEPARATOR);
    }

    Ok(code)
}

/// Encode raw latitude/longitude, validating the range first
pub fn encode_lat_lon(lat: f64, lon: f64, code_length: usize) -> Result<String> {
    encode(Coordinate::new(lat, lon)?, code_length)
}

/// Convert a coordinate to non-negative integers at final precision.
///
/// Values are rounded to 1e-6 of a unit before flooring so that decimal
/// inputs like 2.0343 land in the cell a human would expect.
fn to_integers(coord: &Coordinate) -> (i64, i64) {
    let lat_scaled = (coord.lat() + 90.0) * FINAL_LAT_PRECISION as f64;
    let lon_scaled = (coord.lon() + 180.0) * FINAL_LON_PRECISION as f64;

    let mut lat_val = ((lat_scaled * 1e6).round() / 1e6).floor() as i64;
    let mut lon_val = ((lon_scaled * 1e6).round() / 1e6).floor() as i64;

    // Latitude 90 belongs to the topmost cell
    let lat_span = 180 * FINAL_LAT_PRECISION;
    lat_val = lat_val.clamp(0, lat_span - 1);

    // Longitude 180 wraps to -180
    lon_val = lon_val.rem_euclid(360 * FINAL_LON_PRECISION);

    (lat_val, lon_val)
}
