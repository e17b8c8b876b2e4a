use super::validate::check_full;
use super::{
    digit_value, CodeArea, FINAL_LAT_PRECISION, FINAL_LON_PRECISION, GRID_COLUMNS,
    GRID_LAT_PLACE_VALUES, GRID_LON_PLACE_VALUES, MAX_CODE_LENGTH, PADDING, PAIR_CODE_LENGTH,
    PAIR_PLACE_VALUES, PAIR_PRECISION, SEPARATOR,
};
use crate::error::Result;

/// Decode a full code into the area it covers.
///
/// Short codes must go through [`super::recover_nearest`] first. Digits past
/// the fifteenth are accepted but carry no information.
pub fn decode(code: &str) -> Result<CodeArea> {
    let canonical = check_full(code)?;

    let digits: Vec<i64> = canonical
        .chars()
        .filter(|&c| c != SEPARATOR && c != PADDING)
        .filter_map(digit_value)
        .take(MAX_CODE_LENGTH)
        .collect();

    let pair_digits = digits.len().min(PAIR_CODE_LENGTH);

    // Pair stage, in 1/8000 degree units
    let mut pair_lat = -90 * PAIR_PRECISION;
    let mut pair_lon = -180 * PAIR_PRECISION;
    let mut place_value = PAIR_PLACE_VALUES[0];
    for (i, pair) in digits[..pair_digits].chunks(2).enumerate() {
        place_value = PAIR_PLACE_VALUES[i];
        pair_lat += pair[0] * place_value;
        pair_lon += pair.get(1).copied().unwrap_or_default() * place_value;
    }
    let mut lat_size = place_value as f64 / PAIR_PRECISION as f64;
    let mut lon_size = lat_size;

    // Grid stage, in final-precision units
    let mut grid_lat = 0;
    let mut grid_lon = 0;
    for (i, &digit) in digits[pair_digits..].iter().enumerate() {
        let row = digit / GRID_COLUMNS;
        let col = digit % GRID_COLUMNS;
        grid_lat += row * GRID_LAT_PLACE_VALUES[i];
        grid_lon += col * GRID_LON_PLACE_VALUES[i];
        lat_size = GRID_LAT_PLACE_VALUES[i] as f64 / FINAL_LAT_PRECISION as f64;
        lon_size = GRID_LON_PLACE_VALUES[i] as f64 / FINAL_LON_PRECISION as f64;
    }

    let lat_lo =
        pair_lat as f64 / PAIR_PRECISION as f64 + grid_lat as f64 / FINAL_LAT_PRECISION as f64;
    let lon_lo =
        pair_lon as f64 / PAIR_PRECISION as f64 + grid_lon as f64 / FINAL_LON_PRECISION as f64;

    Ok(CodeArea {
        lat_lo,
        lon_lo,
        lat_hi: lat_lo + lat_size,
        lon_hi: lon_lo + lon_size,
        code_length: digits.len(),
    })
}
