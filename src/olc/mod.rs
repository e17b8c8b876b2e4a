//! Open Location Code grid codec.
//!
//! A code is up to five pairs of base-20 digits (latitude, longitude) that
//! successively divide a 20°×20° cell by 20 on each axis, optionally followed
//! by up to five grid digits that divide the remaining cell into 4 columns by
//! 5 rows. A `+` separator always follows the eighth digit; codes shorter than
//! eight digits are right-padded with `0` up to the separator.
//!
//! All arithmetic happens on integers at the finest grid resolution, so the
//! output matches the reference Open Location Code implementation digit for
//! digit.

mod area;
mod decode;
mod encode;
mod regional;
mod short;
mod validate;

pub use area::CodeArea;
pub use decode::decode;
pub use encode::{encode, encode_lat_lon};
pub use regional::RegionalCode;
pub use short::{recover_nearest, shorten};
pub use validate::{canonicalize, codes_equal, is_full, is_short, is_valid, is_valid_length};

/// Digits used in codes, chosen to avoid spelling words and look-alike
/// characters.
pub(crate) const ALPHABET: &[u8; 20] = b"23456789CFGHJMPQRVWX";

pub const SEPARATOR: char = '+';
/// Number of digits before the separator
pub const SEPARATOR_POSITION: usize = 8;
pub const PADDING: char = '0';

/// Code length used when the caller does not ask for one (~14 m cells)
pub const DEFAULT_CODE_LENGTH: usize = 10;
/// Longest code that carries information; further digits are ignored
pub const MAX_CODE_LENGTH: usize = 15;
/// Digits covered by the 20×20 pair stage
pub(crate) const PAIR_CODE_LENGTH: usize = 10;
/// Codes shorter than this cannot be shortened
pub(crate) const MIN_TRIMMABLE_CODE_LEN: usize = 6;

pub(crate) const ENCODING_BASE: i64 = 20;
pub(crate) const GRID_COLUMNS: i64 = 4;
pub(crate) const GRID_ROWS: i64 = 5;

/// Place value of each pair digit in units of 1/8000 degree
pub(crate) const PAIR_PLACE_VALUES: [i64; 5] = [160_000, 8_000, 400, 20, 1];
pub(crate) const PAIR_PRECISION: i64 = 8_000;

/// Place value of each grid digit in final-precision units
pub(crate) const GRID_LAT_PLACE_VALUES: [i64; 5] = [625, 125, 25, 5, 1];
pub(crate) const GRID_LON_PLACE_VALUES: [i64; 5] = [256, 64, 16, 4, 1];

/// Integer units per degree at full code length
pub(crate) const FINAL_LAT_PRECISION: i64 = PAIR_PRECISION * 3_125; // 5^5
pub(crate) const FINAL_LON_PRECISION: i64 = PAIR_PRECISION * 1_024; // 4^5

/// Cell size in degrees after each pair, used when shortening
pub(crate) const PAIR_RESOLUTIONS: [f64; 5] = [20.0, 1.0, 0.05, 0.0025, 0.000125];

/// Value of an alphabet character, case-insensitive
pub(crate) fn digit_value(c: char) -> Option<i64> {
    let upper = c.to_ascii_uppercase() as u32;
    ALPHABET
        .iter()
        .position(|&a| a as u32 == upper)
        .map(|p| p as i64)
}
