//! Structural checks on code strings.

use super::{
    digit_value, ENCODING_BASE, MAX_CODE_LENGTH, PADDING, PAIR_CODE_LENGTH, SEPARATOR,
    SEPARATOR_POSITION,
};
use crate::error::{GeoError, Result};

/// Whether `len` is a code length [`super::encode`] accepts.
///
/// The pair stage only produces whole pairs, so lengths below 10 must be
/// even; the grid stage adds one digit at a time up to 15.
pub fn is_valid_length(len: usize) -> bool {
    match len {
        2 | 4 | 6 | 8 => true,
        l => (PAIR_CODE_LENGTH..=MAX_CODE_LENGTH).contains(&l),
    }
}

/// Check the layout of a code (full or short), returning the separator index.
pub(crate) fn check(code: &str) -> Result<usize> {
    let fail = |reason: &str| GeoError::malformed(code, reason);

    if code.len() < 2 {
        return Err(fail("code is too short"));
    }

    if let Some(bad) = code
        .chars()
        .find(|&c| c != SEPARATOR && c != PADDING && digit_value(c).is_none())
    {
        return Err(fail(&format!("invalid character '{}'", bad)));
    }

    if code.matches(SEPARATOR).count() != 1 {
        return Err(fail("code must contain exactly one separator"));
    }

    // Only ASCII characters survive the alphabet check, so byte offsets are
    // character offsets from here on.
    let sep = code.find(SEPARATOR).unwrap_or_default();
    if sep > SEPARATOR_POSITION || sep % 2 == 1 {
        return Err(fail("separator is in the wrong position"));
    }

    if let Some(pad) = code.find(PADDING) {
        if sep < SEPARATOR_POSITION {
            return Err(fail("short codes cannot contain padding"));
        }
        if pad == 0 {
            return Err(fail("code cannot start with padding"));
        }
        let rpad = code.rfind(PADDING).map_or(pad, |p| p + 1);
        let run = &code[pad..rpad];
        if run.len() % 2 == 1 || run.chars().any(|c| c != PADDING) {
            return Err(fail("padding must be a single run of an even number of zeros"));
        }
        if !code.ends_with(SEPARATOR) {
            return Err(fail("padded codes cannot have digits after the separator"));
        }
    }

    if code.len() - sep - 1 == 1 {
        return Err(fail("a single digit after the separator is not allowed"));
    }

    Ok(sep)
}

/// Check that `code` is a full code and return it upper-cased.
pub(crate) fn check_full(code: &str) -> Result<String> {
    let sep = check(code)?;
    if sep < SEPARATOR_POSITION {
        return Err(GeoError::malformed(
            code,
            "short codes must be recovered against a reference location first",
        ));
    }

    let mut chars = code.chars();
    let first_lat = chars.next().and_then(digit_value).unwrap_or_default();
    if first_lat * ENCODING_BASE >= 180 {
        return Err(GeoError::malformed(code, "latitude is out of range"));
    }
    let first_lon = chars.next().and_then(digit_value).unwrap_or_default();
    if first_lon * ENCODING_BASE >= 360 {
        return Err(GeoError::malformed(code, "longitude is out of range"));
    }

    Ok(code.to_ascii_uppercase())
}

pub fn is_valid(code: &str) -> bool {
    check(code).is_ok()
}

/// Valid code with digits missing from the front (separator before
/// position 8)
pub fn is_short(code: &str) -> bool {
    matches!(check(code), Ok(sep) if sep < SEPARATOR_POSITION)
}

pub fn is_full(code: &str) -> bool {
    check_full(code).is_ok()
}

/// Canonical form used for comparisons: trimmed and upper-cased
pub fn canonicalize(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

/// Codes are equal when their canonical forms are
pub fn codes_equal(a: &str, b: &str) -> bool {
    canonicalize(a) == canonicalize(b)
}
