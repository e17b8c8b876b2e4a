//! Error types for the geospatial primitives.

use thiserror::Error;

/// Validation failures reported by the codec, distance, and search
/// operations.
///
/// Every variant describes bad caller input. None of them are retryable and
/// the HTTP layer maps all of them to `400 Bad Request`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeoError {
    /// Latitude outside [-90, 90] or longitude outside [-180, 180]
    #[error("invalid coordinate ({lat}, {lon}): latitude must be in [-90, 90], longitude in [-180, 180]")]
    InvalidCoordinate { lat: f64, lon: f64 },

    /// Code length not in the supported set
    #[error("invalid precision {0}: code length must be 2, 4, 6, 8 or 10 to 15")]
    InvalidPrecision(usize),

    /// Code that is not a valid full location code
    #[error("malformed location code '{code}': {reason}")]
    MalformedCode { code: String, reason: String },

    /// Nearest-neighbour search requested on an empty dataset
    #[error("cannot search an empty candidate set")]
    EmptyCandidateSet,

    /// Radius that is negative or not a number
    #[error("invalid search radius {0} km")]
    InvalidRadius(f64),
}

impl GeoError {
    /// Creates a malformed-code error with context
    pub fn malformed(code: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedCode {
            code: code.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GeoError>;
