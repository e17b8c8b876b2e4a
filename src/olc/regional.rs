//! Location codes carrying a region prefix, e.g. `SOM-BNR:6HJ728MC+P2`.

use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use super::{canonicalize, decode, is_valid, CodeArea};
use crate::error::{GeoError, Result};

const REGION_DELIMITER: char = ':';

/// A location code with an optional region label in front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionalCode {
    pub region: Option<String>,
    pub code: String,
}

impl RegionalCode {
    pub fn new(region: Option<String>, code: impl Into<String>) -> Self {
        Self {
            region,
            code: canonicalize(&code.into()),
        }
    }

    /// Decode the location code part; the prefix is informational only
    pub fn decode(&self) -> Result<CodeArea> {
        decode(&self.code)
    }
}

impl FromStr for RegionalCode {
    type Err = GeoError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let (region, code) = match s.split_once(REGION_DELIMITER) {
            Some((prefix, code)) => {
                let valid_prefix = !prefix.is_empty()
                    && prefix
                        .chars()
                        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
                if !valid_prefix {
                    return Err(GeoError::malformed(s, "invalid region prefix"));
                }
                (Some(prefix.to_ascii_uppercase()), code)
            }
            None => (None, s),
        };

        if !is_valid(code) {
            return Err(GeoError::malformed(s, "invalid location code"));
        }

        Ok(Self::new(region, code))
    }
}

impl fmt::Display for RegionalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.region {
            Some(region) => write!(f, "{}{}{}", region, REGION_DELIMITER, self.code),
            None => write!(f, "{}", self.code),
        }
    }
}

impl Serialize for RegionalCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
