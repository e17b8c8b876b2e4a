//! Transport infrastructure points and road polylines.

use geo::LineString;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::Coordinate;

/// Kind of transport point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointKind {
    Airport,
    Port,
    Checkpoint,
    /// Anything else found in the snapshot (towns, landmarks, ...)
    Place,
}

impl PointKind {
    pub fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "airport" | "aerodrome" | "airfield" => PointKind::Airport,
            "port" | "seaport" | "harbour" | "harbor" => PointKind::Port,
            "checkpoint" | "border_crossing" => PointKind::Checkpoint,
            _ => PointKind::Place,
        }
    }
}

impl fmt::Display for PointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PointKind::Airport => write!(f, "airport"),
            PointKind::Port => write!(f, "port"),
            PointKind::Checkpoint => write!(f, "checkpoint"),
            PointKind::Place => write!(f, "place"),
        }
    }
}

/// Airport, port, checkpoint or other point of interest.
///
/// `region` is filled in by the cleanup pass; query-time code only reads it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransportPoint {
    pub id: String,
    pub name: String,
    pub kind: PointKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iata_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icao_code: Option<String>,
    pub coordinate: Coordinate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

impl TransportPoint {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        kind: PointKind,
        coordinate: Coordinate,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            iata_code: None,
            icao_code: None,
            coordinate,
            region: None,
        }
    }

    /// Whether the point carries an IATA or ICAO identifier
    pub fn has_code(&self) -> bool {
        self.iata_code.is_some() || self.icao_code.is_some()
    }

    /// IATA and ICAO codes, whichever are present
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.iata_code
            .as_deref()
            .into_iter()
            .chain(self.icao_code.as_deref())
    }
}

/// A road polyline. Coordinates are (x = lon, y = lat).
#[derive(Debug, Clone)]
pub struct Road {
    pub id: String,
    pub name: String,
    /// Road class, e.g. "primary" or "secondary"
    pub kind: String,
    pub geometry: LineString<f64>,
}
