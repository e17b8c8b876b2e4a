//! Batch cleanup of transport points: de-duplicate, drop foreign entries,
//! label each point with its region, and strip points outside the country.
//!
//! The pass takes a snapshot and returns a new one. It never touches
//! storage, and running it on its own output changes nothing.

use hashbrown::HashMap;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info};

use super::RegionResolver;
use crate::models::{BoundingBox, PointKind, TransportPoint};

/// IATA/ICAO codes of airports in Djibouti, Ethiopia, and Kenya that show
/// up in Somali extracts
pub const NEIGHBOUR_AIRPORT_CODES: &[&str] = &[
    // Djibouti
    "AII", "HDAS", "OBC", "HDOB", "JIB", "HDAM", "TDJ", "HDTJ", "MHI", "HDMO", "HDDK", "HDYO",
    "HDHC", "Z09C",
    // Ethiopia
    "JIJ", "HAJJ", "DIR", "HADR", "ABK", "HAKD", "HIL", "HASL", "GDE", "HAGO", "HDAE",
    // Kenya
    "NDE", "HKMA",
];

/// Finest rounding the dedupe key supports; beyond this the scaled
/// coordinate no longer fits an `i64`
pub const MAX_DEDUPE_DECIMALS: u32 = 9;

pub fn default_excluded_codes() -> Vec<String> {
    NEIGHBOUR_AIRPORT_CODES.iter().map(|c| c.to_string()).collect()
}

/// Tunables for [`CleanupPass`]
#[derive(Debug, Clone)]
pub struct CleanupConfig {
    /// Coarse country box; points outside it and outside every region are removed
    pub country_bbox: BoundingBox,
    /// IATA/ICAO codes known to belong to neighbouring countries
    pub excluded_codes: Vec<String>,
    /// Decimal places used to detect duplicate coordinates (4 ≈ 11 m),
    /// capped at [`MAX_DEDUPE_DECIMALS`]
    pub dedupe_decimals: u32,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            country_bbox: BoundingBox::somalia(),
            excluded_codes: default_excluded_codes(),
            dedupe_decimals: 4,
        }
    }
}

/// Why a point was dropped
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum RemovalReason {
    /// Another point shares the same rounded coordinate
    Duplicate { kept_id: String },
    /// Carries a code from the exclusion list
    ExcludedCode { code: String },
    /// Matches no region and lies outside the country box
    OutsideCountry,
}

#[derive(Debug, Clone, Serialize)]
pub struct RemovedPoint {
    pub point: TransportPoint,
    pub reason: RemovalReason,
}

/// Output of a cleanup run: labeled survivors and removed points, both in
/// input order
#[derive(Debug, Default, Serialize)]
pub struct CleanupReport {
    pub kept: Vec<TransportPoint>,
    pub removed: Vec<RemovedPoint>,
}

impl CleanupReport {
    /// Number of removed points with a matching reason
    pub fn count_removed(&self, matches: impl Fn(&RemovalReason) -> bool) -> usize {
        self.removed.iter().filter(|r| matches(&r.reason)).count()
    }

    /// Kept points that fell in no region
    pub fn unlabeled(&self) -> usize {
        self.kept.iter().filter(|p| p.region.is_none()).count()
    }
}

/// One-shot labeling pass over a transport point snapshot
pub struct CleanupPass<'a> {
    resolver: &'a RegionResolver,
    config: CleanupConfig,
}

impl<'a> CleanupPass<'a> {
    pub fn new(resolver: &'a RegionResolver, config: CleanupConfig) -> Self {
        Self { resolver, config }
    }

    pub fn run(&self, points: Vec<TransportPoint>) -> CleanupReport {
        info!("Cleaning {} transport points...", points.len());

        let mut report = CleanupReport::default();

        let unique = self.dedupe(points, &mut report.removed);
        let allowed = self.drop_excluded(unique, &mut report.removed);

        // Labelling has no cross-point state
        let labeled: Vec<TransportPoint> = allowed
            .into_par_iter()
            .map(|mut point| {
                point.region = self
                    .resolver
                    .resolve(&point.coordinate)
                    .map(|r| r.name.clone());
                point
            })
            .collect();

        for point in labeled {
            if point.region.is_none() && !self.config.country_bbox.contains(&point.coordinate) {
                debug!("Removing {} ({}) - outside country", point.name, point.coordinate);
                report.removed.push(RemovedPoint {
                    point,
                    reason: RemovalReason::OutsideCountry,
                });
            } else {
                report.kept.push(point);
            }
        }

        info!(
            "Cleanup complete: {} kept ({} unlabeled), {} removed",
            report.kept.len(),
            report.unlabeled(),
            report.removed.len()
        );

        report
    }

    /// Keep one point per kind and rounded coordinate, preferring one with
    /// an IATA/ICAO code, else the first seen
    fn dedupe(
        &self,
        points: Vec<TransportPoint>,
        removed: &mut Vec<RemovedPoint>,
    ) -> Vec<TransportPoint> {
        let decimals = self.config.dedupe_decimals.min(MAX_DEDUPE_DECIMALS);
        let scale = 10f64.powi(decimals as i32);
        let key = |p: &TransportPoint| {
            (
                p.kind,
                (p.coordinate.lat() * scale).round() as i64,
                (p.coordinate.lon() * scale).round() as i64,
            )
        };

        let mut chosen: HashMap<(PointKind, i64, i64), usize> = HashMap::new();
        for (i, point) in points.iter().enumerate() {
            chosen
                .entry(key(point))
                .and_modify(|current| {
                    if !points[*current].has_code() && point.has_code() {
                        *current = i;
                    }
                })
                .or_insert(i);
        }

        let kept_ids: HashMap<(PointKind, i64, i64), String> = chosen
            .iter()
            .map(|(k, &i)| (*k, points[i].id.clone()))
            .collect();

        let mut unique = Vec::with_capacity(chosen.len());
        for (i, point) in points.into_iter().enumerate() {
            let k = key(&point);
            if chosen.get(&k) == Some(&i) {
                unique.push(point);
            } else {
                let kept_id = kept_ids.get(&k).cloned().unwrap_or_default();
                debug!("Removing {} - duplicate of {}", point.name, kept_id);
                removed.push(RemovedPoint {
                    point,
                    reason: RemovalReason::Duplicate { kept_id },
                });
            }
        }
        unique
    }

    fn drop_excluded(
        &self,
        points: Vec<TransportPoint>,
        removed: &mut Vec<RemovedPoint>,
    ) -> Vec<TransportPoint> {
        let mut allowed = Vec::with_capacity(points.len());
        for point in points {
            let excluded = point
                .codes()
                .find(|code| {
                    self.config
                        .excluded_codes
                        .iter()
                        .any(|x| x.eq_ignore_ascii_case(code))
                })
                .map(str::to_string);

            match excluded {
                Some(code) => {
                    debug!("Removing {} ({}) - neighbouring country", point.name, code);
                    removed.push(RemovedPoint {
                        point,
                        reason: RemovalReason::ExcludedCode { code },
                    });
                }
                None => allowed.push(point),
            }
        }
        allowed
    }
}
