use geo::{BoundingRect, LineString};
use serde::Serialize;
use std::cmp::Ordering;

use crate::distance::{destination_bbox, haversine_km};
use crate::error::{GeoError, Result};
use crate::models::{BoundingBox, Coordinate};

/// A search result: candidate id and its distance from the query center
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hit<I> {
    pub id: I,
    pub distance_km: f64,
}

/// Ascending distance, ties broken by id so output is deterministic
fn by_distance_then_id<I: Ord>(a: &Hit<I>, b: &Hit<I>) -> Ordering {
    a.distance_km
        .total_cmp(&b.distance_km)
        .then_with(|| a.id.cmp(&b.id))
}

fn check_radius(radius_km: f64) -> Result<()> {
    if radius_km.is_nan() || radius_km < 0.0 {
        return Err(GeoError::InvalidRadius(radius_km));
    }
    Ok(())
}

/// All candidates within `radius_km` (inclusive) of `center`, nearest first.
pub fn within_radius<I, C>(
    center: &Coordinate,
    radius_km: f64,
    candidates: C,
) -> Result<Vec<Hit<I>>>
where
    I: Ord,
    C: IntoIterator<Item = (I, Coordinate)>,
{
    check_radius(radius_km)?;
    let bbox = destination_bbox(center, radius_km);

    let mut hits: Vec<Hit<I>> = candidates
        .into_iter()
        .filter(|(_, coord)| bbox.map_or(true, |b| b.contains(coord)))
        .filter_map(|(id, coord)| {
            let distance_km = haversine_km(center, &coord);
            (distance_km <= radius_km).then_some(Hit { id, distance_km })
        })
        .collect();

    hits.sort_by(by_distance_then_id);
    Ok(hits)
}

/// Distance from `center` to the nearest vertex of `line`.
///
/// `None` when the line has no valid vertex.
pub fn polyline_distance_km(center: &Coordinate, line: &LineString<f64>) -> Option<f64> {
    line.coords()
        .filter_map(|c| Coordinate::from_geo(*c).ok())
        .map(|vertex| haversine_km(center, &vertex))
        .min_by(f64::total_cmp)
}

fn may_reach(line: &LineString<f64>, bbox: &BoundingBox) -> bool {
    match line.bounding_rect() {
        Some(rect) => {
            rect.min().x <= bbox.max_lon
                && rect.max().x >= bbox.min_lon
                && rect.min().y <= bbox.max_lat
                && rect.max().y >= bbox.min_lat
        }
        None => false,
    }
}

/// Polylines with at least one vertex within `radius_km`, nearest first.
pub fn within_radius_polylines<'a, I, C>(
    center: &Coordinate,
    radius_km: f64,
    candidates: C,
) -> Result<Vec<Hit<I>>>
where
    I: Ord,
    C: IntoIterator<Item = (I, &'a LineString<f64>)>,
{
    check_radius(radius_km)?;
    let bbox = destination_bbox(center, radius_km);

    let mut hits: Vec<Hit<I>> = candidates
        .into_iter()
        .filter(|(_, line)| bbox.as_ref().map_or(true, |b| may_reach(line, b)))
        .filter_map(|(id, line)| {
            let distance_km = polyline_distance_km(center, line)?;
            (distance_km <= radius_km).then_some(Hit { id, distance_km })
        })
        .collect();

    hits.sort_by(by_distance_then_id);
    Ok(hits)
}

fn take_nearest<I: Ord>(mut hits: Vec<Hit<I>>, k: usize) -> Vec<Hit<I>> {
    if hits.len() > k {
        if k > 0 {
            hits.select_nth_unstable_by(k - 1, by_distance_then_id);
        }
        hits.truncate(k);
    }
    hits.sort_by(by_distance_then_id);
    hits
}

/// The `k` candidates closest to `center`.
///
/// Returns fewer than `k` hits when there are fewer candidates. Fails with
/// [`GeoError::EmptyCandidateSet`] only when `k > 0` and there is nothing to
/// search.
pub fn nearest<I, C>(center: &Coordinate, candidates: C, k: usize) -> Result<Vec<Hit<I>>>
where
    I: Ord,
    C: IntoIterator<Item = (I, Coordinate)>,
{
    let hits: Vec<Hit<I>> = candidates
        .into_iter()
        .map(|(id, coord)| Hit {
            id,
            distance_km: haversine_km(center, &coord),
        })
        .collect();

    if hits.is_empty() && k > 0 {
        return Err(GeoError::EmptyCandidateSet);
    }
    Ok(take_nearest(hits, k))
}

/// The `k` polylines with the closest vertex to `center`.
pub fn nearest_polylines<'a, I, C>(
    center: &Coordinate,
    candidates: C,
    k: usize,
) -> Result<Vec<Hit<I>>>
where
    I: Ord,
    C: IntoIterator<Item = (I, &'a LineString<f64>)>,
{
    let mut seen = 0usize;
    let hits: Vec<Hit<I>> = candidates
        .into_iter()
        .inspect(|_| seen += 1)
        .filter_map(|(id, line)| {
            polyline_distance_km(center, line).map(|distance_km| Hit { id, distance_km })
        })
        .collect();

    if seen == 0 && k > 0 {
        return Err(GeoError::EmptyCandidateSet);
    }
    Ok(take_nearest(hits, k))
}
