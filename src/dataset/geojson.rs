use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use geo::{Geometry, LineString, MultiPolygon, Point};
use geojson::{feature::Id, Feature, FeatureCollection, GeoJson, JsonObject, JsonValue};
use tracing::{info, warn};

use crate::models::{Coordinate, PointKind, Region, Road, TransportPoint};

fn read_collection(text: &str) -> Result<FeatureCollection> {
    let geojson: GeoJson = text.parse().context("Failed to parse GeoJSON")?;
    FeatureCollection::try_from(geojson).context("Expected a GeoJSON FeatureCollection")
}

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).context(format!("Failed to read {}", path.display()))
}

/// String property, accepting numbers as well
fn property_str(feature: &Feature, key: &str) -> Option<String> {
    match feature.property(key)? {
        JsonValue::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Feature id, falling back to an `id` property and then the position in
/// the collection
fn feature_id(feature: &Feature, index: usize) -> String {
    match &feature.id {
        Some(Id::String(s)) => s.clone(),
        Some(Id::Number(n)) => n.to_string(),
        None => property_str(feature, "id").unwrap_or_else(|| index.to_string()),
    }
}

fn feature_geometry(feature: &Feature) -> Option<Geometry<f64>> {
    let geometry = feature.geometry.clone()?;
    Geometry::<f64>::try_from(geometry).ok()
}

/// Parse regions from a FeatureCollection of Polygon/MultiPolygon features
/// with `name` and optional `code` properties. File order is kept.
pub fn parse_regions(text: &str) -> Result<Vec<Region>> {
    let collection = read_collection(text)?;
    let mut regions = Vec::with_capacity(collection.features.len());

    for (i, feature) in collection.features.iter().enumerate() {
        let Some(name) = property_str(feature, "name") else {
            warn!("Skipping region feature {} without a name", i);
            continue;
        };

        let geometry = match feature_geometry(feature) {
            Some(Geometry::Polygon(p)) => MultiPolygon::new(vec![p]),
            Some(Geometry::MultiPolygon(mp)) => mp,
            _ => {
                warn!("Skipping region '{}': geometry is not a polygon", name);
                continue;
            }
        };

        let open_rings = geometry
            .iter()
            .flat_map(|p| std::iter::once(p.exterior()).chain(p.interiors()))
            .filter(|ring| ring.0.len() < 4 || !ring.is_closed())
            .count();
        if open_rings > 0 {
            warn!(
                "Region '{}' has {} open or degenerate rings; containment there is unreliable",
                name, open_rings
            );
        }

        let mut region = Region::new(name, geometry);
        region.code = property_str(feature, "code");
        regions.push(region);
    }

    Ok(regions)
}

/// Parse roads from LineString/MultiLineString features.
///
/// MultiLineString parts are concatenated into one vertex list; road
/// distance only looks at vertices.
pub fn parse_roads(text: &str) -> Result<Vec<Road>> {
    let collection = read_collection(text)?;
    let mut roads = Vec::with_capacity(collection.features.len());

    for (i, feature) in collection.features.iter().enumerate() {
        let id = feature_id(feature, i);
        let geometry = match feature_geometry(feature) {
            Some(Geometry::LineString(line)) => line,
            Some(Geometry::MultiLineString(lines)) => {
                LineString::new(lines.into_iter().flat_map(|l| l.0).collect())
            }
            _ => {
                warn!("Skipping road {}: geometry is not a line", id);
                continue;
            }
        };

        roads.push(Road {
            name: property_str(feature, "name").unwrap_or_else(|| id.clone()),
            kind: property_str(feature, "type").unwrap_or_else(|| "unknown".to_string()),
            id,
            geometry,
        });
    }

    Ok(roads)
}

/// Parse transport points from Point features
pub fn parse_points(text: &str) -> Result<Vec<TransportPoint>> {
    let collection = read_collection(text)?;
    let mut points = Vec::with_capacity(collection.features.len());

    for (i, feature) in collection.features.iter().enumerate() {
        let id = feature_id(feature, i);
        let coordinate = match feature_geometry(feature) {
            Some(Geometry::Point(p)) => match Coordinate::new(p.y(), p.x()) {
                Ok(c) => c,
                Err(e) => {
                    warn!("Skipping point {}: {}", id, e);
                    continue;
                }
            },
            _ => {
                warn!("Skipping point {}: geometry is not a point", id);
                continue;
            }
        };

        let kind = property_str(feature, "type")
            .map(|t| PointKind::parse(&t))
            .unwrap_or(PointKind::Place);

        points.push(TransportPoint {
            name: property_str(feature, "name").unwrap_or_else(|| id.clone()),
            kind,
            iata_code: property_str(feature, "iata_code"),
            icao_code: property_str(feature, "icao_code"),
            region: property_str(feature, "region"),
            coordinate,
            id,
        });
    }

    Ok(points)
}

pub fn load_regions(path: &Path) -> Result<Vec<Region>> {
    let regions = parse_regions(&read_file(path)?)?;
    info!("Loaded {} regions from {}", regions.len(), path.display());
    Ok(regions)
}

pub fn load_roads(path: &Path) -> Result<Vec<Road>> {
    let roads = parse_roads(&read_file(path)?)?;
    info!("Loaded {} roads from {}", roads.len(), path.display());
    Ok(roads)
}

pub fn load_points(path: &Path) -> Result<Vec<TransportPoint>> {
    let points = parse_points(&read_file(path)?)?;
    info!("Loaded {} transport points from {}", points.len(), path.display());
    Ok(points)
}

/// GeoJSON Point feature for a transport point
pub fn point_feature(point: &TransportPoint) -> Feature {
    let mut properties = JsonObject::new();
    properties.insert("name".to_string(), JsonValue::from(point.name.clone()));
    properties.insert("type".to_string(), JsonValue::from(point.kind.to_string()));
    if let Some(iata) = &point.iata_code {
        properties.insert("iata_code".to_string(), JsonValue::from(iata.clone()));
    }
    if let Some(icao) = &point.icao_code {
        properties.insert("icao_code".to_string(), JsonValue::from(icao.clone()));
    }
    if let Some(region) = &point.region {
        properties.insert("region".to_string(), JsonValue::from(region.clone()));
    }

    let location = Point::new(point.coordinate.lon(), point.coordinate.lat());
    Feature {
        bbox: None,
        geometry: Some(geojson::Geometry::new(geojson::Value::from(&location))),
        id: Some(Id::String(point.id.clone())),
        properties: Some(properties),
        foreign_members: None,
    }
}

pub fn points_to_collection(points: &[TransportPoint]) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features: points.iter().map(point_feature).collect(),
        foreign_members: None,
    }
}

/// Write transport points as a GeoJSON FeatureCollection
pub fn write_points(path: &Path, points: &[TransportPoint]) -> Result<()> {
    let file = File::create(path).context(format!("Failed to create file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &points_to_collection(points))?;
    writer.flush()?;
    info!("Wrote {} transport points to {}", points.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const REGIONS: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {"name": "Banadir", "code": "SOM-BNR"},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[45.0, 1.8], [45.6, 1.8], [45.6, 2.2], [45.0, 2.2], [45.0, 1.8]]]
                }
            },
            {
                "type": "Feature",
                "properties": {"name": "Bari"},
                "geometry": {
                    "type": "MultiPolygon",
                    "coordinates": [
                        [[[48.0, 9.0], [51.0, 9.0], [51.0, 12.0], [48.0, 12.0], [48.0, 9.0]]],
                        [[[53.0, 12.0], [54.0, 12.0], [54.0, 13.0], [53.0, 12.0]]]
                    ]
                }
            },
            {
                "type": "Feature",
                "properties": {"code": "SOM-XX"},
                "geometry": {"type": "Point", "coordinates": [45.0, 2.0]}
            }
        ]
    }"#;

    const POINTS: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "id": "mgq",
                "properties": {"name": "Aden Adde International", "type": "airport", "iata_code": "MGQ", "icao_code": "HCMM"},
                "geometry": {"type": "Point", "coordinates": [45.3047, 2.0144]}
            },
            {
                "type": "Feature",
                "properties": {"id": 7, "name": "Berbera Port", "type": "port"},
                "geometry": {"type": "Point", "coordinates": [45.0143, 10.4396]}
            },
            {
                "type": "Feature",
                "properties": {"name": "Broken"},
                "geometry": {"type": "Point", "coordinates": [245.0, 2.0]}
            }
        ]
    }"#;

    const ROADS: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "id": 10,
                "properties": {"name": "Mogadishu - Afgooye", "type": "primary"},
                "geometry": {"type": "LineString", "coordinates": [[45.3182, 2.0469], [45.1214, 2.1381]]}
            },
            {
                "type": "Feature",
                "properties": {"name": "Split road"},
                "geometry": {
                    "type": "MultiLineString",
                    "coordinates": [[[44.0, 9.0], [44.1, 9.1]], [[44.2, 9.2], [44.3, 9.3]]]
                }
            }
        ]
    }"#;

    #[test]
    fn test_parse_regions() {
        let regions = parse_regions(REGIONS).unwrap();
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].name, "Banadir");
        assert_eq!(regions[0].code.as_deref(), Some("SOM-BNR"));
        assert_eq!(regions[0].geometry.0.len(), 1);
        assert_eq!(regions[1].name, "Bari");
        assert!(regions[1].code.is_none());
        assert_eq!(regions[1].geometry.0.len(), 2);
    }

    #[test]
    fn test_parse_points() {
        let points = parse_points(POINTS).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].id, "mgq");
        assert_eq!(points[0].kind, PointKind::Airport);
        assert_eq!(points[0].iata_code.as_deref(), Some("MGQ"));
        assert!((points[0].coordinate.lat() - 2.0144).abs() < 1e-12);
        assert!((points[0].coordinate.lon() - 45.3047).abs() < 1e-12);
        assert_eq!(points[1].id, "7");
        assert_eq!(points[1].kind, PointKind::Port);
    }

    #[test]
    fn test_parse_roads() {
        let roads = parse_roads(ROADS).unwrap();
        assert_eq!(roads.len(), 2);
        assert_eq!(roads[0].id, "10");
        assert_eq!(roads[0].kind, "primary");
        // No id anywhere: position in the collection
        assert_eq!(roads[1].id, "1");
        assert_eq!(roads[1].kind, "unknown");
        assert_eq!(roads[1].geometry.0.len(), 4);
    }

    #[test]
    fn test_rejects_non_collection() {
        assert!(parse_points(r#"{"type": "Point", "coordinates": [1.0, 2.0]}"#).is_err());
        assert!(parse_points("not json").is_err());
    }

    #[test]
    fn test_write_and_reload_points() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("points.geojson");

        let mut points = parse_points(POINTS).unwrap();
        points[0].region = Some("Banadir".to_string());
        write_points(&path, &points).unwrap();

        let reloaded = load_points(&path).unwrap();
        assert_eq!(reloaded.len(), points.len());
        for (a, b) in reloaded.iter().zip(&points) {
            assert_eq!(a.id, b.id);
            assert_eq!(a.kind, b.kind);
            assert_eq!(a.iata_code, b.iata_code);
            assert_eq!(a.region, b.region);
            assert!((a.coordinate.lat() - b.coordinate.lat()).abs() < 1e-12);
            assert!((a.coordinate.lon() - b.coordinate.lon()).abs() < 1e-12);
        }
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_regions(Path::new("/nonexistent/regions.geojson")).unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }
}
