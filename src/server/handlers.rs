//! Request handlers and their query/response types.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use geojson::{FeatureCollection, JsonValue};
use serde::{Deserialize, Serialize};
use tracing::debug;

use somgeo::config::Config;
use somgeo::dataset::point_feature;
use somgeo::olc::{self, CodeArea, RegionalCode};
use somgeo::pip::RegionResolver;
use somgeo::search::{within_radius, within_radius_polylines};
use somgeo::{Coordinate, GeoError, Region, Road, TransportPoint};

/// Nearby results returned when the request has no `limit`
const DEFAULT_LIMIT: usize = 20;

/// Application state shared across handlers
pub struct AppState {
    pub config: Config,
    pub resolver: RegionResolver,
    pub roads: Vec<Road>,
    pub points: Vec<TransportPoint>,
}

/// Validation failure rendered as `400 {"error": "..."}`
#[derive(Debug)]
pub struct ApiError(GeoError);

impl From<GeoError> for ApiError {
    fn from(err: GeoError) -> Self {
        Self(err)
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        debug!("Rejected request: {}", self.0);
        let body = ErrorBody {
            error: self.0.to_string(),
        };
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

/// Radius accepted by the nearby endpoints
fn checked_radius(radius_km: f64, max_radius_km: f64) -> Result<f64, GeoError> {
    if radius_km.is_nan() || radius_km < 0.0 || radius_km > max_radius_km {
        return Err(GeoError::InvalidRadius(radius_km));
    }
    Ok(radius_km)
}

fn capped_limit(limit: Option<usize>, max_results: usize) -> usize {
    limit.unwrap_or(DEFAULT_LIMIT).min(max_results)
}

#[derive(Serialize)]
pub struct RegionInfo {
    name: String,
    code: Option<String>,
}

impl From<&Region> for RegionInfo {
    fn from(region: &Region) -> Self {
        Self {
            name: region.name.clone(),
            code: region.code.clone(),
        }
    }
}

/// Health check endpoint
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        regions: state.resolver.index().len(),
        roads: state.roads.len(),
        points: state.points.len(),
    })
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    regions: usize,
    roads: usize,
    points: usize,
}

#[derive(Deserialize)]
pub struct GenerateParams {
    lat: f64,
    lon: f64,
    /// Code length, defaults to the configured length
    length: Option<usize>,
}

#[derive(Serialize)]
pub struct GenerateResponse {
    code: String,
    latitude_center: f64,
    longitude_center: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    region_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    region_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    regional_code: Option<RegionalCode>,
}

/// Encode a coordinate, labelled with its region when one contains it
pub async fn generate(
    State(state): State<Arc<AppState>>,
    Query(params): Query<GenerateParams>,
) -> ApiResult<GenerateResponse> {
    let coord = Coordinate::new(params.lat, params.lon)?;
    let length = params
        .length
        .unwrap_or(state.config.server.default_code_length);

    let code = olc::encode(coord, length)?;
    let area = olc::decode(&code)?;
    let region = state.resolver.resolve(&coord);

    let region_code = region.and_then(|r| r.code.clone());
    let regional_code = region_code
        .clone()
        .map(|prefix| RegionalCode::new(Some(prefix), code.clone()));

    Ok(Json(GenerateResponse {
        latitude_center: area.lat_center(),
        longitude_center: area.lon_center(),
        region_code,
        region_name: region.map(|r| r.name.clone()),
        regional_code,
        code,
    }))
}

#[derive(Deserialize)]
pub struct CodeParams {
    /// Plain code or `REGION:CODE`
    code: String,
}

#[derive(Serialize)]
pub struct ResolveResponse {
    code: String,
    latitude_center: f64,
    longitude_center: f64,
    latitude_lo: f64,
    latitude_hi: f64,
    longitude_lo: f64,
    longitude_hi: f64,
    code_length: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    region_code: Option<String>,
}

impl ResolveResponse {
    fn new(code: String, area: &CodeArea, region_code: Option<String>) -> Self {
        Self {
            code,
            latitude_center: area.lat_center(),
            longitude_center: area.lon_center(),
            latitude_lo: area.lat_lo,
            latitude_hi: area.lat_hi,
            longitude_lo: area.lon_lo,
            longitude_hi: area.lon_hi,
            code_length: area.code_length,
            region_code,
        }
    }
}

/// Decode a full code, with or without a region prefix.
///
/// Without a prefix the region is looked up from the cell center.
pub async fn resolve(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CodeParams>,
) -> ApiResult<ResolveResponse> {
    let parsed: RegionalCode = params.code.parse()?;
    let area = parsed.decode()?;

    let region_code = parsed.region.clone().or_else(|| {
        state
            .resolver
            .resolve(&area.center())
            .and_then(|r| r.code.clone())
    });

    Ok(Json(ResolveResponse::new(parsed.code, &area, region_code)))
}

#[derive(Deserialize)]
pub struct ReferenceParams {
    code: String,
    lat: f64,
    lon: f64,
}

#[derive(Serialize)]
pub struct ShortCodeResponse {
    code: String,
    short_code: String,
}

/// Shorten a full code relative to a nearby reference point
pub async fn shorten(Query(params): Query<ReferenceParams>) -> ApiResult<ShortCodeResponse> {
    let reference = Coordinate::new(params.lat, params.lon)?;
    let short_code = olc::shorten(&params.code, reference)?;
    Ok(Json(ShortCodeResponse {
        code: olc::canonicalize(&params.code),
        short_code,
    }))
}

/// Recover the full code nearest a reference point
pub async fn recover(Query(params): Query<ReferenceParams>) -> ApiResult<ShortCodeResponse> {
    let reference = Coordinate::new(params.lat, params.lon)?;
    let code = olc::recover_nearest(&params.code, reference)?;
    Ok(Json(ShortCodeResponse {
        code,
        short_code: olc::canonicalize(&params.code),
    }))
}

#[derive(Deserialize)]
pub struct PointParams {
    lat: f64,
    lon: f64,
}

#[derive(Serialize)]
pub struct RegionLookupResponse {
    region: Option<RegionInfo>,
}

pub async fn region_lookup(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PointParams>,
) -> ApiResult<RegionLookupResponse> {
    let coord = Coordinate::new(params.lat, params.lon)?;
    let region = state
        .resolver
        .resolve_reporting_overlaps(&coord)
        .map(RegionInfo::from);
    Ok(Json(RegionLookupResponse { region }))
}

#[derive(Deserialize)]
pub struct NearbyParams {
    lat: f64,
    lon: f64,
    radius_km: f64,
    limit: Option<usize>,
}

#[derive(Serialize)]
pub struct NearbyRoad {
    id: String,
    name: String,
    #[serde(rename = "type")]
    kind: String,
    distance_km: f64,
}

#[derive(Serialize)]
pub struct RoadsNearbyResponse {
    /// Distances are to the closest vertex, not the closest segment point
    approximate: bool,
    roads: Vec<NearbyRoad>,
}

pub async fn roads_nearby(
    State(state): State<Arc<AppState>>,
    Query(params): Query<NearbyParams>,
) -> ApiResult<RoadsNearbyResponse> {
    let center = Coordinate::new(params.lat, params.lon)?;
    let radius_km = checked_radius(params.radius_km, state.config.server.max_radius_km)?;
    let limit = capped_limit(params.limit, state.config.server.max_results);

    let candidates = state
        .roads
        .iter()
        .enumerate()
        .map(|(i, road)| (i, &road.geometry));
    let hits = within_radius_polylines(&center, radius_km, candidates)?;

    let roads = hits
        .into_iter()
        .take(limit)
        .map(|hit| {
            let road = &state.roads[hit.id];
            NearbyRoad {
                id: road.id.clone(),
                name: road.name.clone(),
                kind: road.kind.clone(),
                distance_km: hit.distance_km,
            }
        })
        .collect();

    Ok(Json(RoadsNearbyResponse {
        approximate: true,
        roads,
    }))
}

/// Transport points within the radius as GeoJSON features with a
/// `distance_km` property
pub async fn places_nearby(
    State(state): State<Arc<AppState>>,
    Query(params): Query<NearbyParams>,
) -> ApiResult<FeatureCollection> {
    let center = Coordinate::new(params.lat, params.lon)?;
    let radius_km = checked_radius(params.radius_km, state.config.server.max_radius_km)?;
    let limit = capped_limit(params.limit, state.config.server.max_results);

    let candidates = state
        .points
        .iter()
        .enumerate()
        .map(|(i, point)| (i, point.coordinate));
    let hits = within_radius(&center, radius_km, candidates)?;

    let features = hits
        .into_iter()
        .take(limit)
        .map(|hit| {
            let mut feature = point_feature(&state.points[hit.id]);
            feature.set_property("distance_km", JsonValue::from(hit.distance_km));
            feature
        })
        .collect();

    Ok(Json(FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{LineString, MultiPolygon, Polygon};
    use somgeo::PointKind;

    fn banadir() -> Region {
        let ring = LineString::from(vec![
            (45.0, 1.8),
            (45.6, 1.8),
            (45.6, 2.2),
            (45.0, 2.2),
            (45.0, 1.8),
        ]);
        Region::new("Banadir", MultiPolygon::new(vec![Polygon::new(ring, vec![])]))
            .with_code("SOM-BNR")
    }

    fn point(id: &str, name: &str, kind: PointKind, lat: f64, lon: f64) -> TransportPoint {
        TransportPoint::new(id, name, kind, Coordinate::new(lat, lon).unwrap())
    }

    fn state() -> Arc<AppState> {
        let roads = vec![Road {
            id: "r1".to_string(),
            name: "Maka Al Mukarama".to_string(),
            kind: "primary".to_string(),
            geometry: LineString::from(vec![(45.3182, 2.0469), (45.30, 2.05)]),
        }];
        let points = vec![
            point("afgooye", "Afgooye", PointKind::Place, 2.1402, 45.1201),
            point("mgq", "Aden Adde International", PointKind::Airport, 2.0144, 45.3047),
            point("villa", "Villa Somalia", PointKind::Place, 2.0343, 45.3201),
        ];
        Arc::new(AppState {
            config: Config::default(),
            resolver: RegionResolver::from_regions(vec![banadir()]),
            roads,
            points,
        })
    }

    #[test]
    fn test_checked_radius() {
        assert_eq!(checked_radius(5.0, 500.0), Ok(5.0));
        assert_eq!(checked_radius(0.0, 500.0), Ok(0.0));
        assert!(matches!(
            checked_radius(-1.0, 500.0),
            Err(GeoError::InvalidRadius(_))
        ));
        assert!(checked_radius(f64::NAN, 500.0).is_err());
        assert!(checked_radius(501.0, 500.0).is_err());
    }

    #[test]
    fn test_capped_limit() {
        assert_eq!(capped_limit(None, 100), DEFAULT_LIMIT);
        assert_eq!(capped_limit(Some(5), 100), 5);
        assert_eq!(capped_limit(Some(1000), 100), 100);
    }

    #[test]
    fn test_error_is_bad_request() {
        let response = ApiError::from(GeoError::InvalidPrecision(9)).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_generate_in_region() {
        let params = GenerateParams {
            lat: 2.0343,
            lon: 45.3201,
            length: None,
        };
        let Json(body) = generate(State(state()), Query(params)).await.unwrap();
        assert_eq!(body.code, "6HJ728MC+P2");
        assert_eq!(body.region_name.as_deref(), Some("Banadir"));
        assert_eq!(body.region_code.as_deref(), Some("SOM-BNR"));
        assert_eq!(
            body.regional_code.map(|c| c.to_string()).as_deref(),
            Some("SOM-BNR:6HJ728MC+P2")
        );
        assert!((body.latitude_center - 2.0343).abs() < 1e-3);
        assert!((body.longitude_center - 45.3201).abs() < 1e-3);
    }

    #[tokio::test]
    async fn test_generate_outside_regions() {
        let params = GenerateParams {
            lat: 9.56,
            lon: 44.065,
            length: Some(8),
        };
        let Json(body) = generate(State(state()), Query(params)).await.unwrap();
        assert_eq!(body.code.len(), 9);
        assert!(body.region_name.is_none());
        assert!(body.regional_code.is_none());
    }

    #[tokio::test]
    async fn test_generate_rejects_bad_input() {
        let bad_lat = GenerateParams {
            lat: 91.0,
            lon: 45.0,
            length: None,
        };
        assert!(matches!(
            generate(State(state()), Query(bad_lat)).await,
            Err(ApiError(GeoError::InvalidCoordinate { .. }))
        ));

        let bad_length = GenerateParams {
            lat: 2.0,
            lon: 45.0,
            length: Some(9),
        };
        assert!(matches!(
            generate(State(state()), Query(bad_length)).await,
            Err(ApiError(GeoError::InvalidPrecision(9)))
        ));
    }

    #[tokio::test]
    async fn test_resolve_prefixed_and_plain() {
        let prefixed = CodeParams {
            code: "som-bnr:6hj728mc+p2".to_string(),
        };
        let Json(body) = resolve(State(state()), Query(prefixed)).await.unwrap();
        assert_eq!(body.code, "6HJ728MC+P2");
        assert_eq!(body.region_code.as_deref(), Some("SOM-BNR"));
        assert_eq!(body.code_length, 10);
        assert!(body.latitude_lo <= 2.0343 && 2.0343 <= body.latitude_hi);
        assert!(body.longitude_lo <= 45.3201 && 45.3201 <= body.longitude_hi);

        let plain = CodeParams {
            code: "6HJ728MC+P2".to_string(),
        };
        let Json(body) = resolve(State(state()), Query(plain)).await.unwrap();
        assert_eq!(body.region_code.as_deref(), Some("SOM-BNR"));
    }

    #[tokio::test]
    async fn test_resolve_rejects_short_code() {
        let params = CodeParams {
            code: "MC+P2".to_string(),
        };
        assert!(matches!(
            resolve(State(state()), Query(params)).await,
            Err(ApiError(GeoError::MalformedCode { .. }))
        ));
    }

    #[tokio::test]
    async fn test_shorten_then_recover() {
        let params = ReferenceParams {
            code: "6HJ728MC+P2".to_string(),
            lat: 2.04,
            lon: 45.32,
        };
        let Json(short) = shorten(Query(params)).await.unwrap();
        assert!(short.short_code.len() < short.code.len());

        let params = ReferenceParams {
            code: short.short_code.clone(),
            lat: 2.04,
            lon: 45.32,
        };
        let Json(full) = recover(Query(params)).await.unwrap();
        assert_eq!(full.code, "6HJ728MC+P2");
    }

    #[tokio::test]
    async fn test_region_lookup() {
        let inside = PointParams {
            lat: 2.0469,
            lon: 45.3182,
        };
        let Json(body) = region_lookup(State(state()), Query(inside)).await.unwrap();
        assert_eq!(body.region.map(|r| r.name).as_deref(), Some("Banadir"));

        let outside = PointParams { lat: 9.56, lon: 44.065 };
        let Json(body) = region_lookup(State(state()), Query(outside)).await.unwrap();
        assert!(body.region.is_none());
    }

    #[tokio::test]
    async fn test_roads_nearby_is_approximate() {
        let params = NearbyParams {
            lat: 2.0469,
            lon: 45.3182,
            radius_km: 1.0,
            limit: None,
        };
        let Json(body) = roads_nearby(State(state()), Query(params)).await.unwrap();
        assert!(body.approximate);
        assert_eq!(body.roads.len(), 1);
        assert_eq!(body.roads[0].id, "r1");
        assert_eq!(body.roads[0].distance_km, 0.0);
    }

    #[tokio::test]
    async fn test_places_nearby_orders_and_limits() {
        let params = NearbyParams {
            lat: 2.0469,
            lon: 45.3182,
            radius_km: 30.0,
            limit: None,
        };
        let Json(body) = places_nearby(State(state()), Query(params)).await.unwrap();
        let ids: Vec<String> = body
            .features
            .iter()
            .map(|f| match &f.id {
                Some(geojson::feature::Id::String(s)) => s.clone(),
                _ => String::new(),
            })
            .collect();
        assert_eq!(ids, vec!["villa", "mgq", "afgooye"]);
        assert!(body.features[0].property("distance_km").is_some());

        let params = NearbyParams {
            lat: 2.0469,
            lon: 45.3182,
            radius_km: 30.0,
            limit: Some(1),
        };
        let Json(body) = places_nearby(State(state()), Query(params)).await.unwrap();
        assert_eq!(body.features.len(), 1);
    }

    #[tokio::test]
    async fn test_places_nearby_rejects_large_radius() {
        let params = NearbyParams {
            lat: 2.0469,
            lon: 45.3182,
            radius_km: 10_000.0,
            limit: None,
        };
        assert!(matches!(
            places_nearby(State(state()), Query(params)).await,
            Err(ApiError(GeoError::InvalidRadius(_)))
        ));
    }
}
