//! Even-odd ray casting against rings, polygons, and multipolygons.
//!
//! Rings must be closed (first == last) and simple. Self-intersecting or
//! open rings give an unspecified, though still deterministic, answer.
//!
//! Boundary policy: a crossing is counted when the ray toward +lon passes
//! strictly right of the point and the edge straddles the point's latitude
//! half-open (`(a.y > y) != (b.y > y)`). For axis-aligned edges this puts
//! points on the minimum-lon and minimum-lat edges inside and points on the
//! maximum edges outside. The same input always yields the same answer.

use geo::{Coord, LineString, MultiPolygon, Polygon};

use crate::models::Coordinate;

/// Whether `coord` lies inside a closed ring under the even-odd rule
pub fn ring_contains(ring: &LineString<f64>, coord: &Coordinate) -> bool {
    let x = coord.lon();
    let y = coord.lat();

    let mut inside = false;
    for edge in ring.0.windows(2) {
        let (a, b) = (edge[0], edge[1]);
        if (a.y > y) != (b.y > y) {
            let x_cross = a.x + (y - a.y) * (b.x - a.x) / (b.y - a.y);
            if x < x_cross {
                inside = !inside;
            }
        }
    }
    inside
}

/// Inside the exterior ring and not inside any hole
pub fn contains(coord: &Coordinate, polygon: &Polygon<f64>) -> bool {
    ring_contains(polygon.exterior(), coord)
        && !polygon
            .interiors()
            .iter()
            .any(|hole| ring_contains(hole, coord))
}

/// Contained by at least one polygon of the set
pub fn contains_any(coord: &Coordinate, multipolygon: &MultiPolygon<f64>) -> bool {
    multipolygon.iter().any(|polygon| contains(coord, polygon))
}

/// Close a coordinate list into a ring, or `None` if it has too few
/// distinct points to enclose an area.
pub fn close_ring(coords: Vec<Coord<f64>>) -> Option<LineString<f64>> {
    if coords.len() < 3 {
        return None;
    }

    // Close the ring if needed
    let mut ring = coords;
    if ring.first() != ring.last() {
        ring.push(ring[0]);
    }

    if ring.len() < 4 {
        return None;
    }

    Some(LineString::new(ring))
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Contains;

    fn at(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon).unwrap()
    }

    fn unit_square() -> Polygon<f64> {
        Polygon::new(
            LineString::from(vec![(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0), (0.0, 0.0)]),
            vec![],
        )
    }

    fn square_with_hole() -> Polygon<f64> {
        Polygon::new(
            LineString::from(vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0), (0.0, 0.0)]),
            vec![LineString::from(vec![
                (4.0, 4.0),
                (6.0, 4.0),
                (6.0, 6.0),
                (4.0, 6.0),
                (4.0, 4.0),
            ])],
        )
    }

    #[test]
    fn test_inside_and_outside_unit_square() {
        let square = unit_square();
        assert!(contains(&at(0.5, 0.5), &square));
        assert!(!contains(&at(2.0, 2.0), &square));
        assert!(!contains(&at(-0.5, 0.5), &square));
    }

    #[test]
    fn test_hole_is_outside() {
        let polygon = square_with_hole();
        assert!(ring_contains(polygon.exterior(), &at(5.0, 5.0)));
        assert!(!contains(&at(5.0, 5.0), &polygon));
        assert!(contains(&at(2.0, 2.0), &polygon));
        assert!(contains(&at(5.0, 8.0), &polygon));
    }

    #[test]
    fn test_boundary_policy_is_consistent() {
        let square = unit_square();
        // Minimum edges count as inside
        assert!(contains(&at(0.5, 0.0), &square));
        assert!(contains(&at(0.0, 0.5), &square));
        // Maximum edges count as outside
        assert!(!contains(&at(0.5, 1.0), &square));
        assert!(!contains(&at(1.0, 0.5), &square));
        // Same answer every time
        for _ in 0..10 {
            assert!(contains(&at(0.0, 0.0), &square));
        }
    }

    #[test]
    fn test_concave_polygon_matches_geo() {
        // A "C" shape opening to the east
        let c_shape = Polygon::new(
            LineString::from(vec![
                (0.0, 0.0),
                (3.0, 0.0),
                (3.0, 1.0),
                (1.0, 1.0),
                (1.0, 2.0),
                (3.0, 2.0),
                (3.0, 3.0),
                (0.0, 3.0),
                (0.0, 0.0),
            ]),
            vec![],
        );

        let mut lat = -0.45;
        while lat < 3.5 {
            let mut lon = -0.45;
            while lon < 3.5 {
                let expected = c_shape.contains(&geo::Point::new(lon, lat));
                assert_eq!(
                    contains(&at(lat, lon), &c_shape),
                    expected,
                    "mismatch at ({}, {})",
                    lat,
                    lon
                );
                lon += 0.3;
            }
            lat += 0.3;
        }
    }

    #[test]
    fn test_multipolygon() {
        let far_square = Polygon::new(
            LineString::from(vec![(5.0, 5.0), (6.0, 5.0), (6.0, 6.0), (5.0, 6.0), (5.0, 5.0)]),
            vec![],
        );
        let multi = MultiPolygon::new(vec![unit_square(), far_square]);
        assert!(contains_any(&at(0.5, 0.5), &multi));
        assert!(contains_any(&at(5.5, 5.5), &multi));
        assert!(!contains_any(&at(3.0, 3.0), &multi));
        assert!(!contains_any(&at(0.5, 0.5), &MultiPolygon::new(vec![])));
    }

    #[test]
    fn test_close_ring() {
        let open = vec![
            Coord { x: 0.0, y: 0.0 },
            Coord { x: 1.0, y: 0.0 },
            Coord { x: 1.0, y: 1.0 },
        ];
        let ring = close_ring(open).unwrap();
        assert_eq!(ring.0.len(), 4);
        assert_eq!(ring.0.first(), ring.0.last());
    }

    #[test]
    fn test_close_ring_degenerate() {
        assert!(close_ring(vec![Coord { x: 0.0, y: 0.0 }, Coord { x: 1.0, y: 0.0 }]).is_none());
        // Three points where the last closes the first leave only a line
        let closed_line = vec![
            Coord { x: 0.0, y: 0.0 },
            Coord { x: 1.0, y: 0.0 },
            Coord { x: 0.0, y: 0.0 },
        ];
        assert!(close_ring(closed_line).is_none());
    }
}
