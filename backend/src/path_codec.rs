//! Encoded polyline paths (Google algorithm, 5 decimal places), the format
//! OSRM returns with `geometries=polyline` and the one every day record carries.

use geo_types::Coord;

use crate::error::RouteError;
use crate::models::Coordinate;

pub const PRECISION: u32 = 5;

pub fn encode_path(path: &[Coordinate]) -> Result<String, RouteError> {
    let coords = path.iter().map(|c| Coord { x: c.lng, y: c.lat });
    polyline::encode_coordinates(coords, PRECISION).map_err(|err| RouteError::Polyline(err.to_string()))
}

pub fn decode_path(encoded: &str) -> Result<Vec<Coordinate>, RouteError> {
    let line = polyline::decode_polyline(encoded, PRECISION)
        .map_err(|err| RouteError::Polyline(err.to_string()))?;
    Ok(line
        .0
        .into_iter()
        .map(|c| Coordinate { lat: c.y, lng: c.x })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_reference_polyline() {
        // Reference example from the polyline algorithm documentation
        let path = [
            Coordinate { lat: 38.5, lng: -120.2 },
            Coordinate { lat: 40.7, lng: -120.95 },
            Coordinate { lat: 43.252, lng: -126.453 },
        ];
        assert_eq!(encode_path(&path).unwrap(), "_p~iF~ps|U_ulLnnqC_mqNvxq`@");
    }

    #[test]
    fn decoded_endpoints_match_within_precision() {
        let path = [
            Coordinate { lat: 45.123456, lng: 7.654321 },
            Coordinate { lat: 45.2, lng: 7.9 },
        ];
        let decoded = decode_path(&encode_path(&path).unwrap()).unwrap();
        assert_eq!(decoded.len(), 2);
        for (a, b) in path.iter().zip(&decoded) {
            assert!((a.lat - b.lat).abs() < 1e-5);
            assert!((a.lng - b.lng).abs() < 1e-5);
        }
    }

    #[test]
    fn empty_path_encodes_to_empty_string() {
        assert_eq!(encode_path(&[]).unwrap(), "");
    }
}
