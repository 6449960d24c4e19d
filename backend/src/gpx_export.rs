use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use geo_types::Point;
use gpx::{Gpx, GpxVersion, Track, TrackSegment, Waypoint};

use crate::error::RouteError;
use crate::models::Coordinate;
use crate::path_codec::decode_path;

const CREATOR: &str = "ridewalk";

/// Write `path` as a single-segment GPX 1.1 track, base64 encoded.
pub fn encode_route_as_gpx(path: &[Coordinate], name: &str) -> Result<String, RouteError> {
    let mut gpx = Gpx {
        version: GpxVersion::Gpx11,
        creator: Some(CREATOR.into()),
        ..Default::default()
    };
    let mut track = Track {
        name: Some(name.into()),
        ..Default::default()
    };

    let mut segment = TrackSegment::new();
    segment.points.extend(path.iter().map(to_waypoint));
    track.segments.push(segment);
    gpx.tracks.push(track);

    let mut buffer = Vec::new();
    gpx::write(&gpx, &mut buffer)?;
    Ok(BASE64.encode(buffer))
}

/// GPX rendition of a provider's encoded polyline.
pub fn encode_day_gpx(encoded_path: &str, name: &str) -> Result<String, RouteError> {
    let path = decode_path(encoded_path)?;
    encode_route_as_gpx(&path, name)
}

fn to_waypoint(coord: &Coordinate) -> Waypoint {
    Waypoint::new(Point::new(coord.lng, coord.lat))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path_codec::encode_path;

    fn decode(gpx_base64: &str) -> Gpx {
        let bytes = BASE64.decode(gpx_base64).unwrap();
        gpx::read(bytes.as_slice()).unwrap()
    }

    #[test]
    fn writes_track_points_in_order() {
        let path = [
            Coordinate { lat: 45.0, lng: 7.0 },
            Coordinate { lat: 45.01, lng: 7.02 },
            Coordinate { lat: 45.02, lng: 7.01 },
        ];
        let gpx = decode(&encode_route_as_gpx(&path, "Day 1 ride").unwrap());

        assert_eq!(gpx.tracks.len(), 1);
        assert_eq!(gpx.tracks[0].name.as_deref(), Some("Day 1 ride"));
        let points = &gpx.tracks[0].segments[0].points;
        assert_eq!(points.len(), 3);
        assert!((points[1].point().y() - 45.01).abs() < 1e-9);
        assert!((points[1].point().x() - 7.02).abs() < 1e-9);
    }

    #[test]
    fn day_gpx_decodes_polyline_first() {
        let path = [Coordinate { lat: 38.5, lng: -120.2 }, Coordinate { lat: 40.7, lng: -120.95 }];
        let encoded = encode_path(&path).unwrap();
        let gpx = decode(&encode_day_gpx(&encoded, "Trek loop").unwrap());
        let points = &gpx.tracks[0].segments[0].points;
        assert_eq!(points.len(), 2);
        assert!((points[0].point().y() - 38.5).abs() < 1e-5);
    }

    #[test]
    fn invalid_polyline_is_an_error() {
        assert!(matches!(
            encode_day_gpx("\u{1}", "broken"),
            Err(RouteError::Polyline(_))
        ));
    }
}
