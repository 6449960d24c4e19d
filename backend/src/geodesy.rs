use crate::models::Coordinate;

pub const EARTH_RADIUS_KM: f64 = 6_371.0;

/// Destination reached by travelling `distance_km` from `start` along the
/// initial `bearing_deg` (degrees clockwise from true north, any real value)
/// on a spherical earth.
///
/// The returned longitude is normalized to `[-180, 180]` so offsets that cross
/// the antimeridian stay valid coordinates.
pub fn destination_point(start: Coordinate, distance_km: f64, bearing_deg: f64) -> Coordinate {
    let angular_distance = distance_km / EARTH_RADIUS_KM;
    let bearing = normalize_bearing(bearing_deg).to_radians();
    let lat1 = start.lat.to_radians();
    let lon1 = start.lng.to_radians();

    // Rounding can push the sine a hair past 1 at the poles.
    let sin_lat2 = (lat1.sin() * angular_distance.cos()
        + lat1.cos() * angular_distance.sin() * bearing.cos())
    .clamp(-1.0, 1.0);
    let lat2 = sin_lat2.asin();
    let lon2 = lon1
        + f64::atan2(
            bearing.sin() * angular_distance.sin() * lat1.cos(),
            angular_distance.cos() - lat1.sin() * sin_lat2,
        );

    Coordinate {
        lat: lat2.to_degrees().clamp(-90.0, 90.0),
        lng: normalize_longitude(lon2.to_degrees()),
    }
}

pub fn haversine_km(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.lng - a.lng).to_radians();

    let sin_dlat = (dlat / 2.0).sin();
    let sin_dlon = (dlon / 2.0).sin();

    let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon;
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

pub fn approximate_distance_km(path: &[Coordinate]) -> f64 {
    path.windows(2).map(|w| haversine_km(w[0], w[1])).sum()
}

pub fn normalize_longitude(lon: f64) -> f64 {
    if (-180.0..=180.0).contains(&lon) {
        return lon;
    }
    (lon + 180.0).rem_euclid(360.0) - 180.0
}

pub fn normalize_bearing(bearing_deg: f64) -> f64 {
    let value = bearing_deg.rem_euclid(360.0);
    // rem_euclid rounds tiny negatives up to exactly 360.0
    if value >= 360.0 {
        0.0
    } else {
        value
    }
}
