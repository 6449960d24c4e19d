//! HTTP route providers: OpenRouteService and OSRM.

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use serde_json::json;

use crate::{
    engine::RouteProvider,
    error::ProviderError,
    models::{Coordinate, RouteSegment, TravelProfile},
    path_codec::encode_path,
};

const ORS_NAME: &str = "openrouteservice";
const OSRM_NAME: &str = "osrm";

/// OpenRouteService directions API, GeoJSON flavour. Requires an API key.
pub struct OpenRouteService {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OpenRouteService {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    fn profile_name(profile: TravelProfile) -> &'static str {
        match profile {
            TravelProfile::Cycling => "cycling-regular",
            TravelProfile::Foot => "foot-hiking",
        }
    }

    fn url(&self, profile: TravelProfile) -> String {
        format!(
            "{}/v2/directions/{}/geojson",
            self.base_url.trim_end_matches('/'),
            Self::profile_name(profile)
        )
    }
}

#[derive(Debug, Deserialize)]
struct OrsResponse {
    #[serde(default)]
    features: Vec<OrsFeature>,
}

#[derive(Debug, Deserialize)]
struct OrsFeature {
    geometry: OrsGeometry,
    #[serde(default)]
    properties: OrsProperties,
}

#[derive(Debug, Deserialize)]
struct OrsGeometry {
    #[serde(default)]
    coordinates: Vec<Vec<f64>>,
}

#[derive(Debug, Default, Deserialize)]
struct OrsProperties {
    #[serde(default)]
    summary: OrsSummary,
}

/// Meters and seconds; ORS omits both for zero-length routes.
#[derive(Debug, Default, Deserialize)]
struct OrsSummary {
    #[serde(default)]
    distance: f64,
    #[serde(default)]
    duration: f64,
}

fn segment_from_ors(response: OrsResponse) -> Result<RouteSegment, ProviderError> {
    let malformed = |reason: &str| ProviderError::Malformed {
        provider: ORS_NAME.to_string(),
        reason: reason.to_string(),
    };

    let feature = response
        .features
        .into_iter()
        .next()
        .ok_or_else(|| malformed("no route feature"))?;

    // GeoJSON positions are [lng, lat(, elevation)]
    let path: Vec<Coordinate> = feature
        .geometry
        .coordinates
        .iter()
        .filter(|position| position.len() >= 2)
        .map(|position| Coordinate {
            lat: position[1],
            lng: position[0],
        })
        .collect();
    if path.len() < 2 {
        return Err(malformed("route geometry has fewer than two points"));
    }

    let encoded_path = encode_path(&path).map_err(|err| malformed(&err.to_string()))?;
    let summary = feature.properties.summary;
    Ok(RouteSegment {
        encoded_path,
        distance_km: summary.distance / 1000.0,
        duration_min: summary.duration / 60.0,
    })
}

#[async_trait]
impl RouteProvider for OpenRouteService {
    fn name(&self) -> &str {
        ORS_NAME
    }

    async fn route(
        &self,
        profile: TravelProfile,
        waypoints: &[Coordinate],
    ) -> Result<RouteSegment, ProviderError> {
        let body = json!({
            "coordinates": waypoints.iter().map(|c| [c.lng, c.lat]).collect::<Vec<_>>(),
            "instructions": false,
        });

        let res = self
            .http
            .post(self.url(profile))
            .header(AUTHORIZATION, &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|source| ProviderError::Transport {
                provider: ORS_NAME.to_string(),
                source,
            })?;

        if !res.status().is_success() {
            return Err(ProviderError::Status {
                provider: ORS_NAME.to_string(),
                status: res.status().as_u16(),
            });
        }

        let data: OrsResponse = res.json().await.map_err(|err| ProviderError::Malformed {
            provider: ORS_NAME.to_string(),
            reason: err.to_string(),
        })?;
        segment_from_ors(data)
    }
}

/// OSRM `route/v1` service; works against the public demo server or a
/// self-hosted instance.
pub struct Osrm {
    http: reqwest::Client,
    base_url: String,
}

impl Osrm {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    fn profile_name(profile: TravelProfile) -> &'static str {
        match profile {
            TravelProfile::Cycling => "cycling",
            TravelProfile::Foot => "walking",
        }
    }

    fn url(&self, profile: TravelProfile, waypoints: &[Coordinate]) -> String {
        let path = waypoints
            .iter()
            .map(|c| format!("{:.6},{:.6}", c.lng, c.lat))
            .collect::<Vec<_>>()
            .join(";");
        format!(
            "{}/route/v1/{}/{}",
            self.base_url.trim_end_matches('/'),
            Self::profile_name(profile),
            path
        )
    }
}

#[derive(Debug, Deserialize)]
struct OsrmResponse {
    #[serde(default)]
    code: String,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    geometry: String,
    distance: f64,
    duration: f64,
}

fn segment_from_osrm(response: OsrmResponse) -> Result<RouteSegment, ProviderError> {
    let route = response
        .routes
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::Malformed {
            provider: OSRM_NAME.to_string(),
            reason: format!("no route (code {:?})", response.code),
        })?;

    Ok(RouteSegment {
        encoded_path: route.geometry,
        distance_km: route.distance / 1000.0,
        duration_min: route.duration / 60.0,
    })
}

#[async_trait]
impl RouteProvider for Osrm {
    fn name(&self) -> &str {
        OSRM_NAME
    }

    async fn route(
        &self,
        profile: TravelProfile,
        waypoints: &[Coordinate],
    ) -> Result<RouteSegment, ProviderError> {
        let res = self
            .http
            .get(self.url(profile, waypoints))
            .query(&[("overview", "full"), ("geometries", "polyline")])
            .send()
            .await
            .map_err(|source| ProviderError::Transport {
                provider: OSRM_NAME.to_string(),
                source,
            })?;

        if !res.status().is_success() {
            return Err(ProviderError::Status {
                provider: OSRM_NAME.to_string(),
                status: res.status().as_u16(),
            });
        }

        let data: OsrmResponse = res.json().await.map_err(|err| ProviderError::Malformed {
            provider: OSRM_NAME.to_string(),
            reason: err.to_string(),
        })?;
        segment_from_osrm(data)
    }
}
