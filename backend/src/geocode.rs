use async_trait::async_trait;
use serde::Deserialize;

use crate::{
    config::GeocoderSettings,
    error::{ConfigError, GeocodeError},
    models::Coordinate,
};

#[derive(Debug, Clone, PartialEq)]
pub struct GeocodedPlace {
    pub coordinate: Coordinate,
    pub display_name: String,
}

/// Resolves a free-text place name to a coordinate.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn lookup(&self, query: &str) -> Result<GeocodedPlace, GeocodeError>;
}

/// OpenStreetMap Nominatim search API.
pub struct NominatimGeocoder {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: String,
}

impl NominatimGeocoder {
    pub fn new(settings: &GeocoderSettings) -> Result<Self, ConfigError> {
        let http = reqwest::Client::builder()
            .user_agent(format!("ride-walk-planner/1.0 ({})", settings.contact_email))
            .timeout(settings.timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: settings.base_url.clone(),
        })
    }
}

fn place_from_results(results: Vec<NominatimPlace>) -> Result<GeocodedPlace, GeocodeError> {
    let place = results.into_iter().next().ok_or(GeocodeError::NotFound)?;
    let lat: f64 = place
        .lat
        .parse()
        .map_err(|_| GeocodeError::Malformed(format!("latitude {:?}", place.lat)))?;
    let lng: f64 = place
        .lon
        .parse()
        .map_err(|_| GeocodeError::Malformed(format!("longitude {:?}", place.lon)))?;

    let coordinate = Coordinate { lat, lng };
    if !coordinate.is_valid() {
        return Err(GeocodeError::Malformed(format!("coordinate {lat}, {lng} out of range")));
    }
    Ok(GeocodedPlace {
        coordinate,
        display_name: place.display_name,
    })
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    #[tracing::instrument(skip(self))]
    async fn lookup(&self, query: &str) -> Result<GeocodedPlace, GeocodeError> {
        let url = format!("{}/search", self.base_url.trim_end_matches('/'));
        let res = self
            .http
            .get(url)
            .query(&[("q", query), ("format", "json"), ("limit", "1")])
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        if !res.status().is_success() {
            return Err(GeocodeError::Status(res.status().as_u16()));
        }

        let results: Vec<NominatimPlace> = res
            .json()
            .await
            .map_err(|err| GeocodeError::Malformed(err.to_string()))?;
        let place = place_from_results(results)?;
        tracing::debug!("Geocoded to {:?} ({})", place.coordinate, place.display_name);
        Ok(place)
    }
}
