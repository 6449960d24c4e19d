use std::time::Duration;

use thiserror::Error;

use crate::models::PlanKind;

#[derive(Debug, Error)]
pub enum RouteError {
    #[error("failed to build GPX document: {0}")]
    Gpx(#[from] gpx::errors::GpxError),
    #[error("invalid encoded path: {0}")]
    Polyline(String),
}

/// Why a single provider call produced no route. Never leaves the gateway.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request to {provider} failed: {source}")]
    Transport {
        provider: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{provider} answered with status {status}")]
    Status { provider: String, status: u16 },
    #[error("{provider} returned an unusable response: {reason}")]
    Malformed { provider: String, reason: String },
    #[error("{provider} did not answer within {timeout:?}")]
    Timeout { provider: String, timeout: Duration },
}

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("no place matches the query")]
    NotFound,
    #[error("geocoder request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("geocoder answered with status {0}")]
    Status(u16),
    #[error("geocoder returned an unusable response: {0}")]
    Malformed(String),
}

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("could not geocode \"{query}\": {source}")]
    Geocode {
        query: String,
        #[source]
        source: GeocodeError,
    },
    #[error("routing failed to satisfy the {kind} distance constraint after {attempts} attempts")]
    RoutingExhausted { kind: PlanKind, attempts: usize },
    #[error("plan request exceeded its {0:?} deadline")]
    DeadlineExceeded(Duration),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error(transparent)]
    Route(#[from] RouteError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {name} has invalid value {value:?}")]
    InvalidVar { name: &'static str, value: String },
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}
