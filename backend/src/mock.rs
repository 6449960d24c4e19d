//! In-process providers and geocoders for offline planning, tests and benchmarks.
//!
//! None of these touch the network. [`StraightLineProvider`] fakes a backend by
//! joining the waypoints with straight segments, which makes the distance of a
//! point-to-point route equal to the geodesic offset that produced it.

use std::{
    collections::{HashMap, VecDeque},
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;

use crate::{
    duration::SpeedBand,
    engine::RouteProvider,
    error::{GeocodeError, ProviderError},
    geocode::{GeocodedPlace, Geocoder},
    geodesy::approximate_distance_km,
    models::{Coordinate, RouteSegment, TravelProfile},
    path_codec::encode_path,
};

fn default_speed_kmh(profile: TravelProfile) -> f64 {
    match profile {
        TravelProfile::Cycling => SpeedBand::BIKE.default_kmh,
        TravelProfile::Foot => SpeedBand::TREK.default_kmh,
    }
}

fn straight_segment(
    name: &str,
    profile: TravelProfile,
    waypoints: &[Coordinate],
    distance_km: f64,
) -> Result<RouteSegment, ProviderError> {
    let encoded_path = encode_path(waypoints).map_err(|err| ProviderError::Malformed {
        provider: name.to_string(),
        reason: err.to_string(),
    })?;
    Ok(RouteSegment {
        encoded_path,
        distance_km,
        duration_min: distance_km / default_speed_kmh(profile) * 60.0,
    })
}

/// Routes along the great-circle segments between waypoints.
pub struct StraightLineProvider {
    name: String,
    detour_factor: f64,
    fixed_distance_km: Option<f64>,
}

impl StraightLineProvider {
    /// Reported distance is the straight-line length times `detour_factor`.
    pub fn new(name: impl Into<String>, detour_factor: f64) -> Self {
        Self {
            name: name.into(),
            detour_factor,
            fixed_distance_km: None,
        }
    }

    /// Reports `distance_km` whatever the waypoints are.
    pub fn fixed_distance(name: impl Into<String>, distance_km: f64) -> Self {
        Self {
            name: name.into(),
            detour_factor: 1.0,
            fixed_distance_km: Some(distance_km),
        }
    }
}

#[async_trait]
impl RouteProvider for StraightLineProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn route(
        &self,
        profile: TravelProfile,
        waypoints: &[Coordinate],
    ) -> Result<RouteSegment, ProviderError> {
        let distance_km = self
            .fixed_distance_km
            .unwrap_or_else(|| approximate_distance_km(waypoints) * self.detour_factor);
        straight_segment(&self.name, profile, waypoints, distance_km)
    }
}

/// Always reports the service as down.
pub struct UnavailableProvider {
    name: String,
}

impl UnavailableProvider {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl RouteProvider for UnavailableProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn route(&self, _: TravelProfile, _: &[Coordinate]) -> Result<RouteSegment, ProviderError> {
        Err(ProviderError::Status {
            provider: self.name.clone(),
            status: 503,
        })
    }
}

/// Replays a fixed sequence of answers: `Some(km)` routes with that distance,
/// `None` is unavailable. Once the script runs out every call is unavailable.
pub struct ScriptedProvider {
    name: String,
    script: Mutex<VecDeque<Option<f64>>>,
    requests: Mutex<Vec<Vec<Coordinate>>>,
}

impl ScriptedProvider {
    pub fn new(name: impl Into<String>, script: impl IntoIterator<Item = Option<f64>>) -> Self {
        Self {
            name: name.into(),
            script: Mutex::new(script.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Waypoints of every call received so far, in order.
    pub fn requests(&self) -> Vec<Vec<Coordinate>> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl RouteProvider for ScriptedProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn route(
        &self,
        profile: TravelProfile,
        waypoints: &[Coordinate],
    ) -> Result<RouteSegment, ProviderError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(waypoints.to_vec());
        }
        let next = self
            .script
            .lock()
            .ok()
            .and_then(|mut script| script.pop_front())
            .flatten();
        match next {
            Some(distance_km) => straight_segment(&self.name, profile, waypoints, distance_km),
            None => Err(ProviderError::Status {
                provider: self.name.clone(),
                status: 503,
            }),
        }
    }
}

/// Waits before delegating, to exercise timeouts.
pub struct SlowProvider<P> {
    delay: Duration,
    inner: P,
}

impl<P> SlowProvider<P> {
    pub fn new(delay: Duration, inner: P) -> Self {
        Self { delay, inner }
    }
}

#[async_trait]
impl<P: RouteProvider> RouteProvider for SlowProvider<P> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn route(
        &self,
        profile: TravelProfile,
        waypoints: &[Coordinate],
    ) -> Result<RouteSegment, ProviderError> {
        tokio::time::sleep(self.delay).await;
        self.inner.route(profile, waypoints).await
    }
}

/// Counts calls made to the wrapped provider.
pub struct CountingProvider<P> {
    inner: P,
    calls: AtomicUsize,
}

impl<P> CountingProvider<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<P: RouteProvider> RouteProvider for CountingProvider<P> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn route(
        &self,
        profile: TravelProfile,
        waypoints: &[Coordinate],
    ) -> Result<RouteSegment, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.route(profile, waypoints).await
    }
}

/// Geocoder backed by a fixed table; queries match case-insensitively.
#[derive(Default)]
pub struct FixedGeocoder {
    places: HashMap<String, GeocodedPlace>,
}

impl FixedGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_place(
        mut self,
        query: &str,
        coordinate: Coordinate,
        display_name: impl Into<String>,
    ) -> Self {
        self.places.insert(
            query.trim().to_lowercase(),
            GeocodedPlace {
                coordinate,
                display_name: display_name.into(),
            },
        );
        self
    }
}

#[async_trait]
impl Geocoder for FixedGeocoder {
    async fn lookup(&self, query: &str) -> Result<GeocodedPlace, GeocodeError> {
        self.places
            .get(&query.trim().to_lowercase())
            .cloned()
            .ok_or(GeocodeError::NotFound)
    }
}
