use std::{collections::HashMap, sync::Arc, time::Duration};

use async_trait::async_trait;
use rand::Rng;

use crate::{
    config::ProviderSettings,
    error::{ConfigError, ProviderError},
    models::{Coordinate, RouteSegment, TravelProfile},
    path_codec::decode_path,
    providers::{OpenRouteService, Osrm},
};

/// A routing backend (Dependency Inversion seam for the planners).
///
/// Abstracts the outbound routing call to allow:
/// - **Fallback**: several backends chained in priority order by [`ProviderGateway`]
/// - **Testing**: scripted implementations in [`crate::mock`]
/// - **Offline use**: the straight-line provider used by the CLI and benchmarks
///
/// # Contract
/// All implementations must:
/// - Route the waypoints in the given order (the first and last may coincide)
/// - Report every failure (transport, status, unparsable body, no route) as
///   `Err`; the gateway turns it into "unavailable" and moves on
/// - Never panic on a malformed upstream response
#[async_trait]
pub trait RouteProvider: Send + Sync {
    /// Short label used in logs.
    fn name(&self) -> &str;

    async fn route(
        &self,
        profile: TravelProfile,
        waypoints: &[Coordinate],
    ) -> Result<RouteSegment, ProviderError>;
}

/// Ordered provider chains per travel profile.
///
/// The gateway holds no mutable state: every call walks the chain from the
/// top, so one gateway can serve any number of concurrent plan requests.
#[derive(Clone, Default)]
pub struct ProviderGateway {
    chains: HashMap<TravelProfile, Vec<Arc<dyn RouteProvider>>>,
    call_timeout: Option<Duration>,
}

impl ProviderGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the production chains: OpenRouteService first when a key is
    /// configured, then OSRM once per configured pass.
    pub fn from_settings(settings: &ProviderSettings) -> Result<Self, ConfigError> {
        let http = reqwest::Client::builder()
            .timeout(settings.call_timeout)
            .build()?;

        let ors: Option<Arc<dyn RouteProvider>> = settings.ors_api_key.as_ref().map(|key| {
            Arc::new(OpenRouteService::new(
                http.clone(),
                settings.ors_base_url.clone(),
                key.clone(),
            )) as Arc<dyn RouteProvider>
        });
        let osrm: Arc<dyn RouteProvider> =
            Arc::new(Osrm::new(http, settings.osrm_base_url.clone()));

        let mut gateway = Self::new().with_call_timeout(settings.call_timeout);
        for profile in [TravelProfile::Cycling, TravelProfile::Foot] {
            if let Some(ors) = &ors {
                gateway = gateway.with_provider(profile, ors.clone());
            }
            for _ in 0..settings.osrm_passes {
                gateway = gateway.with_provider(profile, osrm.clone());
            }
        }

        tracing::info!(
            "Provider chains: cycling=[{}], foot=[{}]",
            gateway.provider_names(TravelProfile::Cycling).join(", "),
            gateway.provider_names(TravelProfile::Foot).join(", ")
        );
        Ok(gateway)
    }

    /// Append `provider` to the end of the chain for `profile`.
    pub fn with_provider(mut self, profile: TravelProfile, provider: Arc<dyn RouteProvider>) -> Self {
        self.chains.entry(profile).or_default().push(provider);
        self
    }

    /// Register the same provider at the end of both chains.
    pub fn with_provider_for_all(self, provider: Arc<dyn RouteProvider>) -> Self {
        self.with_provider(TravelProfile::Cycling, provider.clone())
            .with_provider(TravelProfile::Foot, provider)
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = Some(timeout);
        self
    }

    pub fn providers(&self, profile: TravelProfile) -> &[Arc<dyn RouteProvider>] {
        self.chains.get(&profile).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn provider_names(&self, profile: TravelProfile) -> Vec<String> {
        self.providers(profile)
            .iter()
            .map(|provider| provider.name().to_string())
            .collect()
    }

    /// Route `waypoints` with the first provider of the chain that produces a
    /// usable segment.
    ///
    /// # Returns
    /// - `Some(RouteSegment)`: result of the highest-priority provider that succeeded
    /// - `None`: fewer than two waypoints, or every provider was unavailable
    pub async fn route(&self, profile: TravelProfile, waypoints: &[Coordinate]) -> Option<RouteSegment> {
        if waypoints.len() < 2 {
            tracing::warn!("Refusing to route {} waypoint(s)", waypoints.len());
            return None;
        }

        for provider in self.providers(profile) {
            match self.call(provider.as_ref(), profile, waypoints).await {
                Ok(segment) => {
                    tracing::debug!(
                        "{} routed {} waypoints: {:.2} km, {:.0} min",
                        provider.name(),
                        waypoints.len(),
                        segment.distance_km,
                        segment.duration_min
                    );
                    return Some(segment);
                }
                Err(err) => tracing::warn!("Provider unavailable: {}", err),
            }
        }

        tracing::debug!("All {:?} providers unavailable", profile);
        None
    }

    async fn call(
        &self,
        provider: &dyn RouteProvider,
        profile: TravelProfile,
        waypoints: &[Coordinate],
    ) -> Result<RouteSegment, ProviderError> {
        let segment = match self.call_timeout {
            Some(timeout) => tokio::time::timeout(timeout, provider.route(profile, waypoints))
                .await
                .map_err(|_| ProviderError::Timeout {
                    provider: provider.name().to_string(),
                    timeout,
                })??,
            None => provider.route(profile, waypoints).await?,
        };

        let malformed = |reason: String| ProviderError::Malformed {
            provider: provider.name().to_string(),
            reason,
        };
        if !segment.distance_km.is_finite() || segment.distance_km < 0.0 {
            return Err(malformed(format!("distance {} km", segment.distance_km)));
        }
        let points = decode_path(&segment.encoded_path).map_err(|err| malformed(err.to_string()))?;
        if points.len() < 2 {
            return Err(malformed(format!("path has {} point(s)", points.len())));
        }
        Ok(segment)
    }
}

/// Jittered pause between search attempts that found every provider unavailable.
#[derive(Debug, Clone, Copy, Default)]
pub struct AttemptBackoff {
    base: Duration,
}

impl AttemptBackoff {
    pub fn new(base: Duration) -> Self {
        Self { base }
    }

    /// Sleep for `base` scaled by a random factor in `[0.5, 1.5)`; no-op when
    /// the base is zero.
    pub async fn pause<R: Rng + Send>(&self, rng: &mut R) {
        if self.base.is_zero() {
            return;
        }
        let delay = self.base.mul_f64(rng.gen_range(0.5..1.5));
        tokio::time::sleep(delay).await;
    }
}
