use std::sync::Arc;

use rand::rngs::StdRng;

use crate::{
    bike::BikeLegPlanner,
    config::PlannerConfig,
    duration::sanitize_duration,
    engine::{AttemptBackoff, ProviderGateway},
    error::{ConfigError, PlanError},
    geocode::{Geocoder, NominatimGeocoder},
    gpx_export::encode_day_gpx,
    loops::{LoopOutcome, TrekLoopPlanner},
    models::{
        Anchor, Coordinate, Day, NamedCoordinate, PlanHints, PlanKind, PlanResponse, PlanSeed,
        RouteSegment,
    },
};

/// Ordered days of a plan plus the geocoded starting point.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanOutcome {
    pub days: Vec<Day>,
    pub start: NamedCoordinate,
}

impl From<PlanOutcome> for PlanResponse {
    fn from(outcome: PlanOutcome) -> Self {
        PlanResponse {
            days: outcome.days,
            start: outcome.start,
        }
    }
}

/// Geocodes a seed, runs the matching planner and assembles day records.
///
/// Holds no per-request state; share it behind an `Arc`.
pub struct PlanEngine {
    config: PlannerConfig,
    gateway: ProviderGateway,
    geocoder: Arc<dyn Geocoder>,
}

impl PlanEngine {
    pub fn new(config: PlannerConfig, gateway: ProviderGateway, geocoder: Arc<dyn Geocoder>) -> Self {
        Self {
            config,
            gateway,
            geocoder,
        }
    }

    /// Production wiring: provider chains and Nominatim from `config`.
    pub fn from_config(config: PlannerConfig) -> Result<Self, ConfigError> {
        let gateway = ProviderGateway::from_settings(&config.providers)?;
        let geocoder = Arc::new(NominatimGeocoder::new(&config.geocoder)?);
        Ok(Self::new(config, gateway, geocoder))
    }

    pub fn gateway(&self) -> &ProviderGateway {
        &self.gateway
    }

    /// [`plan`](Self::plan) bounded by the configured request deadline.
    pub async fn plan_with_deadline(&self, seed: &PlanSeed, rng: &mut StdRng) -> Result<PlanOutcome, PlanError> {
        let deadline = self.config.request_deadline;
        tokio::time::timeout(deadline, self.plan(seed, rng))
            .await
            .map_err(|_| {
                tracing::warn!("Plan for {:?} hit the {:?} deadline", seed.location_query, deadline);
                PlanError::DeadlineExceeded(deadline)
            })?
    }

    /// Geocode the seed's location and build its days.
    ///
    /// Geocoding happens exactly once and before any routing call. Planner
    /// failures fail the whole plan: a bike plan is either two days or an error.
    #[tracing::instrument(skip_all, fields(kind = %seed.kind, query = %seed.location_query))]
    pub async fn plan(&self, seed: &PlanSeed, rng: &mut StdRng) -> Result<PlanOutcome, PlanError> {
        let query = seed.location_query.trim();
        if query.is_empty() {
            return Err(PlanError::InvalidRequest("location query is empty".into()));
        }

        let place = self
            .geocoder
            .lookup(query)
            .await
            .map_err(|source| PlanError::Geocode {
                query: query.to_string(),
                source,
            })?;
        tracing::info!("Planning {} from {}", seed.kind, place.display_name);

        let start = place.coordinate;
        let days = match seed.kind {
            PlanKind::Bike => self.plan_bike(start, seed, rng).await?,
            PlanKind::Trek => vec![self.plan_trek(start, seed, rng).await?],
        };

        Ok(PlanOutcome {
            days,
            start: start.named(place.display_name),
        })
    }

    async fn plan_bike(&self, start: Coordinate, seed: &PlanSeed, rng: &mut StdRng) -> Result<Vec<Day>, PlanError> {
        let limits = &self.config.bike;
        let bearings = pair_or(seed.hints.bearings_deg.as_deref(), limits.default_bearings_deg);
        let distances = pair_or(seed.hints.day_distances_km.as_deref(), limits.default_day_distances_km);
        let planner = BikeLegPlanner::new(&self.gateway, limits, self.backoff());

        let first = planner.plan(start, distances[0], bearings[0], rng).await?;
        let second = planner
            .plan(first.destination, distances[1], bearings[1], rng)
            .await?;

        let start_name = anchor_name(seed, "Start");
        let day1 = self.bike_day(
            0,
            first.route,
            start.named(start_name),
            first.destination.named("Day 1 Destination"),
        )?;
        let day2 = self.bike_day(
            1,
            second.route,
            first.destination.named("Day 1 Destination"),
            second.destination.named("Day 2 Destination"),
        )?;
        Ok(vec![day1, day2])
    }

    fn bike_day(
        &self,
        offset: u32,
        route: RouteSegment,
        start: NamedCoordinate,
        end: NamedCoordinate,
    ) -> Result<Day, PlanError> {
        let summary = format!("Day {} ride", offset + 1);
        let distance_km = round_km(route.distance_km);
        let duration_min = sanitize_duration(self.config.bike_speed, distance_km, route.duration_min);
        let gpx_base64 = encode_day_gpx(&route.encoded_path, &summary)?;
        Ok(Day {
            date_offset_days: offset,
            distance_km,
            duration_min,
            encoded_path: route.encoded_path,
            summary,
            start,
            end,
            approximate: false,
            gpx_base64,
        })
    }

    async fn plan_trek(&self, start: Coordinate, seed: &PlanSeed, rng: &mut StdRng) -> Result<Day, PlanError> {
        let limits = &self.config.trek;
        let planner = TrekLoopPlanner::new(&self.gateway, limits, self.backoff());

        let (route, approximate) = match planner.plan(start, &seed.hints, rng).await {
            LoopOutcome::Accepted(route) => (route, false),
            LoopOutcome::Approximate { route, .. } => (route, true),
            LoopOutcome::Exhausted => {
                return Err(PlanError::RoutingExhausted {
                    kind: PlanKind::Trek,
                    attempts: limits.max_attempts,
                });
            }
        };

        let distance_km = round_km(route.distance_km);
        let mut summary = "Trek loop".to_string();
        if !(limits.min_km..=limits.max_km).contains(&distance_km) {
            summary.push_str(&format!(
                " (adjusted near {}–{} km)",
                limits.min_km, limits.max_km
            ));
        }

        let trailhead = start.named(anchor_name(seed, "Trailhead"));
        let duration_min = sanitize_duration(self.config.trek_speed, distance_km, route.duration_min);
        let gpx_base64 = encode_day_gpx(&route.encoded_path, &summary)?;
        Ok(Day {
            date_offset_days: 0,
            distance_km,
            duration_min,
            encoded_path: route.encoded_path,
            summary,
            start: trailhead.clone(),
            end: trailhead,
            approximate,
            gpx_base64,
        })
    }

    fn backoff(&self) -> AttemptBackoff {
        AttemptBackoff::new(self.config.attempt_backoff)
    }
}

/// Two finite values, or the defaults.
fn pair_or(values: Option<&[f64]>, defaults: [f64; 2]) -> [f64; 2] {
    match values {
        Some(&[a, b]) if a.is_finite() && b.is_finite() => [a, b],
        _ => defaults,
    }
}

fn anchor_name(seed: &PlanSeed, fallback: &str) -> String {
    seed.anchors
        .first()
        .map(|anchor| anchor.name.trim())
        .filter(|name| !name.is_empty())
        .unwrap_or(fallback)
        .to_string()
}

fn round_km(distance_km: f64) -> f64 {
    (distance_km * 100.0).round() / 100.0
}

/// Seed for a caller-supplied kind with hints and anchors overriding the
/// seeder's where present.
pub fn merge_seed(mut seed: PlanSeed, hints: Option<PlanHints>, anchors: Option<Vec<Anchor>>) -> PlanSeed {
    if let Some(hints) = hints {
        seed.hints = PlanHints {
            bearings_deg: hints.bearings_deg.or(seed.hints.bearings_deg),
            day_distances_km: hints.day_distances_km.or(seed.hints.day_distances_km),
            loop_km: hints.loop_km.or(seed.hints.loop_km),
            loop_bearings_deg: hints.loop_bearings_deg.or(seed.hints.loop_bearings_deg),
            loop_skew: hints.loop_skew.or(seed.hints.loop_skew),
        };
    }
    if let Some(anchors) = anchors.filter(|anchors| !anchors.is_empty()) {
        seed.anchors = anchors;
    }
    seed
}
