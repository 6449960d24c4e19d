use rand::Rng;

use crate::{
    config::TrekLimits,
    engine::{AttemptBackoff, ProviderGateway},
    geodesy::{destination_point, normalize_bearing},
    models::{Coordinate, PlanHints, PlanKind, RouteSegment},
};

const MIN_SPOKE_KM: f64 = 0.8;
const MAX_SPOKE_KM: f64 = 8.0;
const MIN_ADJUSTED_SPOKE_KM: f64 = 0.6;
const MAX_ADJUSTED_SPOKE_KM: f64 = 10.0;
const MIN_SKEW: f64 = 0.7;
const MAX_SKEW: f64 = 1.4;
const MIN_SCALE: f64 = 0.6;
const MAX_SCALE: f64 = 1.5;
/// Offset of the second spoke from the first when no bearings are hinted.
const RETURN_SPOKE_OFFSET_DEG: f64 = 200.0;

/// Result of a loop search.
#[derive(Debug, Clone, PartialEq)]
pub enum LoopOutcome {
    /// Loop within the distance band.
    Accepted(RouteSegment),
    /// Attempts ran out; the routed loop closest to the desired distance.
    Approximate { route: RouteSegment, distance_km: f64 },
    /// No provider produced any loop.
    Exhausted,
}

/// Two spokes radiating from the trailhead; the loop runs start → tip 1 →
/// tip 2 → start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopShape {
    pub spokes_km: [f64; 2],
    pub bearings_deg: [f64; 2],
}

impl LoopShape {
    /// Initial shape for a loop of `desired_km`.
    ///
    /// Bearings come from the hints when exactly two finite values are given,
    /// otherwise a random base bearing and a return spoke roughly opposite it.
    pub fn initial<R: Rng>(desired_km: f64, hints: &PlanHints, rng: &mut R) -> Self {
        let bearings_deg = match hints.loop_bearings_deg.as_deref() {
            Some(&[b1, b2]) if b1.is_finite() && b2.is_finite() => [b1, b2],
            _ => {
                let base = rng.gen_range(0.0..360.0);
                [base, base + RETURN_SPOKE_OFFSET_DEG + rng.gen_range(-20.0..=20.0)]
            }
        };
        let skew = hints
            .loop_skew
            .filter(|skew| skew.is_finite())
            .unwrap_or(1.0)
            .clamp(MIN_SKEW, MAX_SKEW);

        let spoke1 = (desired_km / 3.0 * rng.gen_range(0.9..=1.1)).clamp(MIN_SPOKE_KM, MAX_SPOKE_KM);
        let spoke2 = (spoke1 * skew).clamp(MIN_SPOKE_KM, MAX_SPOKE_KM);

        Self {
            spokes_km: [spoke1, spoke2],
            bearings_deg,
        }
    }

    pub fn waypoints(&self, start: Coordinate) -> [Coordinate; 4] {
        let tip1 = destination_point(start, self.spokes_km[0], self.bearings_deg[0]);
        let tip2 = destination_point(start, self.spokes_km[1], self.bearings_deg[1]);
        [start, tip1, tip2, start]
    }

    fn scale(&mut self, factor: f64) {
        for spoke in &mut self.spokes_km {
            *spoke = (*spoke * factor).clamp(MIN_ADJUSTED_SPOKE_KM, MAX_ADJUSTED_SPOKE_KM);
        }
    }

    fn shrink(&mut self) {
        for spoke in &mut self.spokes_km {
            *spoke = (*spoke * 0.9).max(MIN_ADJUSTED_SPOKE_KM);
        }
    }

    /// Open (`+`) or close (`-`) the angle between the spokes by `delta_deg` on each side.
    fn rotate_apart(&mut self, delta_deg: f64) {
        self.bearings_deg[0] += delta_deg;
        self.bearings_deg[1] -= delta_deg;
    }
}

/// Searches for a closed foot loop whose routed length falls inside the trek band.
pub struct TrekLoopPlanner<'a> {
    gateway: &'a ProviderGateway,
    limits: &'a TrekLimits,
    backoff: AttemptBackoff,
}

impl<'a> TrekLoopPlanner<'a> {
    pub fn new(gateway: &'a ProviderGateway, limits: &'a TrekLimits, backoff: AttemptBackoff) -> Self {
        Self {
            gateway,
            limits,
            backoff,
        }
    }

    /// Loop length the search aims for: the hinted length (or the default)
    /// clamped into the band.
    pub fn desired_km(&self, hints: &PlanHints) -> f64 {
        hints
            .loop_km
            .filter(|km| km.is_finite())
            .unwrap_or(self.limits.default_loop_km)
            .clamp(self.limits.min_km, self.limits.max_km)
    }

    /// Search for a loop around `start`.
    ///
    /// # Algorithm: two-spoke loop with proportional correction
    ///
    /// ## 1. Shape
    /// Two spoke tips are placed by geodesic offset from `start`, with each spoke
    /// about a third of the desired length so spoke + chord + spoke lands near it.
    ///
    /// ## 2. Correction per attempt
    /// - **In band** (`min - slack ≤ d ≤ max + slack`): accept.
    /// - **Out of band**: scale both spokes by `clamp(desired / d, 0.6, 1.5)` and
    ///   jitter the bearings by `U(6, 12)°`, opening the angle on even attempts
    ///   and closing it on odd ones so retries explore different streets.
    /// - **Unavailable**: shrink spokes by 10% and spin both tips `U(15, 30)°`.
    ///
    /// ## 3. Fallback
    /// Every routed loop is compared to the best so far by its distance to the
    /// desired length; when attempts run out the closest one is returned as
    /// [`LoopOutcome::Approximate`].
    pub async fn plan<R: Rng + Send>(&self, start: Coordinate, hints: &PlanHints, rng: &mut R) -> LoopOutcome {
        let desired = self.desired_km(hints);
        let min_ok = self.limits.min_km - self.limits.band_slack_km;
        let max_ok = self.limits.max_km + self.limits.band_slack_km;
        let mut shape = LoopShape::initial(desired, hints, rng);
        let mut best: Option<RouteSegment> = None;

        tracing::info!(
            "Generating trek loop: desired {:.1}km (band {:.1}-{:.1}km), spokes {:.2}/{:.2}km at {:.0}°/{:.0}°",
            desired,
            min_ok,
            max_ok,
            shape.spokes_km[0],
            shape.spokes_km[1],
            normalize_bearing(shape.bearings_deg[0]),
            normalize_bearing(shape.bearings_deg[1])
        );

        for attempt in 0..self.limits.max_attempts {
            let waypoints = shape.waypoints(start);
            let Some(route) = self.gateway.route(PlanKind::Trek.profile(), &waypoints).await else {
                tracing::debug!("Attempt {}: no provider could route the loop", attempt + 1);
                shape.shrink();
                let spin = rng.gen_range(15.0..=30.0);
                shape.rotate_apart(spin);
                self.backoff.pause(rng).await;
                continue;
            };

            let distance = route.distance_km;
            let closer = best
                .as_ref()
                .map_or(true, |b| (distance - desired).abs() < (b.distance_km - desired).abs());
            if closer {
                best = Some(route.clone());
            }

            if (min_ok..=max_ok).contains(&distance) {
                tracing::info!(
                    "✓ Accepted trek loop: {:.2}km after {} attempt(s)",
                    distance,
                    attempt + 1
                );
                return LoopOutcome::Accepted(route);
            }

            let factor = (desired / distance.max(0.001)).clamp(MIN_SCALE, MAX_SCALE);
            let jitter = rng.gen_range(6.0..=12.0);
            tracing::debug!(
                "Rejected: loop {:.2}km out of band, scaling spokes by {:.2}, jitter {:.1}°",
                distance,
                factor,
                jitter
            );
            shape.scale(factor);
            shape.rotate_apart(if attempt % 2 == 0 { jitter } else { -jitter });
        }

        match best {
            Some(route) => {
                tracing::warn!(
                    "Trek loop search exhausted {} attempts, keeping closest loop at {:.2}km",
                    self.limits.max_attempts,
                    route.distance_km
                );
                let distance_km = route.distance_km;
                LoopOutcome::Approximate { route, distance_km }
            }
            None => {
                tracing::warn!("Trek loop search exhausted {} attempts without any route", self.limits.max_attempts);
                LoopOutcome::Exhausted
            }
        }
    }
}
