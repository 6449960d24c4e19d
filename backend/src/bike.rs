use rand::Rng;

use crate::{
    config::BikeLimits,
    engine::{AttemptBackoff, ProviderGateway},
    error::PlanError,
    geodesy::destination_point,
    models::{Coordinate, PlanKind, RouteSegment},
};

/// Fraction of the measured cap/distance ratio applied when a leg overshoots,
/// so the next attempt lands a little under the cap rather than on it.
const OVERSHOOT_MARGIN: f64 = 0.92;
const MIN_SHRINK_FACTOR: f64 = 0.4;
const UNAVAILABLE_SHRINK_FACTOR: f64 = 0.9;
const BEARING_NUDGE_DEG: f64 = 10.0;

/// An accepted point-to-point leg and the offset point it was routed to.
#[derive(Debug, Clone, PartialEq)]
pub struct BikeLeg {
    pub route: RouteSegment,
    pub destination: Coordinate,
    pub attempts: usize,
}

/// Searches for a single cycling leg whose routed distance stays under the
/// per-day cap.
pub struct BikeLegPlanner<'a> {
    gateway: &'a ProviderGateway,
    limits: &'a BikeLimits,
    backoff: AttemptBackoff,
}

impl<'a> BikeLegPlanner<'a> {
    pub fn new(gateway: &'a ProviderGateway, limits: &'a BikeLimits, backoff: AttemptBackoff) -> Self {
        Self {
            gateway,
            limits,
            backoff,
        }
    }

    /// Route from `start` towards `bearing_deg`, aiming for `target_km`.
    ///
    /// # Algorithm: measured-overshoot shrinking
    ///
    /// Each attempt offsets `start` by the working distance along the working
    /// bearing and asks the gateway for a route to that point.
    ///
    /// - **Within cap** (`distance ≤ cap + tolerance`): accept.
    /// - **Over cap**: scale the working distance by
    ///   `max(0.4, cap / distance × 0.92)`, floored at the minimum leg length.
    ///   The routed/straight ratio of the failed attempt predicts the next one,
    ///   which converges much faster than fixed steps.
    /// - **Unavailable**: shrink by 10% and nudge the bearing ±10° (alternating)
    ///   to step out of areas the providers cannot route (water, no network).
    ///
    /// # Returns
    /// - `Ok(BikeLeg)`: first leg within the cap
    /// - `Err(PlanError::RoutingExhausted)`: attempt budget spent
    pub async fn plan<R: Rng + Send>(
        &self,
        start: Coordinate,
        target_km: f64,
        bearing_deg: f64,
        rng: &mut R,
    ) -> Result<BikeLeg, PlanError> {
        let cap = self.limits.max_km_per_day;
        let min_km = self.limits.min_leg_km;
        let mut km = target_km.max(min_km);
        let mut bearing = bearing_deg;

        for attempt in 0..self.limits.max_attempts {
            let destination = destination_point(start, km, bearing);
            tracing::debug!(
                "Bike attempt {}: {:.1} km at {:.0}°",
                attempt + 1,
                km,
                bearing
            );

            match self.gateway.route(PlanKind::Bike.profile(), &[start, destination]).await {
                Some(route) if route.distance_km <= cap + self.limits.tolerance_km => {
                    tracing::info!(
                        "✓ Accepted bike leg: {:.1} km after {} attempt(s)",
                        route.distance_km,
                        attempt + 1
                    );
                    return Ok(BikeLeg {
                        route,
                        destination,
                        attempts: attempt + 1,
                    });
                }
                Some(route) => {
                    let factor = (cap / route.distance_km * OVERSHOOT_MARGIN).max(MIN_SHRINK_FACTOR);
                    tracing::debug!(
                        "Rejected: {:.1} km over the {:.0} km cap, scaling by {:.3}",
                        route.distance_km,
                        cap,
                        factor
                    );
                    km = (km * factor).max(min_km);
                }
                None => {
                    km = (km * UNAVAILABLE_SHRINK_FACTOR).max(min_km);
                    bearing += if attempt % 2 == 0 {
                        BEARING_NUDGE_DEG
                    } else {
                        -BEARING_NUDGE_DEG
                    };
                    self.backoff.pause(rng).await;
                }
            }
        }

        tracing::warn!(
            "Bike leg from {:?} exhausted {} attempts",
            start,
            self.limits.max_attempts
        );
        Err(PlanError::RoutingExhausted {
            kind: PlanKind::Bike,
            attempts: self.limits.max_attempts,
        })
    }
}
