//! Plan seeds produced without any language model.

use rand::{Rng, rngs::StdRng};

use crate::models::{Anchor, PlanHints, PlanKind, PlanSeed};

/// Supplies the kind, day count, anchors and numeric hints for a plan.
pub trait PlanSeeder: Send + Sync {
    fn seed(&self, location_query: &str, kind: PlanKind, rng: &mut StdRng) -> PlanSeed;
}

/// Default seeds: a two-day ride heading east-north-east then north-north-east,
/// or a single loop of 8-12 km with randomized spokes.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackSeeder;

impl PlanSeeder for FallbackSeeder {
    fn seed(&self, location_query: &str, kind: PlanKind, rng: &mut StdRng) -> PlanSeed {
        let anchors = vec![Anchor {
            name: location_query.to_string(),
        }];

        match kind {
            PlanKind::Bike => PlanSeed {
                location_query: location_query.to_string(),
                kind,
                days: 2,
                anchors,
                hints: PlanHints {
                    bearings_deg: Some(vec![80.0, 30.0]),
                    day_distances_km: Some(vec![45.0, 45.0]),
                    ..PlanHints::default()
                },
            },
            PlanKind::Trek => {
                let loop_km = (8.0 + rng.gen_range(0.0f64..4.0)).clamp(5.0, 15.0);
                let base = rng.gen_range(0.0..360.0);
                let second = base + 220.0 + rng.gen_range(-25.0..25.0);
                let skew = 0.7 + rng.gen_range(0.0..0.7);
                PlanSeed {
                    location_query: location_query.to_string(),
                    kind,
                    days: 1,
                    anchors,
                    hints: PlanHints {
                        loop_km: Some(loop_km),
                        loop_bearings_deg: Some(vec![base, second]),
                        loop_skew: Some(skew),
                        ..PlanHints::default()
                    },
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn bike_seed_uses_fixed_two_day_hints() {
        let seed = FallbackSeeder.seed("Lyon", PlanKind::Bike, &mut StdRng::seed_from_u64(1));
        assert_eq!(seed.days, 2);
        assert_eq!(seed.anchors, vec![Anchor { name: "Lyon".into() }]);
        assert_eq!(seed.hints.bearings_deg, Some(vec![80.0, 30.0]));
        assert_eq!(seed.hints.day_distances_km, Some(vec![45.0, 45.0]));
        assert!(seed.hints.loop_km.is_none());
    }

    #[test]
    fn trek_seed_hints_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..200 {
            let seed = FallbackSeeder.seed("Annecy", PlanKind::Trek, &mut rng);
            assert_eq!(seed.days, 1);

            let loop_km = seed.hints.loop_km.unwrap();
            assert!((8.0..12.0).contains(&loop_km));

            let bearings = seed.hints.loop_bearings_deg.unwrap();
            let spread = bearings[1] - bearings[0];
            assert!((195.0..245.0).contains(&spread));

            let skew = seed.hints.loop_skew.unwrap();
            assert!((0.7..1.4).contains(&skew));
        }
    }

    #[test]
    fn same_rng_seed_gives_same_plan_seed() {
        let a = FallbackSeeder.seed("Annecy", PlanKind::Trek, &mut StdRng::seed_from_u64(5));
        let b = FallbackSeeder.seed("Annecy", PlanKind::Trek, &mut StdRng::seed_from_u64(5));
        assert_eq!(a, b);
    }
}
