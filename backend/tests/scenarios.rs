//! End-to-end planner scenarios against in-process providers.

use std::sync::Arc;

use rand::{SeedableRng, rngs::StdRng};
use ridewalk::{
    bike::BikeLegPlanner,
    config::{BikeLimits, PlannerConfig, TrekLimits},
    engine::{AttemptBackoff, ProviderGateway},
    error::PlanError,
    geodesy::haversine_km,
    loops::{LoopOutcome, TrekLoopPlanner},
    mock::{CountingProvider, FixedGeocoder, StraightLineProvider, UnavailableProvider},
    models::{Coordinate, PlanHints, PlanKind, TravelProfile},
    planner::PlanEngine,
    seed::{FallbackSeeder, PlanSeeder},
};

const START: Coordinate = Coordinate { lat: 45.0, lng: 7.0 };

#[tokio::test]
async fn bike_leg_converges_from_overlong_target() {
    let provider = Arc::new(CountingProvider::new(StraightLineProvider::new("line", 1.0)));
    let gateway = ProviderGateway::new().with_provider(TravelProfile::Cycling, provider.clone());
    let limits = BikeLimits::default();
    let planner = BikeLegPlanner::new(&gateway, &limits, AttemptBackoff::default());

    let leg = planner
        .plan(START, 70.0, 80.0, &mut StdRng::seed_from_u64(0))
        .await
        .unwrap();

    assert!((45.0..=60.3).contains(&leg.route.distance_km));
    assert!(provider.calls() <= 4);
}

#[tokio::test]
async fn trek_with_stubborn_provider_returns_closest_loop() {
    let provider = Arc::new(CountingProvider::new(StraightLineProvider::fixed_distance("fixed", 20.0)));
    let gateway = ProviderGateway::new().with_provider(TravelProfile::Foot, provider.clone());
    let limits = TrekLimits::default();
    let planner = TrekLoopPlanner::new(&gateway, &limits, AttemptBackoff::default());

    let outcome = planner
        .plan(START, &PlanHints::default(), &mut StdRng::seed_from_u64(0))
        .await;

    match outcome {
        LoopOutcome::Approximate { distance_km, route } => {
            assert_eq!(distance_km, 20.0);
            assert_eq!(route.distance_km, 20.0);
        }
        other => panic!("expected approximate loop, got {other:?}"),
    }
    assert_eq!(provider.calls(), 14);
}

#[tokio::test]
async fn unavailable_primary_falls_through_to_secondary() {
    let primary = Arc::new(CountingProvider::new(UnavailableProvider::new("primary")));
    let secondary = Arc::new(CountingProvider::new(StraightLineProvider::new("secondary", 1.0)));
    let gateway = ProviderGateway::new()
        .with_provider_for_all(primary.clone())
        .with_provider_for_all(secondary.clone());
    let geocoder = Arc::new(FixedGeocoder::new().with_place("Torino", START, "Torino"));
    let engine = PlanEngine::new(PlannerConfig::default(), gateway, geocoder);

    let mut rng = StdRng::seed_from_u64(4);
    let seed = FallbackSeeder.seed("Torino", PlanKind::Bike, &mut rng);
    let outcome = engine.plan(&seed, &mut rng).await.unwrap();

    assert_eq!(outcome.days.len(), 2);
    assert_eq!(primary.calls(), secondary.calls());
}

#[tokio::test]
async fn geocode_failure_makes_no_provider_calls() {
    let provider = Arc::new(CountingProvider::new(StraightLineProvider::new("line", 1.0)));
    let gateway = ProviderGateway::new().with_provider_for_all(provider.clone());
    let engine = PlanEngine::new(PlannerConfig::default(), gateway, Arc::new(FixedGeocoder::new()));

    let mut rng = StdRng::seed_from_u64(0);
    let seed = FallbackSeeder.seed("Nowhere", PlanKind::Trek, &mut rng);
    let err = engine.plan(&seed, &mut rng).await.unwrap_err();

    assert!(matches!(err, PlanError::Geocode { .. }));
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn concurrent_plans_share_one_engine() {
    let gateway = ProviderGateway::new().with_provider_for_all(Arc::new(StraightLineProvider::new("line", 1.3)));
    let geocoder = Arc::new(
        FixedGeocoder::new()
            .with_place("Torino", START, "Torino")
            .with_place("Grenoble", Coordinate::new(45.1885, 5.7245), "Grenoble"),
    );
    let engine = Arc::new(PlanEngine::new(PlannerConfig::default(), gateway, geocoder));

    let tasks: Vec<_> = [("Torino", PlanKind::Bike), ("Grenoble", PlanKind::Trek), ("Torino", PlanKind::Trek)]
        .into_iter()
        .enumerate()
        .map(|(i, (place, kind))| {
            let engine = Arc::clone(&engine);
            tokio::spawn(async move {
                let mut rng = StdRng::seed_from_u64(i as u64);
                let seed = FallbackSeeder.seed(place, kind, &mut rng);
                engine.plan(&seed, &mut rng).await
            })
        })
        .collect();

    for task in tasks {
        let outcome = task.await.unwrap().unwrap();
        let day = &outcome.days[0];
        assert!(haversine_km(day.start.coordinate(), outcome.start.coordinate()) < 1e-9);
    }
}
