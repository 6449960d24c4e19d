use std::sync::Arc;

use clap::{Parser, ValueEnum};
use rand::{SeedableRng, rngs::StdRng};
use ridewalk::{
    config::PlannerConfig,
    engine::ProviderGateway,
    mock::{FixedGeocoder, StraightLineProvider},
    models::{Coordinate, PlanKind, PlanResponse},
    planner::PlanEngine,
    seed::{FallbackSeeder, PlanSeeder},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Road/trail length over straight-line length assumed by the offline provider.
const OFFLINE_DETOUR_FACTOR: f64 = 1.25;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Kind {
    Bike,
    Trek,
}

impl From<Kind> for PlanKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Bike => PlanKind::Bike,
            Kind::Trek => PlanKind::Trek,
        }
    }
}

#[derive(Debug, Parser)]
#[command(author, version, about = "Plan a two-day ride or a trek loop and print it as JSON")]
struct Args {
    #[arg(long, value_enum)]
    kind: Kind,

    /// Free-text starting place, e.g. "Annecy"
    #[arg(long)]
    location: String,

    /// RNG seed; the same seed and providers give the same plan
    #[arg(long)]
    seed: Option<u64>,

    /// Route with straight lines instead of the configured providers
    #[arg(long, requires_all = ["lat", "lng"])]
    offline: bool,

    /// Latitude of `--location` in offline mode
    #[arg(long, allow_hyphen_values = true)]
    lat: Option<f64>,

    /// Longitude of `--location` in offline mode
    #[arg(long, allow_hyphen_values = true)]
    lng: Option<f64>,
}

impl Args {
    fn offline_start(&self) -> Option<Coordinate> {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => Some(Coordinate::new(lat, lng)),
            _ => None,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let config = PlannerConfig::from_env()?;

    let engine = match args.offline_start().filter(|_| args.offline) {
        Some(start) => {
            if !start.is_valid() {
                return Err(format!("invalid coordinate {}, {}", start.lat, start.lng).into());
            }
            tracing::info!("offline mode: straight-line routing from {:?}", start);
            let gateway = ProviderGateway::new().with_provider_for_all(Arc::new(
                StraightLineProvider::new("offline", OFFLINE_DETOUR_FACTOR),
            ));
            let geocoder = FixedGeocoder::new().with_place(&args.location, start, args.location.clone());
            PlanEngine::new(config, gateway, Arc::new(geocoder))
        }
        None => PlanEngine::from_config(config)?,
    };

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let seed = FallbackSeeder.seed(&args.location, args.kind.into(), &mut rng);
    let outcome = engine.plan_with_deadline(&seed, &mut rng).await?;

    println!("{}", serde_json::to_string_pretty(&PlanResponse::from(outcome))?);
    Ok(())
}
