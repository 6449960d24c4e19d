pub mod bike;
pub mod config;
pub mod duration;
pub mod engine;
pub mod error;
pub mod geocode;
pub mod geodesy;
pub mod gpx_export;
pub mod loops;
pub mod mock;
pub mod models;
pub mod path_codec;
pub mod planner;
pub mod providers;
pub mod seed;

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use rand::{SeedableRng, rngs::StdRng};

use crate::error::PlanError;
use crate::models::{ApiError, PlanRequest, PlanResponse, RouteRequest, RouteResponse};
use crate::planner::{PlanEngine, merge_seed};
use crate::seed::{FallbackSeeder, PlanSeeder};

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<PlanEngine>,
    pub seeder: Arc<dyn PlanSeeder>,
}

impl AppState {
    pub fn new(engine: PlanEngine) -> Self {
        Self {
            engine: Arc::new(engine),
            seeder: Arc::new(FallbackSeeder),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/plan", post(plan_handler))
        .route("/api/route", post(route_handler))
        .route("/api/health", get(health_handler))
        .with_state(state)
}

async fn plan_handler(
    State(state): State<AppState>,
    Json(req): Json<PlanRequest>,
) -> Result<impl IntoResponse, (StatusCode, Json<ApiError>)> {
    let mut rng = match req.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let seed = state.seeder.seed(req.location_query.trim(), req.kind, &mut rng);
    let seed = merge_seed(seed, req.hints, req.anchors);

    let outcome = state
        .engine
        .plan_with_deadline(&seed, &mut rng)
        .await
        .map_err(plan_error)?;

    Ok(Json(PlanResponse::from(outcome)))
}

async fn route_handler(
    State(state): State<AppState>,
    Json(req): Json<RouteRequest>,
) -> Result<impl IntoResponse, (StatusCode, Json<ApiError>)> {
    let mut waypoints = req.waypoints;
    if waypoints.iter().any(|c| !c.is_valid()) {
        return Err(api_error(StatusCode::BAD_REQUEST, "waypoint outside valid coordinate range"));
    }
    if req.close_loop {
        if let Some(&first) = waypoints.first() {
            waypoints.push(first);
        }
    }
    if waypoints.len() < 2 {
        return Err(api_error(StatusCode::BAD_REQUEST, "at least two waypoints are required"));
    }

    let segment = state
        .engine
        .gateway()
        .route(req.profile, &waypoints)
        .await
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, "no route found between the waypoints"))?;

    Ok(Json(RouteResponse::from(segment)))
}

async fn health_handler() -> &'static str {
    "ok"
}

fn api_error(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<ApiError>) {
    (
        status,
        Json(ApiError {
            message: message.into(),
        }),
    )
}

fn plan_error(err: PlanError) -> (StatusCode, Json<ApiError>) {
    let status = match &err {
        PlanError::Geocode { .. } => StatusCode::NOT_FOUND,
        PlanError::RoutingExhausted { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        PlanError::DeadlineExceeded(_) => StatusCode::GATEWAY_TIMEOUT,
        PlanError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        PlanError::Route(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        tracing::error!("Plan request failed: {}", err);
    } else {
        tracing::info!("Plan request rejected: {}", err);
    }
    api_error(status, err.to_string())
}
