use std::sync::Arc;

use axum::{
    body::{Body, to_bytes},
    http::Request,
};
use hyper::StatusCode;
use ridewalk::{
    AppState, create_router,
    config::PlannerConfig,
    engine::ProviderGateway,
    mock::{FixedGeocoder, StraightLineProvider, UnavailableProvider},
    models::{Coordinate, PlanResponse, RouteResponse, TravelProfile},
    path_codec::decode_path,
    planner::PlanEngine,
};
use serde_json::{Value, json};
use tower::ServiceExt;

const ANNECY: Coordinate = Coordinate {
    lat: 45.8992,
    lng: 6.1294,
};

fn geocoder() -> Arc<FixedGeocoder> {
    Arc::new(FixedGeocoder::new().with_place("Annecy", ANNECY, "Annecy, Haute-Savoie, France"))
}

fn app_with(gateway: ProviderGateway) -> axum::Router {
    let engine = PlanEngine::new(PlannerConfig::default(), gateway, geocoder());
    create_router(AppState::new(engine))
}

fn test_app() -> axum::Router {
    app_with(ProviderGateway::new().with_provider_for_all(Arc::new(StraightLineProvider::new("line", 1.2))))
}

fn post_json(uri: &str, payload: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap()
}

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn bike_plan_returns_two_days() {
    let app = test_app();
    let request = post_json(
        "/api/plan",
        json!({"kind": "bike", "location_query": "Annecy", "seed": 3}),
    );

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: PlanResponse = body_json(response).await;
    assert_eq!(body.start.name, "Annecy, Haute-Savoie, France");
    assert_eq!(body.days.len(), 2);
    assert_eq!(body.days[0].start.name, "Annecy");
    assert_eq!(body.days[1].start, body.days[0].end);
    for day in &body.days {
        assert!(day.distance_km <= 60.3);
        assert!(!day.gpx_base64.is_empty());
        assert!(decode_path(&day.encoded_path).unwrap().len() >= 2);
    }
}

#[tokio::test]
async fn trek_plan_honours_request_hints() {
    let app = test_app();
    let request = post_json(
        "/api/plan",
        json!({
            "kind": "trek",
            "location_query": "Annecy",
            "seed": 9,
            "hints": {"loop_km": 6.0, "loop_bearings_deg": [90.0, 300.0]},
            "anchors": [{"name": "Lac d'Annecy"}]
        }),
    );

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: PlanResponse = body_json(response).await;
    assert_eq!(body.days.len(), 1);
    let day = &body.days[0];
    assert_eq!(day.start.name, "Lac d'Annecy");
    assert_eq!(day.start, day.end);
    assert!((4.8..=15.2).contains(&day.distance_km));
}

#[tokio::test]
async fn same_seed_gives_same_plan() {
    let payload = json!({"kind": "trek", "location_query": "Annecy", "seed": 42});

    let first: PlanResponse = body_json(test_app().oneshot(post_json("/api/plan", payload.clone())).await.unwrap()).await;
    let second: PlanResponse = body_json(test_app().oneshot(post_json("/api/plan", payload)).await.unwrap()).await;
    assert_eq!(first.days, second.days);
}

#[tokio::test]
async fn unknown_location_is_not_found() {
    let response = test_app()
        .oneshot(post_json("/api/plan", json!({"kind": "bike", "location_query": "Atlantis"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body: Value = body_json(response).await;
    assert!(body["message"].as_str().unwrap().contains("Atlantis"));
}

#[tokio::test]
async fn blank_location_is_bad_request() {
    let response = test_app()
        .oneshot(post_json("/api/plan", json!({"kind": "trek", "location_query": "  "})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn exhausted_bike_plan_is_unprocessable() {
    let app = app_with(ProviderGateway::new().with_provider_for_all(Arc::new(UnavailableProvider::new("down"))));
    let response = app
        .oneshot(post_json("/api/plan", json!({"kind": "bike", "location_query": "Annecy", "seed": 1})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn route_endpoint_closes_loops() {
    let request = post_json(
        "/api/route",
        json!({
            "profile": "foot",
            "waypoints": [{"lat": 45.8992, "lng": 6.1294}, {"lat": 45.91, "lng": 6.14}],
            "close_loop": true
        }),
    );

    let response = test_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: RouteResponse = body_json(response).await;
    let path = decode_path(&body.encoded_path).unwrap();
    assert_eq!(path.len(), 3);
    assert!((path[0].lat - path[2].lat).abs() < 1e-9);
    assert!(body.distance_km > 2.0);
}

#[tokio::test]
async fn route_endpoint_validates_waypoints() {
    let single = post_json(
        "/api/route",
        json!({"profile": "cycling", "waypoints": [{"lat": 45.0, "lng": 6.0}]}),
    );
    assert_eq!(test_app().oneshot(single).await.unwrap().status(), StatusCode::BAD_REQUEST);

    let out_of_range = post_json(
        "/api/route",
        json!({"profile": "cycling", "waypoints": [{"lat": 95.0, "lng": 6.0}, {"lat": 45.0, "lng": 6.0}]}),
    );
    assert_eq!(test_app().oneshot(out_of_range).await.unwrap().status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn route_endpoint_reports_missing_route() {
    let app = app_with(ProviderGateway::new().with_provider(
        TravelProfile::Cycling,
        Arc::new(StraightLineProvider::new("bike-only", 1.0)),
    ));
    let request = post_json(
        "/api/route",
        json!({"profile": "foot", "waypoints": [{"lat": 45.0, "lng": 6.0}, {"lat": 45.1, "lng": 6.0}]}),
    );
    assert_eq!(app.oneshot(request).await.unwrap().status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn health_check() {
    let request = Request::builder()
        .uri("/api/health")
        .body(Body::empty())
        .unwrap();
    let response = test_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), 64).await.unwrap();
    assert_eq!(&bytes[..], b"ok");
}
