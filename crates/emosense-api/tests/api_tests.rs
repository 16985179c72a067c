//! API integration tests.
//!
//! These exercise the router against an in-memory database; no camera,
//! FFmpeg, or analysis service is required for the state-conflict and
//! lookup paths covered here.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use emosense_api::{create_router, ApiConfig, AppState};

async fn test_state() -> AppState {
    let config = ApiConfig {
        database_url: "sqlite::memory:".to_string(),
        ..ApiConfig::default()
    };
    AppState::new(config).await.unwrap()
}

async fn test_app() -> (AppState, axum::Router) {
    let state = test_state().await;
    let app = create_router(state.clone());
    (state, app)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let (_state, app) = test_app().await;

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_ready_endpoint() {
    let (_state, app) = test_app().await;

    let response = app
        .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_stop_without_recording_is_conflict() {
    let (_state, app) = test_app().await;

    let response = app
        .oneshot(post_json("/stop_recording", json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "No recording in progress");
}

#[tokio::test]
async fn test_start_evaluation_returns_generated_id() {
    let (_state, app) = test_app().await;

    let response = app
        .clone()
        .oneshot(post_json(
            "/start_evaluation",
            json!({"PruebaID": 4, "EstudianteID": 77}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Evaluation started");
    assert_eq!(body["IDEval"], 1);

    // IDs keep incrementing per session.
    let response = app
        .oneshot(post_json(
            "/start_evaluation",
            json!({"PruebaID": 4, "EstudianteID": 78}),
        ))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["IDEval"], 2);
}

#[tokio::test]
async fn test_start_recording_unknown_stimulus() {
    let (_state, app) = test_app().await;

    let response = app
        .oneshot(post_json(
            "/start_recording",
            json!({"IDEval": 1, "EstimuloName": "missing"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("missing"));
}

#[tokio::test]
async fn test_analyze_video_without_recording() {
    let (state, app) = test_app().await;
    state.db.insert_stimulus("spider photo").await.unwrap();

    let response = app
        .oneshot(post_json(
            "/analyze_video",
            json!({
                "IDEval": 1,
                "EstimuloName": "spider photo",
                "PruebaID": 4,
                "RespuestaEstudiante": "scary",
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("No recording"));
}

#[tokio::test]
async fn test_analyze_video_rejects_zero_frame_rate() {
    let (state, app) = test_app().await;
    state.db.insert_stimulus("spider photo").await.unwrap();

    let response = app
        .oneshot(post_json(
            "/analyze_video",
            json!({
                "frame_rate": 0,
                "IDEval": 1,
                "EstimuloName": "spider photo",
                "PruebaID": 4,
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "frame_rate must be at least 1");
}
