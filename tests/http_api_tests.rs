//! HTTP API tests driving the axum router directly.

#![cfg(feature = "http-server")]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use landsight::auth::LocalIdentityProvider;
use landsight::db::repositories::LocalRepository;
use landsight::http::{create_router, AppState};

struct TestApp {
    router: axum::Router,
    token: String,
}

fn test_app() -> TestApp {
    let identity = LocalIdentityProvider::new();
    let token = identity.issue_token("tester@example.com");
    let state = AppState::new(Arc::new(LocalRepository::new()), Arc::new(identity));
    TestApp {
        router: create_router(state),
        token,
    }
}

fn analyze_request(token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri("/analyze-land")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_analyze_land_success_envelope() {
    let app = test_app();

    let response = app
        .router
        .oneshot(analyze_request(
            Some(&app.token),
            json!({
                "latitude": 10.0,
                "longitude": 20.0,
                "imageData": "data:image/jpeg;base64,eA==",
                "notes": "test plot"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["data"]["analysis_result"]["terrain"], "Tropical");
    assert_eq!(
        body["data"]["analysis_result"]["landUse"],
        "Specialized agriculture"
    );
    assert_eq!(body["data"]["latitude"], json!(10.0));
    assert!(body["data"]["id"].is_string());
    assert!(body["data"]["created_at"].is_string());
}

#[tokio::test]
async fn test_analyze_land_without_token_is_401() {
    let app = test_app();

    let response = app
        .router
        .oneshot(analyze_request(
            None,
            json!({"latitude": 10.0, "longitude": 20.0, "imageData": "x"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_analyze_land_with_bad_token_is_401() {
    let app = test_app();

    let response = app
        .router
        .oneshot(analyze_request(
            Some("bogus"),
            json!({"latitude": 10.0, "longitude": 20.0, "imageData": "x"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_analyze_land_rejects_invalid_coordinate() {
    let app = test_app();

    let response = app
        .router
        .oneshot(analyze_request(
            Some(&app.token),
            json!({"latitude": 123.0, "longitude": 20.0, "imageData": "x"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("latitude"));
}

#[tokio::test]
async fn test_preflight_options_returns_200() {
    let app = test_app();

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/analyze-land")
        .header(header::ORIGIN, "https://example.com")
        .header("Access-Control-Request-Method", "POST")
        .header("Access-Control-Request-Headers", "authorization,content-type")
        .body(Body::empty())
        .unwrap();

    let response = app.router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(bytes.is_empty(), "preflight responds with no body");
}

#[tokio::test]
async fn test_list_and_delete_round_trip() {
    let app = test_app();

    // Submit one analysis.
    let response = app
        .router
        .clone()
        .oneshot(analyze_request(
            Some(&app.token),
            json!({"latitude": 52.0, "longitude": 13.4, "imageData": "x"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let created = body_json(response).await;
    let id = created["data"]["id"].as_str().unwrap().to_string();

    // It shows up in the list.
    let list_request = Request::builder()
        .method(Method::GET)
        .uri("/analyses")
        .header(header::AUTHORIZATION, format!("Bearer {}", app.token))
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(list_request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let listed = body_json(response).await;
    assert_eq!(listed["data"].as_array().unwrap().len(), 1);
    assert_eq!(
        listed["data"][0]["analysis_result"]["terrain"],
        "Temperate hills"
    );

    // Delete it; a second delete is 404.
    let delete_request = |token: &str| {
        Request::builder()
            .method(Method::DELETE)
            .uri(format!("/analyses/{}", id))
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap()
    };

    let response = app
        .router
        .clone()
        .oneshot(delete_request(&app.token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.router.oneshot(delete_request(&app.token)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_foreign_record_is_404() {
    let identity = LocalIdentityProvider::new();
    let alice = identity.issue_token("alice@example.com");
    let bob = identity.issue_token("bob@example.com");
    let state = AppState::new(Arc::new(LocalRepository::new()), Arc::new(identity));
    let router = create_router(state);

    let response = router
        .clone()
        .oneshot(analyze_request(
            Some(&bob),
            json!({"latitude": 10.0, "longitude": 20.0, "imageData": "x"}),
        ))
        .await
        .unwrap();
    let created = body_json(response).await;
    let id = created["data"]["id"].as_str().unwrap();

    let request = Request::builder()
        .method(Method::DELETE)
        .uri(format!("/analyses/{}", id))
        .header(header::AUTHORIZATION, format!("Bearer {}", alice))
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = test_app();

    let request = Request::builder()
        .method(Method::GET)
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = app.router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "connected");
}
