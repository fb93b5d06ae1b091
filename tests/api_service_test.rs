use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Request, StatusCode},
    routing::get,
};
use cloud_demo_services::{create_api_app, with_http_tracing};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

async fn call(method: &str, uri: &str) -> (StatusCode, Value) {
    let response = create_api_app()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_root_returns_message() {
    let (status, body) = call("GET", "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_status_reports_api_and_time() {
    let (status, body) = call("GET", "/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["api"], "cloud-demo-services");
    let time = body["time"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(time).is_ok());
}

#[tokio::test]
async fn test_unmatched_routes_return_literal_404() {
    for (method, uri) in [
        ("GET", "/any-unmatched-path"),
        ("GET", "/items/42"),
        ("DELETE", "/"),
        ("POST", "/status"),
    ] {
        let (status, body) = call(method, uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{} {}", method, uri);
        assert_eq!(body, json!({"error": "Not Found -  Error 404."}));
    }
}

#[tokio::test]
async fn test_traced_router_sees_assigned_request_id() {
    // The inner route reports the id it received; the tracing wrapper must
    // have assigned one before the request reached it.
    let inner = Router::new().route(
        "/echo",
        get(|headers: HeaderMap| async move {
            headers
                .get("x-request-id")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("missing")
                .to_string()
        }),
    );

    let response = with_http_tracing(inner)
        .oneshot(Request::builder().uri("/echo").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let assigned = response.headers()["x-request-id"].to_str().unwrap().to_string();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let seen = String::from_utf8(body.to_vec()).unwrap();
    assert_ne!(seen, "missing");
    assert_eq!(seen, assigned);
    assert!(uuid::Uuid::parse_str(&assigned).is_ok());
}
