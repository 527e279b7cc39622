// tests/integration/system/health_tests.rs
use crate::common::app_helper::setup_app;
use crate::common::auth_helper::read_json;
use axum::body::Body;
use axum::http::Request;
use tower::ServiceExt;

#[tokio::test]
async fn test_health_check_reports_database() {
    let (app, _db) = setup_app().await;

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let body = read_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "connected");
    assert_eq!(body["environment"], "test");
}

#[tokio::test]
async fn test_responses_carry_request_id_and_security_headers() {
    let (app, _db) = setup_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("x-request-id", "health-probe-1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.headers()["x-request-id"], "health-probe-1");
    assert_eq!(response.headers()["x-content-type-options"], "nosniff");
}
