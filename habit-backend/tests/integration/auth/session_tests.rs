// tests/integration/auth/session_tests.rs
use crate::common::app_helper::setup_app;
use crate::common::auth_helper::{
    create_authenticated_request, json_request, read_json, signin_test_user, signup_test_user,
};
use axum::body::Body;
use axum::http::Request;
use futures::StreamExt;
use serde_json::json;
use std::time::Duration;
use tower::ServiceExt;

#[tokio::test]
async fn test_me_requires_authentication() {
    let (app, _db) = setup_app().await;

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/auth/me").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), 401);

    let response = app
        .clone()
        .oneshot(create_authenticated_request(
            "GET",
            "/auth/me",
            "not-a-jwt",
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_me_returns_current_user() {
    let (app, _db) = setup_app().await;
    let user = signup_test_user(&app).await;

    let response = app
        .clone()
        .oneshot(create_authenticated_request(
            "GET",
            "/auth/me",
            &user.access_token,
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), 200);

    let body = read_json(response).await;
    assert_eq!(body["data"]["user"]["id"], user.id.to_string());
    assert_eq!(body["data"]["onboarding_completed"], false);
}

#[tokio::test]
async fn test_me_accepts_access_token_cookie() {
    let (app, _db) = setup_app().await;
    let user = signup_test_user(&app).await;

    let request = Request::builder()
        .uri("/auth/me")
        .header("Cookie", format!("access_token={}", user.access_token))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn test_refresh_rotates_refresh_token() {
    let (app, _db) = setup_app().await;
    let user = signup_test_user(&app).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/auth/refresh",
            json!({ "refresh_token": user.refresh_token }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let body = read_json(response).await;
    let new_refresh = body["data"]["tokens"]["refresh_token"].as_str().unwrap();
    assert_ne!(new_refresh, user.refresh_token);
    assert_eq!(body["data"]["user"]["id"], user.id.to_string());

    // 使用済みのリフレッシュトークンは再利用できない
    let reused = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/auth/refresh",
            json!({ "refresh_token": user.refresh_token }),
        ))
        .await
        .unwrap();
    assert_eq!(reused.status(), 401);

    // 新しいトークンは使える
    let rotated = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/auth/refresh",
            json!({ "refresh_token": new_refresh }),
        ))
        .await
        .unwrap();
    assert_eq!(rotated.status(), 200);
}

#[tokio::test]
async fn test_refresh_rejects_access_token() {
    let (app, _db) = setup_app().await;
    let user = signup_test_user(&app).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/auth/refresh",
            json!({ "refresh_token": user.access_token }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_signout_revokes_given_refresh_token() {
    let (app, _db) = setup_app().await;
    let user = signup_test_user(&app).await;

    let response = app
        .clone()
        .oneshot(create_authenticated_request(
            "POST",
            "/auth/signout",
            &user.access_token,
            Some(json!({ "refresh_token": user.refresh_token })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let cleared: Vec<_> = response
        .headers()
        .get_all("set-cookie")
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect();
    assert!(cleared.iter().any(|c| c.starts_with("access_token=")));

    let body = read_json(response).await;
    assert_eq!(body["data"]["message"], "Logout successful");

    let refresh = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/auth/refresh",
            json!({ "refresh_token": user.refresh_token }),
        ))
        .await
        .unwrap();
    assert_eq!(refresh.status(), 401);
}

#[tokio::test]
async fn test_signout_without_token_revokes_all_sessions() {
    let (app, _db) = setup_app().await;
    let user = signup_test_user(&app).await;
    let second_session = signin_test_user(&app, &user).await;

    let response = app
        .clone()
        .oneshot(create_authenticated_request(
            "POST",
            "/auth/signout",
            &user.access_token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    for token in [&user.refresh_token, &second_session.refresh_token] {
        let refresh = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/auth/refresh",
                json!({ "refresh_token": token }),
            ))
            .await
            .unwrap();
        assert_eq!(refresh.status(), 401);
    }
}

#[tokio::test]
async fn test_signout_twice_reports_already_logged_out() {
    let (app, _db) = setup_app().await;
    let user = signup_test_user(&app).await;

    for expected in ["Logout successful", "Already logged out"] {
        let response = app
            .clone()
            .oneshot(create_authenticated_request(
                "POST",
                "/auth/signout",
                &user.access_token,
                Some(json!({ "refresh_token": user.refresh_token })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), 200);

        let body = read_json(response).await;
        assert_eq!(body["data"]["message"], expected);
    }
}

#[tokio::test]
async fn test_signout_with_other_users_token_is_forbidden() {
    let (app, _db) = setup_app().await;
    let alice = signup_test_user(&app).await;
    let bob = signup_test_user(&app).await;

    let response = app
        .clone()
        .oneshot(create_authenticated_request(
            "POST",
            "/auth/signout",
            &alice.access_token,
            Some(json!({ "refresh_token": bob.refresh_token })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), 403);
}

#[tokio::test]
async fn test_session_events_stream_reports_signin() {
    let (app, _db) = setup_app().await;
    let user = signup_test_user(&app).await;

    let response = app
        .clone()
        .oneshot(create_authenticated_request(
            "GET",
            "/auth/events",
            &user.access_token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    assert!(response.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("text/event-stream"));

    // 購読開始後に同じユーザーで再ログイン
    signin_test_user(&app, &user).await;

    let mut stream = response.into_body().into_data_stream();
    let frame = tokio::time::timeout(Duration::from_secs(5), stream.next())
        .await
        .expect("event within timeout")
        .expect("stream open")
        .expect("frame bytes");
    let text = String::from_utf8_lossy(&frame);

    assert!(text.contains("event: signed_in"), "unexpected frame: {}", text);
    assert!(text.contains(&user.id.to_string()));
}
