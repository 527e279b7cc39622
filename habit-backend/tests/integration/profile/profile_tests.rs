// tests/integration/profile/profile_tests.rs
use crate::common::app_helper::setup_app;
use crate::common::auth_helper::{create_authenticated_request, read_json, signup_test_user};
use serde_json::json;
use tower::ServiceExt;

#[tokio::test]
async fn test_get_profile_before_onboarding() {
    let (app, _db) = setup_app().await;
    let user = signup_test_user(&app).await;

    let response = app
        .clone()
        .oneshot(create_authenticated_request(
            "GET",
            "/profile",
            &user.access_token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let body = read_json(response).await;
    let data = &body["data"];
    assert_eq!(data["user_id"], user.id.to_string());
    assert!(data["role"].is_null());
    assert_eq!(data["activities"], json!([]));
    assert_eq!(data["onboarding_completed"], false);
}

#[tokio::test]
async fn test_save_profile_completes_onboarding() {
    let (app, _db) = setup_app().await;
    let user = signup_test_user(&app).await;

    let response = app
        .clone()
        .oneshot(create_authenticated_request(
            "PUT",
            "/profile",
            &user.access_token,
            Some(json!({
                "role": "student",
                "activities": ["coding", "learning", "coding"],
                "platforms": { "leetcode": "  alice_lc  ", "gfg": "" }
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let body = read_json(response).await;
    assert_eq!(body["message"], "Onboarding completed");
    let data = &body["data"];
    assert_eq!(data["role"], "student");
    assert_eq!(data["activities"], json!(["coding", "learning"]));
    assert_eq!(data["platforms"], json!({ "leetcode": "alice_lc" }));
    assert_eq!(data["onboarding_completed"], true);
    assert!(data["onboarding_completed_at"].is_string());

    // /auth/me にも反映される
    let me = app
        .clone()
        .oneshot(create_authenticated_request(
            "GET",
            "/auth/me",
            &user.access_token,
            None,
        ))
        .await
        .unwrap();
    let body = read_json(me).await;
    assert_eq!(body["data"]["onboarding_completed"], true);
}

#[tokio::test]
async fn test_platforms_dropped_without_coding_activity() {
    let (app, _db) = setup_app().await;
    let user = signup_test_user(&app).await;

    let response = app
        .clone()
        .oneshot(create_authenticated_request(
            "PUT",
            "/profile",
            &user.access_token,
            Some(json!({
                "role": "freelancer",
                "activities": ["designing"],
                "platforms": { "leetcode": "ignored" }
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let body = read_json(response).await;
    assert!(body["data"]["platforms"].is_null());
}

#[tokio::test]
async fn test_save_profile_overwrites_previous() {
    let (app, _db) = setup_app().await;
    let user = signup_test_user(&app).await;

    for (role, activity) in [("student", "learning"), ("professional", "content")] {
        let response = app
            .clone()
            .oneshot(create_authenticated_request(
                "PUT",
                "/profile",
                &user.access_token,
                Some(json!({ "role": role, "activities": [activity] })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
    }

    let response = app
        .clone()
        .oneshot(create_authenticated_request(
            "GET",
            "/profile",
            &user.access_token,
            None,
        ))
        .await
        .unwrap();
    let body = read_json(response).await;
    assert_eq!(body["data"]["role"], "professional");
    assert_eq!(body["data"]["activities"], json!(["content"]));
}

#[tokio::test]
async fn test_save_profile_requires_an_activity() {
    let (app, _db) = setup_app().await;
    let user = signup_test_user(&app).await;

    let response = app
        .clone()
        .oneshot(create_authenticated_request(
            "PUT",
            "/profile",
            &user.access_token,
            Some(json!({ "role": "student", "activities": [] })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), 400);

    let body = read_json(response).await;
    assert!(body["errors"].to_string().contains("Select at least one activity"));
}

#[tokio::test]
async fn test_save_profile_rejects_unknown_role() {
    let (app, _db) = setup_app().await;
    let user = signup_test_user(&app).await;

    let response = app
        .clone()
        .oneshot(create_authenticated_request(
            "PUT",
            "/profile",
            &user.access_token,
            Some(json!({ "role": "astronaut", "activities": ["coding"] })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), 422);
}
